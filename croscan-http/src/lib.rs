//! Minimal HTTP client with safe logging and single-attempt requests.
//!
//! - Request options: headers, timeout, absolute-URL override
//! - [`HttpClient::send`] returns the raw response whatever its status, so
//!   callers can apply their own success policy
//! - [`HttpClient::get_json`] / [`HttpClient::post_json`] treat non-2xx as
//!   [`HttpError::Api`]
//! - Optional *raw* request/response logging via `CROSCAN_HTTP_RAW=1`
//!
//! Example (no_run):
//! ```rust
//! # async fn demo() -> Result<(), croscan_http::HttpError> {
//! let client = croscan_http::HttpClient::new("http://localhost:11434")?;
//! let tags: serde_json::Value = client
//!     .get_json("api/tags", croscan_http::RequestOpts::default())
//!     .await?;
//! # Ok(()) }
//! ```
//!
//! Requests are never retried. Observability: structured `tracing` events are
//! emitted for request start, response headers, body snippets (truncated),
//! final errors, and (optionally) raw request/response lines under target
//! `http.raw`.

use reqwest::header::HeaderMap;
use reqwest::{Client, Method, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::env;
use std::time::{Duration, Instant};
use thiserror::Error;

// ==============================
// Raw logging toggles
// ==============================

const RAW_ENV: &str = "CROSCAN_HTTP_RAW";
const RAW_MAX_BODY: usize = 64 * 1024; // cap raw body logs (64 KiB)
const SNIPPET_MAX: usize = 500;

fn raw_enabled() -> bool {
    matches!(
        env::var(RAW_ENV).as_deref(),
        Ok("1") | Ok("true") | Ok("yes")
    )
}

/// Render a best-effort curl command for repro/debug, with auth redacted.
fn make_curl(method: &Method, url: &Url, headers: &HeaderMap, body: Option<&[u8]>) -> String {
    let mut parts = vec!["curl".to_string(), format!("-X{}", method)];
    for (name, val) in redact_headers(headers) {
        parts.push(format!("-H '{}: {}'", name, val.replace('\'', r"'\''")));
    }
    if let Some(bytes) = body {
        match std::str::from_utf8(bytes) {
            Ok(s) => {
                let mut s = s.to_string();
                if s.len() > RAW_MAX_BODY {
                    truncate_on_char_boundary(&mut s, RAW_MAX_BODY);
                    s.push_str("...");
                }
                parts.push(format!("-d '{}'", s.replace('\'', r"'\''")));
            }
            Err(_) => parts.push(format!("--data-binary @- # ({} bytes)", bytes.len())),
        }
    }
    parts.push(format!("'{}'", url.as_str()));
    parts.join(" ")
}

/// Redact sensitive headers for logging
fn redact_headers(h: &HeaderMap) -> Vec<(String, String)> {
    h.iter()
        .map(|(k, v)| {
            let key = k.as_str().to_string();
            let val = if key.eq_ignore_ascii_case("authorization")
                || key.eq_ignore_ascii_case("cookie")
            {
                "<redacted>".to_string()
            } else {
                v.to_str().unwrap_or("").to_string()
            };
            (key, val)
        })
        .collect()
}

// ==============================
// Errors
// ==============================

#[derive(Debug, Error)]
pub enum HttpError {
    #[error("invalid URL: {0}")]
    Url(String),
    #[error("request build failed: {0}")]
    Build(String),
    #[error("request timed out after {0:?}")]
    Timeout(Duration),
    #[error("network error: {0}")]
    Network(String),
    #[error("decode error: {0}, body_snippet: {1}")]
    Decode(String, String),
    #[error("server returned error {status}: {message}, request_id={request_id}")]
    Api {
        status: StatusCode,
        message: String,
        request_id: String,
    },
}

// ==============================
// Request options & raw response
// ==============================

/// Per-request tuning knobs for the HTTP client.
///
/// ```
/// use croscan_http::RequestOpts;
/// use std::time::Duration;
///
/// let opts = RequestOpts {
///     timeout: Some(Duration::from_secs(20)),
///     allow_absolute: true,
///     ..Default::default()
/// };
///
/// assert_eq!(opts.timeout.unwrap().as_secs(), 20);
/// assert!(opts.headers.is_none());
/// ```
#[derive(Clone, Debug, Default)]
pub struct RequestOpts {
    /// Overrides the client default; `None` falls back to it.
    pub timeout: Option<Duration>,
    pub headers: Option<HeaderMap>,
    /// If true and `path` is an absolute URL, use it as-is (ignore base).
    pub allow_absolute: bool,
}

/// A response received from the server, whatever its status.
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    /// Decoded with the `Content-Type` charset, UTF-8 when none is declared.
    pub body: String,
    pub duration: Duration,
}

impl RawResponse {
    pub fn text(&self) -> &str {
        &self.body
    }

    pub fn snippet(&self) -> String {
        snip_body(&self.body)
    }
}

// ==============================
// Client
// ==============================

/// Builder for [`HttpClient`].
///
/// ```no_run
/// use croscan_http::{HttpClient, HttpError};
/// use std::time::Duration;
///
/// let client = HttpClient::builder()
///     .base("http://localhost:11434")
///     .connect_timeout(Duration::from_secs(10))
///     .default_timeout(None)
///     .build()?;
/// assert!(client.default_timeout.is_none());
/// # Ok::<(), HttpError>(())
/// ```
#[derive(Debug, Clone)]
pub struct HttpClientBuilder {
    base: Option<String>,
    connect_timeout: Duration,
    default_timeout: Option<Duration>,
}

impl Default for HttpClientBuilder {
    fn default() -> Self {
        Self {
            base: None,
            connect_timeout: Duration::from_secs(5),
            default_timeout: Some(Duration::from_secs(15)),
        }
    }
}

impl HttpClientBuilder {
    pub fn base(mut self, base: impl Into<String>) -> Self {
        self.base = Some(base.into());
        self
    }

    pub fn connect_timeout(mut self, dur: Duration) -> Self {
        self.connect_timeout = dur;
        self
    }

    /// Whole-request timeout; `None` disables it.
    pub fn default_timeout(mut self, dur: Option<Duration>) -> Self {
        self.default_timeout = dur;
        self
    }

    pub fn build(self) -> Result<HttpClient, HttpError> {
        let base = self
            .base
            .as_deref()
            .map(|b| {
                // A base without a trailing slash would have its last segment
                // replaced by `Url::join`.
                let normalised = if b.ends_with('/') {
                    b.to_string()
                } else {
                    format!("{b}/")
                };
                Url::parse(&normalised).map_err(|e| HttpError::Url(e.to_string()))
            })
            .transpose()?;
        let inner = Client::builder()
            .connect_timeout(self.connect_timeout)
            .build()
            .map_err(|e| HttpError::Build(e.to_string()))?;
        Ok(HttpClient {
            base,
            inner,
            default_timeout: self.default_timeout,
        })
    }
}

#[derive(Clone, Debug)]
pub struct HttpClient {
    base: Option<Url>,
    inner: Client,
    pub default_timeout: Option<Duration>,
}

impl HttpClient {
    /// Construct a client anchored to a base URL.
    ///
    /// ```no_run
    /// use croscan_http::{HttpClient, HttpError};
    /// use std::time::Duration;
    ///
    /// let client = HttpClient::new("http://localhost:11434")?;
    /// assert_eq!(client.default_timeout, Some(Duration::from_secs(15)));
    /// # Ok::<(), HttpError>(())
    /// ```
    pub fn new(base: &str) -> Result<Self, HttpError> {
        Self::builder().base(base).build()
    }

    pub fn builder() -> HttpClientBuilder {
        HttpClientBuilder::default()
    }

    /// GET JSON; non-2xx is an [`HttpError::Api`].
    pub async fn get_json<T>(&self, path: &str, opts: RequestOpts) -> Result<T, HttpError>
    where
        T: DeserializeOwned,
    {
        let resp = self.send::<()>(Method::GET, path, None, opts).await?;
        decode_success(resp)
    }

    /// POST JSON; non-2xx is an [`HttpError::Api`].
    pub async fn post_json<B, T>(
        &self,
        path: &str,
        body: &B,
        opts: RequestOpts,
    ) -> Result<T, HttpError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let resp = self.send(Method::POST, path, Some(body), opts).await?;
        decode_success(resp)
    }

    fn resolve(&self, path: &str, allow_absolute: bool) -> Result<Url, HttpError> {
        if allow_absolute || self.base.is_none() {
            if let Ok(abs) = Url::parse(path) {
                return Ok(abs);
            }
        }
        match &self.base {
            Some(base) => base
                .join(path.trim_start_matches('/'))
                .map_err(|e| HttpError::Url(e.to_string())),
            None => Err(HttpError::Url(format!(
                "relative path `{path}` given to a client without a base URL"
            ))),
        }
    }

    /// Send one request and return the response regardless of its status.
    ///
    /// Only transport failures (connect, DNS, TLS, timeout, body read) are
    /// errors here.
    pub async fn send<B>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
        opts: RequestOpts,
    ) -> Result<RawResponse, HttpError>
    where
        B: Serialize + ?Sized,
    {
        let url = self.resolve(path, opts.allow_absolute)?;

        // ----- Build request -----
        let mut rb = self.inner.request(method.clone(), url.clone());

        let timeout = opts.timeout.or(self.default_timeout);
        if let Some(timeout) = timeout {
            rb = rb.timeout(timeout);
        }

        // Serialize up front so the exact bytes can be logged.
        let mut request_body_bytes: Option<Vec<u8>> = None;
        if let Some(b) = body {
            let bytes = serde_json::to_vec(b).map_err(|e| HttpError::Build(e.to_string()))?;
            rb = rb
                .header(reqwest::header::CONTENT_TYPE, "application/json")
                .body(bytes.clone());
            request_body_bytes = Some(bytes);
        }

        if let Some(hdrs) = &opts.headers {
            rb = rb.headers(hdrs.clone());
        }

        let req_id = uuid::Uuid::new_v4().simple().to_string();

        tracing::debug!(
            req_id=%req_id,
            method=%method,
            host_path=%format!("{}{}", url.host_str().unwrap_or("-"), url.path()),
            timeout_ms=timeout.map(|t| t.as_millis() as u64),
            has_body=%body.is_some(),
            "http.request.start"
        );

        if raw_enabled() {
            let empty = HeaderMap::new();
            let curl = make_curl(
                &method,
                &url,
                opts.headers.as_ref().unwrap_or(&empty),
                request_body_bytes.as_deref(),
            );
            tracing::debug!(target: "http.raw", %req_id, %curl, "request");
        }

        // ----- Send -----
        let t0 = Instant::now();
        let resp = rb
            .send()
            .await
            .map_err(|err| transport_error(&req_id, "send", err, timeout))?;
        let status = resp.status();
        let headers = resp.headers().clone();
        let body = resp
            .text()
            .await
            .map_err(|err| transport_error(&req_id, "body", err, timeout))?;
        let duration = t0.elapsed();

        let x_request_id = headers
            .get("x-request-id")
            .or_else(|| headers.get("x-correlation-id"))
            .and_then(|v| v.to_str().ok())
            .unwrap_or("-");

        tracing::debug!(
            req_id=%req_id,
            %status,
            duration_ms=duration.as_millis() as u64,
            body_len=body.len(),
            x_request_id=%x_request_id,
            "http.response.headers"
        );

        if raw_enabled() {
            let hdrs = redact_headers(&headers);
            let truncated = body.len() > RAW_MAX_BODY;
            let mut text = body.clone();
            truncate_on_char_boundary(&mut text, RAW_MAX_BODY);
            tracing::info!(
                target: "http.raw",
                %req_id,
                status=%status,
                duration_ms=duration.as_millis() as u64,
                headers=?hdrs,
                body=%text,
                truncated
            );
        }

        tracing::trace!(
            req_id=%req_id,
            body_snippet=%snip_body(&body),
            "http.response.body_snippet"
        );

        Ok(RawResponse {
            status,
            headers,
            body,
            duration,
        })
    }
}

// ==============================
// Helpers
// ==============================

fn transport_error(
    req_id: &str,
    stage: &'static str,
    err: reqwest::Error,
    timeout: Option<Duration>,
) -> HttpError {
    let message = err.to_string();
    tracing::warn!(req_id=%req_id, stage, message=%message, "http.network_error");
    match timeout {
        Some(limit) if err.is_timeout() => HttpError::Timeout(limit),
        _ => HttpError::Network(message),
    }
}

fn decode_success<T: DeserializeOwned>(resp: RawResponse) -> Result<T, HttpError> {
    let snippet = resp.snippet();
    if !resp.status.is_success() {
        let message = extract_error_message(&resp.body);
        let request_id = resp
            .headers
            .get("x-request-id")
            .and_then(|v| v.to_str().ok())
            .unwrap_or("-")
            .to_string();
        tracing::warn!(
            status=%resp.status,
            message=%message,
            x_request_id=%request_id,
            body_snippet=%snippet,
            "http.error"
        );
        return Err(HttpError::Api {
            status: resp.status,
            message,
            request_id,
        });
    }

    serde_json::from_str::<T>(&resp.body).map_err(|e| {
        tracing::warn!(
            serde_line=%e.line(),
            serde_col=%e.column(),
            serde_err=%e.to_string(),
            body_snippet=%snippet,
            "http.response.decode_error"
        );
        HttpError::Decode(e.to_string(), snippet)
    })
}

fn extract_error_message(body: &str) -> String {
    // Generic: {"error":"..."} (Ollama) or {"message":"..."} or {"detail":"..."}
    #[derive(Deserialize)]
    struct Msg {
        #[serde(default)]
        error: String,
        #[serde(default)]
        message: String,
        #[serde(default)]
        detail: String,
    }

    if let Ok(m) = serde_json::from_str::<Msg>(body) {
        for candidate in [m.error, m.message, m.detail] {
            if !candidate.is_empty() {
                return candidate;
            }
        }
    }
    snip_body(body)
}

fn truncate_on_char_boundary(s: &mut String, max: usize) {
    let mut cut = max.min(s.len());
    while !s.is_char_boundary(cut) {
        cut -= 1;
    }
    s.truncate(cut);
}

fn snip_body(body: &str) -> String {
    let mut snip = body.to_string();
    if snip.len() > SNIPPET_MAX {
        truncate_on_char_boundary(&mut snip, SNIPPET_MAX);
        snip.push_str("...");
    }
    snip
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::{AUTHORIZATION, HeaderValue, USER_AGENT};

    #[test]
    fn error_message_prefers_ollama_error_field() {
        let body = r#"{"error":"model 'llama3.1:8b' not found"}"#;
        assert_eq!(extract_error_message(body), "model 'llama3.1:8b' not found");
    }

    #[test]
    fn error_message_falls_back_to_snippet() {
        assert_eq!(extract_error_message("Bad Gateway"), "Bad Gateway");
    }

    #[test]
    fn snippet_truncates_on_char_boundary() {
        let body = "é".repeat(400);
        let snip = snip_body(&body);
        assert!(snip.ends_with("..."));
        assert!(snip.len() <= SNIPPET_MAX + 3);
    }

    #[test]
    fn auth_headers_are_redacted() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer secret"));
        headers.insert(USER_AGENT, HeaderValue::from_static("Mozilla/5.0"));
        let redacted = redact_headers(&headers);
        assert!(redacted.contains(&("authorization".to_string(), "<redacted>".to_string())));
        assert!(redacted.contains(&("user-agent".to_string(), "Mozilla/5.0".to_string())));
    }

    #[test]
    fn relative_paths_need_a_base() {
        let client = HttpClient::builder().build().unwrap();
        assert!(matches!(client.resolve("api/tags", false), Err(HttpError::Url(_))));
        let abs = client.resolve("https://example.com/x", false).unwrap();
        assert_eq!(abs.as_str(), "https://example.com/x");
    }

    #[test]
    fn base_without_trailing_slash_keeps_its_path() {
        let client = HttpClient::new("http://localhost:11434/ollama").unwrap();
        let url = client.resolve("/api/chat", false).unwrap();
        assert_eq!(url.as_str(), "http://localhost:11434/ollama/api/chat");
    }
}
