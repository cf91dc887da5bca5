//! Single-attempt page retrieval.

use async_trait::async_trait;
use croscan_common::{CroError, Result, StatusPolicy};
use croscan_http::{HttpClient, RequestOpts};
use reqwest::Method;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use std::time::Duration;
use url::Url;

/// Retrieves the raw HTML of a page.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<String>;
}

/// Fetch settings resolved from configuration.
#[derive(Debug, Clone)]
pub struct FetchOptions {
    pub user_agent: String,
    pub timeout: Duration,
    pub status_policy: StatusPolicy,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            user_agent: "Mozilla/5.0".to_string(),
            timeout: Duration::from_secs(20),
            status_policy: StatusPolicy::OkOnly,
        }
    }
}

/// [`PageFetcher`] over the shared HTTP client: one GET, browser-like
/// `User-Agent`, fixed timeout, no retries.
pub struct HttpPageFetcher {
    client: HttpClient,
    headers: HeaderMap,
    timeout: Duration,
    policy: StatusPolicy,
}

impl HttpPageFetcher {
    pub fn new(options: FetchOptions) -> Result<Self> {
        let client = HttpClient::builder()
            .default_timeout(Some(options.timeout))
            .build()
            .map_err(|e| CroError::Config(format!("HttpClient init failed: {e}")))?;

        let user_agent = HeaderValue::from_str(&options.user_agent)
            .map_err(|e| CroError::Config(format!("invalid user agent: {e}")))?;
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, user_agent);

        Ok(Self {
            client,
            headers,
            timeout: options.timeout,
            policy: options.status_policy,
        })
    }
}

fn parse_page_url(raw: &str) -> Result<Url> {
    let url = Url::parse(raw.trim())
        .map_err(|e| CroError::fetch(None, format!("invalid URL `{raw}`: {e}")))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(CroError::fetch(
            None,
            format!("unsupported URL scheme `{other}`"),
        )),
    }
}

#[async_trait]
impl PageFetcher for HttpPageFetcher {
    async fn fetch(&self, url: &str) -> Result<String> {
        let url = parse_page_url(url)?;

        let opts = RequestOpts {
            timeout: Some(self.timeout),
            headers: Some(self.headers.clone()),
            allow_absolute: true,
        };
        let resp = self
            .client
            .send::<()>(Method::GET, url.as_str(), None, opts)
            .await
            .map_err(|e| CroError::fetch(None, e.to_string()))?;

        let status = resp.status.as_u16();
        if !self.policy.accepts(status) {
            tracing::warn!(%url, status, policy=?self.policy, "page.fetch.rejected_status");
            return Err(CroError::fetch(Some(status), format!("HTTP {}", resp.status)));
        }

        tracing::info!(
            %url,
            status,
            bytes = resp.body.len(),
            duration_ms = resp.duration.as_millis() as u64,
            "page.fetch.ok"
        );
        Ok(resp.body)
    }
}
