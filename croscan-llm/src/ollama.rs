use crate::traits::{ChatMessage, LlmClient, LlmError, LlmResponse};
use async_trait::async_trait;
use croscan_http::{HttpClient, HttpError, RequestOpts};
use serde::{Deserialize, Serialize};
use std::time::Duration;

const OLLAMA_CONNECTION_ERROR: &str = "No running Ollama server detected. Start it with: `ollama serve` (after installing). Install instructions: https://github.com/ollama/ollama";

/// Connection settings for [`OllamaClient`].
#[derive(Debug, Clone)]
pub struct OllamaOptions {
    pub base_url: String,
    pub model: String,
    pub connect_timeout: Duration,
    /// `None` lets a slow generation run as long as it needs.
    pub request_timeout: Option<Duration>,
    pub pull_timeout: Duration,
}

impl Default for OllamaOptions {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:11434".to_string(),
            model: crate::DEFAULT_OLLAMA_MODEL.to_string(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: None,
            pull_timeout: Duration::from_secs(30 * 60),
        }
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    stream: bool,
}

#[derive(Deserialize)]
struct ChatReply {
    message: ChatMessage,
    #[serde(default)]
    model: Option<String>,
    #[serde(default)]
    eval_count: Option<u32>,
}

#[derive(Deserialize)]
struct TagList {
    #[serde(default)]
    models: Vec<TagEntry>,
}

#[derive(Deserialize)]
struct TagEntry {
    name: String,
}

/// Ollama client for local model inference.
///
/// Expects a running Ollama server (see https://github.com/ollama/ollama).
/// Construction does not touch the network; call [`OllamaClient::ensure_ready`]
/// to probe the server up front.
pub struct OllamaClient {
    client: HttpClient,
    model: String,
    pull_timeout: Duration,
}

impl OllamaClient {
    pub fn new(options: OllamaOptions) -> Result<Self, LlmError> {
        let client = HttpClient::builder()
            .base(options.base_url.trim_end_matches('/'))
            .connect_timeout(options.connect_timeout)
            .default_timeout(options.request_timeout)
            .build()
            .map_err(|e| LlmError::Config(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            model: options.model,
            pull_timeout: options.pull_timeout,
        })
    }

    /// Verify the server answers and the model is present, pulling it when
    /// `pull_if_missing` is set.
    pub async fn ensure_ready(&self, pull_if_missing: bool) -> Result<(), LlmError> {
        let models = self.fetch_available_models().await?;
        if has_model(&models, &self.model) {
            return Ok(());
        }
        if !pull_if_missing {
            return Err(LlmError::ModelNotAvailable(format!(
                "{} (run `ollama pull {}`)",
                self.model, self.model
            )));
        }
        tracing::info!(model = %self.model, "Model not found locally, pulling...");
        self.pull_model(&self.model).await
    }

    async fn fetch_available_models(&self) -> Result<Vec<String>, LlmError> {
        let tags: TagList = self
            .client
            .get_json("api/tags", probe_opts())
            .await
            .map_err(|e| match e {
                HttpError::Network(_) | HttpError::Timeout(_) => {
                    LlmError::Network(OLLAMA_CONNECTION_ERROR.to_string())
                }
                other => LlmError::Api(format!("Failed to fetch models: {other}")),
            })?;

        Ok(tags.models.into_iter().map(|m| m.name).collect())
    }

    async fn pull_model(&self, model: &str) -> Result<(), LlmError> {
        let payload = serde_json::json!({ "model": model, "stream": false });
        let opts = RequestOpts {
            timeout: Some(self.pull_timeout),
            ..Default::default()
        };
        self.client
            .post_json::<_, serde_json::Value>("api/pull", &payload, opts)
            .await
            .map_err(|e| match e {
                HttpError::Timeout(limit) => {
                    LlmError::Network(format!("Pull of {model} did not finish within {limit:?}"))
                }
                other => LlmError::Api(format!("Failed to pull model: {other}")),
            })?;
        tracing::info!(model, "Successfully pulled model");
        Ok(())
    }
}

fn probe_opts() -> RequestOpts {
    RequestOpts {
        timeout: Some(Duration::from_secs(5)),
        ..Default::default()
    }
}

/// Ollama reports untagged models as `<name>:latest`.
fn has_model(available: &[String], wanted: &str) -> bool {
    available
        .iter()
        .any(|name| name == wanted || (!wanted.contains(':') && *name == format!("{wanted}:latest")))
}

fn map_chat_error(model: &str, err: HttpError) -> LlmError {
    match err {
        HttpError::Network(_) => LlmError::Network(OLLAMA_CONNECTION_ERROR.to_string()),
        HttpError::Timeout(limit) => {
            LlmError::Network(format!("Ollama did not answer within {limit:?}"))
        }
        HttpError::Api {
            status, message, ..
        } if status.as_u16() == 404 => {
            LlmError::ModelNotAvailable(format!("{model}: {message}"))
        }
        HttpError::Api {
            status, message, ..
        } => LlmError::Api(format!("Chat failed: HTTP {status}: {message}")),
        HttpError::Decode(err, snippet) => {
            LlmError::Decode(format!("{err}, body_snippet: {snippet}"))
        }
        HttpError::Url(msg) | HttpError::Build(msg) => LlmError::Config(msg),
    }
}

#[async_trait]
impl LlmClient for OllamaClient {
    async fn chat(&self, messages: &[ChatMessage]) -> Result<LlmResponse, LlmError> {
        let payload = ChatRequest {
            model: &self.model,
            messages,
            stream: false,
        };

        let reply: ChatReply = self
            .client
            .post_json("api/chat", &payload, RequestOpts::default())
            .await
            .map_err(|e| map_chat_error(&self.model, e))?;

        Ok(LlmResponse {
            text: reply.message.content,
            model: reply.model.or_else(|| Some(self.model.clone())),
            tokens_used: reply.eval_count,
        })
    }

    async fn health_check(&self) -> bool {
        self.fetch_available_models().await.is_ok()
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
