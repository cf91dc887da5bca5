#![allow(dead_code)]

use std::sync::Arc;

use async_trait::async_trait;
use croscan_app::Pipeline;
use croscan_common::{CroError, Result};
use croscan_llm::analyzer::Analyzer;
use croscan_llm::prompt::html_segment;
use croscan_llm::traits::{ChatMessage, LlmClient, LlmError, LlmResponse};
use croscan_web::PageFetcher;

pub const PAGE: &str = "<html><body><script>x</script><h1>Buy Now</h1></body></html>";

/// Serves a fixed page, or fails like an HTTP 404.
pub enum StubFetcher {
    Page(&'static str),
    NotFound,
}

#[async_trait]
impl PageFetcher for StubFetcher {
    async fn fetch(&self, _url: &str) -> Result<String> {
        match self {
            StubFetcher::Page(html) => Ok(html.to_string()),
            StubFetcher::NotFound => Err(CroError::fetch(Some(404), "HTTP 404")),
        }
    }
}

/// Replies with the HTML embedded in the prompt, a fixed text, or an error.
pub enum StubLlm {
    Echo,
    Reply(&'static str),
    Down,
}

#[async_trait]
impl LlmClient for StubLlm {
    async fn chat(&self, messages: &[ChatMessage]) -> std::result::Result<LlmResponse, LlmError> {
        let text = match self {
            StubLlm::Echo => html_segment(&messages[0].content).unwrap_or_default().to_string(),
            StubLlm::Reply(text) => text.to_string(),
            StubLlm::Down => return Err(LlmError::Network("connection refused".into())),
        };
        Ok(LlmResponse {
            text,
            model: Some("stub".into()),
            tokens_used: None,
        })
    }

    async fn health_check(&self) -> bool {
        !matches!(self, StubLlm::Down)
    }

    fn model_name(&self) -> &str {
        "stub-model"
    }
}

pub fn pipeline(fetcher: StubFetcher, llm: StubLlm) -> Pipeline {
    Pipeline::new(Arc::new(fetcher), Analyzer::new(Arc::new(llm)))
}
