use crate::prompt::build_prompt;
use crate::traits::{ChatMessage, LlmClient};
use croscan_common::Result;
use std::sync::Arc;

/// Turns cleaned HTML into the model's CRO analysis.
///
/// The reply is returned exactly as the model produced it; nothing here parses
/// or validates it.
#[derive(Clone)]
pub struct Analyzer {
    llm: Arc<dyn LlmClient + Send + Sync + 'static>,
}

impl Analyzer {
    pub fn new(llm: Arc<dyn LlmClient + Send + Sync + 'static>) -> Self {
        Self { llm }
    }

    pub fn llm(&self) -> &(dyn LlmClient + Send + Sync + 'static) {
        self.llm.as_ref()
    }

    pub async fn analyze(&self, cleaned_html: &str) -> Result<String> {
        let prompt = build_prompt(cleaned_html);
        tracing::debug!(
            model = self.llm.model_name(),
            prompt_chars = prompt.len(),
            "analysis.request"
        );

        let response = self.llm.chat(&[ChatMessage::user(prompt)]).await?;

        tracing::info!(
            model = ?response.model,
            tokens_used = ?response.tokens_used,
            reply_chars = response.text.len(),
            "analysis.reply"
        );
        Ok(response.text)
    }
}
