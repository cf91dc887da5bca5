//! Fetch → clean → analyze, shared by the HTTP service and the console driver.

use croscan_common::Result;
use croscan_config::CroscanConfig;
use croscan_llm::analyzer::Analyzer;
use croscan_llm::ollama::{OllamaClient, OllamaOptions};
use croscan_web::{FetchOptions, HttpPageFetcher, PageFetcher, clean};
use std::fmt;
use std::sync::Arc;

/// Progress of a single run: `Fetching → Cleaning → Analyzing → Done`, or
/// `Failed` from Fetching or Analyzing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Fetching,
    Cleaning,
    Analyzing,
    Done,
    Failed,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Fetching => "fetching",
            Stage::Cleaning => "cleaning",
            Stage::Analyzing => "analyzing",
            Stage::Done => "done",
            Stage::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// The composition root. Built once at startup and shared read-only.
#[derive(Clone)]
pub struct Pipeline {
    fetcher: Arc<dyn PageFetcher>,
    analyzer: Analyzer,
}

pub fn fetch_options(cfg: &CroscanConfig) -> FetchOptions {
    FetchOptions {
        user_agent: cfg.fetch.user_agent.clone(),
        timeout: cfg.fetch.timeout(),
        status_policy: cfg.fetch.status_policy,
    }
}

pub fn ollama_options(cfg: &CroscanConfig) -> OllamaOptions {
    OllamaOptions {
        base_url: cfg.llm.endpoint.clone(),
        model: cfg.llm.model.clone(),
        connect_timeout: cfg.llm.connect_timeout(),
        request_timeout: cfg.llm.request_timeout(),
        pull_timeout: cfg.llm.pull_timeout(),
    }
}

impl Pipeline {
    pub fn new(fetcher: Arc<dyn PageFetcher>, analyzer: Analyzer) -> Self {
        Self { fetcher, analyzer }
    }

    /// Wire the reqwest fetcher and the Ollama client from configuration.
    /// Nothing is contacted yet.
    pub fn from_config(cfg: &CroscanConfig) -> Result<Self> {
        let fetcher = HttpPageFetcher::new(fetch_options(cfg))?;
        let llm = OllamaClient::new(ollama_options(cfg))?;
        Ok(Self::new(Arc::new(fetcher), Analyzer::new(Arc::new(llm))))
    }

    pub fn model_name(&self) -> &str {
        self.analyzer.llm().model_name()
    }

    pub async fn llm_reachable(&self) -> bool {
        self.analyzer.llm().health_check().await
    }

    pub async fn run(&self, url: &str) -> Result<String> {
        self.run_observed(url, &mut |_| {}).await
    }

    /// Run the pipeline, reporting each stage transition to `on_stage`.
    pub async fn run_observed(
        &self,
        url: &str,
        on_stage: &mut (dyn FnMut(Stage) + Send),
    ) -> Result<String> {
        let result = self.run_stages(url, on_stage).await;
        match &result {
            Ok(_) => on_stage(Stage::Done),
            Err(err) => {
                tracing::warn!(%url, error = %err, "pipeline.failed");
                on_stage(Stage::Failed);
            }
        }
        result
    }

    async fn run_stages(
        &self,
        url: &str,
        on_stage: &mut (dyn FnMut(Stage) + Send),
    ) -> Result<String> {
        on_stage(Stage::Fetching);
        let raw = self.fetcher.fetch(url).await?;

        on_stage(Stage::Cleaning);
        let cleaned = clean(&raw);
        tracing::info!(
            %url,
            raw_bytes = raw.len(),
            cleaned_bytes = cleaned.len(),
            checksum = %blake3::hash(raw.as_bytes()).to_hex(),
            "pipeline.cleaned"
        );

        on_stage(Stage::Analyzing);
        self.analyzer.analyze(&cleaned).await
    }
}
