//! LLM integration for croscan.
//!
//! This crate exposes a common [`traits::LlmClient`] interface, the Ollama
//! implementation, the CRO prompt, and the [`analyzer::Analyzer`] that ties
//! them together.
//!
//! # Examples
//! ```no_run
//! use croscan_llm::{ollama::OllamaOptions, ollama_analyzer};
//!
//! # #[tokio::main]
//! # async fn main() -> croscan_common::Result<()> {
//! let analyzer = ollama_analyzer(OllamaOptions::default())?;
//! let reply = analyzer.analyze("<h1>Buy Now</h1>").await?;
//! println!("{reply}");
//! # Ok(())
//! # }
//! ```
pub mod analyzer;
pub mod ollama;
pub mod prompt;
pub mod report;
pub mod traits;

use analyzer::Analyzer;
use ollama::{OllamaClient, OllamaOptions};
use std::sync::Arc;

/// Model used when none is configured.
pub const DEFAULT_OLLAMA_MODEL: &str = "llama3.1:8b";

/// Build an analyzer backed by Ollama without contacting the server.
pub fn ollama_analyzer(options: OllamaOptions) -> croscan_common::Result<Analyzer> {
    let client = OllamaClient::new(options)?;
    Ok(Analyzer::new(Arc::new(client)))
}
