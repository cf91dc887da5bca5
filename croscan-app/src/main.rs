use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use croscan_app::cli::{Cli, Command};
use croscan_app::pipeline::{Pipeline, ollama_options};
use croscan_app::{console, server};
use croscan_common::observability::{LogConfig, init_logging};
use croscan_config::{CroscanConfig, CroscanConfigLoader, discover_config_file};
use croscan_llm::ollama::{OllamaClient, OllamaOptions};

fn load_config(cli: &Cli) -> Result<CroscanConfig> {
    let loader = CroscanConfigLoader::new();
    let loader = match (&cli.config, discover_config_file()) {
        (Some(explicit), _) => loader.with_file(explicit),
        (None, Some(found)) => loader.with_optional_file(found),
        (None, None) => loader,
    };
    Ok(loader.load()?)
}

fn logging_for(cfg: &CroscanConfig, emit_stderr: bool) -> LogConfig {
    LogConfig {
        app_name: "croscan",
        log_dir: cfg.logging.dir.clone(),
        emit_stderr,
        format: cfg.logging.format,
        default_filter: cfg.logging.filter.clone(),
    }
}

/// Probe Ollama, pulling the model when allowed. Runs beside the server, so
/// problems are only logged: each request still reports its own failure.
async fn warm_up(options: OllamaOptions, pull_if_missing: bool) {
    let model = options.model.clone();
    let client = match OllamaClient::new(options) {
        Ok(client) => client,
        Err(err) => {
            tracing::warn!(error = %err, "could not build Ollama client for warm-up");
            return;
        }
    };
    match client.ensure_ready(pull_if_missing).await {
        Ok(()) => tracing::info!(%model, "model ready"),
        Err(err) => tracing::warn!(error = %err, "model not ready; requests will fail until it is"),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut cfg = load_config(&cli)?;

    match cli.resolved_command() {
        Command::Serve { host, port } => {
            if let Some(host) = host {
                cfg.server.host = host;
            }
            if let Some(port) = port {
                cfg.server.port = port;
            }
            let log_path = init_logging(logging_for(&cfg, true))?;
            tracing::info!(log_path = %log_path.display(), "logging initialised");

            tokio::spawn(warm_up(ollama_options(&cfg), cfg.llm.pull_if_missing));
            let pipeline = Arc::new(Pipeline::from_config(&cfg)?);
            server::serve(pipeline, &cfg.server.address()).await
        }
        Command::Analyze { url, output } => {
            if let Some(output) = output {
                cfg.output.path = output;
            }
            // Logs go to the file sink only; stdout carries the result.
            init_logging(logging_for(&cfg, false))?;

            let pipeline = Pipeline::from_config(&cfg)?;
            let mut stdout = std::io::stdout();
            let url = match url {
                Some(url) => url,
                None => console::prompt_for_url(&mut std::io::stdin().lock(), &mut stdout)?,
            };
            console::analyze_to_file(&pipeline, &url, &cfg.output.path, &mut stdout).await?;
            Ok(())
        }
    }
}
