use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Conversion-rate-optimization analysis of live web pages with a local LLM.
#[derive(Debug, Parser)]
#[command(name = "croscan", version, about)]
pub struct Cli {
    /// Configuration file (YAML). Defaults to `croscan.yaml` when present.
    #[arg(long, global = true, env = "CROSCAN_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Serve `GET /analyze?url=...` over HTTP.
    Serve {
        #[arg(long)]
        host: Option<String>,
        #[arg(long)]
        port: Option<u16>,
    },
    /// Analyze one page and save the model's reply (the default).
    Analyze {
        /// Page to analyze; prompted for when omitted.
        url: Option<String>,
        /// Where to write the reply. Defaults to `result.json`.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

impl Cli {
    /// The subcommand to run; no subcommand means an interactive `analyze`.
    pub fn resolved_command(&self) -> Command {
        match &self.command {
            Some(Command::Serve { host, port }) => Command::Serve {
                host: host.clone(),
                port: *port,
            },
            Some(Command::Analyze { url, output }) => Command::Analyze {
                url: url.clone(),
                output: output.clone(),
            },
            None => Command::Analyze {
                url: None,
                output: None,
            },
        }
    }
}
