//! Console adapter: prompt for a URL, print progress, save the raw reply.

use std::io::{BufRead, Write};
use std::path::Path;

use anyhow::{Context, bail};
use croscan_llm::report::PageAnalysis;

use crate::pipeline::{Pipeline, Stage};

pub const URL_PROMPT: &str = "Enter URL to analyze: ";
pub const RESULT_BANNER: &str = "===== CRO ANALYSIS RESULT =====";

/// Read one URL from `input`, writing the prompt to `out` first.
pub fn prompt_for_url<R: BufRead, W: Write>(input: &mut R, out: &mut W) -> anyhow::Result<String> {
    write!(out, "{URL_PROMPT}")?;
    out.flush()?;

    let mut line = String::new();
    input.read_line(&mut line).context("failed to read URL")?;
    let url = line.trim();
    if url.is_empty() {
        bail!("no URL given");
    }
    Ok(url.to_string())
}

/// Run the pipeline for `url` and persist the reply to `output_path`,
/// overwriting it. Nothing is written when the run fails.
pub async fn analyze_to_file<W: Write + Send>(
    pipeline: &Pipeline,
    url: &str,
    output_path: &Path,
    out: &mut W,
) -> anyhow::Result<String> {
    let model = pipeline.model_name().to_string();
    let mut on_stage = |stage: Stage| {
        let line = match stage {
            Stage::Fetching => format!("Fetching {url} ..."),
            Stage::Cleaning => "Cleaning HTML ...".to_string(),
            Stage::Analyzing => format!("Analyzing with {model} ..."),
            Stage::Done | Stage::Failed => return,
        };
        // Progress output is best-effort.
        let _ = writeln!(out, "{line}");
        let _ = out.flush();
    };
    let result = pipeline.run_observed(url, &mut on_stage).await;
    let result = result.with_context(|| format!("analysis of {url} failed"))?;

    writeln!(out)?;
    writeln!(out, "{RESULT_BANNER}")?;
    writeln!(out, "{result}")?;
    writeln!(out)?;

    if let Some(parent) = output_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    tokio::fs::write(output_path, result.as_bytes())
        .await
        .with_context(|| format!("failed to write {}", output_path.display()))?;

    match PageAnalysis::from_model_text(&result) {
        Ok(analysis) => {
            writeln!(
                out,
                "{} elements found ({} above the fold)",
                analysis.elements.len(),
                analysis.above_the_fold().count()
            )?;
            if let Some(top) = analysis.ranked().first() {
                writeln!(out, "Top test candidate: {} ({}) {:?}", top.id, top.kind, top.text)?;
            }
        }
        Err(err) => {
            tracing::debug!(error = %err, "reply is not the expected JSON shape");
            writeln!(out, "Reply is not valid JSON; saved as-is")?
        }
    }
    writeln!(out, "Saved result to {}", output_path.display())?;

    Ok(result)
}
