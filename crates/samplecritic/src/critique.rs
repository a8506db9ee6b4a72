use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use serde_json::Value;

use samplecritic_critic::{validate, CritiqueConfig, CritiquePipeline, CritiquePrompts};
use samplecritic_model::OpenAiChatClient;

use crate::serve::open_store;

/// Where the request body for a one-off critique comes from
#[derive(Debug)]
pub enum CritiqueSource {
    File(PathBuf),
    Sample(String),
}

/// Run the pipeline once and print the result as JSON.
///
/// Returns the process exit code: 0 for a success result, 1 otherwise.
pub async fn handle_critique_command(
    config: CritiqueConfig,
    source: CritiqueSource,
    samples: Option<PathBuf>,
    dry_run: bool,
) -> Result<i32> {
    let body = load_body(source, samples)?;

    if dry_run {
        let request = validate(&body).map_err(|e| {
            anyhow::anyhow!(
                "Request is invalid:\n{}",
                serde_json::to_string_pretty(&e.issues).unwrap_or_default()
            )
        })?;
        eprintln!("=== Dry Run ===");
        eprintln!("Model: {}", config.model);
        eprintln!("Timeout: {}ms", config.timeout.as_millis());
        eprintln!();
        println!("{}", CritiquePrompts::build_prompt(&request));
        return Ok(0);
    }

    let client = Arc::new(OpenAiChatClient::new(config.base_url.clone()));
    let pipeline = CritiquePipeline::new(client, config);
    let response = pipeline.handle_value(&body).await;

    println!("{}", serde_json::to_string_pretty(&response.result)?);
    Ok(if response.result.is_ok() { 0 } else { 1 })
}

fn load_body(source: CritiqueSource, samples: Option<PathBuf>) -> Result<Value> {
    match source {
        CritiqueSource::File(path) => {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse {} as JSON", path.display()))
        }
        CritiqueSource::Sample(id) => {
            let store = open_store(samples)?;
            let sample = store
                .get(&id)?
                .with_context(|| format!("Sample not found: {}", id))?;
            Ok(sample.to_request_body())
        }
    }
}
