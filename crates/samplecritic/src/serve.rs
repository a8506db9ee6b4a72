use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};

use samplecritic_critic::{CritiqueConfig, CritiquePipeline};
use samplecritic_model::OpenAiChatClient;
use samplecritic_samples::SampleStore;

use crate::api;

pub async fn handle_serve_command(
    config: CritiqueConfig,
    host: &str,
    port: u16,
    samples: Option<PathBuf>,
) -> Result<()> {
    use colored::Colorize;

    let store = Arc::new(open_store(samples)?);
    let client = Arc::new(OpenAiChatClient::new(config.base_url.clone()));

    if !config.has_credential() {
        tracing::warn!("Model API key is not set; critique requests will fail until it is");
    }

    let model = config.model.clone();
    let endpoint = client.base_url().to_string();
    let pipeline = Arc::new(CritiquePipeline::new(client, config));
    let router = api::create_router(pipeline, store.clone());

    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind API server to {}", addr))?;

    eprintln!();
    eprintln!(
        "  {} {}",
        "->".bright_green(),
        format!("Listening on http://{}", addr).bold()
    );
    eprintln!(
        "  {} Model: {} via {}",
        "->".dimmed(),
        model.cyan(),
        endpoint.dimmed()
    );
    let sample_count = match store.count() {
        Ok(n) => format!("{} samples", n),
        Err(e) => format!("unreadable: {}", e),
    };
    eprintln!(
        "  {} Samples: {} ({})",
        "->".dimmed(),
        store.path().display().to_string().dimmed(),
        sample_count
    );
    eprintln!("  {} Press {} to stop", "->".dimmed(), "Ctrl+C".bold());
    eprintln!();

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("API server error")
}

pub fn open_store(path: Option<PathBuf>) -> Result<SampleStore> {
    match path {
        Some(path) => Ok(SampleStore::with_path(path)),
        None => SampleStore::new(),
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for Ctrl+C: {}", e);
        std::future::pending::<()>().await;
    }
    eprintln!("\nShutting down...");
}
