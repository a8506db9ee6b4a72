mod api;
mod config;
mod critique;
mod samples;
mod serve;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};

use samplecritic_logging::{init_tracing, LogFormat};

use crate::critique::CritiqueSource;
use crate::samples::SamplesAction;

#[derive(Parser, Debug)]
#[command(
    name = "samplecritic",
    about = "Critique buggy solutions to programming tasks with a language model",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Log level (overridden by RUST_LOG)
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    /// Log output format
    #[arg(long, global = true, value_enum, default_value = "pretty")]
    log_format: LogFormatChoice,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP API
    Serve {
        /// Address to bind
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Port to listen on
        #[arg(short, long, default_value_t = 3100)]
        port: u16,

        /// Path to the samples JSONL file
        #[arg(long)]
        samples: Option<PathBuf>,
    },

    /// Critique one request locally and print the result
    Critique {
        #[command(flatten)]
        source: SourceArgs,

        /// Path to the samples JSONL file
        #[arg(long)]
        samples: Option<PathBuf>,

        /// Print the rendered prompt without calling the model
        #[arg(long)]
        dry_run: bool,
    },

    /// Browse the sample dataset
    Samples {
        #[command(subcommand)]
        action: SamplesAction,

        /// Path to the samples JSONL file
        #[arg(long, global = true)]
        samples: Option<PathBuf>,
    },
}

#[derive(Args, Debug)]
#[group(required = true, multiple = false)]
struct SourceArgs {
    /// JSON file holding the request body
    #[arg(long)]
    file: Option<PathBuf>,

    /// ID of a sample in the dataset
    #[arg(long)]
    sample_id: Option<String>,
}

impl SourceArgs {
    fn into_source(self) -> Result<CritiqueSource> {
        match (self.file, self.sample_id) {
            (Some(path), None) => Ok(CritiqueSource::File(path)),
            (None, Some(id)) => Ok(CritiqueSource::Sample(id)),
            _ => anyhow::bail!("Provide exactly one of --file or --sample-id"),
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogFormatChoice {
    Pretty,
    Json,
    Compact,
}

impl From<LogFormatChoice> for LogFormat {
    fn from(choice: LogFormatChoice) -> Self {
        match choice {
            LogFormatChoice::Pretty => LogFormat::Pretty,
            LogFormatChoice::Json => LogFormat::Json,
            LogFormatChoice::Compact => LogFormat::Compact,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_tracing(&cli.log_level, cli.log_format.into());

    match cli.command {
        Command::Serve {
            host,
            port,
            samples,
        } => {
            let config = load_config()?;
            serve::handle_serve_command(config, &host, port, samples).await
        }
        Command::Critique {
            source,
            samples,
            dry_run,
        } => {
            let config = load_config()?;
            let code =
                critique::handle_critique_command(config, source.into_source()?, samples, dry_run)
                    .await?;
            std::process::exit(code);
        }
        Command::Samples { action, samples } => samples::handle_samples_command(action, samples),
    }
}

fn load_config() -> Result<samplecritic_critic::CritiqueConfig> {
    let working_dir = std::env::current_dir().context("Failed to get current directory")?;
    config::resolve(&working_dir)
}
