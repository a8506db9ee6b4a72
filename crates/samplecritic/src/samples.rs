use std::path::PathBuf;

use anyhow::Result;
use clap::Subcommand;
use colored::Colorize;

use samplecritic_samples::{Sample, SampleFilter, SampleSummary};

use crate::serve::open_store;

#[derive(Subcommand, Debug)]
pub enum SamplesAction {
    /// List recent samples
    List {
        /// Filter by label (e.g. wrong_answer, timeout)
        #[arg(long)]
        label: Option<String>,

        /// Search PRD text
        #[arg(long)]
        search: Option<String>,

        /// Maximum number of samples to show
        #[arg(short = 'n', long)]
        limit: Option<usize>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show one sample
    Show {
        /// Sample ID
        id: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

pub fn handle_samples_command(action: SamplesAction, path: Option<PathBuf>) -> Result<()> {
    let store = open_store(path)?;

    match action {
        SamplesAction::List {
            label,
            search,
            limit,
            json,
        } => {
            let filter = SampleFilter {
                label,
                search,
                limit,
            };
            let summaries = store.list_recent(&filter)?;

            if json {
                println!("{}", serde_json::to_string_pretty(&summaries)?);
            } else if summaries.is_empty() {
                println!("{}", "No samples found.".dimmed());
            } else {
                print_samples_table(&summaries);
            }
        }
        SamplesAction::Show { id, json } => {
            let Some(sample) = store.get(&id)? else {
                anyhow::bail!("Sample not found: {}", id);
            };

            if json {
                println!("{}", serde_json::to_string_pretty(&sample)?);
            } else {
                print_sample_detail(&sample);
            }
        }
    }

    Ok(())
}

fn print_samples_table(summaries: &[SampleSummary]) {
    println!(
        "{:<20} {:<18} {:<14} {:<6} {}",
        "CREATED".dimmed(),
        "ID".dimmed(),
        "LABEL".dimmed(),
        "LINES".dimmed(),
        "PRD".dimmed(),
    );

    for s in summaries {
        let created = s
            .created_at
            .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| "-".to_string());
        let label = s.label.as_deref().unwrap_or("-");
        let label_colored = match label {
            "-" => label.dimmed().to_string(),
            "wrong_answer" => label.bright_red().to_string(),
            _ => label.bright_yellow().to_string(),
        };
        let prd = truncate(&s.prd_preview, 50);

        println!(
            "{:<20} {:<18} {:<14} {:<6} {}",
            created, s.id, label_colored, s.code_lines, prd
        );
    }
}

fn print_sample_detail(sample: &Sample) {
    println!("{}", "=== Sample Detail ===".bright_blue().bold());
    println!("{}  {}", "ID:".dimmed(), sample.id);
    if let Some(ref label) = sample.label {
        println!("{}  {}", "Label:".dimmed(), label);
    }
    if let Some(created) = sample.created_at {
        println!(
            "{}  {}",
            "Created:".dimmed(),
            created.format("%Y-%m-%d %H:%M:%S UTC")
        );
    }
    println!();
    println!("{}", "--- PRD ---".bright_blue());
    println!("{}", sample.prd);
    println!();
    println!("{}", "--- Buggy Code ---".bright_blue());
    println!("{}", sample.buggy_solution_code);
    if let Some(ref info) = sample.failure_info {
        println!();
        println!("{}", "--- Failure Info ---".bright_blue());
        println!(
            "{}",
            serde_json::to_string_pretty(info).unwrap_or_else(|_| info.to_string())
        );
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() > max_chars {
        let head: String = text.chars().take(max_chars).collect();
        format!("{}...", head)
    } else {
        text.to_string()
    }
}
