use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use anyhow::{Context, Result};

use crate::types::Sample;

/// Parse a JSONL dataset into samples, in file order.
///
/// Blank lines are ignored. Lines that are not a valid sample are skipped
/// with a warning rather than failing the whole file.
pub fn parse_samples(path: &Path) -> Result<Vec<Sample>> {
    let file =
        File::open(path).with_context(|| format!("Failed to open sample file: {:?}", path))?;
    let reader = BufReader::new(file);

    let mut samples = Vec::new();
    for (index, line) in reader.lines().enumerate() {
        let line = line.with_context(|| "Failed to read line from sample file")?;
        if line.trim().is_empty() {
            continue;
        }

        match serde_json::from_str::<Sample>(&line) {
            Ok(sample) => samples.push(sample),
            Err(e) => {
                tracing::warn!(line = index + 1, "Skipping malformed sample: {}", e);
            }
        }
    }

    Ok(samples)
}
