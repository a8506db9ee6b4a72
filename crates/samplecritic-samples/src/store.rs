use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::parser::parse_samples;
use crate::types::{Sample, SampleFilter, SampleSummary};

/// Page size used when a listing does not ask for one
pub const DEFAULT_LIST_LIMIT: usize = 50;
/// Largest page a listing may return
pub const MAX_LIST_LIMIT: usize = 500;

/// Read-only access to the sample dataset on disk.
///
/// The file is re-read on every call so edits show up without a restart.
pub struct SampleStore {
    path: PathBuf,
}

impl SampleStore {
    /// Create a SampleStore using the default dataset location.
    pub fn new() -> Result<Self> {
        let data_dir = dirs::data_dir().with_context(|| "Could not determine data directory")?;
        let path = data_dir.join("samplecritic").join("samples.jsonl");
        Ok(Self { path })
    }

    /// Create a SampleStore over a specific file (useful for testing).
    pub fn with_path(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Fetch one sample by ID. The first row with a matching ID wins.
    pub fn get(&self, id: &str) -> Result<Option<Sample>> {
        Ok(self.load()?.into_iter().find(|s| s.id == id))
    }

    /// List samples matching the filter, newest first.
    ///
    /// Dated samples come first by `created_at` descending; undated samples
    /// follow in file order.
    pub fn list_recent(&self, filter: &SampleFilter) -> Result<Vec<SampleSummary>> {
        let mut samples: Vec<Sample> = self
            .load()?
            .into_iter()
            .filter(|s| matches_filter(s, filter))
            .collect();

        samples.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let limit = filter
            .limit
            .unwrap_or(DEFAULT_LIST_LIMIT)
            .min(MAX_LIST_LIMIT);

        Ok(samples.iter().take(limit).map(Sample::summary).collect())
    }

    /// Total number of readable samples.
    pub fn count(&self) -> Result<usize> {
        Ok(self.load()?.len())
    }

    fn load(&self) -> Result<Vec<Sample>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        parse_samples(&self.path)
    }
}

fn matches_filter(sample: &Sample, filter: &SampleFilter) -> bool {
    if let Some(ref label) = filter.label {
        if sample.label.as_deref() != Some(label.as_str()) {
            return false;
        }
    }

    if let Some(ref search) = filter.search {
        let search_lower = search.to_lowercase();
        if !sample.prd.to_lowercase().contains(&search_lower) {
            return false;
        }
    }

    true
}
