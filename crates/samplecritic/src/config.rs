//! Project configuration file support for samplecritic.
//!
//! Loads configuration from `samplecritic.toml` in the working directory.
//! The model credential is only ever taken from the environment.

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;

use samplecritic_critic::CritiqueConfig;

/// Project-level configuration loaded from `samplecritic.toml`
#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct ProjectConfig {
    /// Model endpoint settings
    #[serde(default)]
    pub model: ModelSection,
}

/// The `[model]` table
#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct ModelSection {
    /// Model identifier sent with each completion request
    pub name: Option<String>,
    /// Per-request deadline in milliseconds
    pub timeout_ms: Option<u64>,
    /// Base URL of an OpenAI-compatible API
    pub base_url: Option<String>,
}

/// The config file name
pub const CONFIG_FILE_NAME: &str = "samplecritic.toml";

impl ProjectConfig {
    /// Load configuration from the working directory.
    ///
    /// Returns:
    /// - `Ok(Some(config))` if file exists and parses successfully
    /// - `Ok(None)` if file does not exist
    /// - `Err(...)` if file exists but fails to parse (hard error)
    pub fn load(working_dir: &Path) -> Result<Option<Self>> {
        let config_path = working_dir.join(CONFIG_FILE_NAME);

        if !config_path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read {}", config_path.display()))?;

        let config: ProjectConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse {}", config_path.display()))?;

        Ok(Some(config))
    }

    /// Overlay file values onto `base`. Blank names and zero timeouts are ignored.
    pub fn apply_to(&self, mut base: CritiqueConfig) -> CritiqueConfig {
        if let Some(name) = non_blank(self.model.name.as_deref()) {
            base = base.with_model(name);
        }
        if let Some(ms) = self.model.timeout_ms.filter(|ms| *ms > 0) {
            base = base.with_timeout(Duration::from_millis(ms));
        }
        if let Some(url) = non_blank(self.model.base_url.as_deref()) {
            base = base.with_base_url(url);
        }
        base
    }
}

/// Resolve the effective critique config.
/// Priority: environment > `samplecritic.toml` > defaults
pub fn resolve(working_dir: &Path) -> Result<CritiqueConfig> {
    resolve_with(working_dir, |key| std::env::var(key).ok())
}

fn resolve_with<F>(working_dir: &Path, lookup: F) -> Result<CritiqueConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = CritiqueConfig::default();
    if let Some(file) = ProjectConfig::load(working_dir)? {
        config = file.apply_to(config);
    }
    Ok(config.apply_env(lookup))
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
