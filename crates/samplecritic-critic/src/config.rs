use std::time::Duration;

use samplecritic_model::{ApiKey, DEFAULT_BASE_URL};

/// Model used when none is configured
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
/// Timeout used when none is configured or the value is not a positive integer
pub const DEFAULT_TIMEOUT_MS: u64 = 45_000;

pub const ENV_API_KEY: &str = "OPENAI_API_KEY";
pub const ENV_MODEL: &str = "OPENAI_MODEL";
pub const ENV_TIMEOUT_MS: &str = "OPENAI_TIMEOUT_MS";
pub const ENV_BASE_URL: &str = "OPENAI_BASE_URL";

/// Settings consumed by the critique invoker.
///
/// Built once at startup and passed in. A missing credential is not an error
/// here; it is reported per request.
#[derive(Debug, Clone)]
pub struct CritiqueConfig {
    pub api_key: Option<ApiKey>,
    pub model: String,
    pub timeout: Duration,
    pub base_url: String,
}

impl Default for CritiqueConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }
}

impl CritiqueConfig {
    /// Defaults overlaid with the process environment
    pub fn from_env() -> Self {
        Self::default().apply_env(|key| std::env::var(key).ok())
    }

    /// Overlay values from an environment-like lookup.
    ///
    /// Blank values and non-numeric timeouts are ignored so the current
    /// value stays in effect.
    pub fn apply_env<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(key) = lookup(ENV_API_KEY).and_then(ApiKey::new) {
            self.api_key = Some(key);
        }
        if let Some(model) = non_blank(lookup(ENV_MODEL)) {
            self.model = model;
        }
        if let Some(ms) = lookup(ENV_TIMEOUT_MS).as_deref().and_then(parse_timeout_ms) {
            self.timeout = Duration::from_millis(ms);
        }
        if let Some(url) = non_blank(lookup(ENV_BASE_URL)) {
            self.base_url = url;
        }
        self
    }

    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = ApiKey::new(key);
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn has_credential(&self) -> bool {
        self.api_key.is_some()
    }
}

/// Parse a millisecond timeout; `None` for non-numeric or zero values
pub fn parse_timeout_ms(raw: &str) -> Option<u64> {
    raw.trim().parse::<u64>().ok().filter(|ms| *ms > 0)
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_env_empty() {
        let config = CritiqueConfig::default().apply_env(lookup(&[]));
        assert!(!config.has_credential());
        assert_eq!(config.model, DEFAULT_MODEL);
        assert_eq!(config.timeout, Duration::from_millis(45_000));
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
    }

    #[test]
    fn test_env_overrides() {
        let config = CritiqueConfig::default().apply_env(lookup(&[
            (ENV_API_KEY, "sk-test"),
            (ENV_MODEL, "gpt-4.1"),
            (ENV_TIMEOUT_MS, "1500"),
            (ENV_BASE_URL, "http://localhost:8080/v1"),
        ]));
        assert_eq!(config.api_key.unwrap().expose(), "sk-test");
        assert_eq!(config.model, "gpt-4.1");
        assert_eq!(config.timeout, Duration::from_millis(1500));
        assert_eq!(config.base_url, "http://localhost:8080/v1");
    }

    #[test]
    fn test_non_numeric_timeout_falls_back() {
        let config = CritiqueConfig::default().apply_env(lookup(&[(ENV_TIMEOUT_MS, "soon")]));
        assert_eq!(config.timeout, Duration::from_millis(DEFAULT_TIMEOUT_MS));
    }

    #[test]
    fn test_blank_values_are_ignored() {
        let config = CritiqueConfig::default()
            .apply_env(lookup(&[(ENV_API_KEY, "  "), (ENV_MODEL, "")]));
        assert!(!config.has_credential());
        assert_eq!(config.model, DEFAULT_MODEL);
    }

    #[test]
    fn test_parse_timeout_ms() {
        assert_eq!(parse_timeout_ms("250"), Some(250));
        assert_eq!(parse_timeout_ms(" 10 "), Some(10));
        assert_eq!(parse_timeout_ms("0"), None);
        assert_eq!(parse_timeout_ms("-5"), None);
        assert_eq!(parse_timeout_ms("1e3"), None);
    }
}
