use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

/// How a critique request ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeKind {
    Success,
    Validation,
    BadContentType,
    Misconfigured,
    UpstreamTimeout,
    ServerError,
}

impl OutcomeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutcomeKind::Success => "success",
            OutcomeKind::Validation => "validation",
            OutcomeKind::BadContentType => "bad_content_type",
            OutcomeKind::Misconfigured => "misconfigured",
            OutcomeKind::UpstreamTimeout => "upstream_timeout",
            OutcomeKind::ServerError => "server_error",
        }
    }
}

impl std::fmt::Display for OutcomeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Structured log events for a single critique request
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum CritiqueEvent {
    RequestReceived {
        request_id: String,
        content_type: Option<String>,
        body_bytes: usize,
    },
    /// Rejected before any model call was attempted
    RequestRejected {
        request_id: String,
        kind: OutcomeKind,
        issues: usize,
    },
    ModelCallStarted {
        request_id: String,
        sample_id: String,
        model: String,
        prompt_chars: usize,
        timeout_ms: u64,
    },
    ModelCallCompleted {
        request_id: String,
        sample_id: String,
        model: String,
        text_chars: usize,
        has_all_headers: bool,
        elapsed_ms: u64,
    },
    ModelCallFailed {
        request_id: String,
        sample_id: String,
        kind: OutcomeKind,
        error: String,
        elapsed_ms: u64,
    },
}

impl CritiqueEvent {
    /// Emit the event through `tracing` at a level matching its severity
    pub fn emit(&self) {
        match self {
            CritiqueEvent::RequestReceived {
                request_id,
                content_type,
                body_bytes,
            } => {
                debug!(
                    request_id = %request_id,
                    content_type = content_type.as_deref().unwrap_or("<none>"),
                    body_bytes,
                    "Critique request received"
                );
            }
            CritiqueEvent::RequestRejected {
                request_id,
                kind,
                issues,
            } => {
                warn!(
                    request_id = %request_id,
                    kind = kind.as_str(),
                    issues,
                    "Critique request rejected"
                );
            }
            CritiqueEvent::ModelCallStarted {
                request_id,
                sample_id,
                model,
                prompt_chars,
                timeout_ms,
            } => {
                info!(
                    request_id = %request_id,
                    sample_id = %sample_id,
                    model = %model,
                    prompt_chars,
                    timeout_ms,
                    "Requesting critique from model"
                );
            }
            CritiqueEvent::ModelCallCompleted {
                request_id,
                sample_id,
                model,
                text_chars,
                has_all_headers,
                elapsed_ms,
            } => {
                info!(
                    request_id = %request_id,
                    sample_id = %sample_id,
                    model = %model,
                    text_chars,
                    has_all_headers,
                    elapsed_ms,
                    "Critique completed"
                );
            }
            CritiqueEvent::ModelCallFailed {
                request_id,
                sample_id,
                kind,
                error: cause,
                elapsed_ms,
            } => match kind {
                OutcomeKind::UpstreamTimeout => {
                    warn!(
                        request_id = %request_id,
                        sample_id = %sample_id,
                        elapsed_ms,
                        "Model call timed out"
                    );
                }
                _ => {
                    error!(
                        request_id = %request_id,
                        sample_id = %sample_id,
                        kind = kind.as_str(),
                        error = %cause,
                        elapsed_ms,
                        "Model call failed"
                    );
                }
            },
        }
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable multi-line format
    #[default]
    Pretty,
    /// JSON lines format for machine consumption
    Json,
    /// Compact single-line format
    Compact,
}

impl std::str::FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pretty" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            "compact" => Ok(LogFormat::Compact),
            _ => Err(format!("Unknown log format: {}", s)),
        }
    }
}
