use std::time::Duration;

/// Output captured from a completion call
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionOutput {
    /// Generated text, if the response carried any
    pub text: Option<String>,
    /// Model id reported by the endpoint (falls back to the requested one)
    pub model: String,
    pub finish_reason: Option<String>,
    /// Wall-clock duration of the call
    pub duration: Duration,
}

impl CompletionOutput {
    pub fn new(
        text: Option<String>,
        model: String,
        finish_reason: Option<String>,
        duration: Duration,
    ) -> Self {
        Self {
            text,
            model,
            finish_reason,
            duration,
        }
    }

    /// Generated text, or an empty string when the response had none
    pub fn text_or_empty(&self) -> &str {
        self.text.as_deref().unwrap_or("")
    }

    /// Whether generation stopped because the token budget ran out
    pub fn hit_length_limit(&self) -> bool {
        self.finish_reason.as_deref() == Some("length")
    }
}
