use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio_util::sync::CancellationToken;

use crate::CompletionOutput;

/// Errors that can occur while talking to a model endpoint
#[derive(Error, Debug)]
pub enum ModelError {
    #[error("Model request was aborted")]
    Aborted,

    #[error("HTTP transport error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Model endpoint returned status {status}: {body}")]
    Api { status: u16, body: String },

    #[error("Failed to decode model response: {0}")]
    Decode(String),
}

impl ModelError {
    pub fn is_aborted(&self) -> bool {
        matches!(self, ModelError::Aborted)
    }
}

/// Access credential for a model endpoint. `Debug` never prints the secret.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    /// Returns `None` for blank values so an empty env var counts as unset.
    pub fn new(value: impl Into<String>) -> Option<Self> {
        let value = value.into();
        if value.trim().is_empty() {
            None
        } else {
            Some(Self(value))
        }
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("ApiKey(***)")
    }
}

/// Author of a chat message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// A single chat-completion call
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    /// Upper bound on generated tokens
    pub max_tokens: u32,
    pub temperature: f32,
}

/// The core abstraction for chat-completion endpoints
#[async_trait]
pub trait ModelClient: Send + Sync {
    /// Human-readable name of the backend (e.g., "OpenAI")
    fn name(&self) -> &str;

    /// Send exactly one completion request.
    ///
    /// Implementations must return [`ModelError::Aborted`] promptly once
    /// `cancel` fires and must not retry on their own.
    async fn complete(
        &self,
        key: &ApiKey,
        request: &CompletionRequest,
        cancel: &CancellationToken,
    ) -> Result<CompletionOutput, ModelError>;
}
