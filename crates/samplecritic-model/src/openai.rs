use std::time::Instant;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

use crate::{ApiKey, ChatMessage, CompletionOutput, CompletionRequest, ModelClient, ModelError};

/// Default endpoint for OpenAI-compatible APIs
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Upstream error bodies are cut to this many chars before being kept
const MAX_ERROR_BODY_CHARS: usize = 2000;

#[derive(Debug, Serialize)]
struct ChatCompletionBody<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Default, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    model: Option<String>,
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Default, Deserialize)]
struct Choice {
    #[serde(default)]
    message: Option<ResponseMessage>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Client for OpenAI-compatible `/chat/completions` endpoints
pub struct OpenAiChatClient {
    http: Client,
    base_url: String,
}

impl OpenAiChatClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_http_client(Client::new(), base_url)
    }

    pub fn with_http_client(http: Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }

    async fn send(
        &self,
        key: &ApiKey,
        request: &CompletionRequest,
    ) -> Result<ChatCompletionResponse, ModelError> {
        let body = ChatCompletionBody {
            model: &request.model,
            messages: &request.messages,
            max_tokens: request.max_tokens,
            temperature: request.temperature,
        };

        let response = self
            .http
            .post(self.endpoint())
            .bearer_auth(key.expose())
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ModelError::Api {
                status: status.as_u16(),
                body: body.chars().take(MAX_ERROR_BODY_CHARS).collect(),
            });
        }

        let raw = response.bytes().await?;
        trace!(bytes = raw.len(), "Received completion body");
        serde_json::from_slice(&raw).map_err(|e| ModelError::Decode(e.to_string()))
    }
}

impl Default for OpenAiChatClient {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

#[async_trait]
impl ModelClient for OpenAiChatClient {
    fn name(&self) -> &str {
        "OpenAI"
    }

    async fn complete(
        &self,
        key: &ApiKey,
        request: &CompletionRequest,
        cancel: &CancellationToken,
    ) -> Result<CompletionOutput, ModelError> {
        let start = Instant::now();

        debug!(
            client = self.name(),
            endpoint = %self.endpoint(),
            model = %request.model,
            messages = request.messages.len(),
            "Sending chat completion"
        );

        // Dropping the send future on cancel aborts the in-flight request
        let parsed = tokio::select! {
            biased;

            _ = cancel.cancelled() => return Err(ModelError::Aborted),
            result = self.send(key, request) => result?,
        };

        let model = parsed.model.unwrap_or_else(|| request.model.clone());
        let (text, finish_reason) = match parsed.choices.into_iter().next() {
            Some(choice) => (
                choice.message.and_then(|m| m.content),
                choice.finish_reason,
            ),
            None => (None, None),
        };

        let duration = start.elapsed();
        debug!(
            model = %model,
            has_text = text.is_some(),
            duration_ms = duration.as_millis() as u64,
            "Chat completion finished"
        );

        Ok(CompletionOutput::new(text, model, finish_reason, duration))
    }
}
