use std::sync::Arc;
use std::time::Instant;

use samplecritic_logging::CritiqueEvent;
use samplecritic_model::{ChatMessage, CompletionRequest, ModelClient, ModelError};
use tracing::debug;

use crate::deadline::DeadlineGuard;
use crate::headers::{has_all_headers, missing_headers};
use crate::prompts::SYSTEM_INSTRUCTION;
use crate::{CritiqueConfig, CritiqueError, CritiquePrompts, CritiqueRequest, CritiqueSuccess};

/// Cap on generated tokens; fixed policy, not request-controllable
pub const MAX_OUTPUT_TOKENS: u32 = 1400;
/// Sampling temperature; fixed policy, not request-controllable
pub const TEMPERATURE: f32 = 0.2;

/// Sends one completion request per critique and classifies the outcome
pub struct CritiqueInvoker {
    client: Arc<dyn ModelClient>,
    config: CritiqueConfig,
}

impl CritiqueInvoker {
    pub fn new(client: Arc<dyn ModelClient>, config: CritiqueConfig) -> Self {
        Self { client, config }
    }

    pub fn config(&self) -> &CritiqueConfig {
        &self.config
    }

    /// Build the completion call for a request without sending it
    pub fn completion_request(&self, request: &CritiqueRequest) -> CompletionRequest {
        CompletionRequest {
            model: self.config.model.clone(),
            messages: vec![
                ChatMessage::system(SYSTEM_INSTRUCTION),
                ChatMessage::user(CritiquePrompts::build_prompt(request)),
            ],
            max_tokens: MAX_OUTPUT_TOKENS,
            temperature: TEMPERATURE,
        }
    }

    /// Critique a validated request.
    ///
    /// Fails with [`CritiqueError::Misconfigured`] before any network I/O
    /// when no credential is configured. Otherwise makes exactly one call
    /// under the configured deadline.
    pub async fn invoke(
        &self,
        request_id: &str,
        request: &CritiqueRequest,
    ) -> Result<CritiqueSuccess, CritiqueError> {
        let key = self
            .config
            .api_key
            .as_ref()
            .ok_or(CritiqueError::Misconfigured)?;

        let completion = self.completion_request(request);

        CritiqueEvent::ModelCallStarted {
            request_id: request_id.to_string(),
            sample_id: request.id.clone(),
            model: completion.model.clone(),
            prompt_chars: completion
                .messages
                .last()
                .map(|m| m.content.chars().count())
                .unwrap_or(0),
            timeout_ms: self.config.timeout.as_millis() as u64,
        }
        .emit();

        let start = Instant::now();
        let guard = DeadlineGuard::arm(self.config.timeout);

        let outcome = tokio::select! {
            biased;

            _ = guard.token().cancelled() => Err(ModelError::Aborted),
            result = self.client.complete(key, &completion, guard.token()) => result,
        };

        let timed_out = guard.disarm();
        let elapsed_ms = start.elapsed().as_millis() as u64;

        match outcome {
            Ok(output) => {
                if output.hit_length_limit() {
                    debug!(request_id, "Model output hit the token limit");
                }

                let text = output.text_or_empty().to_string();
                let has_all_headers = has_all_headers(&text);
                if !has_all_headers {
                    debug!(
                        request_id,
                        missing = ?missing_headers(&text),
                        "Critique is missing section headers"
                    );
                }

                CritiqueEvent::ModelCallCompleted {
                    request_id: request_id.to_string(),
                    sample_id: request.id.clone(),
                    model: completion.model.clone(),
                    text_chars: text.chars().count(),
                    has_all_headers,
                    elapsed_ms,
                }
                .emit();

                Ok(CritiqueSuccess {
                    request_id: request_id.to_string(),
                    id: request.id.clone(),
                    model: completion.model,
                    has_all_headers,
                    text,
                })
            }
            Err(e) => {
                let error = if e.is_aborted() || timed_out {
                    CritiqueError::UpstreamTimeout {
                        after: self.config.timeout,
                    }
                } else {
                    CritiqueError::server(&e)
                };

                CritiqueEvent::ModelCallFailed {
                    request_id: request_id.to_string(),
                    sample_id: request.id.clone(),
                    kind: error.kind(),
                    error: e.to_string(),
                    elapsed_ms,
                }
                .emit();

                Err(error)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{NeverClient, ScriptedClient};
    use std::time::Duration;

    fn request() -> CritiqueRequest {
        CritiqueRequest {
            id: "s1".into(),
            prd: "Return sum of list".into(),
            buggy_solution_code: "def f(x): return 0".into(),
            failure_info: None,
            label: None,
            meta: None,
        }
    }

    fn config() -> CritiqueConfig {
        CritiqueConfig::default().with_api_key("sk-test")
    }

    #[test]
    fn test_completion_request_uses_fixed_policy() {
        let invoker = CritiqueInvoker::new(Arc::new(ScriptedClient::text("")), config());
        let completion = invoker.completion_request(&request());
        assert_eq!(completion.max_tokens, 1400);
        assert!((completion.temperature - 0.2).abs() < f32::EPSILON);
        assert_eq!(completion.messages.len(), 2);
        assert_eq!(completion.messages[0].content, SYSTEM_INSTRUCTION);
        assert_eq!(
            completion.messages[1].content,
            CritiquePrompts::build_prompt(&request())
        );
    }

    #[tokio::test]
    async fn test_missing_credential_short_circuits() {
        let client = Arc::new(ScriptedClient::text("unused"));
        let invoker = CritiqueInvoker::new(client.clone(), CritiqueConfig::default());

        let err = invoker.invoke("r1", &request()).await.unwrap_err();
        assert!(matches!(err, CritiqueError::Misconfigured));
        assert_eq!(client.calls(), 0);
    }

    #[tokio::test]
    async fn test_success_reports_configured_model() {
        let client = Arc::new(ScriptedClient::text(
            "Detailed Diagnosis\n...\n[Proposed Fix]\n...\n<Test_Validation>\n...",
        ));
        let invoker = CritiqueInvoker::new(client.clone(), config().with_model("gpt-test"));

        let success = invoker.invoke("r1", &request()).await.unwrap();
        assert_eq!(success.model, "gpt-test");
        assert_eq!(success.id, "s1");
        assert_eq!(success.request_id, "r1");
        assert!(success.has_all_headers);
        assert_eq!(client.calls(), 1);
    }

    #[tokio::test]
    async fn test_missing_content_becomes_empty_text() {
        let invoker = CritiqueInvoker::new(Arc::new(ScriptedClient::empty()), config());
        let success = invoker.invoke("r1", &request()).await.unwrap();
        assert_eq!(success.text, "");
        assert!(!success.has_all_headers);
    }

    #[tokio::test]
    async fn test_upstream_error_is_server_error() {
        let client = Arc::new(ScriptedClient::api_error(502, "bad gateway"));
        let invoker = CritiqueInvoker::new(client.clone(), config());

        let err = invoker.invoke("r1", &request()).await.unwrap_err();
        match err {
            CritiqueError::Server { cause } => assert!(cause.contains("502")),
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(client.calls(), 1);
    }

    #[tokio::test]
    async fn test_never_settling_call_times_out() {
        let client = Arc::new(NeverClient::default());
        let invoker = CritiqueInvoker::new(
            client.clone(),
            config().with_timeout(Duration::from_millis(10)),
        );

        let start = Instant::now();
        let err = invoker.invoke("r1", &request()).await.unwrap_err();
        assert!(matches!(err, CritiqueError::UpstreamTimeout { .. }));
        assert_eq!(err.status(), 504);
        assert!(start.elapsed() < Duration::from_secs(2));
        assert_eq!(client.calls(), 1);
    }
}
