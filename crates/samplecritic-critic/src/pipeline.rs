use std::sync::Arc;

use samplecritic_logging::{CritiqueEvent, OutcomeKind};
use samplecritic_model::ModelClient;
use serde_json::Value;

use crate::request::{is_json_content_type, parse_body, validate};
use crate::{
    CritiqueConfig, CritiqueError, CritiqueInvoker, CritiqueRequest, CritiqueResponse,
    CritiqueSuccess, ValidationError,
};

/// Entry point for one critique request: content type, body parse,
/// validation, model call, classification.
///
/// Holds no per-request state, so one instance serves concurrent requests.
pub struct CritiquePipeline {
    invoker: CritiqueInvoker,
}

impl CritiquePipeline {
    pub fn new(client: Arc<dyn ModelClient>, config: CritiqueConfig) -> Self {
        Self {
            invoker: CritiqueInvoker::new(client, config),
        }
    }

    pub fn config(&self) -> &CritiqueConfig {
        self.invoker.config()
    }

    /// Handle a raw HTTP-style request
    pub async fn handle(&self, content_type: Option<&str>, body: &[u8]) -> CritiqueResponse {
        let request_id = new_request_id();

        CritiqueEvent::RequestReceived {
            request_id: request_id.clone(),
            content_type: content_type.map(str::to_string),
            body_bytes: body.len(),
        }
        .emit();

        let result = self.run_raw(&request_id, content_type, body).await;
        finish(request_id, result)
    }

    /// Answer a request whose body could not be read, e.g. because it was
    /// over the size limit. The content-type check still comes first.
    pub fn handle_unreadable(
        &self,
        content_type: Option<&str>,
        error: ValidationError,
    ) -> CritiqueResponse {
        let request_id = new_request_id();

        CritiqueEvent::RequestReceived {
            request_id: request_id.clone(),
            content_type: content_type.map(str::to_string),
            body_bytes: 0,
        }
        .emit();

        let error = if is_json_content_type(content_type) {
            CritiqueError::Validation(error)
        } else {
            CritiqueError::BadContentType {
                received: content_type.map(str::to_string),
            }
        };
        finish(request_id, Err(error))
    }

    /// Handle an already-parsed JSON body (skips the content-type check)
    pub async fn handle_value(&self, value: &Value) -> CritiqueResponse {
        let request_id = new_request_id();
        let result = match validate(value) {
            Ok(request) => self.invoker.invoke(&request_id, &request).await,
            Err(e) => Err(e.into()),
        };
        finish(request_id, result)
    }

    /// Handle a request that is already typed
    pub async fn handle_request(&self, request: &CritiqueRequest) -> CritiqueResponse {
        let request_id = new_request_id();
        let result = self.invoker.invoke(&request_id, request).await;
        finish(request_id, result)
    }

    async fn run_raw(
        &self,
        request_id: &str,
        content_type: Option<&str>,
        body: &[u8],
    ) -> Result<CritiqueSuccess, CritiqueError> {
        if !is_json_content_type(content_type) {
            return Err(CritiqueError::BadContentType {
                received: content_type.map(str::to_string),
            });
        }

        let value = parse_body(body)?;
        let request = validate(&value)?;
        self.invoker.invoke(request_id, &request).await
    }
}

fn new_request_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

fn finish(request_id: String, result: Result<CritiqueSuccess, CritiqueError>) -> CritiqueResponse {
    match result {
        Ok(success) => CritiqueResponse::success(success),
        Err(error) => {
            // Model-call failures were already logged by the invoker
            if matches!(
                error.kind(),
                OutcomeKind::Validation | OutcomeKind::BadContentType | OutcomeKind::Misconfigured
            ) {
                let issues = match &error {
                    CritiqueError::Validation(e) => e.issues.len(),
                    _ => 0,
                };
                CritiqueEvent::RequestRejected {
                    request_id: request_id.clone(),
                    kind: error.kind(),
                    issues,
                }
                .emit();
            }
            CritiqueResponse::failure(error, request_id)
        }
    }
}
