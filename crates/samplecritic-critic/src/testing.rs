//! Model client doubles for tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use samplecritic_model::{
    ApiKey, CancellationToken, CompletionOutput, CompletionRequest, ModelClient, ModelError,
};

enum Script {
    Reply(Option<String>),
    ApiError { status: u16, body: String },
}

/// Answers every call with a fixed reply and records what it was sent
pub struct ScriptedClient {
    script: Script,
    calls: AtomicUsize,
    last_request: Mutex<Option<CompletionRequest>>,
}

impl ScriptedClient {
    fn with_script(script: Script) -> Self {
        Self {
            script,
            calls: AtomicUsize::new(0),
            last_request: Mutex::new(None),
        }
    }

    pub fn text(text: impl Into<String>) -> Self {
        Self::with_script(Script::Reply(Some(text.into())))
    }

    /// Replies with a response that carries no content
    pub fn empty() -> Self {
        Self::with_script(Script::Reply(None))
    }

    pub fn api_error(status: u16, body: impl Into<String>) -> Self {
        Self::with_script(Script::ApiError {
            status,
            body: body.into(),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_request(&self) -> Option<CompletionRequest> {
        self.last_request.lock().ok().and_then(|r| r.clone())
    }
}

#[async_trait]
impl ModelClient for ScriptedClient {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn complete(
        &self,
        _key: &ApiKey,
        request: &CompletionRequest,
        _cancel: &CancellationToken,
    ) -> Result<CompletionOutput, ModelError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut last) = self.last_request.lock() {
            *last = Some(request.clone());
        }

        match &self.script {
            Script::Reply(text) => Ok(CompletionOutput::new(
                text.clone(),
                request.model.clone(),
                Some("stop".to_string()),
                Duration::ZERO,
            )),
            Script::ApiError { status, body } => Err(ModelError::Api {
                status: *status,
                body: body.clone(),
            }),
        }
    }
}

/// A call that never settles and ignores cancellation
#[derive(Default)]
pub struct NeverClient {
    calls: AtomicUsize,
}

impl NeverClient {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ModelClient for NeverClient {
    fn name(&self) -> &str {
        "never"
    }

    async fn complete(
        &self,
        _key: &ApiKey,
        _request: &CompletionRequest,
        _cancel: &CancellationToken,
    ) -> Result<CompletionOutput, ModelError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        std::future::pending().await
    }
}
