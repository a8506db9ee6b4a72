use std::time::Duration;

use samplecritic_logging::OutcomeKind;
use serde::{Serialize, Serializer};
use thiserror::Error;

use crate::{Issue, ValidationError};

/// Why a critique request failed.
///
/// `Display` is the message returned to the caller, so it never carries
/// internal detail; `Server::cause` is for logs only.
#[derive(Error, Debug)]
pub enum CritiqueError {
    #[error("Invalid request body")]
    Validation(#[from] ValidationError),

    #[error("Content-Type must be application/json")]
    BadContentType { received: Option<String> },

    #[error("Server misconfigured: model API key is not set")]
    Misconfigured,

    #[error("Upstream model request timed out")]
    UpstreamTimeout { after: Duration },

    #[error("Internal server error")]
    Server { cause: String },
}

impl CritiqueError {
    pub fn server(cause: impl std::fmt::Display) -> Self {
        CritiqueError::Server {
            cause: cause.to_string(),
        }
    }

    /// HTTP status code for this failure
    pub fn status(&self) -> u16 {
        match self {
            CritiqueError::Validation(_) => 400,
            CritiqueError::BadContentType { .. } => 415,
            CritiqueError::Misconfigured => 500,
            CritiqueError::UpstreamTimeout { .. } => 504,
            CritiqueError::Server { .. } => 500,
        }
    }

    pub fn kind(&self) -> OutcomeKind {
        match self {
            CritiqueError::Validation(_) => OutcomeKind::Validation,
            CritiqueError::BadContentType { .. } => OutcomeKind::BadContentType,
            CritiqueError::Misconfigured => OutcomeKind::Misconfigured,
            CritiqueError::UpstreamTimeout { .. } => OutcomeKind::UpstreamTimeout,
            CritiqueError::Server { .. } => OutcomeKind::ServerError,
        }
    }

    pub fn into_failure(self, request_id: String) -> CritiqueFailure {
        let error = self.to_string();
        let details = match self {
            CritiqueError::Validation(e) => Some(e.issues),
            _ => None,
        };
        CritiqueFailure {
            request_id,
            error,
            details,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CritiqueSuccess {
    pub request_id: String,
    pub id: String,
    pub model: String,
    #[serde(rename = "hasAllHeaders")]
    pub has_all_headers: bool,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CritiqueFailure {
    pub request_id: String,
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<Issue>>,
}

/// Result of one critique request, serialized with an `ok` discriminator
#[derive(Debug, Clone, PartialEq)]
pub enum CritiqueResult {
    Success(CritiqueSuccess),
    Failure(CritiqueFailure),
}

impl CritiqueResult {
    pub fn is_ok(&self) -> bool {
        matches!(self, CritiqueResult::Success(_))
    }

    pub fn request_id(&self) -> &str {
        match self {
            CritiqueResult::Success(s) => &s.request_id,
            CritiqueResult::Failure(f) => &f.request_id,
        }
    }
}

impl Serialize for CritiqueResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        #[derive(Serialize)]
        struct Tagged<'a, T> {
            ok: bool,
            #[serde(flatten)]
            body: &'a T,
        }

        match self {
            CritiqueResult::Success(body) => Tagged { ok: true, body }.serialize(serializer),
            CritiqueResult::Failure(body) => Tagged { ok: false, body }.serialize(serializer),
        }
    }
}

/// A classified result plus the HTTP status it maps to
#[derive(Debug, Clone, PartialEq)]
pub struct CritiqueResponse {
    pub status: u16,
    pub result: CritiqueResult,
}

impl CritiqueResponse {
    pub fn success(body: CritiqueSuccess) -> Self {
        Self {
            status: 200,
            result: CritiqueResult::Success(body),
        }
    }

    pub fn failure(error: CritiqueError, request_id: String) -> Self {
        Self {
            status: error.status(),
            result: CritiqueResult::Failure(error.into_failure(request_id)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::IssueCode;
    use serde_json::json;

    #[test]
    fn test_success_serialization() {
        let result = CritiqueResult::Success(CritiqueSuccess {
            request_id: "r1".into(),
            id: "s1".into(),
            model: "gpt-4o-mini".into(),
            has_all_headers: true,
            text: "body".into(),
        });
        assert_eq!(
            serde_json::to_value(&result).unwrap(),
            json!({
                "ok": true,
                "request_id": "r1",
                "id": "s1",
                "model": "gpt-4o-mini",
                "hasAllHeaders": true,
                "text": "body"
            })
        );
    }

    #[test]
    fn test_validation_failure_carries_details() {
        let err = CritiqueError::Validation(ValidationError {
            issues: vec![Issue {
                code: IssueCode::InvalidType,
                path: vec!["prd".into()],
                message: "Required".into(),
            }],
        });
        let response = CritiqueResponse::failure(err, "r2".into());
        assert_eq!(response.status, 400);
        assert_eq!(
            serde_json::to_value(&response.result).unwrap(),
            json!({
                "ok": false,
                "request_id": "r2",
                "error": "Invalid request body",
                "details": [{"code": "invalid_type", "path": ["prd"], "message": "Required"}]
            })
        );
    }

    #[test]
    fn test_server_error_hides_cause() {
        let response = CritiqueResponse::failure(
            CritiqueError::server("connection refused to 10.0.0.3"),
            "r3".into(),
        );
        let json = serde_json::to_value(&response.result).unwrap();
        assert_eq!(response.status, 500);
        assert_eq!(json["error"], "Internal server error");
        assert!(json.get("details").is_none());
        assert!(!json.to_string().contains("10.0.0.3"));
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(CritiqueError::BadContentType { received: None }.status(), 415);
        assert_eq!(CritiqueError::Misconfigured.status(), 500);
        let timeout = CritiqueError::UpstreamTimeout {
            after: Duration::from_millis(10),
        };
        assert_eq!(timeout.status(), 504);
    }
}
