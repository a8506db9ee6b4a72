use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use serde_json::value::RawValue;
use serde_json::{Map, Value};
use thiserror::Error;

/// A validated critique request.
///
/// Only `id`, `prd` and `buggy_solution_code` are constrained; the remaining
/// fields are carried through as-is whatever their shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CritiqueRequest {
    pub id: String,
    pub prd: String,
    pub buggy_solution_code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure_info: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Accepted and ignored by the pipeline
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueCode {
    InvalidType,
    TooSmall,
    TooBig,
    InvalidJson,
}

/// One violated field constraint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    pub code: IssueCode,
    /// Path segments from the body root; empty for the body itself
    pub path: Vec<String>,
    pub message: String,
}

impl Issue {
    fn at(code: IssueCode, field: &str, message: impl Into<String>) -> Self {
        Self {
            code,
            path: vec![field.to_string()],
            message: message.into(),
        }
    }

    fn root(code: IssueCode, message: impl Into<String>) -> Self {
        Self {
            code,
            path: Vec::new(),
            message: message.into(),
        }
    }
}

/// Every constraint the body violated, in field order
#[derive(Debug, Clone, PartialEq, Error)]
#[error("Invalid request body ({} issue(s))", issues.len())]
pub struct ValidationError {
    pub issues: Vec<Issue>,
}

impl ValidationError {
    /// Returns true if any issue points at the given top-level field
    pub fn has_issue_for(&self, field: &str) -> bool {
        self.issues
            .iter()
            .any(|i| i.path.first().map(String::as_str) == Some(field))
    }

    /// The body was larger than the server accepts
    pub fn body_too_large(limit_bytes: usize) -> Self {
        Self {
            issues: vec![Issue::root(
                IssueCode::TooBig,
                format!("Request body must not exceed {} bytes", limit_bytes),
            )],
        }
    }

    /// The body could not be read in full
    pub fn unreadable_body(reason: impl std::fmt::Display) -> Self {
        Self {
            issues: vec![Issue::root(
                IssueCode::InvalidJson,
                format!("Failed to read request body: {}", reason),
            )],
        }
    }
}

/// Whether a `Content-Type` header value declares a JSON body.
///
/// Accepts `application/json` and `application/*+json`, with or without
/// parameters such as `charset`.
pub fn is_json_content_type(content_type: Option<&str>) -> bool {
    let Some(raw) = content_type else {
        return false;
    };
    let mime = raw
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();

    mime == "application/json" || (mime.starts_with("application/") && mime.ends_with("+json"))
}

/// Parse a raw body into JSON, reporting malformed input as a root issue.
///
/// Syntax is checked at any nesting depth. A top-level field nested deeper
/// than `serde_json` builds into a [`Value`] comes back as `null` instead of
/// failing the whole body.
pub fn parse_body(body: &[u8]) -> Result<Value, ValidationError> {
    let raw: Box<RawValue> = serde_json::from_slice(body).map_err(|e| ValidationError {
        issues: vec![Issue::root(
            IssueCode::InvalidJson,
            format!("Malformed JSON body: {}", e),
        )],
    })?;

    match serde_json::from_str(raw.get()) {
        Ok(value) => Ok(value),
        Err(_) => Ok(parse_fields_leniently(&raw)),
    }
}

fn parse_fields_leniently(raw: &RawValue) -> Value {
    // Only arrays and objects nest, so a body that is not an object is an array
    let Ok(fields) = serde_json::from_str::<BTreeMap<String, Box<RawValue>>>(raw.get()) else {
        return Value::Array(Vec::new());
    };

    let mut obj = Map::new();
    for (name, field) in fields {
        let value = serde_json::from_str(field.get()).unwrap_or_else(|e| {
            tracing::debug!(field = %name, "Field too deeply nested, treating as null: {}", e);
            Value::Null
        });
        obj.insert(name, value);
    }
    Value::Object(obj)
}

/// Validate an arbitrary JSON value into a [`CritiqueRequest`].
///
/// Collects every issue instead of stopping at the first one.
pub fn validate(value: &Value) -> Result<CritiqueRequest, ValidationError> {
    let Some(obj) = value.as_object() else {
        return Err(ValidationError {
            issues: vec![Issue::root(
                IssueCode::InvalidType,
                format!("Expected object, received {}", json_type_name(value)),
            )],
        });
    };

    let mut issues = Vec::new();
    let id = required_string(obj, "id", &mut issues);
    let prd = required_string(obj, "prd", &mut issues);
    let buggy_solution_code = required_string(obj, "buggy_solution_code", &mut issues);
    let label = optional_string(obj, "label", &mut issues);

    match (id, prd, buggy_solution_code) {
        (Some(id), Some(prd), Some(buggy_solution_code)) if issues.is_empty() => {
            Ok(CritiqueRequest {
                id,
                prd,
                buggy_solution_code,
                failure_info: non_null(obj.get("failure_info")),
                label,
                meta: non_null(obj.get("meta")),
            })
        }
        _ => Err(ValidationError { issues }),
    }
}

fn required_string(
    obj: &Map<String, Value>,
    field: &str,
    issues: &mut Vec<Issue>,
) -> Option<String> {
    match obj.get(field) {
        None => {
            issues.push(Issue::at(IssueCode::InvalidType, field, "Required"));
            None
        }
        Some(Value::String(s)) if s.is_empty() => {
            issues.push(Issue::at(
                IssueCode::TooSmall,
                field,
                "String must contain at least 1 character(s)",
            ));
            None
        }
        Some(Value::String(s)) => Some(s.clone()),
        Some(other) => {
            issues.push(Issue::at(
                IssueCode::InvalidType,
                field,
                format!("Expected string, received {}", json_type_name(other)),
            ));
            None
        }
    }
}

fn optional_string(
    obj: &Map<String, Value>,
    field: &str,
    issues: &mut Vec<Issue>,
) -> Option<String> {
    match obj.get(field) {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s.clone()),
        Some(other) => {
            issues.push(Issue::at(
                IssueCode::InvalidType,
                field,
                format!("Expected string, received {}", json_type_name(other)),
            ));
            None
        }
    }
}

fn non_null(value: Option<&Value>) -> Option<Value> {
    value.filter(|v| !v.is_null()).cloned()
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_validate_accepts_minimal_request() {
        let req = validate(&json!({
            "id": "s1",
            "prd": "Return sum of list",
            "buggy_solution_code": "def f(x): return 0"
        }))
        .unwrap();
        assert_eq!(req.id, "s1");
        assert!(req.failure_info.is_none());
        assert!(req.label.is_none());
    }

    #[test]
    fn test_validate_keeps_optional_fields_of_any_shape() {
        let req = validate(&json!({
            "id": "s1",
            "prd": "p",
            "buggy_solution_code": "c",
            "failure_info": [1, {"nested": [true, null]}],
            "label": "wrong_answer",
            "meta": "anything"
        }))
        .unwrap();
        assert_eq!(req.failure_info, Some(json!([1, {"nested": [true, null]}])));
        assert_eq!(req.label.as_deref(), Some("wrong_answer"));
        assert_eq!(req.meta, Some(json!("anything")));
    }

    #[test]
    fn test_validate_reports_every_issue() {
        let err = validate(&json!({
            "id": "",
            "buggy_solution_code": 42,
            "label": 7
        }))
        .unwrap_err();

        assert_eq!(err.issues.len(), 4);
        assert!(err.has_issue_for("id"));
        assert!(err.has_issue_for("prd"));
        assert!(err.has_issue_for("buggy_solution_code"));
        assert!(err.has_issue_for("label"));

        assert_eq!(err.issues[0].code, IssueCode::TooSmall);
        assert_eq!(err.issues[1].message, "Required");
        assert_eq!(err.issues[2].message, "Expected string, received number");
    }

    #[test]
    fn test_validate_missing_prd_reports_path() {
        let err = validate(&json!({"id": "s1", "buggy_solution_code": "c"})).unwrap_err();
        assert_eq!(err.issues.len(), 1);
        assert_eq!(err.issues[0].path, vec!["prd".to_string()]);
    }

    #[test]
    fn test_validate_rejects_non_object() {
        let err = validate(&json!(["id", "prd"])).unwrap_err();
        assert_eq!(err.issues.len(), 1);
        assert!(err.issues[0].path.is_empty());
        assert_eq!(err.issues[0].message, "Expected object, received array");
    }

    #[test]
    fn test_validate_null_label_is_absent() {
        let req = validate(&json!({
            "id": "s1",
            "prd": "p",
            "buggy_solution_code": "c",
            "label": null,
            "failure_info": null
        }))
        .unwrap();
        assert!(req.label.is_none());
        assert!(req.failure_info.is_none());
    }

    #[test]
    fn test_parse_body_reports_malformed_json() {
        let err = parse_body(b"{not json").unwrap_err();
        assert_eq!(err.issues[0].code, IssueCode::InvalidJson);
        assert!(err.issues[0].path.is_empty());

        assert!(parse_body(b"").is_err());
    }

    fn nested(depth: usize) -> String {
        format!("{}{}", "[".repeat(depth), "]".repeat(depth))
    }

    #[test]
    fn test_parse_body_accepts_deeply_nested_failure_info() {
        let body = format!(
            r#"{{"id":"s1","prd":"p","buggy_solution_code":"c","failure_info":{},"label":"wrong_answer"}}"#,
            nested(200)
        );

        let value = parse_body(body.as_bytes()).unwrap();
        let req = validate(&value).unwrap();
        assert_eq!(req.prd, "p");
        assert_eq!(req.label.as_deref(), Some("wrong_answer"));
        assert!(req.failure_info.is_none());
    }

    #[test]
    fn test_parse_body_keeps_shallow_fields_beside_deep_meta() {
        let body = format!(
            r#"{{"id":"s1","prd":"p","buggy_solution_code":"c","failure_info":{{"trace":"x"}},"meta":{}}}"#,
            nested(500)
        );

        let req = validate(&parse_body(body.as_bytes()).unwrap()).unwrap();
        assert_eq!(req.failure_info, Some(json!({"trace": "x"})));
        assert!(req.meta.is_none());
    }

    #[test]
    fn test_parse_body_deep_array_is_not_an_object() {
        let value = parse_body(nested(300).as_bytes()).unwrap();
        let err = validate(&value).unwrap_err();
        assert_eq!(err.issues[0].message, "Expected object, received array");
    }

    #[test]
    fn test_parse_body_deep_but_unbalanced_is_malformed() {
        let body = format!(r#"{{"id":"s1","failure_info":{}"#, "[".repeat(200));
        let err = parse_body(body.as_bytes()).unwrap_err();
        assert_eq!(err.issues[0].code, IssueCode::InvalidJson);
    }

    #[test]
    fn test_body_error_constructors() {
        let err = ValidationError::body_too_large(1024);
        assert_eq!(err.issues[0].code, IssueCode::TooBig);
        assert!(err.issues[0].path.is_empty());
        assert!(err.issues[0].message.contains("1024"));

        let err = ValidationError::unreadable_body("connection reset");
        assert_eq!(err.issues[0].code, IssueCode::InvalidJson);
    }

    #[test]
    fn test_is_json_content_type() {
        assert!(is_json_content_type(Some("application/json")));
        assert!(is_json_content_type(Some("Application/JSON; charset=utf-8")));
        assert!(is_json_content_type(Some("application/vnd.api+json")));
        assert!(!is_json_content_type(Some("text/plain")));
        assert!(!is_json_content_type(Some("multipart/form-data; boundary=x")));
        assert!(!is_json_content_type(None));
    }
}
