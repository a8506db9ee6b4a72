use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One row of the sample dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub id: String,
    pub prd: String,
    pub buggy_solution_code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure_info: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Sample {
    /// The critique request body for this sample. `created_at` is not part
    /// of the request and absent optional fields are omitted.
    pub fn to_request_body(&self) -> Value {
        let mut body = Map::new();
        body.insert("id".into(), Value::String(self.id.clone()));
        body.insert("prd".into(), Value::String(self.prd.clone()));
        body.insert(
            "buggy_solution_code".into(),
            Value::String(self.buggy_solution_code.clone()),
        );
        if let Some(ref failure_info) = self.failure_info {
            body.insert("failure_info".into(), failure_info.clone());
        }
        if let Some(ref label) = self.label {
            body.insert("label".into(), Value::String(label.clone()));
        }
        if let Some(ref meta) = self.meta {
            body.insert("meta".into(), meta.clone());
        }
        Value::Object(body)
    }

    pub fn summary(&self) -> SampleSummary {
        let prd_preview: String = self.prd.chars().take(120).collect();
        let prd_preview = if self.prd.chars().count() > 120 {
            format!("{}...", prd_preview)
        } else {
            prd_preview
        };

        SampleSummary {
            id: self.id.clone(),
            label: self.label.clone(),
            created_at: self.created_at,
            prd_preview,
            code_lines: self.buggy_solution_code.lines().count(),
            has_failure_info: self.failure_info.as_ref().is_some_and(|v| !v.is_null()),
        }
    }
}

/// Summary for list views.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleSummary {
    pub id: String,
    pub label: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub prd_preview: String,
    pub code_lines: usize,
    pub has_failure_info: bool,
}

/// Filter parameters for listing samples.
#[derive(Debug, Default)]
pub struct SampleFilter {
    pub label: Option<String>,
    pub search: Option<String>,
    pub limit: Option<usize>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> Sample {
        Sample {
            id: "s1".into(),
            prd: "Return sum of list".into(),
            buggy_solution_code: "def f(x):\n    return 0".into(),
            failure_info: Some(json!({"trace": "AssertionError"})),
            label: Some("wrong_answer".into()),
            meta: None,
            created_at: None,
        }
    }

    #[test]
    fn test_request_body_omits_absent_fields() {
        let body = sample().to_request_body();
        assert_eq!(body["id"], "s1");
        assert_eq!(body["failure_info"]["trace"], "AssertionError");
        assert_eq!(body["label"], "wrong_answer");
        assert!(body.get("meta").is_none());
        assert!(body.get("created_at").is_none());
    }

    #[test]
    fn test_summary_counts_code_lines() {
        let summary = sample().summary();
        assert_eq!(summary.code_lines, 2);
        assert!(summary.has_failure_info);
        assert_eq!(summary.prd_preview, "Return sum of list");
    }

    #[test]
    fn test_summary_truncates_long_prd() {
        let mut s = sample();
        s.prd = "x".repeat(200);
        let summary = s.summary();
        assert_eq!(summary.prd_preview.chars().count(), 123);
        assert!(summary.prd_preview.ends_with("..."));
    }

    #[test]
    fn test_null_failure_info_is_not_reported() {
        let mut s = sample();
        s.failure_info = Some(Value::Null);
        assert!(!s.summary().has_failure_info);
    }
}
