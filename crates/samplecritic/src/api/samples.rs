use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::Json;
use serde::Deserialize;

use samplecritic_samples::{Sample, SampleFilter, SampleSummary};

use super::AppState;

#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub limit: Option<usize>,
    pub label: Option<String>,
    pub search: Option<String>,
}

pub async fn list_samples(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<SampleSummary>>, (StatusCode, String)> {
    let filter = SampleFilter {
        label: params.label,
        search: params.search,
        limit: params.limit,
    };

    let summaries = state
        .store
        .list_recent(&filter)
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;

    Ok(Json(summaries))
}

pub async fn get_sample(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Sample>, (StatusCode, String)> {
    let sample = state
        .store
        .get(&id)
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?
        .ok_or_else(|| (StatusCode::NOT_FOUND, format!("Sample not found: {}", id)))?;

    Ok(Json(sample))
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use samplecritic_critic::testing::ScriptedClient;
    use samplecritic_critic::CritiqueConfig;
    use samplecritic_samples::SampleStore;
    use tower::ServiceExt;

    use crate::api::test_support::{body_json, router};

    fn app(file: &tempfile::NamedTempFile) -> axum::Router {
        router(
            Arc::new(ScriptedClient::text("ok")),
            CritiqueConfig::default(),
            SampleStore::with_path(file.path().to_path_buf()),
        )
    }

    fn dataset() -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"{{"id":"a","prd":"Sort numbers","buggy_solution_code":"x","label":"wrong_answer","created_at":"2024-01-01T00:00:00Z"}}"#
        )
        .unwrap();
        writeln!(
            file,
            r#"{{"id":"b","prd":"Sum numbers","buggy_solution_code":"y","label":"timeout","created_at":"2024-02-01T00:00:00Z"}}"#
        )
        .unwrap();
        file
    }

    #[tokio::test]
    async fn test_list_newest_first() {
        let file = dataset();
        let response = app(&file)
            .oneshot(Request::get("/api/samples").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json[0]["id"], "b");
        assert_eq!(json[1]["id"], "a");
    }

    #[tokio::test]
    async fn test_list_with_query_filters() {
        let file = dataset();
        let response = app(&file)
            .oneshot(
                Request::get("/api/samples?label=wrong_answer&limit=5")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        let json = body_json(response).await;
        assert_eq!(json.as_array().unwrap().len(), 1);
        assert_eq!(json[0]["id"], "a");
    }

    #[tokio::test]
    async fn test_get_sample_and_404() {
        let file = dataset();

        let response = app(&file)
            .oneshot(Request::get("/api/samples/b").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["prd"], "Sum numbers");

        let response = app(&file)
            .oneshot(Request::get("/api/samples/zzz").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
