use axum::body::Bytes;
use axum::extract::rejection::BytesRejection;
use axum::extract::State;
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Json, Response};

use samplecritic_critic::ValidationError;

use super::AppState;

pub async fn critique(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> Response {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok());

    let response = match body {
        Ok(body) => state.pipeline.handle(content_type, &body).await,
        Err(rejection) => {
            tracing::warn!(
                status = %rejection.status(),
                "Failed to read critique body: {}",
                rejection
            );
            let error = if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
                ValidationError::body_too_large(state.body_limit)
            } else {
                ValidationError::unreadable_body(&rejection)
            };
            state.pipeline.handle_unreadable(content_type, error)
        }
    };
    let status =
        StatusCode::from_u16(response.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

    (
        status,
        [(header::CACHE_CONTROL, "no-store")],
        Json(response.result),
    )
        .into_response()
}
