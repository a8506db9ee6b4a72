use axum::extract::State;
use axum::response::Json;
use serde::Serialize;

use super::AppState;

#[derive(Debug, Serialize)]
pub struct Health {
    pub ok: bool,
    pub model: String,
    pub has_credential: bool,
}

pub async fn health(State(state): State<AppState>) -> Json<Health> {
    let config = state.pipeline.config();
    Json(Health {
        ok: true,
        model: config.model.clone(),
        has_credential: config.has_credential(),
    })
}
