mod critique;
mod health;
mod samples;

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;

use samplecritic_critic::CritiquePipeline;
use samplecritic_samples::SampleStore;

#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<CritiquePipeline>,
    pub store: Arc<SampleStore>,
    pub body_limit: usize,
}

/// Largest critique body accepted. Oversized fields inside it are cut to
/// their prompt budgets, so this only bounds memory per request.
pub const MAX_BODY_BYTES: usize = 16 * 1024 * 1024;

pub fn create_router(pipeline: Arc<CritiquePipeline>, store: Arc<SampleStore>) -> Router {
    create_router_with_body_limit(pipeline, store, MAX_BODY_BYTES)
}

fn create_router_with_body_limit(
    pipeline: Arc<CritiquePipeline>,
    store: Arc<SampleStore>,
    body_limit: usize,
) -> Router {
    let state = AppState {
        pipeline,
        store,
        body_limit,
    };

    Router::new()
        .route(
            "/api/critique",
            post(critique::critique).layer(DefaultBodyLimit::max(body_limit)),
        )
        .route("/api/samples", get(samples::list_samples))
        .route("/api/samples/{id}", get(samples::get_sample))
        .route("/api/health", get(health::health))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
