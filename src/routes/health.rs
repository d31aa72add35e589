//! Health check endpoint

use axum::{extract::State, routing::get, Json, Router};
use serde::{Deserialize, Serialize};

use crate::parser::PoolStats;
use crate::state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub backend: &'static str,
    pub pool: PoolStats,
}

/// Deserializable mirror used by clients and tests
#[derive(Debug, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    pub version: String,
    pub backend: String,
}

pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}

async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let parser = state.parser();
    Json(HealthResponse {
        status: if parser.is_running() { "healthy" } else { "stopping" },
        version: env!("CARGO_PKG_VERSION"),
        backend: parser.backend_name(),
        pool: parser.pool_stats(),
    })
}
