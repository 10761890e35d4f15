//! Health check endpoints

use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use serde::Serialize;

use crate::state::AppState;

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    service: &'static str,
    version: &'static str,
}

#[derive(Serialize)]
struct ReadyResponse {
    status: &'static str,
    database: DatabaseReadiness,
}

#[derive(Serialize)]
struct DatabaseReadiness {
    dialect: String,
    healthy: bool,
    response_time_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
}

/// Liveness: the process is up, dependencies are not consulted.
async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        service: "products-api",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Readiness: 503 until the database answers `SELECT 1`.
async fn ready(State(state): State<AppState>) -> (StatusCode, Json<ReadyResponse>) {
    let probe = state.backend.health().await;
    if !probe.healthy {
        tracing::warn!(error = ?probe.message, "readiness check failed");
    }

    let status = if probe.healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let body = ReadyResponse {
        status: if probe.healthy { "ready" } else { "not ready" },
        database: DatabaseReadiness {
            dialect: state.config.database.dialect().to_string(),
            healthy: probe.healthy,
            response_time_ms: probe.response_time_ms,
            message: probe.message,
        },
    };
    (status, Json(body))
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/ready", get(ready))
        .with_state(state)
}
