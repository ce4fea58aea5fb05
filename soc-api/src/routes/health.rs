//! Health probes
//!
//! `ping` and `live` never touch the study database. `ready` opens it and
//! runs one trivial query; the server answers 503 until that succeeds.

use axum::{extract::State, http::StatusCode, response::IntoResponse, routing::get, Json, Router};
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::state::AppState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Unhealthy,
}

impl HealthStatus {
    fn status_code(self) -> StatusCode {
        match self {
            HealthStatus::Healthy => StatusCode::OK,
            HealthStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

/// Body of `/health/live` and `/health/ready`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthReport {
    pub status: HealthStatus,
    pub version: String,
    pub uptime_seconds: u64,
    /// Only filled by the readiness probe.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub database: Option<DatabaseCheck>,
}

/// Outcome of opening and querying the study database once.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseCheck {
    pub status: HealthStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latency_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl DatabaseCheck {
    async fn run(state: &AppState) -> Self {
        let started = Instant::now();
        let store = state.store.clone();

        let failure = match tokio::task::spawn_blocking(move || store.ping()).await {
            Ok(Ok(())) => {
                return Self {
                    status: HealthStatus::Healthy,
                    latency_ms: Some(started.elapsed().as_millis() as u64),
                    error: None,
                }
            }
            Ok(Err(err)) => err.to_string(),
            Err(err) => format!("Database check did not complete: {}", err),
        };

        tracing::warn!(error = %failure, "Readiness check failed");
        Self {
            status: HealthStatus::Unhealthy,
            latency_ms: None,
            error: Some(failure),
        }
    }
}

fn report(state: &AppState, database: Option<DatabaseCheck>) -> HealthReport {
    HealthReport {
        status: database
            .as_ref()
            .map_or(HealthStatus::Healthy, |check| check.status),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
        database,
    }
}

/// GET /health/ping
pub async fn ping() -> &'static str {
    "pong"
}

/// GET /health/live
pub async fn liveness(State(state): State<AppState>) -> Json<HealthReport> {
    Json(report(&state, None))
}

/// GET /health/ready
pub async fn readiness(State(state): State<AppState>) -> impl IntoResponse {
    let check = DatabaseCheck::run(&state).await;
    let body = report(&state, Some(check));
    (body.status.status_code(), Json(body))
}

/// Probe routes, nested under `/health`.
pub fn create_router() -> Router<AppState> {
    Router::new()
        .route("/ping", get(ping))
        .route("/live", get(liveness))
        .route("/ready", get(readiness))
}
