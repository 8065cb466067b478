//! Liveness probe polled by clients to check the service is reachable,
//! served on both `/health` and `/docs`.

use crate::state::AppState;
use axum::{extract::State, Json};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Body of `GET /health`.
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Always `"ok"` while the process is serving.
    pub status: String,
    pub version: String,
    pub timestamp: DateTime<Utc>,
    pub uptime_seconds: i64,
}

impl HealthResponse {
    #[must_use]
    pub fn at(state: &AppState, now: DateTime<Utc>) -> Self {
        Self {
            status: "ok".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            timestamp: now,
            uptime_seconds: (now - state.started_at).num_seconds().max(0),
        }
    }
}

/// GET /health
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse::at(&state, Utc::now()))
}
