//! GET /api/health

use std::sync::Arc;

use axum::extract::State;
use chrono::Local;
use serde::Serialize;

use crate::error::ApiOk;
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct HealthStatus {
    pub service: &'static str,
    pub time: String,
    pub database: &'static str,
}

/// Liveness probe. Always answers; `database` reports whether a trivial query
/// went through.
pub async fn health_check(State(state): State<Arc<AppState>>) -> ApiOk<HealthStatus> {
    let database = if state.db.health_check().await {
        "ok"
    } else {
        "unavailable"
    };

    ApiOk(HealthStatus {
        service: "Harbor HQ API",
        time: Local::now().to_rfc3339(),
        database,
    })
}
