//! Health check endpoint

use axum::{Json, extract::State};
use chrono::{SecondsFormat, Utc};
use ans_directory::DirectoryStats;
use serde::{Deserialize, Serialize};

use crate::state::AppState;

/// Body of `GET /health`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    /// Always `healthy` when the server answers
    pub status: String,
    /// Current time, RFC 3339
    pub timestamp: String,
    /// Server version
    pub version: String,
    /// Number of registered agents
    pub agents: usize,
    /// Number of distinct providers
    pub providers: usize,
    /// Number of distinct capability names
    pub capabilities: usize,
    /// Seconds since startup
    pub uptime_secs: i64,
}

/// GET /health
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let stats = state.directory.stats().unwrap_or_else(|e| {
        tracing::warn!(error = %e, "directory stats unavailable");
        DirectoryStats::default()
    });

    Json(HealthResponse {
        status: "healthy".to_string(),
        timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        version: env!("CARGO_PKG_VERSION").to_string(),
        agents: stats.total_registrations(),
        providers: stats.unique_providers(),
        capabilities: stats.unique_capabilities(),
        uptime_secs: state.uptime_secs(),
    })
}
