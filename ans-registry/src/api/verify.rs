//! Capability verification endpoint.

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::state::AppState;

/// Body of `POST /api/v1/verify`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyRequest {
    /// Agent whose key should have signed the proof
    pub ans_name: String,
    /// Capability being claimed
    pub capability: String,
    /// Capability proof token
    pub proof: String,
}

/// Result of a verification.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifyResponse {
    /// Whether the proof checked out
    pub verified: bool,
}

/// POST /api/v1/verify
pub async fn verify_capability(
    State(state): State<AppState>,
    payload: Result<Json<VerifyRequest>, JsonRejection>,
) -> Result<Json<VerifyResponse>, ApiError> {
    let Json(request) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;

    let verified = state.directory.verify_capability(
        &request.ans_name,
        &request.capability,
        &request.proof,
    )?;

    tracing::debug!(
        ans_name = %request.ans_name,
        capability = %request.capability,
        verified,
        "capability verification"
    );
    Ok(Json(VerifyResponse { verified }))
}
