//! Certificate authority endpoints.

use axum::{
    Extension, Json,
    extract::{State, rejection::JsonRejection},
};
use serde::{Deserialize, Serialize};

use crate::auth::AuthenticatedCaller;
use crate::error::ApiError;
use crate::state::AppState;

/// A certificate PEM.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CertificateResponse {
    /// PEM-encoded X.509 certificate
    pub certificate: String,
}

/// Body of `POST /api/v1/certificates`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueCertificateRequest {
    /// Subject common name for the new certificate
    pub agent_name: String,
    /// Public key PEM to certify
    pub public_key: String,
}

/// GET /api/v1/ca
pub async fn ca_certificate(State(state): State<AppState>) -> Json<CertificateResponse> {
    Json(CertificateResponse {
        certificate: state.directory.ca_certificate(),
    })
}

/// POST /api/v1/certificates
pub async fn issue_certificate(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthenticatedCaller>,
    payload: Result<Json<IssueCertificateRequest>, JsonRejection>,
) -> Result<Json<CertificateResponse>, ApiError> {
    let Json(request) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;

    let certificate = state
        .directory
        .issue_certificate(&request.agent_name, &request.public_key)?;

    tracing::info!(
        agent_name = %request.agent_name,
        caller = %caller.common_name,
        "certificate issued"
    );
    Ok(Json(CertificateResponse { certificate }))
}
