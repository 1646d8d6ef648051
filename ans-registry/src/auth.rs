//! Bearer token authentication middleware.

use axum::{
    body::Body,
    extract::State,
    http::{Request, header},
    middleware::Next,
    response::Response,
};

use crate::error::ApiError;
use crate::state::AppState;

/// Message for a missing or non-Bearer `Authorization` header.
pub const MISSING_AUTHORIZATION: &str = "Missing or invalid authorization header";

/// Message for a token that fails verification.
pub const INVALID_TOKEN: &str = "Invalid token";

/// The verified caller, placed in request extensions by [`require_auth`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthenticatedCaller {
    /// Subject common name of the caller's certificate
    pub common_name: String,
}

/// Extracts the token from a `Bearer` authorization header.
///
/// The scheme is matched case-insensitively.
fn extract_bearer_token(req: &Request<Body>) -> Option<&str> {
    let auth_header = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())?;

    let (scheme, token) = auth_header.split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("Bearer") && !token.is_empty()).then_some(token)
}

/// Middleware that verifies the bearer token and records the caller.
///
/// Returns 401 with `{error}` if the header is missing, uses another
/// scheme, or carries a token the verifier rejects.
///
/// # Errors
///
/// Returns `ApiError::Unauthorized` on any authentication failure.
pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_bearer_token(&req)
        .ok_or_else(|| ApiError::Unauthorized(MISSING_AUTHORIZATION.to_string()))?;

    let agent = state.verifier.verify(token).map_err(|e| {
        tracing::debug!(error = %e, "bearer token rejected");
        ApiError::Unauthorized(INVALID_TOKEN.to_string())
    })?;

    let caller = AuthenticatedCaller {
        common_name: agent.common_name().to_string(),
    };
    tracing::debug!(
        caller = %caller.common_name,
        method = %req.method(),
        path = %req.uri().path(),
        "authenticated request"
    );
    req.extensions_mut().insert(caller);

    Ok(next.run(req).await)
}
