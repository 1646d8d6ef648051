//! HTTP API for the registry.

pub mod agents;
pub mod certificates;
pub mod health;
pub mod verify;

use axum::{
    Router, middleware,
    routing::{get, post},
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::auth::require_auth;
use crate::state::AppState;

pub use agents::{AgentsResponse, DiscoverQuery, MessageResponse, RegisterResponse, ResolveResponse};
pub use certificates::{CertificateResponse, IssueCertificateRequest};
pub use health::HealthResponse;
pub use verify::{VerifyRequest, VerifyResponse};

/// Creates the API router.
///
/// `GET /health` and `GET /api/v1/ca` are public; every other route
/// requires a bearer token.
pub fn create_router(state: AppState) -> Router {
    let cors_enabled = state.config.cors_enabled;

    let public_routes = Router::new()
        .route("/health", get(health::health))
        .route("/api/v1/ca", get(certificates::ca_certificate));

    let protected_routes = Router::new()
        .route(
            "/api/v1/agents",
            post(agents::register_agent).get(agents::discover_agents),
        )
        .route(
            "/api/v1/agents/{ans_name}",
            get(agents::resolve_agent).delete(agents::remove_agent),
        )
        .route("/api/v1/verify", post(verify::verify_capability))
        .route("/api/v1/certificates", post(certificates::issue_certificate))
        .layer(middleware::from_fn_with_state(state.clone(), require_auth));

    let app = Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    if cors_enabled {
        app.layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
    } else {
        app
    }
}
