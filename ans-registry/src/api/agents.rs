//! Agent registration, lookup and removal endpoints.

use axum::{
    Extension, Json,
    extract::{Path, Query, State, rejection::JsonRejection},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};

use ans_directory::{AgentMetadata, AgentRegistration};

use crate::auth::AuthenticatedCaller;
use crate::error::ApiError;
use crate::state::AppState;

/// Body of a successful registration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterResponse {
    /// Human-readable confirmation
    pub message: String,
    /// The registered name, as submitted
    pub ans_name: String,
}

/// Body of `GET /api/v1/agents/{ans_name}`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolveResponse {
    /// The agent's metadata
    pub metadata: AgentMetadata,
}

/// Body of `GET /api/v1/agents`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentsResponse {
    /// Matching agents in registration order
    pub agents: Vec<AgentMetadata>,
}

/// Body of a successful removal.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageResponse {
    /// Human-readable confirmation
    pub message: String,
}

/// Query string of `GET /api/v1/agents`.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct DiscoverQuery {
    /// Capability to match; empty or absent lists every agent
    pub capability: Option<String>,
    /// Provider to match; empty or absent matches any provider
    pub provider: Option<String>,
}

/// POST /api/v1/agents
pub async fn register_agent(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthenticatedCaller>,
    payload: Result<Json<AgentRegistration>, JsonRejection>,
) -> Result<(StatusCode, Json<RegisterResponse>), ApiError> {
    let Json(registration) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let ans_name = registration.ans_name.clone();

    state.directory.register(registration)?;

    tracing::info!(ans_name = %ans_name, caller = %caller.common_name, "registration accepted");
    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            message: "Agent registered successfully".to_string(),
            ans_name,
        }),
    ))
}

/// GET /api/v1/agents/{ans_name}
pub async fn resolve_agent(
    State(state): State<AppState>,
    Path(ans_name): Path<String>,
) -> Result<Json<ResolveResponse>, ApiError> {
    let metadata = state.directory.resolve(&ans_name)?;
    Ok(Json(ResolveResponse { metadata }))
}

/// GET /api/v1/agents?capability=&provider=
pub async fn discover_agents(
    State(state): State<AppState>,
    Query(query): Query<DiscoverQuery>,
) -> Result<Json<AgentsResponse>, ApiError> {
    let capability = query.capability.filter(|c| !c.is_empty());
    let provider = query.provider.filter(|p| !p.is_empty());

    let agents = match capability {
        Some(capability) => state
            .directory
            .discover(&capability, provider.as_deref())?,
        None => state.directory.list_agents()?,
    };

    Ok(Json(AgentsResponse { agents }))
}

/// DELETE /api/v1/agents/{ans_name}
pub async fn remove_agent(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthenticatedCaller>,
    Path(ans_name): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    if !state.directory.remove(&ans_name)? {
        return Err(ApiError::agent_not_found());
    }

    tracing::info!(ans_name = %ans_name, caller = %caller.common_name, "registration removed");
    Ok(Json(MessageResponse {
        message: "Agent removed successfully".to_string(),
    }))
}
