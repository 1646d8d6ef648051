//! HTTP registry for the Agent Name Service.
//!
//! This crate serves an [`ans_directory::Directory`] over HTTP, behind a
//! bearer-token gateway.
//!
//! # Endpoints
//!
//! | Method & Path | Auth | Success |
//! |---------------|------|---------|
//! | `GET /health` | none | `{status, timestamp, version, agents, uptimeSecs}` |
//! | `GET /api/v1/ca` | none | `{certificate}` |
//! | `POST /api/v1/agents` | bearer | 201 `{message, ansName}` |
//! | `GET /api/v1/agents/{ansName}` | bearer | `{metadata}` |
//! | `GET /api/v1/agents?capability=&provider=` | bearer | `{agents}` |
//! | `DELETE /api/v1/agents/{ansName}` | bearer | `{message}` |
//! | `POST /api/v1/verify` | bearer | `{verified}` |
//! | `POST /api/v1/certificates` | bearer | `{certificate}` |
//!
//! Errors are always `{"error": message}` with 400 for rejected input, 401
//! for failed authentication, 404 for unknown agents and 500 otherwise.
//!
//! # Example
//!
//! ```rust,no_run
//! use ans_registry::{api, AppState, RegistryConfig};
//!
//! # async fn run() -> anyhow::Result<()> {
//! let config = RegistryConfig::new().with_port(3000);
//! let address = config.bind_address();
//! let state = AppState::from_config(config)?;
//!
//! let listener = tokio::net::TcpListener::bind(address).await?;
//! axum::serve(listener, api::create_router(state)).await?;
//! # Ok(())
//! # }
//! ```

#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod state;

pub use auth::{AuthenticatedCaller, require_auth};
pub use config::{ConfigError, RegistryConfig, StorageBackend};
pub use error::ApiError;
pub use state::AppState;
