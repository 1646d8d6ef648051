//! Agent-side client for the Agent Name Service registry.
//!
//! [`AgentClient`] wraps the registry's HTTP API. It holds the agent's key
//! pair and certificate and signs a fresh bearer token for every call.
//!
//! # Lifecycle
//!
//! 1. [`AgentClient::new`] loads or generates an identity. A generated one
//!    is self-signed, which the registry will not accept for registration.
//! 2. [`AgentClient::enroll`] has the registry CA certify the agent's key.
//! 3. [`AgentClient::register_agent`] publishes metadata under a name built
//!    from it.
//! 4. Other agents resolve, discover and verify it.
//!
//! # Naming
//!
//! `register_agent("model1", metadata)` registers under
//! `a2a://model1.<capability>.<provider>.v<version>[.<environment>]`, where
//! `<capability>` is the first declared capability or `general`. The
//! string is joined as is, so a dotted version such as `2.1.0` is kept
//! verbatim and parses as version `2` with the rest in the extension.
//!
//! # Errors
//!
//! Every operation but [`AgentClient::verify_capability`] returns
//! [`ClientError::Operation`] naming what failed. `verify_capability`
//! answers false on any failure.

#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

mod client;
mod config;
mod error;
mod events;

pub use client::{AgentClient, SELF_SIGNED_COMMON_NAME};
pub use config::ClientConfig;
pub use error::ClientError;
pub use events::ClientEvent;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::{AgentClient, ClientConfig, ClientError, ClientEvent};
}
