//! Capability-based agent directory for the Agent Name Service.
//!
//! This crate holds the registry's state and rules. It includes:
//!
//! - **Data model**: [`AgentMetadata`], [`AgentCapability`], [`AgentEndpoint`]
//!   and [`AgentRegistration`], all camelCase JSON on the wire
//! - **Trait interface**: [`Directory`] for abstracting the store
//! - **In-memory store**: [`InMemoryDirectory`], insertion ordered
//! - **Change events**: [`DirectoryEvent`] over a tokio broadcast channel
//!
//! # Overview
//!
//! Agents register under a name such as
//! `a2a://model1.ml-inference.acme.v1.prod`. The directory accepts a
//! registration only if the name parses and the certificate was issued by
//! its [`TrustAuthority`](ans_trust::TrustAuthority). Callers then resolve
//! by exact name or discover by capability and provider.
//!
//! # Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use ans_directory::prelude::*;
//! use ans_trust::{CapabilityProof, KeyPair, TrustAuthority};
//!
//! let authority = Arc::new(TrustAuthority::generate().unwrap());
//! let directory = InMemoryDirectory::new(Arc::clone(&authority));
//!
//! // The agent obtains a certificate and registers
//! let key_pair = KeyPair::generate();
//! let public_key = key_pair.public_key_pem().unwrap();
//! let name = "a2a://model1.ml-inference.acme.v1.prod";
//! let certificate = authority.issue_certificate(name, &public_key).unwrap();
//! let metadata = AgentMetadata::new("Model 1", "1", "acme")
//!     .with_capability(AgentCapability::new("ml-inference", "1.0"))
//!     .with_environment("prod");
//! directory
//!     .register(AgentRegistration::new(name, metadata, certificate, public_key))
//!     .unwrap();
//!
//! // Anyone can discover it and check a capability proof
//! let found = directory.discover("ml-inference", Some("acme")).unwrap();
//! assert_eq!(found.len(), 1);
//!
//! let proof = CapabilityProof::generate("ml-inference", &key_pair).unwrap();
//! assert!(directory.verify_capability(name, "ml-inference", &proof).unwrap());
//! ```
//!
//! # Matching Rules
//!
//! | Operation | Rule |
//! |-----------|------|
//! | `resolve` | Exact name string, no normalisation |
//! | `discover` | Exact capability name, then exact provider if given |
//! | Ordering | Registration order; overwriting keeps the position |
//!
//! Registrations never expire; they leave only through `remove`.

#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

mod config;
mod endpoint;
mod error;
mod events;
mod memory;
mod metadata;
mod registration;
mod stats;
mod traits;

pub use config::DirectoryConfig;
pub use endpoint::AgentEndpoint;
pub use error::{DirectoryError, ErrorClass};
pub use events::DirectoryEvent;
pub use memory::InMemoryDirectory;
pub use metadata::{AgentCapability, AgentMetadata};
pub use registration::AgentRegistration;
pub use stats::DirectoryStats;
pub use traits::Directory;

/// A prelude module for convenient imports.
///
/// # Example
///
/// ```rust
/// use ans_directory::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        AgentCapability, AgentEndpoint, AgentMetadata, AgentRegistration, Directory,
        DirectoryConfig, DirectoryError, DirectoryEvent, InMemoryDirectory,
    };
}
