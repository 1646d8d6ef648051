//! Notifications published by the client.

use ans_directory::AgentMetadata;

/// Something the client did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientEvent {
    /// A registration was accepted by the registry.
    Registered {
        /// The registered name
        ans_name: String,
        /// Metadata that was sent
        metadata: AgentMetadata,
    },
    /// A registry operation failed.
    Error {
        /// Operation that failed, e.g. `register`
        operation: &'static str,
        /// Rendered error
        message: String,
    },
}
