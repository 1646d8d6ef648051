//! Change notifications published by the directory.

use serde::{Deserialize, Serialize};

use crate::AgentMetadata;

/// Something that changed in the directory.
///
/// Delivered through a bounded broadcast channel. A receiver that falls
/// behind gets `RecvError::Lagged` and skips ahead; publishing never waits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum DirectoryEvent {
    /// A name was registered or overwritten.
    #[serde(rename_all = "camelCase")]
    Registered {
        /// The registered name
        ans_name: String,
        /// Metadata as stored
        metadata: AgentMetadata,
    },
    /// A name was removed.
    #[serde(rename_all = "camelCase")]
    Removed {
        /// The removed name
        ans_name: String,
    },
}

impl DirectoryEvent {
    /// Returns the name the event is about.
    #[must_use]
    pub fn ans_name(&self) -> &str {
        match self {
            Self::Registered { ans_name, .. } | Self::Removed { ans_name } => ans_name,
        }
    }
}
