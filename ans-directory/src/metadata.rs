//! Agent metadata carried by registrations.

use serde::{Deserialize, Serialize};

use crate::AgentEndpoint;

/// A capability an agent declares.
///
/// `permissions` is a set in meaning but is kept as submitted, duplicates
/// and order included.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentCapability {
    /// Capability name, matched exactly by discovery
    pub name: String,
    /// Capability version
    pub version: String,
    /// Free-form description
    #[serde(default)]
    pub description: String,
    /// Permissions the capability needs
    #[serde(default)]
    pub permissions: Vec<String>,
}

impl AgentCapability {
    /// Creates a capability with no description or permissions.
    #[must_use]
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            description: String::new(),
            permissions: Vec::new(),
        }
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Adds a permission.
    #[must_use]
    pub fn with_permission(mut self, permission: impl Into<String>) -> Self {
        self.permissions.push(permission.into());
        self
    }
}

/// Descriptive record of an agent.
///
/// # Examples
///
/// ```
/// use ans_directory::{AgentCapability, AgentMetadata};
///
/// let metadata = AgentMetadata::new("Model 1", "1", "acme")
///     .with_capability(AgentCapability::new("ml-inference", "1.0"))
///     .with_environment("prod");
///
/// assert!(metadata.has_capability("ml-inference"));
/// assert_eq!(metadata.primary_capability().unwrap().name, "ml-inference");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentMetadata {
    /// Display name
    pub name: String,
    /// Agent version
    pub version: String,
    /// Declared capabilities, first one is primary
    #[serde(default)]
    pub capabilities: Vec<AgentCapability>,
    /// Provider, matched exactly by discovery
    pub provider: String,
    /// Where the agent can be reached
    #[serde(default)]
    pub endpoints: Vec<AgentEndpoint>,
    /// Deployment environment, e.g. `prod`
    #[serde(default)]
    pub environment: String,
    /// Opaque clearance level
    #[serde(default)]
    pub security_clearance: i64,
    /// Certificate PEM, if the agent chose to publish it here
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub certificate: Option<String>,
    /// Public key PEM, if the agent chose to publish it here
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_key: Option<String>,
}

impl AgentMetadata {
    /// Creates metadata with no capabilities or endpoints.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        version: impl Into<String>,
        provider: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            capabilities: Vec::new(),
            provider: provider.into(),
            endpoints: Vec::new(),
            environment: String::new(),
            security_clearance: 0,
            certificate: None,
            public_key: None,
        }
    }

    /// Adds a capability.
    #[must_use]
    pub fn with_capability(mut self, capability: AgentCapability) -> Self {
        self.capabilities.push(capability);
        self
    }

    /// Adds an endpoint.
    #[must_use]
    pub fn with_endpoint(mut self, endpoint: AgentEndpoint) -> Self {
        self.endpoints.push(endpoint);
        self
    }

    /// Sets the environment.
    #[must_use]
    pub fn with_environment(mut self, environment: impl Into<String>) -> Self {
        self.environment = environment.into();
        self
    }

    /// Sets the security clearance.
    #[must_use]
    pub const fn with_security_clearance(mut self, clearance: i64) -> Self {
        self.security_clearance = clearance;
        self
    }

    /// Returns true if a capability with exactly this name is declared.
    #[must_use]
    pub fn has_capability(&self, name: &str) -> bool {
        self.capabilities.iter().any(|c| c.name == name)
    }

    /// Returns the first declared capability.
    #[must_use]
    pub fn primary_capability(&self) -> Option<&AgentCapability> {
        self.capabilities.first()
    }
}
