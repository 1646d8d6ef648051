//! Directory trait definition for capability-based agent discovery.

use ans_name::AnsName;

use crate::{AgentMetadata, AgentRegistration, DirectoryError, DirectoryStats};

/// Abstract directory operations.
///
/// This trait defines the interface the registry serves. Implementations
/// may be in-memory (for a single node and for tests) or backed by an
/// external store.
///
/// # Async Considerations
///
/// This trait uses synchronous methods because the in-memory
/// implementation never blocks for long. Implementations backed by a
/// network store should wrap themselves in a runtime-specific async layer.
pub trait Directory: Send + Sync {
    /// Registers an agent, overwriting any record under the same name.
    ///
    /// The name must follow the naming grammar and the certificate must have
    /// been issued by the directory's authority.
    ///
    /// # Returns
    ///
    /// The parsed agent name.
    ///
    /// # Errors
    ///
    /// Returns `DirectoryError` if:
    /// - The name is malformed (`InvalidName`)
    /// - The certificate is not trusted (`UntrustedCertificate`)
    /// - The directory is full and the name is new (`CapacityExceeded`)
    fn register(&self, registration: AgentRegistration) -> Result<AnsName, DirectoryError>;

    /// Returns the metadata stored under `ans_name`.
    ///
    /// # Errors
    ///
    /// Returns `DirectoryError::NotFound` if nothing is registered under the
    /// exact name.
    fn resolve(&self, ans_name: &str) -> Result<AgentMetadata, DirectoryError>;

    /// Finds agents that declare `capability`, optionally from one provider.
    ///
    /// Both filters match exactly. Results follow registration order and may
    /// be empty.
    ///
    /// # Errors
    ///
    /// Returns `DirectoryError` if an internal error occurs.
    fn discover(
        &self,
        capability: &str,
        provider: Option<&str>,
    ) -> Result<Vec<AgentMetadata>, DirectoryError>;

    /// Checks a capability proof against the stored public key.
    ///
    /// Returns `false` if the agent does not declare the capability or the
    /// proof does not verify.
    ///
    /// # Errors
    ///
    /// Returns `DirectoryError::NotFound` if the agent is not registered.
    fn verify_capability(
        &self,
        ans_name: &str,
        capability: &str,
        proof: &str,
    ) -> Result<bool, DirectoryError>;

    /// Returns every registered agent in registration order.
    ///
    /// # Errors
    ///
    /// Returns `DirectoryError` if an internal error occurs.
    fn list_agents(&self) -> Result<Vec<AgentMetadata>, DirectoryError>;

    /// Removes a registration. Returns true if one existed.
    ///
    /// # Errors
    ///
    /// Returns `DirectoryError` if an internal error occurs.
    fn remove(&self, ans_name: &str) -> Result<bool, DirectoryError>;

    /// Issues a certificate for `agent_name` over the given public key.
    ///
    /// # Errors
    ///
    /// Returns `DirectoryError::InvalidKey` if the key cannot be decoded, or
    /// `DirectoryError::Issuance` if signing fails.
    fn issue_certificate(
        &self,
        agent_name: &str,
        public_key_pem: &str,
    ) -> Result<String, DirectoryError>;

    /// Returns counts describing the current contents.
    ///
    /// # Errors
    ///
    /// Returns `DirectoryError` if an internal error occurs.
    fn stats(&self) -> Result<DirectoryStats, DirectoryError>;

    /// Returns the authority's certificate PEM.
    fn ca_certificate(&self) -> String;
}
