//! Client configuration.

use std::time::Duration;

/// Configuration for [`AgentClient`](crate::AgentClient).
#[derive(Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Base URL of the registry, e.g. `http://localhost:3000`.
    pub registry_url: String,

    /// Expected CA certificate PEM.
    ///
    /// When set, certificates obtained through `enroll` must name this CA
    /// as their issuer.
    pub ca_cert: Option<String>,

    /// Agent certificate PEM. Used only together with `agent_key`.
    pub agent_cert: Option<String>,

    /// Agent private key PEM (PKCS#8). Used only together with `agent_cert`.
    pub agent_key: Option<String>,

    /// Bound on every registry call.
    ///
    /// Default: 5 seconds
    pub timeout: Duration,

    /// Send the private key inside registrations, for registries that
    /// still expect the field.
    ///
    /// Default: false
    pub include_private_key: bool,
}

impl ClientConfig {
    /// Default request timeout.
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

    /// Creates a configuration for the given registry.
    #[must_use]
    pub fn new(registry_url: impl Into<String>) -> Self {
        Self {
            registry_url: registry_url.into(),
            ca_cert: None,
            agent_cert: None,
            agent_key: None,
            timeout: Self::DEFAULT_TIMEOUT,
            include_private_key: false,
        }
    }

    /// Sets the expected CA certificate.
    #[must_use]
    pub fn with_ca_cert(mut self, pem: impl Into<String>) -> Self {
        self.ca_cert = Some(pem.into());
        self
    }

    /// Sets an existing identity.
    #[must_use]
    pub fn with_identity(mut self, cert_pem: impl Into<String>, key_pem: impl Into<String>) -> Self {
        self.agent_cert = Some(cert_pem.into());
        self.agent_key = Some(key_pem.into());
        self
    }

    /// Sets the request timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Enables or disables sending the private key in registrations.
    #[must_use]
    pub const fn with_private_key_upload(mut self, include: bool) -> Self {
        self.include_private_key = include;
        self
    }
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("registry_url", &self.registry_url)
            .field("ca_cert", &self.ca_cert.is_some())
            .field("agent_cert", &self.agent_cert.is_some())
            .field("agent_key", &self.agent_key.as_ref().map(|_| "[REDACTED]"))
            .field("timeout", &self.timeout)
            .field("include_private_key", &self.include_private_key)
            .finish()
    }
}
