//! Shared application state.

use std::sync::Arc;

use ans_directory::{Directory, InMemoryDirectory};
use ans_trust::{BearerVerifier, TrustAuthority};
use chrono::{DateTime, Utc};

use crate::config::{ConfigError, RegistryConfig};

/// State shared by every handler.
#[derive(Clone)]
pub struct AppState {
    /// The agent directory
    pub directory: Arc<dyn Directory>,
    /// Bearer token verifier
    pub verifier: Arc<BearerVerifier>,
    /// Effective configuration
    pub config: Arc<RegistryConfig>,
    /// When the server started
    pub started_at: DateTime<Utc>,
}

impl AppState {
    /// Builds state around an existing authority with an in-memory directory.
    #[must_use]
    pub fn new(config: RegistryConfig, authority: Arc<TrustAuthority>) -> Self {
        let directory = InMemoryDirectory::with_config(
            Arc::clone(&authority),
            config.directory_config(),
        );
        Self::with_directory(config, authority, Arc::new(directory))
    }

    /// Builds state around any directory implementation.
    #[must_use]
    pub fn with_directory(
        config: RegistryConfig,
        authority: Arc<TrustAuthority>,
        directory: Arc<dyn Directory>,
    ) -> Self {
        let verifier = BearerVerifier::new(authority, config.auth_mode);
        Self {
            directory,
            verifier: Arc::new(verifier),
            config: Arc::new(config),
            started_at: Utc::now(),
        }
    }

    /// Validates the configuration, loads or generates the CA and builds
    /// the state.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the configuration is invalid or the CA
    /// cannot be loaded.
    pub fn from_config(config: RegistryConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let authority = Arc::new(config.trust_authority()?);
        Ok(Self::new(config, authority))
    }

    /// Returns seconds since startup.
    #[must_use]
    pub fn uptime_secs(&self) -> i64 {
        (Utc::now() - self.started_at).num_seconds()
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("config", &self.config)
            .field("started_at", &self.started_at)
            .finish_non_exhaustive()
    }
}
