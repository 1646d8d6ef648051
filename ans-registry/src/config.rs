//! Registry configuration.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use ans_directory::DirectoryConfig;
use ans_trust::{GatewayTrust, TrustAuthority, TrustError};
use serde::{Deserialize, Serialize};

/// Errors raised while loading or validating configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A file could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        /// The file that failed
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },
    /// The configuration file is not valid TOML for this schema.
    #[error("invalid configuration file: {0}")]
    Parse(#[from] toml::de::Error),
    /// The configuration is inconsistent.
    #[error("invalid configuration: {0}")]
    Invalid(String),
    /// CA material could not be loaded or generated.
    #[error("certificate authority: {0}")]
    Trust(#[from] TrustError),
}

/// Storage backend for the directory.
///
/// Only `memory` is implemented; the others are accepted by the parser so
/// that configuration files written for them fail validation with a clear
/// message.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// In-process, non-persistent
    #[default]
    Memory,
    /// etcd cluster
    Etcd,
    /// Redis server
    Redis,
}

impl fmt::Display for StorageBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Memory => "memory",
            Self::Etcd => "etcd",
            Self::Redis => "redis",
        })
    }
}

impl FromStr for StorageBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "memory" => Ok(Self::Memory),
            "etcd" => Ok(Self::Etcd),
            "redis" => Ok(Self::Redis),
            other => Err(format!(
                "unknown storage backend '{other}'; expected memory, etcd or redis"
            )),
        }
    }
}

/// Registry server configuration.
///
/// Loaded from a TOML file, then overridden by command line flags and
/// `ANS_*` environment variables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// Interface to bind.
    ///
    /// Default: `0.0.0.0`
    pub host: String,

    /// Port to bind.
    ///
    /// Default: 3000
    pub port: u16,

    /// Directory storage backend.
    ///
    /// Default: memory
    pub storage: StorageBackend,

    /// CA certificate PEM file. Must be set together with `ca_key_path`.
    ///
    /// When both are absent a fresh CA is generated at startup.
    pub ca_cert_path: Option<PathBuf>,

    /// CA private key PEM file (PKCS#8).
    pub ca_key_path: Option<PathBuf>,

    /// How bearer-token certificates are trusted.
    ///
    /// Default: proof-of-possession
    pub auth_mode: GatewayTrust,

    /// Whether to answer cross-origin requests.
    ///
    /// Default: true
    pub cors_enabled: bool,

    /// Maximum number of registrations. None means unlimited.
    pub max_registrations: Option<usize>,

    /// Log level used when `RUST_LOG` is not set.
    ///
    /// Default: info
    pub log_level: String,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            storage: StorageBackend::default(),
            ca_cert_path: None,
            ca_key_path: None,
            auth_mode: GatewayTrust::default(),
            cors_enabled: true,
            max_registrations: None,
            log_level: "info".to_string(),
        }
    }
}

impl RegistryConfig {
    /// Creates a configuration with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Io` if the file cannot be read, or
    /// `ConfigError::Parse` if it is not valid.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Parses configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Parse` if the text is not valid.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Sets the bind host.
    #[must_use]
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    /// Sets the bind port.
    #[must_use]
    pub const fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Sets the storage backend.
    #[must_use]
    pub const fn with_storage(mut self, storage: StorageBackend) -> Self {
        self.storage = storage;
        self
    }

    /// Sets the CA certificate and key files.
    #[must_use]
    pub fn with_ca_files(mut self, cert: impl Into<PathBuf>, key: impl Into<PathBuf>) -> Self {
        self.ca_cert_path = Some(cert.into());
        self.ca_key_path = Some(key.into());
        self
    }

    /// Sets the gateway trust mode.
    #[must_use]
    pub const fn with_auth_mode(mut self, mode: GatewayTrust) -> Self {
        self.auth_mode = mode;
        self
    }

    /// Enables or disables CORS.
    #[must_use]
    pub const fn with_cors(mut self, enabled: bool) -> Self {
        self.cors_enabled = enabled;
        self
    }

    /// Limits the number of registrations.
    #[must_use]
    pub const fn with_max_registrations(mut self, max: usize) -> Self {
        self.max_registrations = Some(max);
        self
    }

    /// Returns `host:port`, bracketing IPv6 hosts.
    #[must_use]
    pub fn bind_address(&self) -> String {
        let host = self.host.trim().trim_start_matches('[').trim_end_matches(']');
        if host.contains(':') {
            format!("[{host}]:{}", self.port)
        } else {
            format!("{host}:{}", self.port)
        }
    }

    /// Checks the configuration for settings that cannot be served.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` for an unimplemented storage backend,
    /// or when only one of the CA files is given.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.storage != StorageBackend::Memory {
            return Err(ConfigError::Invalid(format!(
                "storage backend '{}' is not available; use 'memory'",
                self.storage
            )));
        }
        if self.ca_cert_path.is_some() != self.ca_key_path.is_some() {
            return Err(ConfigError::Invalid(
                "ca_cert_path and ca_key_path must be set together".to_string(),
            ));
        }
        if self.max_registrations == Some(0) {
            return Err(ConfigError::Invalid(
                "max_registrations must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Returns the directory settings derived from this configuration.
    #[must_use]
    pub fn directory_config(&self) -> DirectoryConfig {
        match self.max_registrations {
            Some(max) => DirectoryConfig::new().with_max_registrations(max),
            None => DirectoryConfig::new(),
        }
    }

    /// Loads the CA from the configured files, or generates one.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Io` if a file cannot be read, or
    /// `ConfigError::Trust` if the material is invalid.
    pub fn trust_authority(&self) -> Result<TrustAuthority, ConfigError> {
        match (&self.ca_cert_path, &self.ca_key_path) {
            (Some(cert_path), Some(key_path)) => {
                let cert = read_pem(cert_path)?;
                let key = read_pem(key_path)?;
                let authority = TrustAuthority::from_pem(&cert, &key)?;
                tracing::info!(path = %cert_path.display(), "loaded certificate authority");
                Ok(authority)
            }
            (None, None) => {
                let authority = TrustAuthority::generate()?;
                tracing::info!("generated ephemeral certificate authority");
                Ok(authority)
            }
            _ => Err(ConfigError::Invalid(
                "ca_cert_path and ca_key_path must be set together".to_string(),
            )),
        }
    }
}

fn read_pem(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = RegistryConfig::default();
        assert_eq!(config.bind_address(), "0.0.0.0:3000");
        assert_eq!(config.storage, StorageBackend::Memory);
        assert_eq!(config.auth_mode, GatewayTrust::ProofOfPossession);
        assert!(config.cors_enabled);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn builder_pattern() {
        let config = RegistryConfig::new()
            .with_host("127.0.0.1")
            .with_port(8080)
            .with_auth_mode(GatewayTrust::CaRooted)
            .with_cors(false)
            .with_max_registrations(5);

        assert_eq!(config.bind_address(), "127.0.0.1:8080");
        assert_eq!(config.auth_mode, GatewayTrust::CaRooted);
        assert!(!config.cors_enabled);
        assert_eq!(config.directory_config().max_registrations, Some(5));
    }

    #[test]
    fn parse_toml() {
        let config = RegistryConfig::from_toml(
            r#"
            host = "127.0.0.1"
            port = 4000
            storage = "memory"
            auth_mode = "ca-rooted"
            cors_enabled = false
            max_registrations = 100
            "#,
        )
        .unwrap();

        assert_eq!(config.port, 4000);
        assert_eq!(config.auth_mode, GatewayTrust::CaRooted);
        assert_eq!(config.max_registrations, Some(100));
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn unknown_storage_fails_to_parse() {
        assert!(matches!(
            RegistryConfig::from_toml(r#"storage = "sqlite""#),
            Err(ConfigError::Parse(_))
        ));
        assert!("sqlite".parse::<StorageBackend>().is_err());
        assert_eq!("redis".parse::<StorageBackend>(), Ok(StorageBackend::Redis));
    }

    #[test]
    fn unimplemented_storage_fails_validation() {
        let config = RegistryConfig::new().with_storage(StorageBackend::Etcd);
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("etcd"));
    }

    #[test]
    fn lone_ca_file_fails_validation() {
        let config = RegistryConfig {
            ca_cert_path: Some(PathBuf::from("ca.pem")),
            ..RegistryConfig::default()
        };
        assert!(config.validate().is_err());
        assert!(config.trust_authority().is_err());
    }

    #[test]
    fn ipv6_bind_address_is_bracketed() {
        assert_eq!(RegistryConfig::new().with_host("::1").bind_address(), "[::1]:3000");
    }

    #[test]
    fn authority_round_trips_through_files() {
        let dir = tempfile::tempdir().unwrap();
        let original = TrustAuthority::generate().unwrap();
        let cert_path = dir.path().join("ca.pem");
        let key_path = dir.path().join("ca.key");
        std::fs::write(&cert_path, original.ca_certificate_pem()).unwrap();
        std::fs::write(&key_path, original.private_key_pem().unwrap()).unwrap();

        let loaded = RegistryConfig::new()
            .with_ca_files(&cert_path, &key_path)
            .trust_authority()
            .unwrap();

        assert_eq!(loaded.ca_certificate_pem(), original.ca_certificate_pem());
    }

    #[test]
    fn missing_ca_file_is_io_error() {
        let err = RegistryConfig::new()
            .with_ca_files("/nonexistent/ca.pem", "/nonexistent/ca.key")
            .trust_authority()
            .unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
