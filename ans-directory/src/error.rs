//! Custom error types for directory operations.

use std::fmt;

use ans_name::ParseError;
use ans_trust::TrustError;

/// Errors that can occur during directory operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DirectoryError {
    /// The agent name does not follow the naming grammar.
    InvalidName {
        /// The name that was rejected
        ans_name: String,
        /// Why it was rejected
        reason: String,
    },
    /// The certificate was not issued by the directory's authority.
    UntrustedCertificate {
        /// The agent name the certificate was presented for
        ans_name: String,
        /// Why the certificate was rejected
        reason: String,
    },
    /// The agent is not registered.
    NotFound {
        /// The agent name that was not found
        ans_name: String,
    },
    /// The directory holds the maximum number of registrations.
    CapacityExceeded {
        /// Maximum allowed registrations
        max: usize,
    },
    /// A public key could not be decoded.
    InvalidKey {
        /// Why the key was rejected
        reason: String,
    },
    /// The authority failed to issue a certificate.
    Issuance {
        /// Why issuance failed
        reason: String,
    },
    /// Internal error (should not happen in production).
    Internal {
        /// Error message
        message: String,
    },
}

/// Coarse classification of a [`DirectoryError`].
///
/// Transport layers map this to their own status codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorClass {
    /// The caller sent something the directory will not accept.
    InvalidRequest,
    /// The named agent does not exist.
    NotFound,
    /// A fault on the directory side.
    Internal,
}

impl fmt::Display for DirectoryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidName { ans_name, reason } => {
                write!(f, "invalid ANS name format '{ans_name}': {reason}")
            }
            Self::UntrustedCertificate { ans_name, reason } => {
                write!(f, "invalid certificate for agent '{ans_name}': {reason}")
            }
            Self::NotFound { ans_name } => {
                write!(f, "agent not found: {ans_name}")
            }
            Self::CapacityExceeded { max } => {
                write!(
                    f,
                    "directory has reached maximum capacity of {max} registrations"
                )
            }
            Self::InvalidKey { reason } => {
                write!(f, "invalid public key: {reason}")
            }
            Self::Issuance { reason } => {
                write!(f, "certificate issuance failed: {reason}")
            }
            Self::Internal { message } => {
                write!(f, "internal directory error: {message}")
            }
        }
    }
}

impl std::error::Error for DirectoryError {}

impl DirectoryError {
    /// Creates an `InvalidName` error from a parse failure.
    #[must_use]
    pub fn invalid_name(error: &ParseError) -> Self {
        Self::InvalidName {
            ans_name: error.input.clone(),
            reason: error.kind.to_string(),
        }
    }

    /// Creates an `UntrustedCertificate` error.
    #[must_use]
    pub fn untrusted(ans_name: impl Into<String>, error: &TrustError) -> Self {
        Self::UntrustedCertificate {
            ans_name: ans_name.into(),
            reason: error.to_string(),
        }
    }

    /// Creates a `NotFound` error.
    #[must_use]
    pub fn not_found(ans_name: impl Into<String>) -> Self {
        Self::NotFound {
            ans_name: ans_name.into(),
        }
    }

    /// Creates an `Internal` error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Returns true if this error indicates the agent was not found.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Classifies the error for transport layers.
    #[must_use]
    pub const fn status_class(&self) -> ErrorClass {
        match self {
            Self::InvalidName { .. }
            | Self::UntrustedCertificate { .. }
            | Self::CapacityExceeded { .. }
            | Self::InvalidKey { .. } => ErrorClass::InvalidRequest,
            Self::NotFound { .. } => ErrorClass::NotFound,
            Self::Issuance { .. } | Self::Internal { .. } => ErrorClass::Internal,
        }
    }
}

impl From<TrustError> for DirectoryError {
    fn from(error: TrustError) -> Self {
        match error {
            TrustError::InvalidKeyFormat { reason } => Self::InvalidKey { reason },
            other => Self::Issuance {
                reason: other.to_string(),
            },
        }
    }
}
