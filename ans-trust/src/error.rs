//! Error types for trust operations.

use std::fmt;

/// Errors that can occur while handling keys, certificates, proofs and tokens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrustError {
    /// Key material could not be decoded or encoded.
    InvalidKeyFormat {
        /// Description of the key error
        reason: String,
    },
    /// Certificate could not be decoded.
    InvalidCertificate {
        /// Description of the decoding error
        reason: String,
    },
    /// The private key does not belong to the certificate.
    KeyMismatch,
    /// Certificate could not be built or signed.
    CertificateGeneration {
        /// Description of the generation error
        reason: String,
    },
    /// Certificate was not issued by the trusted authority or is outside its validity window.
    UntrustedCertificate {
        /// Why the certificate is not trusted
        reason: String,
    },
    /// Token format is invalid.
    InvalidToken {
        /// Description of the format error
        reason: String,
    },
    /// Token has expired.
    TokenExpired {
        /// When the token expired
        expired_at: String,
    },
    /// Signature verification failed.
    InvalidSignature,
    /// Claims could not be parsed or have unexpected values.
    InvalidClaims {
        /// Description of the claims error
        reason: String,
    },
}

impl TrustError {
    pub(crate) fn key(reason: impl fmt::Display) -> Self {
        Self::InvalidKeyFormat {
            reason: reason.to_string(),
        }
    }

    pub(crate) fn certificate(reason: impl fmt::Display) -> Self {
        Self::InvalidCertificate {
            reason: reason.to_string(),
        }
    }

    pub(crate) fn generation(reason: impl fmt::Display) -> Self {
        Self::CertificateGeneration {
            reason: reason.to_string(),
        }
    }

    pub(crate) fn untrusted(reason: impl fmt::Display) -> Self {
        Self::UntrustedCertificate {
            reason: reason.to_string(),
        }
    }

    pub(crate) fn token(reason: impl fmt::Display) -> Self {
        Self::InvalidToken {
            reason: reason.to_string(),
        }
    }

    pub(crate) fn claims(reason: impl fmt::Display) -> Self {
        Self::InvalidClaims {
            reason: reason.to_string(),
        }
    }
}

impl fmt::Display for TrustError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidKeyFormat { reason } => write!(f, "invalid key format: {reason}"),
            Self::InvalidCertificate { reason } => write!(f, "invalid certificate: {reason}"),
            Self::KeyMismatch => {
                write!(f, "private key does not match the certificate public key")
            }
            Self::CertificateGeneration { reason } => {
                write!(f, "certificate generation failed: {reason}")
            }
            Self::UntrustedCertificate { reason } => {
                write!(f, "invalid certificate: {reason}")
            }
            Self::InvalidToken { reason } => write!(f, "invalid token format: {reason}"),
            Self::TokenExpired { expired_at } => {
                write!(f, "token expired at {expired_at}; request a new token")
            }
            Self::InvalidSignature => {
                write!(
                    f,
                    "signature verification failed; data may have been tampered with"
                )
            }
            Self::InvalidClaims { reason } => write!(f, "failed to parse claims: {reason}"),
        }
    }
}

impl std::error::Error for TrustError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn untrusted_certificate_reads_as_invalid_certificate() {
        let err = TrustError::untrusted("issuer mismatch");
        assert_eq!(err.to_string(), "invalid certificate: issuer mismatch");
    }

    #[test]
    fn helpers_capture_reason() {
        assert!(matches!(
            TrustError::key("bad pem"),
            TrustError::InvalidKeyFormat { reason } if reason == "bad pem"
        ));
        assert!(matches!(
            TrustError::token("no payload"),
            TrustError::InvalidToken { reason } if reason == "no payload"
        ));
    }
}
