//! Bearer token claims.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::TrustError;

/// Issuer claim carried by every bearer token.
pub const TOKEN_ISSUER: &str = "ans-client";

/// Default bearer token lifetime.
pub const DEFAULT_TOKEN_TTL: Duration = Duration::from_secs(3600);

/// Claims embedded in a bearer token.
///
/// The subject is the caller's certificate in PEM form; the token signature
/// proves possession of the matching private key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BearerClaims {
    /// Issuer, always [`TOKEN_ISSUER`]
    pub iss: String,
    /// The caller's certificate as PEM
    pub sub: String,
    /// When the token was issued
    pub iat: DateTime<Utc>,
    /// When the token expires
    pub exp: DateTime<Utc>,
}

impl BearerClaims {
    /// Creates claims for `certificate_pem` valid for `ttl` from now.
    ///
    /// # Errors
    ///
    /// Returns `TrustError::InvalidClaims` if `ttl` is out of range.
    pub fn new(certificate_pem: impl Into<String>, ttl: Duration) -> Result<Self, TrustError> {
        let now = Utc::now();
        let exp = now
            + chrono::Duration::from_std(ttl)
                .map_err(|_| TrustError::claims("token lifetime out of range"))?;

        Ok(Self {
            iss: TOKEN_ISSUER.to_string(),
            sub: certificate_pem.into(),
            iat: now,
            exp,
        })
    }

    /// Returns true if the claims have expired.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        Utc::now() >= self.exp
    }
}
