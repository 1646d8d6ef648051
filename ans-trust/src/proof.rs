//! Capability proofs.
//!
//! A capability proof shows that the holder of a key vouches for a
//! capability name. The proof is the base64 encoding of a JSON object:
//!
//! ```text
//! { "capability": "...", "timestamp": 1700000000000, "nonce": "<uuid v4>", "signature": "<base64>" }
//! ```
//!
//! The signature covers only the SHA-256 digest of the capability name.
//! `timestamp` and `nonce` travel with the proof but are not signed, so a
//! captured proof can be replayed for the same capability and key.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::TrustError;
use crate::keys::{KeyPair, VerifyingKey};

/// The decoded form of a capability proof.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapabilityProof {
    /// Capability the proof was generated for
    pub capability: String,
    /// Milliseconds since the Unix epoch at generation time
    pub timestamp: i64,
    /// Random UUID v4
    pub nonce: String,
    /// Base64 signature over SHA-256 of the capability
    pub signature: String,
}

impl CapabilityProof {
    /// Generates a proof token for `capability`.
    ///
    /// # Errors
    ///
    /// Returns `TrustError::InvalidClaims` if the proof cannot be serialized.
    ///
    /// # Example
    ///
    /// ```
    /// use ans_trust::{CapabilityProof, KeyPair};
    ///
    /// let key_pair = KeyPair::generate();
    /// let token = CapabilityProof::generate("text-generation", &key_pair).unwrap();
    ///
    /// assert!(CapabilityProof::verify("text-generation", &token, &key_pair.verifying_key()));
    /// assert!(!CapabilityProof::verify("image-generation", &token, &key_pair.verifying_key()));
    /// ```
    pub fn generate(capability: &str, key_pair: &KeyPair) -> Result<String, TrustError> {
        let proof = Self {
            capability: capability.to_string(),
            timestamp: Utc::now().timestamp_millis(),
            nonce: uuid::Uuid::new_v4().to_string(),
            signature: sign_data(capability.as_bytes(), key_pair),
        };
        proof.encode()
    }

    /// Encodes the proof as a token.
    ///
    /// # Errors
    ///
    /// Returns `TrustError::InvalidClaims` if the proof cannot be serialized.
    pub fn encode(&self) -> Result<String, TrustError> {
        let json = serde_json::to_vec(self).map_err(TrustError::claims)?;
        Ok(STANDARD.encode(json))
    }

    /// Decodes a token without checking its signature.
    ///
    /// # Errors
    ///
    /// Returns `TrustError::InvalidToken` if the token is not base64, or
    /// `TrustError::InvalidClaims` if it does not hold a proof object.
    pub fn decode(token: &str) -> Result<Self, TrustError> {
        let json = STANDARD.decode(token).map_err(TrustError::token)?;
        serde_json::from_slice(&json).map_err(TrustError::claims)
    }

    /// Returns true if `token` carries a valid signature over `capability`
    /// made by `public_key`. Never fails.
    ///
    /// The capability recorded inside the proof is informational only.
    #[must_use]
    pub fn verify(capability: &str, token: &str, public_key: &VerifyingKey) -> bool {
        Self::decode(token).is_ok_and(|proof| {
            verify_with_key(capability.as_bytes(), &proof.signature, public_key)
        })
    }

    /// Same as [`CapabilityProof::verify`] with a PEM public key.
    #[must_use]
    pub fn verify_with_pem(capability: &str, token: &str, public_key_pem: &str) -> bool {
        VerifyingKey::from_public_key_pem(public_key_pem)
            .is_ok_and(|key| Self::verify(capability, token, &key))
    }
}

/// Signs the SHA-256 digest of `data` and returns the signature as base64.
#[must_use]
pub fn sign_data(data: &[u8], key_pair: &KeyPair) -> String {
    let digest = Sha256::digest(data);
    STANDARD.encode(key_pair.sign(&digest))
}

/// Returns true if `signature` (base64) was produced by [`sign_data`] over
/// `data` with the key in `public_key_pem`. Never fails.
#[must_use]
pub fn verify_signature(data: &[u8], signature: &str, public_key_pem: &str) -> bool {
    VerifyingKey::from_public_key_pem(public_key_pem)
        .is_ok_and(|key| verify_with_key(data, signature, &key))
}

fn verify_with_key(data: &[u8], signature: &str, public_key: &VerifyingKey) -> bool {
    let digest = Sha256::digest(data);
    STANDARD
        .decode(signature)
        .is_ok_and(|signature| public_key.verify(&digest, &signature))
}
