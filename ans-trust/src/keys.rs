//! Key types for signing and verification.
//!
//! Key pairs are Ed25519 and are exchanged as PEM: PKCS#8 for private keys,
//! `SubjectPublicKeyInfo` for public keys.

use ed25519_dalek::pkcs8::spki::der::pem::LineEnding;
use ed25519_dalek::pkcs8::{DecodePrivateKey, DecodePublicKey, EncodePrivateKey, EncodePublicKey};
use ed25519_dalek::{
    Signature, Signer, SigningKey as DalekSigningKey, Verifier, VerifyingKey as DalekVerifyingKey,
};

use crate::error::TrustError;

/// An agent or authority key pair.
///
/// # Example
///
/// ```
/// use ans_trust::KeyPair;
///
/// let key_pair = KeyPair::generate();
/// let pem = key_pair.private_key_pem().unwrap();
///
/// let restored = KeyPair::from_private_key_pem(&pem).unwrap();
/// assert_eq!(restored.verifying_key(), key_pair.verifying_key());
/// ```
#[derive(Clone)]
pub struct KeyPair {
    inner: DalekSigningKey,
}

impl KeyPair {
    /// Creates a new random key pair.
    #[must_use]
    pub fn generate() -> Self {
        let mut rng = rand::thread_rng();
        Self {
            inner: DalekSigningKey::generate(&mut rng),
        }
    }

    /// Creates a key pair from the raw 32-byte secret.
    #[must_use]
    pub fn from_bytes(bytes: &[u8; 32]) -> Self {
        Self {
            inner: DalekSigningKey::from_bytes(bytes),
        }
    }

    /// Returns the raw secret bytes.
    #[must_use]
    pub fn to_bytes(&self) -> [u8; 32] {
        self.inner.to_bytes()
    }

    /// Loads a key pair from a PKCS#8 PEM document.
    ///
    /// # Errors
    ///
    /// Returns `TrustError::InvalidKeyFormat` if the PEM is not an Ed25519
    /// PKCS#8 private key.
    pub fn from_private_key_pem(pem: &str) -> Result<Self, TrustError> {
        DalekSigningKey::from_pkcs8_pem(pem)
            .map(|inner| Self { inner })
            .map_err(TrustError::key)
    }

    /// Encodes the private key as a PKCS#8 PEM document.
    ///
    /// # Errors
    ///
    /// Returns `TrustError::InvalidKeyFormat` if encoding fails.
    pub fn private_key_pem(&self) -> Result<String, TrustError> {
        let pem = self
            .inner
            .to_pkcs8_pem(LineEnding::LF)
            .map_err(TrustError::key)?;
        Ok(pem.as_str().to_owned())
    }

    /// Encodes the public key as a `SubjectPublicKeyInfo` PEM document.
    ///
    /// # Errors
    ///
    /// Returns `TrustError::InvalidKeyFormat` if encoding fails.
    pub fn public_key_pem(&self) -> Result<String, TrustError> {
        self.verifying_key().to_public_key_pem()
    }

    /// Returns the corresponding verifying (public) key.
    #[must_use]
    pub fn verifying_key(&self) -> VerifyingKey {
        VerifyingKey {
            inner: self.inner.verifying_key(),
        }
    }

    /// Signs a message.
    #[must_use]
    pub fn sign(&self, message: &[u8]) -> [u8; 64] {
        self.inner.sign(message).to_bytes()
    }

    pub(crate) fn as_dalek(&self) -> &DalekSigningKey {
        &self.inner
    }
}

impl std::fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyPair")
            .field("public_key", &self.verifying_key())
            .finish_non_exhaustive()
    }
}

/// A public key used to verify signatures.
///
/// This key can be safely shared and distributed.
#[derive(Clone, PartialEq, Eq)]
pub struct VerifyingKey {
    inner: DalekVerifyingKey,
}

impl VerifyingKey {
    /// Creates a verifying key from raw bytes.
    ///
    /// # Errors
    ///
    /// Returns `TrustError::InvalidKeyFormat` if the bytes are not a valid
    /// Ed25519 curve point.
    pub fn from_bytes(bytes: &[u8; 32]) -> Result<Self, TrustError> {
        DalekVerifyingKey::from_bytes(bytes)
            .map(|inner| Self { inner })
            .map_err(TrustError::key)
    }

    /// Creates a verifying key from a byte slice of any length.
    ///
    /// # Errors
    ///
    /// Returns `TrustError::InvalidKeyFormat` unless the slice holds exactly
    /// one valid 32-byte key.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, TrustError> {
        let bytes: &[u8; 32] = bytes.try_into().map_err(|_| {
            TrustError::key(format!("expected 32 key bytes, found {}", bytes.len()))
        })?;
        Self::from_bytes(bytes)
    }

    /// Returns the raw key bytes.
    #[must_use]
    pub fn to_bytes(&self) -> [u8; 32] {
        self.inner.to_bytes()
    }

    /// Loads a public key from a `SubjectPublicKeyInfo` PEM document.
    ///
    /// # Errors
    ///
    /// Returns `TrustError::InvalidKeyFormat` if the PEM is not an Ed25519
    /// public key.
    pub fn from_public_key_pem(pem: &str) -> Result<Self, TrustError> {
        DalekVerifyingKey::from_public_key_pem(pem)
            .map(|inner| Self { inner })
            .map_err(TrustError::key)
    }

    /// Encodes the key as a `SubjectPublicKeyInfo` PEM document.
    ///
    /// # Errors
    ///
    /// Returns `TrustError::InvalidKeyFormat` if encoding fails.
    pub fn to_public_key_pem(&self) -> Result<String, TrustError> {
        self.inner
            .to_public_key_pem(LineEnding::LF)
            .map_err(TrustError::key)
    }

    /// Returns true if `signature` is a valid signature of `message`.
    #[must_use]
    pub fn verify(&self, message: &[u8], signature: &[u8]) -> bool {
        Signature::from_slice(signature)
            .is_ok_and(|signature| self.inner.verify(message, &signature).is_ok())
    }
}

impl std::fmt::Debug for VerifyingKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // First 4 bytes are enough to tell keys apart in logs
        let bytes = self.to_bytes();
        write!(
            f,
            "VerifyingKey({:02x}{:02x}{:02x}{:02x}...)",
            bytes[0], bytes[1], bytes[2], bytes[3]
        )
    }
}
