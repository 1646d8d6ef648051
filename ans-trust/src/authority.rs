//! The certificate authority.

use chrono::Utc;

use crate::certificate::{
    certificate_params, signing_key, subject_key, Certificate, CERTIFICATE_VALIDITY_DAYS,
};
use crate::error::TrustError;
use crate::keys::{KeyPair, VerifyingKey};
use crate::verification::check_validity_window;

/// Common name of a generated root certificate.
pub const CA_COMMON_NAME: &str = "ANS Root CA";

/// Validity period of a generated root certificate, in days.
pub const CA_VALIDITY_DAYS: i64 = 3650;

/// Issues and verifies agent certificates.
///
/// The authority holds one key pair and one root certificate for its whole
/// lifetime. Share it behind an `Arc`.
///
/// # Example
///
/// ```
/// use ans_trust::{KeyPair, TrustAuthority};
///
/// let authority = TrustAuthority::generate().unwrap();
/// let agent_key = KeyPair::generate();
///
/// let pem = authority
///     .issue_certificate("a2a://model1.ml-inference.acme.v1.prod", &agent_key.public_key_pem().unwrap())
///     .unwrap();
///
/// assert!(authority.verify_certificate(&pem));
/// assert!(!authority.verify_certificate("invalid-cert"));
/// ```
pub struct TrustAuthority {
    key_pair: KeyPair,
    certificate: Certificate,
    issuer: rcgen::Certificate,
    issuer_key: rcgen::KeyPair,
}

impl TrustAuthority {
    /// Creates an authority with a fresh key pair and a self-signed root
    /// certificate named [`CA_COMMON_NAME`], valid for ten years.
    ///
    /// # Errors
    ///
    /// Returns `TrustError::CertificateGeneration` if the root certificate
    /// cannot be built.
    pub fn generate() -> Result<Self, TrustError> {
        let key_pair = KeyPair::generate();
        let issuer_key = signing_key(&key_pair)?;
        let issuer = certificate_params(CA_COMMON_NAME, CA_VALIDITY_DAYS, true)
            .self_signed(&issuer_key)
            .map_err(TrustError::generation)?;
        let certificate = Certificate::from_pem(&issuer.pem())?;

        Ok(Self {
            key_pair,
            certificate,
            issuer,
            issuer_key,
        })
    }

    /// Loads an authority from a PEM root certificate and its PKCS#8 key.
    ///
    /// # Errors
    ///
    /// Returns an error if either document cannot be decoded, or
    /// `TrustError::KeyMismatch` if the key does not belong to the
    /// certificate.
    pub fn from_pem(certificate_pem: &str, private_key_pem: &str) -> Result<Self, TrustError> {
        let certificate = Certificate::from_pem(certificate_pem)?;
        let key_pair = KeyPair::from_private_key_pem(private_key_pem)?;

        if certificate.public_key()? != key_pair.verifying_key() {
            return Err(TrustError::KeyMismatch);
        }

        // rcgen needs an issuer handle carrying the root's subject; only the
        // name and key are taken from it when signing.
        let issuer_key = signing_key(&key_pair)?;
        let issuer = certificate_params(
            certificate.subject_common_name(),
            CA_VALIDITY_DAYS,
            true,
        )
        .self_signed(&issuer_key)
        .map_err(TrustError::generation)?;

        Ok(Self {
            key_pair,
            certificate,
            issuer,
            issuer_key,
        })
    }

    /// Returns the root certificate.
    #[must_use]
    pub fn certificate(&self) -> &Certificate {
        &self.certificate
    }

    /// Returns the root certificate as PEM.
    #[must_use]
    pub fn ca_certificate_pem(&self) -> &str {
        self.certificate.to_pem()
    }

    /// Returns the root certificate's common name.
    #[must_use]
    pub fn ca_common_name(&self) -> &str {
        self.certificate.subject_common_name()
    }

    /// Returns the authority's private key as PKCS#8 PEM, for persisting a
    /// generated authority.
    ///
    /// # Errors
    ///
    /// Returns `TrustError::InvalidKeyFormat` if encoding fails.
    pub fn private_key_pem(&self) -> Result<String, TrustError> {
        self.key_pair.private_key_pem()
    }

    /// Issues a certificate binding `agent_name` to a PEM public key.
    ///
    /// # Errors
    ///
    /// Returns `TrustError::InvalidKeyFormat` if the public key cannot be
    /// decoded, or `TrustError::CertificateGeneration` if signing fails.
    pub fn issue_certificate(
        &self,
        agent_name: &str,
        public_key_pem: &str,
    ) -> Result<String, TrustError> {
        let public_key = VerifyingKey::from_public_key_pem(public_key_pem)?;
        Ok(self.issue_for_key(agent_name, &public_key)?.to_pem().to_string())
    }

    /// Issues a certificate binding `agent_name` to `public_key`.
    ///
    /// The certificate is valid for one year and carries a random serial.
    ///
    /// # Errors
    ///
    /// Returns `TrustError::CertificateGeneration` if signing fails.
    pub fn issue_for_key(
        &self,
        agent_name: &str,
        public_key: &VerifyingKey,
    ) -> Result<Certificate, TrustError> {
        let subject = subject_key(public_key)?;
        let issued = certificate_params(agent_name, CERTIFICATE_VALIDITY_DAYS, false)
            .signed_by(&subject, &self.issuer, &self.issuer_key)
            .map_err(TrustError::generation)?;
        Certificate::from_pem(&issued.pem())
    }

    /// Returns true if `certificate_pem` was issued by this authority and is
    /// inside its validity window. Never fails.
    #[must_use]
    pub fn verify_certificate(&self, certificate_pem: &str) -> bool {
        self.check_certificate(certificate_pem).is_ok()
    }

    /// Checks a PEM certificate against this authority.
    ///
    /// # Errors
    ///
    /// - `InvalidCertificate` if the input cannot be parsed
    /// - `UntrustedCertificate` on an issuer mismatch or outside the validity window
    /// - `InvalidSignature` if the signature was not made by the root key
    pub fn check_certificate(&self, certificate_pem: &str) -> Result<Certificate, TrustError> {
        let certificate = Certificate::from_pem(certificate_pem)?;
        self.check(&certificate)?;
        Ok(certificate)
    }

    /// Checks an already parsed certificate against this authority.
    ///
    /// # Errors
    ///
    /// Same as [`TrustAuthority::check_certificate`], minus parsing.
    pub fn check(&self, certificate: &Certificate) -> Result<(), TrustError> {
        if certificate.issuer_common_name() != self.ca_common_name() {
            return Err(TrustError::untrusted(format!(
                "issued by '{}', expected '{}'",
                certificate.issuer_common_name(),
                self.ca_common_name()
            )));
        }

        certificate.verify_signed_by(&self.certificate)?;

        check_validity_window(certificate.not_before(), certificate.not_after(), Utc::now())
    }
}

impl std::fmt::Debug for TrustAuthority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TrustAuthority")
            .field("common_name", &self.ca_common_name())
            .field("serial", &self.certificate.serial_hex())
            .field("public_key", &self.key_pair.verifying_key())
            .finish_non_exhaustive()
    }
}
