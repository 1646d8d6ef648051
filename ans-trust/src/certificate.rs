//! X.509 certificates.
//!
//! Certificates are built with `rcgen` and read back with `x509-parser`.
//! Signing goes through the crate's own Ed25519 keys, so no key material is
//! ever handed to another crypto backend.

use chrono::{DateTime, Utc};
use ed25519_dalek::Signer;
use rcgen::{
    BasicConstraints, CertificateParams, DistinguishedName, DnType, DnValue, IsCa,
    KeyUsagePurpose, SerialNumber,
};
use time::OffsetDateTime;
use x509_parser::certificate::X509Certificate;
use x509_parser::prelude::FromDer;

use crate::error::TrustError;
use crate::keys::{KeyPair, VerifyingKey};

/// Validity period of agent certificates, in days.
pub const CERTIFICATE_VALIDITY_DAYS: i64 = 365;

const PEM_TAG: &str = "CERTIFICATE";

/// A parsed X.509 certificate together with its PEM encoding.
///
/// # Example
///
/// ```
/// use ans_trust::{Certificate, KeyPair};
///
/// let key_pair = KeyPair::generate();
/// let certificate = Certificate::self_signed(&key_pair, "ans-agent").unwrap();
///
/// assert_eq!(certificate.subject_common_name(), "ans-agent");
/// assert_eq!(certificate.issuer_common_name(), "ans-agent");
///
/// let parsed = Certificate::from_pem(certificate.to_pem()).unwrap();
/// assert_eq!(parsed, certificate);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Certificate {
    pem: String,
    der: Vec<u8>,
    subject_cn: String,
    issuer_cn: String,
    serial: Vec<u8>,
    not_before: DateTime<Utc>,
    not_after: DateTime<Utc>,
    public_key: Vec<u8>,
}

impl Certificate {
    /// Parses a PEM-encoded certificate.
    ///
    /// # Errors
    ///
    /// Returns `TrustError::InvalidCertificate` if the input is not a single
    /// well-formed X.509 certificate in PEM form.
    pub fn from_pem(pem: &str) -> Result<Self, TrustError> {
        let block = pem::parse(pem).map_err(TrustError::certificate)?;
        if block.tag() != PEM_TAG {
            return Err(TrustError::certificate(format!(
                "expected a {PEM_TAG} PEM block, found {}",
                block.tag()
            )));
        }

        let der = block.into_contents();
        let (subject_cn, issuer_cn, serial, not_before, not_after, public_key) = {
            let cert = parse_der(&der)?;
            let validity = cert.validity();
            (
                common_name(cert.subject()),
                common_name(cert.issuer()),
                cert.raw_serial().to_vec(),
                asn1_to_chrono(validity.not_before.timestamp())?,
                asn1_to_chrono(validity.not_after.timestamp())?,
                cert.public_key().subject_public_key.data.to_vec(),
            )
        };

        Ok(Self {
            pem: pem.to_string(),
            der,
            subject_cn,
            issuer_cn,
            serial,
            not_before,
            not_after,
            public_key,
        })
    }

    /// Creates a self-signed certificate for `key_pair`.
    ///
    /// Subject and issuer common names are both `subject_name`; the
    /// certificate is valid for one year from now.
    ///
    /// # Errors
    ///
    /// Returns `TrustError::CertificateGeneration` if signing fails.
    pub fn self_signed(key_pair: &KeyPair, subject_name: &str) -> Result<Self, TrustError> {
        let params = certificate_params(subject_name, CERTIFICATE_VALIDITY_DAYS, false);
        let signer = signing_key(key_pair)?;
        let certificate = params.self_signed(&signer).map_err(TrustError::generation)?;
        Self::from_pem(&certificate.pem())
    }

    /// Returns the PEM encoding this certificate was read from.
    #[must_use]
    pub fn to_pem(&self) -> &str {
        &self.pem
    }

    /// Returns the DER encoding.
    #[must_use]
    pub fn der(&self) -> &[u8] {
        &self.der
    }

    /// Returns the subject common name, or an empty string if there is none.
    #[must_use]
    pub fn subject_common_name(&self) -> &str {
        &self.subject_cn
    }

    /// Returns the issuer common name, or an empty string if there is none.
    #[must_use]
    pub fn issuer_common_name(&self) -> &str {
        &self.issuer_cn
    }

    /// Returns the start of the validity window.
    #[must_use]
    pub fn not_before(&self) -> DateTime<Utc> {
        self.not_before
    }

    /// Returns the end of the validity window.
    #[must_use]
    pub fn not_after(&self) -> DateTime<Utc> {
        self.not_after
    }

    /// Returns the serial number as lowercase hex.
    #[must_use]
    pub fn serial_hex(&self) -> String {
        self.serial.iter().map(|b| format!("{b:02x}")).collect()
    }

    /// Returns the subject's public key.
    ///
    /// # Errors
    ///
    /// Returns `TrustError::InvalidKeyFormat` if the certificate does not
    /// carry an Ed25519 key.
    pub fn public_key(&self) -> Result<VerifyingKey, TrustError> {
        VerifyingKey::from_slice(&self.public_key)
    }

    /// Returns true if `now` lies inside the validity window.
    #[must_use]
    pub fn is_time_valid_at(&self, now: DateTime<Utc>) -> bool {
        self.not_before <= now && now <= self.not_after
    }

    /// Checks that this certificate's signature was made by `issuer`'s key.
    ///
    /// # Errors
    ///
    /// Returns `TrustError::InvalidSignature` if it was not, or
    /// `TrustError::InvalidCertificate` if either certificate cannot be
    /// re-parsed.
    pub fn verify_signed_by(&self, issuer: &Self) -> Result<(), TrustError> {
        let cert = parse_der(&self.der)?;
        let issuer_cert = parse_der(&issuer.der)?;
        cert.verify_signature(Some(issuer_cert.public_key()))
            .map_err(|_| TrustError::InvalidSignature)
    }
}

fn parse_der(der: &[u8]) -> Result<X509Certificate<'_>, TrustError> {
    let (rest, cert) = X509Certificate::from_der(der).map_err(TrustError::certificate)?;
    if !rest.is_empty() {
        return Err(TrustError::certificate("trailing data after certificate"));
    }
    Ok(cert)
}

fn common_name(name: &x509_parser::x509::X509Name<'_>) -> String {
    name.iter_common_name()
        .next()
        .and_then(|cn| cn.as_str().ok())
        .unwrap_or_default()
        .to_string()
}

fn asn1_to_chrono(timestamp: i64) -> Result<DateTime<Utc>, TrustError> {
    DateTime::from_timestamp(timestamp, 0)
        .ok_or_else(|| TrustError::certificate(format!("timestamp {timestamp} out of range")))
}

/// Builds the parameters shared by every certificate the crate creates.
pub(crate) fn certificate_params(
    common_name: &str,
    validity_days: i64,
    is_ca: bool,
) -> CertificateParams {
    let mut params = CertificateParams::default();

    let mut distinguished_name = DistinguishedName::new();
    distinguished_name.push(
        DnType::CommonName,
        DnValue::Utf8String(common_name.to_string()),
    );
    params.distinguished_name = distinguished_name;

    let now = OffsetDateTime::now_utc();
    params.not_before = now;
    params.not_after = now + time::Duration::days(validity_days);
    params.serial_number = Some(random_serial());

    if is_ca {
        params.is_ca = IsCa::Ca(BasicConstraints::Unconstrained);
        params.key_usages = vec![
            KeyUsagePurpose::KeyCertSign,
            KeyUsagePurpose::CrlSign,
            KeyUsagePurpose::DigitalSignature,
        ];
    } else {
        params.key_usages = vec![KeyUsagePurpose::DigitalSignature];
    }

    params
}

/// 128-bit random serial, kept positive and minimally encoded.
fn random_serial() -> SerialNumber {
    let mut bytes = *uuid::Uuid::new_v4().as_bytes();
    bytes[0] = (bytes[0] & 0x7f) | 0x40;
    SerialNumber::from(bytes.to_vec())
}

/// Wraps a key pair so `rcgen` can sign with it.
pub(crate) fn signing_key(key_pair: &KeyPair) -> Result<rcgen::KeyPair, TrustError> {
    rcgen::KeyPair::from_remote(Box::new(Ed25519Key {
        public: key_pair.verifying_key().to_bytes(),
        signer: Some(key_pair.as_dalek().clone()),
    }))
    .map_err(TrustError::generation)
}

/// Wraps a bare public key so it can be placed in a certificate.
pub(crate) fn subject_key(public_key: &VerifyingKey) -> Result<rcgen::KeyPair, TrustError> {
    rcgen::KeyPair::from_remote(Box::new(Ed25519Key {
        public: public_key.to_bytes(),
        signer: None,
    }))
    .map_err(TrustError::generation)
}

struct Ed25519Key {
    public: [u8; 32],
    signer: Option<ed25519_dalek::SigningKey>,
}

impl rcgen::RemoteKeyPair for Ed25519Key {
    fn public_key(&self) -> &[u8] {
        &self.public
    }

    fn sign(&self, msg: &[u8]) -> Result<Vec<u8>, rcgen::Error> {
        self.signer
            .as_ref()
            .map(|key| key.sign(msg).to_bytes().to_vec())
            .ok_or(rcgen::Error::RemoteKeyError)
    }

    fn algorithm(&self) -> &'static rcgen::SignatureAlgorithm {
        &rcgen::PKCS_ED25519
    }
}
