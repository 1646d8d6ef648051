//! Trust primitives for the Agent Name Service.
//!
//! This crate provides the certificate authority that vouches for agent
//! identities, the capability proofs agents use to back their claims, and
//! the bearer tokens that authenticate calls to the registry.
//!
//! # Overview
//!
//! - [`TrustAuthority`] issues X.509 certificates binding an agent name to
//!   a public key, and verifies certificates presented later.
//! - [`CapabilityProof`] signs a capability name with an agent's key.
//! - [`TokenIssuer`] and [`BearerVerifier`] create and check PASETO
//!   v4.public tokens whose subject is the caller's certificate.
//!
//! # Example
//!
//! ```rust
//! use ans_trust::{CapabilityProof, KeyPair, TrustAuthority};
//!
//! // Authority side: certify an agent key
//! let authority = TrustAuthority::generate().unwrap();
//! let agent_key = KeyPair::generate();
//! let certificate = authority
//!     .issue_certificate("a2a://model1.ml-inference.acme.v1", &agent_key.public_key_pem().unwrap())
//!     .unwrap();
//! assert!(authority.verify_certificate(&certificate));
//!
//! // Agent side: prove a capability
//! let proof = CapabilityProof::generate("ml-inference", &agent_key).unwrap();
//! assert!(CapabilityProof::verify("ml-inference", &proof, &agent_key.verifying_key()));
//! ```
//!
//! # Key Material
//!
//! | Item | Format |
//! |------|--------|
//! | Key pairs | Ed25519 |
//! | Private keys | PKCS#8 PEM |
//! | Public keys | `SubjectPublicKeyInfo` PEM |
//! | Certificates | X.509 PEM |
//! | Root validity | 10 years |
//! | Agent certificate validity | 1 year |
//! | Bearer token lifetime | 1 hour |
//!
//! # Security Properties
//!
//! | Property | How Achieved |
//! |----------|--------------|
//! | No algorithm confusion | PASETO v4 is Ed25519-only |
//! | Key possession | Bearer tokens are signed by the certified key |
//! | Certificate binding | Issuer name, signature and validity window are all checked |
//! | Tamper detection | Ed25519 signature verification |
//!
//! Capability proofs carry a timestamp and nonce that are not covered by the
//! signature, so they offer no replay protection.

#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

mod authority;
mod certificate;
mod claims;
mod error;
mod keys;
mod proof;
mod token;
mod verification;

pub use authority::{TrustAuthority, CA_COMMON_NAME, CA_VALIDITY_DAYS};
pub use certificate::{Certificate, CERTIFICATE_VALIDITY_DAYS};
pub use claims::{BearerClaims, DEFAULT_TOKEN_TTL, TOKEN_ISSUER};
pub use error::TrustError;
pub use keys::{KeyPair, VerifyingKey};
pub use proof::{sign_data, verify_signature, CapabilityProof};
pub use token::{AuthenticatedAgent, BearerVerifier, GatewayTrust, TokenIssuer};
pub use verification::{check_expiration, check_validity_window, validate_issuer};

/// A prelude module for convenient imports.
///
/// # Example
///
/// ```rust
/// use ans_trust::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        check_expiration, check_validity_window, sign_data, validate_issuer, verify_signature,
        AuthenticatedAgent, BearerClaims, BearerVerifier, CapabilityProof, Certificate,
        GatewayTrust, KeyPair, TokenIssuer, TrustAuthority, TrustError, VerifyingKey,
    };
}
