//! Bearer tokens for authenticating registry requests.
//!
//! A bearer token is a PASETO v4.public token signed with the caller's key.
//! Its subject claim carries the caller's certificate, so the verifier needs
//! no prior knowledge of the caller: it reads the certificate, checks the
//! signature against the certified key and then decides whether it trusts
//! the certificate itself.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::Utc;
use rusty_paseto::prelude::*;
use serde::{Deserialize, Serialize};

use crate::authority::TrustAuthority;
use crate::certificate::Certificate;
use crate::claims::{BearerClaims, DEFAULT_TOKEN_TTL, TOKEN_ISSUER};
use crate::error::TrustError;
use crate::keys::KeyPair;
use crate::verification::{check_expiration, check_validity_window, validate_issuer};

const TOKEN_PREFIX: &str = "v4.public.";
const SIGNATURE_LENGTH: usize = 64;

/// Creates bearer tokens for one agent identity.
///
/// # Example
///
/// ```
/// use ans_trust::{Certificate, KeyPair, TokenIssuer};
///
/// let key_pair = KeyPair::generate();
/// let certificate = Certificate::self_signed(&key_pair, "ans-agent").unwrap();
/// let issuer = TokenIssuer::new(key_pair, certificate);
///
/// let token = issuer.issue().unwrap();
/// assert!(token.starts_with("v4.public."));
/// ```
#[derive(Debug, Clone)]
pub struct TokenIssuer {
    key_pair: KeyPair,
    certificate: Certificate,
    default_ttl: Duration,
}

impl TokenIssuer {
    /// Creates an issuer with the default one-hour token lifetime.
    #[must_use]
    pub fn new(key_pair: KeyPair, certificate: Certificate) -> Self {
        Self {
            key_pair,
            certificate,
            default_ttl: DEFAULT_TOKEN_TTL,
        }
    }

    /// Sets the token lifetime.
    #[must_use]
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.default_ttl = ttl;
        self
    }

    /// Returns the certificate placed in the subject claim.
    #[must_use]
    pub fn certificate(&self) -> &Certificate {
        &self.certificate
    }

    /// Returns the default token lifetime.
    #[must_use]
    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    /// Issues a token with the default lifetime.
    ///
    /// # Errors
    ///
    /// Returns `TrustError` if token creation fails.
    pub fn issue(&self) -> Result<String, TrustError> {
        self.issue_with_ttl(self.default_ttl)
    }

    /// Issues a token with a custom lifetime.
    ///
    /// # Errors
    ///
    /// Returns `TrustError` if token creation fails.
    pub fn issue_with_ttl(&self, ttl: Duration) -> Result<String, TrustError> {
        let claims = BearerClaims::new(self.certificate.to_pem(), ttl)?;
        self.issue_claims(&claims)
    }

    /// Issues a token for pre-built claims.
    ///
    /// # Errors
    ///
    /// Returns `TrustError` if token creation fails.
    pub fn issue_claims(&self, claims: &BearerClaims) -> Result<String, TrustError> {
        let key_bytes = self.key_pair.as_dalek().to_keypair_bytes();
        let key_wrapper = Key::<64>::from(&key_bytes);
        let paseto_key = PasetoAsymmetricPrivateKey::<V4, Public>::from(&key_wrapper);

        let exp_str = claims.exp.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string();
        let iat_str = claims.iat.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string();

        let exp_claim = ExpirationClaim::try_from(exp_str.as_str())
            .map_err(|e| TrustError::claims(format!("invalid expiration: {e}")))?;
        let iat_claim = IssuedAtClaim::try_from(iat_str.as_str())
            .map_err(|e| TrustError::claims(format!("invalid issued at: {e}")))?;

        PasetoBuilder::<V4, Public>::default()
            .set_claim(exp_claim)
            .set_claim(iat_claim)
            .set_claim(IssuerClaim::from(claims.iss.as_str()))
            .set_claim(SubjectClaim::from(claims.sub.as_str()))
            .build(&paseto_key)
            .map_err(TrustError::token)
    }
}

/// How far the gateway trusts a bearer token's certificate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GatewayTrust {
    /// Any certificate is accepted once the caller proves possession of its
    /// key. Registration still requires a CA-issued certificate.
    #[default]
    ProofOfPossession,
    /// The certificate must also be issued by the registry's authority.
    CaRooted,
}

impl fmt::Display for GatewayTrust {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ProofOfPossession => write!(f, "proof-of-possession"),
            Self::CaRooted => write!(f, "ca-rooted"),
        }
    }
}

impl FromStr for GatewayTrust {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "proof-of-possession" => Ok(Self::ProofOfPossession),
            "ca-rooted" => Ok(Self::CaRooted),
            other => Err(format!(
                "unknown trust mode '{other}'; expected 'proof-of-possession' or 'ca-rooted'"
            )),
        }
    }
}

/// A caller whose bearer token has been verified.
#[derive(Debug, Clone)]
pub struct AuthenticatedAgent {
    /// Verified claims
    pub claims: BearerClaims,
    /// The caller's certificate
    pub certificate: Certificate,
}

impl AuthenticatedAgent {
    /// Returns the certificate's subject common name.
    #[must_use]
    pub fn common_name(&self) -> &str {
        self.certificate.subject_common_name()
    }
}

/// Verifies bearer tokens.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use ans_trust::{BearerVerifier, Certificate, GatewayTrust, KeyPair, TokenIssuer, TrustAuthority};
///
/// let authority = Arc::new(TrustAuthority::generate().unwrap());
/// let key_pair = KeyPair::generate();
/// let certificate = Certificate::self_signed(&key_pair, "ans-agent").unwrap();
/// let token = TokenIssuer::new(key_pair, certificate).issue().unwrap();
///
/// let verifier = BearerVerifier::new(Arc::clone(&authority), GatewayTrust::ProofOfPossession);
/// assert_eq!(verifier.verify(&token).unwrap().common_name(), "ans-agent");
///
/// let strict = BearerVerifier::new(authority, GatewayTrust::CaRooted);
/// assert!(strict.verify(&token).is_err());
/// ```
#[derive(Debug, Clone)]
pub struct BearerVerifier {
    authority: Arc<TrustAuthority>,
    trust: GatewayTrust,
}

impl BearerVerifier {
    /// Creates a verifier.
    #[must_use]
    pub fn new(authority: Arc<TrustAuthority>, trust: GatewayTrust) -> Self {
        Self { authority, trust }
    }

    /// Returns the trust mode.
    #[must_use]
    pub fn trust(&self) -> GatewayTrust {
        self.trust
    }

    /// Verifies a token and returns the authenticated caller.
    ///
    /// This method:
    /// 1. Reads the certificate from the unverified subject claim
    /// 2. Verifies the signature with the certified public key
    /// 3. Checks issuer and expiration
    /// 4. Checks the certificate validity window
    /// 5. Under [`GatewayTrust::CaRooted`], checks the certificate against the authority
    ///
    /// # Errors
    ///
    /// Returns `TrustError` describing the first check that failed.
    pub fn verify(&self, token: &str) -> Result<AuthenticatedAgent, TrustError> {
        let subject = peek_subject(token)?;
        let certificate = Certificate::from_pem(&subject)?;
        let public_key = certificate.public_key()?;

        let key_bytes = public_key.to_bytes();
        let key_wrapper = Key::<32>::from(&key_bytes);
        let paseto_key = PasetoAsymmetricPublicKey::<V4, Public>::from(&key_wrapper);

        let json = PasetoParser::<V4, Public>::default()
            .parse(token, &paseto_key)
            .map_err(|e| {
                let err_str = e.to_string().to_lowercase();
                if err_str.contains("signature") {
                    TrustError::InvalidSignature
                } else if err_str.contains("expired") {
                    TrustError::TokenExpired {
                        expired_at: "unknown".to_string(),
                    }
                } else {
                    TrustError::token(e)
                }
            })?;

        let claims = extract_claims(&json)?;
        let now = Utc::now();
        validate_issuer(TOKEN_ISSUER, &claims.iss)?;
        check_expiration(claims.exp, now)?;
        if claims.sub != certificate.to_pem() {
            return Err(TrustError::claims("subject changed after signing"));
        }
        check_validity_window(certificate.not_before(), certificate.not_after(), now)?;

        if self.trust == GatewayTrust::CaRooted {
            self.authority.check(&certificate)?;
        }

        Ok(AuthenticatedAgent {
            claims,
            certificate,
        })
    }
}

/// Reads the subject claim without checking the signature.
fn peek_subject(token: &str) -> Result<String, TrustError> {
    let body = token
        .strip_prefix(TOKEN_PREFIX)
        .ok_or_else(|| TrustError::token(format!("expected '{TOKEN_PREFIX}' prefix")))?;
    let payload = body.split('.').next().unwrap_or_default();

    let decoded = URL_SAFE_NO_PAD
        .decode(payload)
        .map_err(|e| TrustError::token(format!("payload is not base64url: {e}")))?;
    if decoded.len() <= SIGNATURE_LENGTH {
        return Err(TrustError::token("payload too short"));
    }

    let message = &decoded[..decoded.len() - SIGNATURE_LENGTH];
    let json: serde_json::Value = serde_json::from_slice(message)
        .map_err(|e| TrustError::claims(format!("payload is not JSON: {e}")))?;

    json["sub"]
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| TrustError::claims("missing sub claim"))
}

fn extract_claims(json: &serde_json::Value) -> Result<BearerClaims, TrustError> {
    let string_claim = |name: &str| {
        json[name]
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| TrustError::claims(format!("missing {name} claim")))
    };
    let time_claim = |name: &str| {
        let value = string_claim(name)?;
        chrono::DateTime::parse_from_rfc3339(&value)
            .map(|t| t.with_timezone(&Utc))
            .map_err(|e| TrustError::claims(format!("invalid {name} format: {e}")))
    };

    Ok(BearerClaims {
        iss: string_claim("iss")?,
        sub: string_claim("sub")?,
        iat: time_claim("iat")?,
        exp: time_claim("exp")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity() -> (KeyPair, Certificate) {
        let key_pair = KeyPair::generate();
        let certificate = Certificate::self_signed(&key_pair, "ans-agent").unwrap();
        (key_pair, certificate)
    }

    fn verifier(trust: GatewayTrust) -> (Arc<TrustAuthority>, BearerVerifier) {
        let authority = Arc::new(TrustAuthority::generate().unwrap());
        (Arc::clone(&authority), BearerVerifier::new(authority, trust))
    }

    #[test]
    fn issue_creates_v4_public_token() {
        let (key_pair, certificate) = identity();
        let token = TokenIssuer::new(key_pair, certificate).issue().unwrap();

        assert!(token.starts_with("v4.public."));
    }

    #[test]
    fn verify_returns_claims() {
        let (key_pair, certificate) = identity();
        let pem = certificate.to_pem().to_string();
        let token = TokenIssuer::new(key_pair, certificate).issue().unwrap();

        let (_, verifier) = verifier(GatewayTrust::ProofOfPossession);
        let agent = verifier.verify(&token).unwrap();

        assert_eq!(agent.claims.iss, TOKEN_ISSUER);
        assert_eq!(agent.claims.sub, pem);
        assert_eq!(agent.common_name(), "ans-agent");
    }

    #[test]
    fn ca_rooted_accepts_issued_certificate() {
        let (authority, verifier) = verifier(GatewayTrust::CaRooted);
        let key_pair = KeyPair::generate();
        let certificate = authority
            .issue_for_key("agent-1", &key_pair.verifying_key())
            .unwrap();

        let token = TokenIssuer::new(key_pair, certificate).issue().unwrap();

        assert_eq!(verifier.verify(&token).unwrap().common_name(), "agent-1");
    }

    #[test]
    fn ca_rooted_rejects_self_signed() {
        let (_, verifier) = verifier(GatewayTrust::CaRooted);
        let (key_pair, certificate) = identity();
        let token = TokenIssuer::new(key_pair, certificate).issue().unwrap();

        assert!(matches!(
            verifier.verify(&token),
            Err(TrustError::UntrustedCertificate { .. })
        ));
    }

    #[test]
    fn token_signed_by_other_key_is_rejected() {
        let (_, certificate) = identity();
        let token = TokenIssuer::new(KeyPair::generate(), certificate)
            .issue()
            .unwrap();

        let (_, verifier) = verifier(GatewayTrust::ProofOfPossession);
        let result = verifier.verify(&token);

        assert!(
            matches!(
                result,
                Err(TrustError::InvalidSignature | TrustError::InvalidToken { .. })
            ),
            "Expected InvalidSignature or InvalidToken, got {result:?}"
        );
    }

    #[test]
    fn expired_token_is_rejected() {
        let (key_pair, certificate) = identity();
        let token = TokenIssuer::new(key_pair, certificate)
            .issue_with_ttl(Duration::ZERO)
            .unwrap();

        let (_, verifier) = verifier(GatewayTrust::ProofOfPossession);
        assert!(verifier.verify(&token).is_err());
    }

    #[test]
    fn malformed_tokens_are_rejected() {
        let (_, verifier) = verifier(GatewayTrust::ProofOfPossession);

        for token in ["", "invalid-token", "v4.public.", "v4.public.!!!", "v4.local.abc"] {
            assert!(verifier.verify(token).is_err(), "{token:?} should be rejected");
        }
    }

    #[test]
    fn trust_mode_parses() {
        assert_eq!(
            "ca-rooted".parse::<GatewayTrust>().unwrap(),
            GatewayTrust::CaRooted
        );
        assert_eq!(
            "proof-of-possession".parse::<GatewayTrust>().unwrap(),
            GatewayTrust::default()
        );
        assert!("open".parse::<GatewayTrust>().is_err());
        assert_eq!(GatewayTrust::CaRooted.to_string(), "ca-rooted");
    }
}
