//! Integration tests for ans-trust.

use std::sync::Arc;

use ans_trust::{
    BearerVerifier, CapabilityProof, Certificate, GatewayTrust, KeyPair, TokenIssuer,
    TrustAuthority, TrustError, CA_COMMON_NAME,
};

#[test]
fn round_trip_issue_and_verify_certificate() {
    // Arrange
    let authority = TrustAuthority::generate().unwrap();
    let agent_key = KeyPair::generate();
    let agent_name = "a2a://model1.ml-inference.acme.v1.prod";

    // Act
    let pem = authority
        .issue_certificate(agent_name, &agent_key.public_key_pem().unwrap())
        .unwrap();
    let certificate = authority.check_certificate(&pem).unwrap();

    // Assert
    assert_eq!(certificate.subject_common_name(), agent_name);
    assert_eq!(certificate.issuer_common_name(), CA_COMMON_NAME);
    assert_eq!(certificate.public_key().unwrap(), agent_key.verifying_key());
}

#[test]
fn reloaded_authority_verifies_certificates_of_the_original() {
    let original = TrustAuthority::generate().unwrap();
    let issued = original
        .issue_certificate("agent-1", &KeyPair::generate().public_key_pem().unwrap())
        .unwrap();

    let reloaded = TrustAuthority::from_pem(
        original.ca_certificate_pem(),
        &original.private_key_pem().unwrap(),
    )
    .unwrap();

    assert_eq!(reloaded.ca_certificate_pem(), original.ca_certificate_pem());
    assert!(reloaded.verify_certificate(&issued));

    // And the other way around
    let reissued = reloaded
        .issue_certificate("agent-2", &KeyPair::generate().public_key_pem().unwrap())
        .unwrap();
    assert!(original.verify_certificate(&reissued));
}

#[test]
fn authorities_do_not_trust_each_other() {
    let a = TrustAuthority::generate().unwrap();
    let b = TrustAuthority::generate().unwrap();

    let from_b = b
        .issue_certificate("agent-1", &KeyPair::generate().public_key_pem().unwrap())
        .unwrap();

    assert!(!a.verify_certificate(&from_b));
    assert!(b.verify_certificate(&from_b));
}

#[test]
fn verify_certificate_never_panics_on_garbage() {
    let authority = TrustAuthority::generate().unwrap();

    for input in [
        "",
        "invalid-cert",
        "-----BEGIN CERTIFICATE-----\nAAAA\n-----END CERTIFICATE-----\n",
        "-----BEGIN CERTIFICATE-----\n-----END CERTIFICATE-----\n",
    ] {
        assert!(!authority.verify_certificate(input), "{input:?} verified");
    }
}

#[test]
fn tampered_certificate_is_rejected() {
    let authority = TrustAuthority::generate().unwrap();
    let pem = authority
        .issue_certificate("agent-1", &KeyPair::generate().public_key_pem().unwrap())
        .unwrap();
    let certificate = Certificate::from_pem(&pem).unwrap();

    // Flip one byte near the end of the signed portion
    let mut der = certificate.der().to_vec();
    let idx = der.len() - 80;
    der[idx] ^= 0x01;
    let tampered = pem::encode(&pem::Pem::new("CERTIFICATE", der));

    assert!(!authority.verify_certificate(&tampered));
}

#[test]
fn self_signed_identity_authenticates_only_without_ca_rooting() {
    let authority = Arc::new(TrustAuthority::generate().unwrap());
    let key_pair = KeyPair::generate();
    let certificate = Certificate::self_signed(&key_pair, "ans-agent").unwrap();
    let token = TokenIssuer::new(key_pair, certificate).issue().unwrap();

    let lenient = BearerVerifier::new(Arc::clone(&authority), GatewayTrust::ProofOfPossession);
    let strict = BearerVerifier::new(authority, GatewayTrust::CaRooted);

    assert!(lenient.verify(&token).is_ok());
    assert!(matches!(
        strict.verify(&token),
        Err(TrustError::UntrustedCertificate { .. })
    ));
}

#[test]
fn ca_issued_identity_authenticates_in_both_modes() {
    let authority = Arc::new(TrustAuthority::generate().unwrap());
    let key_pair = KeyPair::generate();
    let certificate = authority
        .issue_for_key("agent-1", &key_pair.verifying_key())
        .unwrap();
    let token = TokenIssuer::new(key_pair, certificate).issue().unwrap();

    for trust in [GatewayTrust::ProofOfPossession, GatewayTrust::CaRooted] {
        let verifier = BearerVerifier::new(Arc::clone(&authority), trust);
        let agent = verifier.verify(&token).unwrap();
        assert_eq!(agent.common_name(), "agent-1");
    }
}

#[test]
fn capability_proof_checks_against_certified_key() {
    let authority = TrustAuthority::generate().unwrap();
    let key_pair = KeyPair::generate();
    let pem = authority
        .issue_certificate("agent-1", &key_pair.public_key_pem().unwrap())
        .unwrap();
    let certificate = Certificate::from_pem(&pem).unwrap();

    let proof = CapabilityProof::generate("text-generation", &key_pair).unwrap();

    assert!(CapabilityProof::verify(
        "text-generation",
        &proof,
        &certificate.public_key().unwrap()
    ));
}
