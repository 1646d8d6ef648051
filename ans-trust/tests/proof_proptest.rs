//! Property-based tests for capability proofs and bearer tokens.

use std::sync::Arc;

use proptest::prelude::*;

use ans_trust::{BearerVerifier, CapabilityProof, GatewayTrust, KeyPair, TrustAuthority};

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn own_proof_always_verifies(capability in "\\PC{0,64}") {
        let key_pair = KeyPair::generate();
        let token = CapabilityProof::generate(&capability, &key_pair).unwrap();

        prop_assert!(CapabilityProof::verify(&capability, &token, &key_pair.verifying_key()));
    }

    #[test]
    fn proof_does_not_transfer_between_capabilities(
        a in "[a-z-]{1,24}",
        b in "[a-z-]{1,24}",
    ) {
        prop_assume!(a != b);
        let key_pair = KeyPair::generate();
        let token = CapabilityProof::generate(&a, &key_pair).unwrap();

        prop_assert!(!CapabilityProof::verify(&b, &token, &key_pair.verifying_key()));
    }

    #[test]
    fn arbitrary_proof_input_never_verifies(token in "\\PC{0,128}") {
        let key = KeyPair::generate().verifying_key();
        prop_assert!(!CapabilityProof::verify("cap", &token, &key));
    }

    #[test]
    fn arbitrary_bearer_input_is_rejected(token in "(v4\\.public\\.)?[A-Za-z0-9_-]{0,128}") {
        let authority = Arc::new(TrustAuthority::generate().unwrap());
        let verifier = BearerVerifier::new(authority, GatewayTrust::ProofOfPossession);

        prop_assert!(verifier.verify(&token).is_err());
    }
}
