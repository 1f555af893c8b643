//! Property-based tests for the decision evaluator.
//!
//! These tests use proptest to verify:
//! - Unconditional checks deny regardless of the rest of the input
//! - Evaluation is deterministic
//! - Policies survive a serialize/reload cycle

use pacm::facts::{FactRecord, ParameterCount};
use pacm::policy::{
    evaluate, failed_checks, load_policy, AllowedSigner, Decision, PolicyDocument, Verdict,
};
use proptest::prelude::*;

// ============================================================================
// Strategies
// ============================================================================

fn arb_key() -> impl Strategy<Value = String> {
    prop::string::string_regex("K[0-9]{1,3}").unwrap()
}

fn arb_policy() -> impl Strategy<Value = PolicyDocument> {
    (
        any::<bool>(),
        prop::collection::vec(arb_key(), 0..5),
        prop::option::of(0u64..=1_000_000_000_000),
    )
        .prop_map(|(signature_required, keys, max)| {
            PolicyDocument::new(
                signature_required,
                keys.into_iter().map(AllowedSigner::new).collect(),
                max,
            )
        })
}

fn arb_facts() -> impl Strategy<Value = FactRecord> {
    (
        any::<bool>(),
        prop::option::of(arb_key()),
        prop::option::of(prop_oneof![
            9 => (0u64..=1_000_000_000_000).prop_map(ParameterCount::Known),
            1 => Just(ParameterCount::Unreadable),
        ]),
        any::<bool>(),
    )
        .prop_map(|(signature_valid, signer, count, fingerprint)| FactRecord {
            signature_valid,
            signer_public_key: signer,
            parameter_count: count,
            fingerprint_match: fingerprint,
        })
}

/// Facts that pass every check except possibly the one under test
fn permissive_facts(policy: &PolicyDocument) -> FactRecord {
    let mut facts = FactRecord::new()
        .with_signature_valid(true)
        .with_fingerprint_match(true);
    if let Some(signer) = policy.allowed_signers.first() {
        facts = facts.with_signer(signer.public_key.clone());
    }
    facts
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #[test]
    fn fingerprint_mismatch_always_denies(policy in arb_policy()) {
        prop_assume!(!policy.allowed_signers.is_empty());
        let facts = permissive_facts(&policy).with_fingerprint_match(false);

        let decision = evaluate(&policy, &facts);
        prop_assert_eq!(decision, Decision::deny("Fingerprint mismatch"));
    }

    #[test]
    fn required_signature_invalid_always_denies(policy in arb_policy(), facts in arb_facts()) {
        let mut policy = policy;
        policy.requirements.signature_required = true;
        let facts = FactRecord { signature_valid: false, ..facts };

        let decision = evaluate(&policy, &facts);
        prop_assert_eq!(decision.verdict, Verdict::Deny);
        prop_assert_eq!(decision.reason, "Signature required but invalid or missing");
    }

    #[test]
    fn unlisted_signer_always_denies(policy in arb_policy()) {
        let facts = permissive_facts(&policy).with_signer("not-a-listed-key");

        let decision = evaluate(&policy, &facts);
        prop_assert_eq!(decision.reason, "Signer is not in allowed_signers");
    }

    #[test]
    fn parameter_count_at_limit_never_denies(policy in arb_policy()) {
        prop_assume!(!policy.allowed_signers.is_empty());
        if let Some(max) = policy.constraints.max_parameter_count {
            let facts = permissive_facts(&policy).with_parameter_count(max);
            prop_assert!(evaluate(&policy, &facts).is_allowed());
        }
    }

    #[test]
    fn unreadable_count_under_ceiling_never_allows(policy in arb_policy()) {
        prop_assume!(policy.constraints.max_parameter_count.is_some());
        let facts = permissive_facts(&policy).with_unreadable_parameter_count();
        prop_assert!(!evaluate(&policy, &facts).is_allowed());
    }

    #[test]
    fn evaluation_is_deterministic(policy in arb_policy(), facts in arb_facts()) {
        let first = evaluate(&policy, &facts);
        for _ in 0..3 {
            prop_assert_eq!(&evaluate(&policy, &facts), &first);
        }
    }

    #[test]
    fn decision_matches_first_failed_check(policy in arb_policy(), facts in arb_facts()) {
        let decision = evaluate(&policy, &facts);
        match failed_checks(&policy, &facts).first() {
            Some(failure) => {
                prop_assert_eq!(decision.verdict, Verdict::Deny);
                prop_assert_eq!(&decision.reason, &failure.message);
            }
            None => {
                prop_assert_eq!(decision, Decision::allow("Policy satisfied"));
            }
        }
    }

    #[test]
    fn policy_roundtrip_preserves_fields(policy in arb_policy()) {
        let yaml = policy.to_yaml().unwrap();
        let reloaded = load_policy(&yaml).unwrap();
        prop_assert_eq!(reloaded, policy);
    }
}
