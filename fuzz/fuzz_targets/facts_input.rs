#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use pacm::facts::FactRecord;
use pacm::policy::{failed_checks, PolicyEngine, Verdict};

const POLICY: &str = r#"
version: "pacm-v1"
requirements:
  signature_required: true
allowed_signers:
  - public_key: "K1"
  - public_key: "K2"
constraints:
  max_parameter_count: 1000000
"#;

#[derive(Arbitrary, Debug)]
struct FuzzInput {
    raw_json: String,
    signature_valid: Option<bool>,
    signer_public_key: Option<String>,
    parameter_count: Option<i64>,
    float_count: Option<f64>,
    fingerprint_match: Option<bool>,
}

fuzz_target!(|input: FuzzInput| {
    let engine = PolicyEngine::from_yaml(POLICY).expect("Valid YAML");

    // Untrusted verifier text: either a JSON error or a normalized record.
    if let Ok(facts) = FactRecord::from_json(&input.raw_json) {
        let _ = engine.evaluate(&facts);
    }

    let mut value = serde_json::Map::new();
    if let Some(v) = input.signature_valid {
        value.insert("signature_valid".to_string(), serde_json::json!(v));
    }
    if let Some(ref v) = input.signer_public_key {
        value.insert("signer_public_key".to_string(), serde_json::json!(v));
    }
    if let Some(v) = input.parameter_count {
        value.insert("parameter_count".to_string(), serde_json::json!(v));
    } else if let Some(v) = input.float_count {
        value.insert("parameter_count".to_string(), serde_json::json!(v));
    }
    if let Some(v) = input.fingerprint_match {
        value.insert("fingerprint_match".to_string(), serde_json::json!(v));
    }

    let facts = FactRecord::from_value(&serde_json::Value::Object(value));
    let decision = engine.evaluate(&facts);

    // Never allow what any check rejects.
    let failures = failed_checks(engine.policy(), &facts);
    assert_eq!(decision.verdict == Verdict::Allow, failures.is_empty());

    // A reported count that is not a valid count must not pass the ceiling.
    if matches!(input.parameter_count, Some(n) if n < 0) {
        assert_ne!(decision.verdict, Verdict::Allow);
    }
});
