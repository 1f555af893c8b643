//! PaCM - Policy-as-Code for Models
//!
//! Consumes facts produced by an external model verifier (signature
//! validity, signer key, parameter count, fingerprint match) and renders an
//! ALLOW/DENY decision against a declarative YAML policy.
//!
//! # Example
//!
//! ```rust
//! use pacm::facts::FactRecord;
//! use pacm::policy::{PolicyEngine, Verdict};
//!
//! let policy = r#"
//! version: "pacm-v1"
//! requirements:
//!   signature_required: true
//! allowed_signers:
//!   - public_key: "K1"
//! constraints:
//!   max_parameter_count: 1000000
//! "#;
//!
//! let engine = PolicyEngine::from_yaml(policy).unwrap();
//!
//! let facts = FactRecord::new()
//!     .with_signature_valid(true)
//!     .with_signer("K1")
//!     .with_parameter_count(500_000)
//!     .with_fingerprint_match(true);
//!
//! let decision = engine.evaluate(&facts);
//! assert_eq!(decision.verdict, Verdict::Allow);
//! assert_eq!(decision.reason, "Policy satisfied");
//! ```

pub mod config;
pub mod facts;
pub mod gate;
pub mod policy;

// Re-export commonly used types at the crate root
pub use facts::{FactRecord, ModelVerifier, VerifierError};
pub use gate::{GateError, PolicyGate};
pub use policy::{load_policy, Decision, PolicyDocument, PolicyEngine, SchemaError, Verdict};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Evaluate verifier output (JSON) against a policy (YAML)
///
/// This is a convenience function for simple use cases. Facts JSON that does
/// not parse is a verifier failure, never a decision.
///
/// # Example
///
/// ```rust
/// use pacm::evaluate_facts;
///
/// let policy = r#"
/// version: "pacm-v1"
/// requirements:
///   signature_required: false
/// allowed_signers:
///   - public_key: "K1"
/// constraints:
///   max_parameter_count: null
/// "#;
///
/// let decision = evaluate_facts(policy, r#"{"signer_public_key": "K1"}"#).unwrap();
/// assert_eq!(decision.reason, "Fingerprint mismatch");
/// ```
pub fn evaluate_facts(policy_yaml: &str, facts_json: &str) -> Result<Decision, GateError> {
    let engine = PolicyEngine::from_yaml(policy_yaml)?;
    let facts = FactRecord::from_json(facts_json).map_err(VerifierError::from)?;
    Ok(engine.evaluate(&facts))
}
