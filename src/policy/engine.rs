use std::path::Path;

use crate::facts::FactRecord;
use crate::policy::check::{Check, CheckFailure};
use crate::policy::config::PolicyDocument;
use crate::policy::decision::Decision;
use crate::policy::loader::{self, SchemaError};

/// Reason attached to an ALLOW decision
pub const POLICY_SATISFIED: &str = "Policy satisfied";

/// Evaluate facts against a policy.
///
/// Checks run in [`Check::ORDERED`] order and the first failure decides
/// the reason. Pure: the same inputs always give the same decision.
pub fn evaluate(policy: &PolicyDocument, facts: &FactRecord) -> Decision {
    for check in Check::ORDERED {
        if let Err(failure) = check.check(policy, facts) {
            tracing::debug!(check = %failure.check, "policy check denied artifact");
            return Decision::deny(failure.message);
        }
    }
    Decision::allow(POLICY_SATISFIED)
}

/// Every failing check, in evaluation order (doesn't stop at first)
pub fn failed_checks(policy: &PolicyDocument, facts: &FactRecord) -> Vec<CheckFailure> {
    Check::ORDERED
        .iter()
        .filter_map(|check| check.check(policy, facts).err())
        .collect()
}

/// A loaded policy ready for evaluation
#[derive(Debug, Clone)]
pub struct PolicyEngine {
    policy: PolicyDocument,
}

impl PolicyEngine {
    /// Load and validate a policy from YAML text
    pub fn from_yaml(yaml: &str) -> Result<Self, SchemaError> {
        Ok(Self::from_document(loader::load_policy(yaml)?))
    }

    /// Load and validate a policy file
    pub fn from_file(path: &Path) -> Result<Self, SchemaError> {
        Ok(Self::from_document(loader::load_policy_file(path)?))
    }

    pub fn from_document(policy: PolicyDocument) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &PolicyDocument {
        &self.policy
    }

    /// Number of distinct allowed signer keys
    pub fn signer_count(&self) -> usize {
        self.policy.allowed_keys().len()
    }

    pub fn evaluate(&self, facts: &FactRecord) -> Decision {
        evaluate(&self.policy, facts)
    }

    pub fn failed_checks(&self, facts: &FactRecord) -> Vec<CheckFailure> {
        failed_checks(&self.policy, facts)
    }
}
