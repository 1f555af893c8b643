use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::facts::FactRecord;
use crate::policy::config::PolicyDocument;

/// The checks applied to every artifact, in evaluation order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Check {
    /// Signature must be valid when the policy requires one
    SignatureRequired,
    /// Signer key must be on the allow-list
    AllowedSigners,
    /// Parameter count must not exceed the ceiling. Skipped when there is
    /// no ceiling or no reported count; an unreadable count fails.
    MaxParameterCount,
    /// Fingerprint must match; no policy toggle
    FingerprintMatch,
}

impl Check {
    /// Evaluation order. The first failing entry decides the reason.
    pub const ORDERED: [Check; 4] = [
        Check::SignatureRequired,
        Check::AllowedSigners,
        Check::MaxParameterCount,
        Check::FingerprintMatch,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Check::SignatureRequired => "signature_required",
            Check::AllowedSigners => "allowed_signers",
            Check::MaxParameterCount => "max_parameter_count",
            Check::FingerprintMatch => "fingerprint_match",
        }
    }

    /// Reason reported when this check denies
    pub fn reason(&self) -> &'static str {
        match self {
            Check::SignatureRequired => "Signature required but invalid or missing",
            Check::AllowedSigners => "Signer is not in allowed_signers",
            Check::MaxParameterCount => "Model exceeds max_parameter_count",
            Check::FingerprintMatch => "Fingerprint mismatch",
        }
    }

    /// Apply this check to the given policy and facts
    pub fn check(&self, policy: &PolicyDocument, facts: &FactRecord) -> Result<(), CheckFailure> {
        let passed = match self {
            Check::SignatureRequired => {
                !policy.requirements.signature_required || facts.signature_valid
            }
            Check::AllowedSigners => policy.allows_signer(facts.signer_public_key.as_deref()),
            Check::MaxParameterCount => match (
                policy.constraints.max_parameter_count,
                facts.parameter_count,
            ) {
                (Some(max), Some(count)) => count.within(max),
                _ => true,
            },
            Check::FingerprintMatch => facts.fingerprint_match,
        };

        if passed {
            Ok(())
        } else {
            Err(CheckFailure::new(*self))
        }
    }
}

impl fmt::Display for Check {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A check that denied an artifact
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Policy check '{check}' failed: {message}")]
pub struct CheckFailure {
    pub check: Check,
    pub message: String,
}

impl CheckFailure {
    pub fn new(check: Check) -> Self {
        Self {
            check,
            message: check.reason().to_string(),
        }
    }
}
