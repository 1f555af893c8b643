// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 CAB Ingénierie / Christophe ABOULICAM
use std::collections::HashSet;

use serde::{Deserialize, Serialize};

/// Schema tag every policy document must carry
pub const POLICY_VERSION: &str = "pacm-v1";

/// Root structure of a validated policy document.
///
/// Only [`crate::policy::load_policy`] and its siblings hand these out, so
/// every field has already passed the structural checks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyDocument {
    pub version: String,
    pub requirements: Requirements,
    pub allowed_signers: Vec<AllowedSigner>,
    pub constraints: Constraints,
}

/// `requirements` section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Requirements {
    pub signature_required: bool,
}

/// One entry of `allowed_signers`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AllowedSigner {
    pub public_key: String,
}

/// `constraints` section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Constraints {
    /// `None` means no ceiling. The key itself is still mandatory on load.
    pub max_parameter_count: Option<u64>,
}

impl AllowedSigner {
    pub fn new(public_key: impl Into<String>) -> Self {
        Self {
            public_key: public_key.into(),
        }
    }
}

impl PolicyDocument {
    /// Build a document carrying the current schema tag
    pub fn new(
        signature_required: bool,
        allowed_signers: Vec<AllowedSigner>,
        max_parameter_count: Option<u64>,
    ) -> Self {
        Self {
            version: POLICY_VERSION.to_string(),
            requirements: Requirements { signature_required },
            allowed_signers,
            constraints: Constraints {
                max_parameter_count,
            },
        }
    }

    /// Public keys of the allowed signers, deduplicated
    pub fn allowed_keys(&self) -> HashSet<&str> {
        self.allowed_signers
            .iter()
            .map(|s| s.public_key.as_str())
            .collect()
    }

    /// Whether `signer` is one of the allowed keys. An absent signer never is.
    pub fn allows_signer(&self, signer: Option<&str>) -> bool {
        signer.is_some_and(|key| self.allowed_signers.iter().any(|s| s.public_key == key))
    }

    /// Serialize the document back to YAML
    pub fn to_yaml(&self) -> Result<String, serde_yaml::Error> {
        serde_yaml::to_string(self)
    }
}
