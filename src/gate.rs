// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 CAB Ingénierie / Christophe ABOULICAM
//! Full pipeline: verify an artifact, then evaluate the policy.

use std::path::Path;

use thiserror::Error;

use crate::facts::{ModelVerifier, VerifierError};
use crate::policy::{Decision, PolicyDocument, PolicyEngine, SchemaError};

/// Fatal errors of a gate run. Neither is ever turned into a DENY.
#[derive(Debug, Error)]
pub enum GateError {
    #[error("Policy error: {0}")]
    Schema(#[from] SchemaError),
    #[error("Verification failed: {0}")]
    Verifier(#[from] VerifierError),
}

/// A policy paired with the verifier that produces facts for it
pub struct PolicyGate<V> {
    engine: PolicyEngine,
    verifier: V,
}

impl<V: ModelVerifier> PolicyGate<V> {
    pub fn new(policy: PolicyDocument, verifier: V) -> Self {
        Self {
            engine: PolicyEngine::from_document(policy),
            verifier,
        }
    }

    /// Load the policy file before anything touches the verifier
    pub fn from_policy_file(path: &Path, verifier: V) -> Result<Self, GateError> {
        let engine = PolicyEngine::from_file(path)?;
        Ok(Self { engine, verifier })
    }

    pub fn engine(&self) -> &PolicyEngine {
        &self.engine
    }

    /// Verify the artifact and evaluate the resulting facts
    pub fn run(&self, model: &Path, certificate: &Path) -> Result<Decision, GateError> {
        let facts = self.verifier.verify(model, certificate)?;
        let decision = self.engine.evaluate(&facts);

        if decision.is_denied() {
            for failure in self.engine.failed_checks(&facts) {
                tracing::debug!(check = %failure.check, reason = %failure.message, "failed check");
            }
            tracing::warn!(
                model = %model.display(),
                reason = %decision.reason,
                "model artifact denied"
            );
        } else {
            tracing::info!(
                model = %model.display(),
                verdict = %decision.verdict,
                "model artifact evaluated"
            );
        }

        Ok(decision)
    }
}
