// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 CAB Ingénierie / Christophe ABOULICAM
//! Verifier boundary.
//!
//! Signature checking and fingerprinting live outside this crate. Hosts plug
//! them in by implementing [`ModelVerifier`].

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::facts::record::FactRecord;

/// Failure to produce a [`FactRecord`]. Always fatal to the run.
#[derive(Debug, Error)]
pub enum VerifierError {
    #[error("{kind} not found: {}", .path.display())]
    ArtifactNotFound { kind: &'static str, path: PathBuf },
    #[error("Failed to read facts {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse facts JSON: {0}")]
    Facts(#[from] serde_json::Error),
    #[error("{0}")]
    Failed(String),
}

/// Produces verified facts for a model artifact and its certificate
pub trait ModelVerifier: Send + Sync {
    fn verify(&self, model: &Path, certificate: &Path) -> Result<FactRecord, VerifierError>;
}

impl<F> ModelVerifier for F
where
    F: Fn(&Path, &Path) -> Result<FactRecord, VerifierError> + Send + Sync,
{
    fn verify(&self, model: &Path, certificate: &Path) -> Result<FactRecord, VerifierError> {
        self(model, certificate)
    }
}

/// Returns the same facts for every artifact
#[derive(Debug, Clone, Default)]
pub struct StaticVerifier {
    facts: FactRecord,
}

impl StaticVerifier {
    pub fn new(facts: FactRecord) -> Self {
        Self { facts }
    }
}

impl ModelVerifier for StaticVerifier {
    fn verify(&self, _model: &Path, _certificate: &Path) -> Result<FactRecord, VerifierError> {
        Ok(self.facts.clone())
    }
}

/// Reads facts that an upstream verifier wrote as JSON.
///
/// The model and certificate must exist; the facts file is normalized
/// through [`FactRecord::from_value`].
#[derive(Debug, Clone)]
pub struct FactsFileVerifier {
    facts_path: PathBuf,
}

impl FactsFileVerifier {
    pub fn new(facts_path: impl Into<PathBuf>) -> Self {
        Self {
            facts_path: facts_path.into(),
        }
    }

    /// Facts stored next to the certificate as `<certificate>.facts.json`
    pub fn beside_certificate(certificate: &Path) -> Self {
        let mut name = certificate.as_os_str().to_os_string();
        name.push(".facts.json");
        Self::new(PathBuf::from(name))
    }

    pub fn facts_path(&self) -> &Path {
        &self.facts_path
    }
}

impl ModelVerifier for FactsFileVerifier {
    fn verify(&self, model: &Path, certificate: &Path) -> Result<FactRecord, VerifierError> {
        require_file("model artifact", model)?;
        require_file("certificate", certificate)?;

        let raw = fs::read_to_string(&self.facts_path).map_err(|source| VerifierError::Io {
            path: self.facts_path.clone(),
            source,
        })?;
        let facts = FactRecord::from_json(&raw)?;

        tracing::debug!(
            model = %model.display(),
            facts = %self.facts_path.display(),
            signature_valid = facts.signature_valid,
            fingerprint_match = facts.fingerprint_match,
            "facts loaded"
        );
        Ok(facts)
    }
}

fn require_file(kind: &'static str, path: &Path) -> Result<(), VerifierError> {
    if path.is_file() {
        Ok(())
    } else {
        Err(VerifierError::ArtifactNotFound {
            kind,
            path: path.to_path_buf(),
        })
    }
}
