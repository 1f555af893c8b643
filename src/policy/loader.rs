// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 CAB Ingénierie / Christophe ABOULICAM
//! Policy loading and schema validation.
//!
//! Structural checks run in a fixed order and stop at the first failure, so
//! the same broken document always yields the same message.

use std::fs;
use std::path::{Path, PathBuf};

use serde_yaml::{Mapping, Value};
use thiserror::Error;

use crate::policy::config::{PolicyDocument, POLICY_VERSION};

/// Structural defect in a policy document. Always fatal to the run.
#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("Failed to read policy file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("Policy file must be a YAML mapping")]
    NotAMapping,
    #[error("Unsupported or missing policy version")]
    UnsupportedVersion { found: Option<String> },
    #[error("Policy missing '{0}' section")]
    MissingSection(&'static str),
    #[error("'allowed_signers' must be a list")]
    SignersNotAList,
    #[error("Policy missing '{0}' requirement")]
    MissingRequirement(&'static str),
    #[error("Policy missing '{0}' constraint")]
    MissingConstraint(&'static str),
    /// A present key whose value has the wrong type, raised by the typed
    /// decode after the structural checks. `signature_required: null` and a
    /// float ceiling such as `max_parameter_count: 1e6` land here: the policy
    /// is rejected at load instead of being read as "not required" or
    /// compared as a float.
    #[error("Invalid policy document: {0}")]
    InvalidField(String),
}

/// Parse and validate a policy document from YAML (or JSON) text
pub fn load_policy(raw: &str) -> Result<PolicyDocument, SchemaError> {
    let value: Value = serde_yaml::from_str(raw)?;
    load_policy_value(value)
}

/// Read, parse and validate a policy file
pub fn load_policy_file(path: &Path) -> Result<PolicyDocument, SchemaError> {
    let raw = fs::read_to_string(path).map_err(|source| SchemaError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let policy = load_policy(&raw)?;
    tracing::debug!(
        path = %path.display(),
        signers = policy.allowed_signers.len(),
        "policy loaded"
    );
    Ok(policy)
}

/// Validate an already-deserialized document
pub fn load_policy_value(value: Value) -> Result<PolicyDocument, SchemaError> {
    let root = value.as_mapping().ok_or(SchemaError::NotAMapping)?;

    match root.get("version") {
        Some(Value::String(v)) if v == POLICY_VERSION => {}
        other => {
            return Err(SchemaError::UnsupportedVersion {
                found: other.and_then(Value::as_str).map(str::to_string),
            })
        }
    }

    let requirements = section(root, "requirements")?;
    let signers = section(root, "allowed_signers")?;
    let constraints = section(root, "constraints")?;

    if !signers.is_sequence() {
        return Err(SchemaError::SignersNotAList);
    }
    if !has_key(requirements, "signature_required") {
        return Err(SchemaError::MissingRequirement("signature_required"));
    }
    if !has_key(constraints, "max_parameter_count") {
        return Err(SchemaError::MissingConstraint("max_parameter_count"));
    }

    serde_yaml::from_value(value).map_err(|e| SchemaError::InvalidField(e.to_string()))
}

fn section<'a>(root: &'a Mapping, key: &'static str) -> Result<&'a Value, SchemaError> {
    root.get(key).ok_or(SchemaError::MissingSection(key))
}

// A section that is not a mapping has no keys at all.
fn has_key(section: &Value, key: &str) -> bool {
    section
        .as_mapping()
        .map(|m| m.contains_key(key))
        .unwrap_or(false)
}
