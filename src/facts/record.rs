// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 CAB Ingénierie / Christophe ABOULICAM
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

/// Marker written in place of a count the verifier reported but that could
/// not be read as a non-negative integer
const UNREADABLE: &str = "unreadable";

/// Parameter count as reported by the verifier.
///
/// A reported value that is not a non-negative integer (a string, a
/// fractional or negative number, or one beyond `u64::MAX`) is kept as
/// `Unreadable` rather than dropped, so a policy ceiling denies it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParameterCount {
    Known(u64),
    Unreadable,
}

impl ParameterCount {
    pub fn from_value(value: &Value) -> Self {
        if let Some(count) = value.as_u64() {
            return ParameterCount::Known(count);
        }
        // Integral floats such as 2000000.0 are still a count.
        match value.as_f64() {
            Some(f) if f >= 0.0 && f.fract() == 0.0 && f < u64::MAX as f64 => {
                ParameterCount::Known(f as u64)
            }
            _ => ParameterCount::Unreadable,
        }
    }

    /// Whether the count fits under `max`. An unreadable count never does.
    pub fn within(&self, max: u64) -> bool {
        match self {
            ParameterCount::Known(count) => *count <= max,
            ParameterCount::Unreadable => false,
        }
    }
}

impl Serialize for ParameterCount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            ParameterCount::Known(count) => serializer.serialize_u64(*count),
            ParameterCount::Unreadable => serializer.serialize_str(UNREADABLE),
        }
    }
}

impl<'de> Deserialize<'de> for ParameterCount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Ok(ParameterCount::from_value(&value))
    }
}

/// Verified attributes of a model artifact, as reported by the verifier.
///
/// Every field defaults to its fail-closed value: `false` for the booleans,
/// `None` for the optional attributes. A parameter count that is present
/// but unreadable is [`ParameterCount::Unreadable`], not `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FactRecord {
    /// The artifact signature verified against the certificate
    #[serde(default)]
    pub signature_valid: bool,
    /// Public key of the signer, when one could be extracted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signer_public_key: Option<String>,
    /// Parameter count measured from the model weights
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameter_count: Option<ParameterCount>,
    /// The computed fingerprint equals the certified one
    #[serde(default)]
    pub fingerprint_match: bool,
}

impl FactRecord {
    /// Create a record with every fact at its fail-closed default
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_signature_valid(mut self, valid: bool) -> Self {
        self.signature_valid = valid;
        self
    }

    pub fn with_signer(mut self, public_key: impl Into<String>) -> Self {
        self.signer_public_key = Some(public_key.into());
        self
    }

    pub fn with_parameter_count(mut self, count: u64) -> Self {
        self.parameter_count = Some(ParameterCount::Known(count));
        self
    }

    pub fn with_unreadable_parameter_count(mut self) -> Self {
        self.parameter_count = Some(ParameterCount::Unreadable);
        self
    }

    pub fn with_fingerprint_match(mut self, matched: bool) -> Self {
        self.fingerprint_match = matched;
        self
    }

    /// Normalize untrusted verifier output.
    ///
    /// Missing fields and fields of the wrong type fall back to the
    /// fail-closed defaults. A missing or `null` parameter count is unknown;
    /// any other value that is not a count is unreadable. This never fails.
    pub fn from_value(value: &Value) -> Self {
        if !value.is_object() {
            tracing::warn!("verifier output is not an object, treating every fact as unknown");
        }

        Self {
            signature_valid: value
                .get("signature_valid")
                .and_then(Value::as_bool)
                .unwrap_or(false),
            signer_public_key: value
                .get("signer_public_key")
                .and_then(Value::as_str)
                .map(str::to_string),
            parameter_count: match value.get("parameter_count") {
                None | Some(Value::Null) => None,
                Some(raw) => {
                    let count = ParameterCount::from_value(raw);
                    if count == ParameterCount::Unreadable {
                        tracing::warn!(parameter_count = %raw, "unreadable parameter count");
                    }
                    Some(count)
                }
            },
            fingerprint_match: value
                .get("fingerprint_match")
                .and_then(Value::as_bool)
                .unwrap_or(false),
        }
    }

    /// Parse verifier output from JSON text, then normalize it
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let value: Value = serde_json::from_str(json)?;
        Ok(Self::from_value(&value))
    }
}
