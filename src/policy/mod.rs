// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 CAB Ingénierie / Christophe ABOULICAM
pub mod check;
pub mod config;
pub mod decision;
pub mod engine;
pub mod loader;

pub use check::{Check, CheckFailure};
pub use config::{AllowedSigner, Constraints, PolicyDocument, Requirements, POLICY_VERSION};
pub use decision::{Decision, Verdict};
pub use engine::{evaluate, failed_checks, PolicyEngine, POLICY_SATISFIED};
pub use loader::{load_policy, load_policy_file, load_policy_value, SchemaError};
