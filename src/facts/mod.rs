// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 CAB Ingénierie / Christophe ABOULICAM
pub mod record;
pub mod verifier;

pub use record::{FactRecord, ParameterCount};
pub use verifier::{FactsFileVerifier, ModelVerifier, StaticVerifier, VerifierError};
