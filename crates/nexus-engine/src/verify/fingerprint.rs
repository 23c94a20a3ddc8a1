//! Deterministic trace fingerprints.
//!
//! A fingerprint is the BLAKE3 hash of the canonical JSON encoding. Every
//! map in the models is ordered (`BTreeMap` or `IndexMap`), so equal traces
//! always hash equally. Used to check that replaying a request reproduces
//! the exact same trace.

use serde::Serialize;

use nexus_core::{Outcome, Trace};

use crate::error::EngineError;

pub fn trace_fingerprint<M: Serialize>(trace: &Trace<M>) -> Result<blake3::Hash, EngineError> {
    let bytes = serde_json::to_vec(trace)?;
    Ok(blake3::hash(&bytes))
}

/// Hash over the new model followed by the trace.
pub fn outcome_fingerprint<M: Serialize>(outcome: &Outcome<M>) -> Result<blake3::Hash, EngineError> {
    let mut hasher = blake3::Hasher::new();
    hasher.update(&serde_json::to_vec(&outcome.new_model)?);
    hasher.update(&serde_json::to_vec(&outcome.trace)?);
    Ok(hasher.finalize())
}
