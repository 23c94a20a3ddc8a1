//! Engine error types.
//!
//! Errors here mean the operation could not be traced at all: the model
//! handed in was malformed, the request does not fit the model, or the trace
//! grew past its budget. Learner mistakes (duplicate keys, empty
//! structures, bad tokens) are never errors; they show up as refusal steps
//! inside the trace.

use nexus_core::{CoreError, NodeId};

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("invalid model: {0}")]
    InvalidModel(#[from] CoreError),

    #[error("{request} request cannot run against a {structure} model")]
    StructureMismatch {
        request: &'static str,
        structure: &'static str,
    },

    #[error("{executor} executor cannot run on a {kind} tree")]
    TreeKindMismatch {
        executor: &'static str,
        kind: &'static str,
    },

    #[error("step limit ({limit}) exceeded")]
    StepLimitExceeded { limit: usize },

    #[error("node {node} vanished mid-operation")]
    MissingNode { node: NodeId },

    #[error("serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}
