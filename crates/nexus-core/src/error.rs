//! Core error types for nexus-core.
//!
//! Uses `thiserror` for structured, matchable variants. Every variant here
//! describes a malformed model handed in by the caller, never a learner
//! mistake: learner mistakes are reported inside the trace instead.

use crate::id::NodeId;
use thiserror::Error;

/// Structural contract violations detected by [`Structure::validate`].
///
/// [`Structure::validate`]: crate::model::Structure::validate
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    /// A relation points at an id that is not part of the same model.
    #[error("dangling relation: node {from} refers to missing node {to}")]
    DanglingRelation { from: NodeId, to: NodeId },

    /// The root/head id is set but not present in the model.
    #[error("root {id} is not present in the model")]
    MissingRoot { id: NodeId },

    /// The same id appears twice.
    #[error("duplicate node id {id}")]
    DuplicateId { id: NodeId },

    /// A node's stored id disagrees with the key it is filed under.
    #[error("node filed under {key} carries id {actual}")]
    MisfiledNode { key: NodeId, actual: NodeId },

    /// Parent/child or next relations do not form the expected shape.
    #[error("inconsistent structure at node {node}: {reason}")]
    Inconsistent { node: NodeId, reason: String },

    /// The id allocator would hand out an id that is already in use.
    #[error("id allocator is behind: next id {next} already in use")]
    StaleAllocator { next: NodeId },

    /// Every `u32` id has been handed out.
    #[error("no node ids left to allocate")]
    IdsExhausted,

    /// A bounded structure holds more items than its capacity.
    #[error("capacity {capacity} exceeded: holds {len} items")]
    CapacityExceeded { capacity: usize, len: usize },

    /// Polynomial terms are not strictly descending by exponent.
    #[error("polynomial terms out of order at exponent {exponent}")]
    TermOrder { exponent: u32 },
}
