//! Verification helpers: structural invariant checks, a seeded random
//! operation harness, and trace fingerprints.
//!
//! None of this runs inside an operation. Executors trust their own
//! algorithms; these checks exist for tests and for the `nexus check`
//! command.

pub mod fingerprint;
pub mod invariants;
pub mod property;

use serde::{Deserialize, Serialize};

use nexus_core::NodeId;

/// The family of invariant that was broken.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum InvariantKind {
    /// Relations do not resolve or do not agree (see `Structure::validate`).
    Structure,
    /// An in-order walk of a search tree is not strictly ascending.
    SearchOrder,
    /// A cached subtree height disagrees with the actual height.
    HeightCache,
    /// An AVL node's balance factor is outside `[-1, 1]`.
    AvlBalance,
    /// A heap child beats its parent.
    HeapOrder,
    /// One Huffman code is a prefix of another.
    PrefixCode,
    /// Product terms are unsorted, repeat an exponent, or keep a zero.
    TermOrder,
    /// The trace is empty, misnumbered, or does not end on the new model.
    TraceShape,
    /// Running the same request twice produced different traces.
    Determinism,
}

/// A structured invariant violation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvariantViolation {
    pub kind: InvariantKind,
    /// The offending node, when one can be named.
    pub node: Option<NodeId>,
    pub message: String,
}

impl InvariantViolation {
    pub fn new(kind: InvariantKind, node: Option<NodeId>, message: impl Into<String>) -> Self {
        InvariantViolation {
            kind,
            node,
            message: message.into(),
        }
    }
}
