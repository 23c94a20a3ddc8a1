//! Steps, traces, and operation outcomes.
//!
//! A [`Step`] is one renderable moment of an operation: a full snapshot of the
//! model plus the phase being illustrated, the highlighted node ids, and a
//! short description. A [`Trace`] is the ordered list of steps for a single
//! operation call, and an [`Outcome`] pairs that trace with the new model.

use std::fmt;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::id::NodeId;

/// Highlighted ids of one step. Most steps touch at most a handful of nodes.
pub type Highlight = SmallVec<[NodeId; 4]>;

/// The part of an algorithm a step illustrates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Phase {
    // Search trees
    Compare,
    Found,
    NotFound,
    Duplicate,
    Link,
    Unlink,
    Replace,
    SuccessorSearch,
    Balance,
    Imbalance,
    RotateLeft,
    RotateRight,
    Visit,

    // Heap
    Append,
    Swap,
    ExtractRoot,

    // Shortest paths
    Initialize,
    ExtractMin,
    RelaxEdge,
    RelaxNoOp,
    Unreachable,

    // Huffman
    Merge,
    Degenerate,
    AssignCode,

    // Stack, queue, expression conversion
    ReadToken,
    Push,
    Pop,
    Peek,
    Emit,
    Enqueue,
    Dequeue,
    Blocked,

    // Polynomial
    Multiply,
    Combine,
    Normalize,

    // Terminal
    Rejected,
    Error,
    Done,
}

impl Phase {
    /// The kebab-case name used on the wire.
    pub fn as_str(self) -> &'static str {
        match self {
            Phase::Compare => "compare",
            Phase::Found => "found",
            Phase::NotFound => "not-found",
            Phase::Duplicate => "duplicate",
            Phase::Link => "link",
            Phase::Unlink => "unlink",
            Phase::Replace => "replace",
            Phase::SuccessorSearch => "successor-search",
            Phase::Balance => "balance",
            Phase::Imbalance => "imbalance",
            Phase::RotateLeft => "rotate-left",
            Phase::RotateRight => "rotate-right",
            Phase::Visit => "visit",
            Phase::Append => "append",
            Phase::Swap => "swap",
            Phase::ExtractRoot => "extract-root",
            Phase::Initialize => "initialize",
            Phase::ExtractMin => "extract-min",
            Phase::RelaxEdge => "relax-edge",
            Phase::RelaxNoOp => "relax-no-op",
            Phase::Unreachable => "unreachable",
            Phase::Merge => "merge",
            Phase::Degenerate => "degenerate",
            Phase::AssignCode => "assign-code",
            Phase::ReadToken => "read-token",
            Phase::Push => "push",
            Phase::Pop => "pop",
            Phase::Peek => "peek",
            Phase::Emit => "emit",
            Phase::Enqueue => "enqueue",
            Phase::Dequeue => "dequeue",
            Phase::Blocked => "blocked",
            Phase::Multiply => "multiply",
            Phase::Combine => "combine",
            Phase::Normalize => "normalize",
            Phase::Rejected => "rejected",
            Phase::Error => "error",
            Phase::Done => "done",
        }
    }

    /// Whether this phase reports a learner-input problem or a refused
    /// operation rather than progress.
    pub fn is_refusal(self) -> bool {
        matches!(
            self,
            Phase::Duplicate | Phase::NotFound | Phase::Rejected | Phase::Blocked | Phase::Error
        )
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One immutable snapshot + annotation inside a trace.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Step<M> {
    /// Position in the trace, starting at 0.
    pub index: usize,
    /// What the algorithm is doing at this moment.
    pub phase: Phase,
    /// Nodes the renderer should emphasise.
    pub highlighted: Highlight,
    /// Full model state at this moment. May violate the structure's
    /// invariants mid-operation.
    pub snapshot: M,
    /// Short human-readable explanation.
    pub description: String,
}

impl<M> Step<M> {
    /// Converts the snapshot, keeping every other field.
    pub fn map<N>(self, f: impl FnOnce(M) -> N) -> Step<N> {
        Step {
            index: self.index,
            phase: self.phase,
            highlighted: self.highlighted,
            snapshot: f(self.snapshot),
            description: self.description,
        }
    }
}

/// The ordered steps of one operation call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Trace<M> {
    steps: Vec<Step<M>>,
}

impl<M> Trace<M> {
    /// Wraps already-indexed steps.
    pub fn from_steps(steps: Vec<Step<M>>) -> Self {
        Trace { steps }
    }

    pub fn steps(&self) -> &[Step<M>] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn first(&self) -> Option<&Step<M>> {
        self.steps.first()
    }

    pub fn last(&self) -> Option<&Step<M>> {
        self.steps.last()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Step<M>> {
        self.steps.iter()
    }

    /// Phases in trace order, handy for assertions and summaries.
    pub fn phases(&self) -> Vec<Phase> {
        self.steps.iter().map(|s| s.phase).collect()
    }

    /// The phase of the final step.
    pub fn terminal_phase(&self) -> Option<Phase> {
        self.steps.last().map(|s| s.phase)
    }

    /// Number of steps tagged with `phase`.
    pub fn count(&self, phase: Phase) -> usize {
        self.steps.iter().filter(|s| s.phase == phase).count()
    }

    pub fn into_steps(self) -> Vec<Step<M>> {
        self.steps
    }

    /// Converts every snapshot, e.g. to lift a typed trace into
    /// [`StructureModel`](crate::model::StructureModel).
    pub fn map<N>(self, f: impl Fn(M) -> N) -> Trace<N> {
        Trace {
            steps: self.steps.into_iter().map(|s| s.map(&f)).collect(),
        }
    }
}

impl<'a, M> IntoIterator for &'a Trace<M> {
    type Item = &'a Step<M>;
    type IntoIter = std::slice::Iter<'a, Step<M>>;

    fn into_iter(self) -> Self::IntoIter {
        self.steps.iter()
    }
}

/// The result of one operation: the new model and the trace that led to it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Outcome<M> {
    pub new_model: M,
    pub trace: Trace<M>,
}

impl<M> Outcome<M> {
    pub fn map<N>(self, f: impl Fn(M) -> N) -> Outcome<N> {
        Outcome {
            new_model: f(self.new_model),
            trace: self.trace.map(f),
        }
    }
}

impl<M: PartialEq> Outcome<M> {
    /// True when the last snapshot equals the returned model.
    pub fn is_complete(&self) -> bool {
        self.trace
            .last()
            .is_some_and(|step| step.snapshot == self.new_model)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use smallvec::smallvec;

    fn step(index: usize, phase: Phase, snapshot: u32) -> Step<u32> {
        Step {
            index,
            phase,
            highlighted: smallvec![NodeId(1)],
            snapshot,
            description: String::new(),
        }
    }

    #[test]
    fn phase_serializes_kebab_case() {
        let json = serde_json::to_string(&Phase::RotateLeft).unwrap();
        assert_eq!(json, "\"rotate-left\"");
        assert_eq!(Phase::RelaxNoOp.to_string(), "relax-no-op");
    }

    #[test]
    fn phase_names_match_serde() {
        for phase in [Phase::SuccessorSearch, Phase::ExtractMin, Phase::AssignCode, Phase::NotFound] {
            let json = serde_json::to_string(&phase).unwrap();
            assert_eq!(json.trim_matches('"'), phase.as_str());
        }
    }

    #[test]
    fn trace_serializes_as_array() {
        let trace = Trace::from_steps(vec![step(0, Phase::Done, 5)]);
        let json = serde_json::to_value(&trace).unwrap();
        assert!(json.is_array());
        assert_eq!(json[0]["phase"], "done");
        assert_eq!(json[0]["highlighted"][0], 1);
    }

    #[test]
    fn outcome_uses_camel_case_model_field() {
        let outcome = Outcome {
            new_model: 5u32,
            trace: Trace::from_steps(vec![step(0, Phase::Done, 5)]),
        };
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["newModel"], 5);
        assert!(outcome.is_complete());
    }

    #[test]
    fn outcome_incomplete_when_last_snapshot_differs() {
        let outcome = Outcome {
            new_model: 6u32,
            trace: Trace::from_steps(vec![step(0, Phase::Swap, 5)]),
        };
        assert!(!outcome.is_complete());
    }

    #[test]
    fn map_preserves_indices_and_phases() {
        let trace = Trace::from_steps(vec![step(0, Phase::Compare, 1), step(1, Phase::Done, 2)]);
        let mapped = trace.map(|n| n * 10);
        assert_eq!(mapped.phases(), vec![Phase::Compare, Phase::Done]);
        assert_eq!(mapped.steps()[1].snapshot, 20);
        assert_eq!(mapped.steps()[1].index, 1);
    }

    #[test]
    fn refusal_phases() {
        assert!(Phase::Blocked.is_refusal());
        assert!(!Phase::Swap.is_refusal());
    }
}
