//! Seeded random-operation harness.
//!
//! For each structure family the harness starts from an empty model and
//! applies a stream of random requests drawn from a ChaCha8 PRNG. After
//! every request it checks the trace shape and the new model's invariants,
//! and replays the request to confirm the trace fingerprint is identical.
//!
//! Reproducibility: the same `random_seed` generates the same requests and
//! therefore the same report.

use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use nexus_core::heap::{HeapKind, HeapModel};
use nexus_core::linear::{QueueModel, StackModel};
use nexus_core::list::ListModel;
use nexus_core::tree::{TreeKind, TreeModel};
use nexus_core::StructureModel;

use super::fingerprint::trace_fingerprint;
use super::invariants::{check_model, check_trace};
use super::{InvariantKind, InvariantViolation};
use crate::engine::Engine;
use crate::error::EngineError;
use crate::request::{HeapOp, ListOp, OperationRequest, QueueOp, StackOp, TreeOp};

/// Families the harness knows how to drive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Family {
    Bst,
    Avl,
    MinHeap,
    MaxHeap,
    List,
    Stack,
    Queue,
}

impl Family {
    pub const ALL: [Family; 7] = [
        Family::Bst,
        Family::Avl,
        Family::MinHeap,
        Family::MaxHeap,
        Family::List,
        Family::Stack,
        Family::Queue,
    ];

    fn empty_model(self) -> StructureModel {
        match self {
            Family::Bst => StructureModel::Tree(TreeModel::new(TreeKind::Bst)),
            Family::Avl => StructureModel::Tree(TreeModel::new(TreeKind::Avl)),
            Family::MinHeap => StructureModel::Heap(HeapModel::new(HeapKind::Min)),
            Family::MaxHeap => StructureModel::Heap(HeapModel::new(HeapKind::Max)),
            Family::List => StructureModel::List(ListModel::new()),
            Family::Stack => StructureModel::Stack(StackModel::with_capacity(8)),
            Family::Queue => StructureModel::Queue(QueueModel::with_capacity(8)),
        }
    }
}

/// Configuration for a property run.
#[derive(Debug, Clone)]
pub struct PropertyRunConfig {
    /// Independent runs per family, each from an empty model.
    pub iterations: u32,
    /// Requests applied per run.
    pub operations: u32,
    /// Random seed for reproducibility.
    pub random_seed: u64,
    /// Keys and values are drawn from `-key_range..=key_range`. A small
    /// range makes duplicates and misses likely.
    pub key_range: i64,
    pub families: Vec<Family>,
}

impl Default for PropertyRunConfig {
    fn default() -> Self {
        PropertyRunConfig {
            iterations: 16,
            operations: 64,
            random_seed: 0,
            key_range: 32,
            families: Family::ALL.to_vec(),
        }
    }
}

/// One failing request with the history that led to it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PropertyFailure {
    pub family: Family,
    pub iteration: u32,
    /// Every request of the run up to and including the failing one.
    pub history: Vec<OperationRequest>,
    pub violations: Vec<InvariantViolation>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PropertyReport {
    pub total_operations: u64,
    pub failures: Vec<PropertyFailure>,
    /// The seed used, for replay.
    pub random_seed: u64,
}

impl PropertyReport {
    pub fn passed(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Generates one random request for `family`.
pub fn random_request(family: Family, rng: &mut ChaCha8Rng, key_range: i64) -> OperationRequest {
    let key = rng.gen_range(-key_range..=key_range);
    match family {
        Family::Bst | Family::Avl => OperationRequest::Tree(match rng.gen_range(0..10) {
            0..=5 => TreeOp::Insert { key },
            6..=8 => TreeOp::Delete { key },
            _ => TreeOp::Find { key },
        }),
        Family::MinHeap | Family::MaxHeap => OperationRequest::Heap(match rng.gen_range(0..10) {
            0..=5 => HeapOp::Insert { value: key },
            6..=8 => HeapOp::ExtractRoot,
            _ => HeapOp::Peek,
        }),
        Family::List => OperationRequest::List(match rng.gen_range(0..10) {
            0..=2 => ListOp::InsertHead { value: key },
            3..=4 => ListOp::InsertTail { value: key },
            5 => ListOp::InsertAt {
                index: rng.gen_range(0..4),
                value: key,
            },
            6..=8 => ListOp::Delete { value: key },
            _ => ListOp::Search { value: key },
        }),
        Family::Stack => OperationRequest::Stack(match rng.gen_range(0..3) {
            0 => StackOp::Push { value: key },
            1 => StackOp::Pop,
            _ => StackOp::Peek,
        }),
        Family::Queue => OperationRequest::Queue(match rng.gen_range(0..3) {
            0 => QueueOp::Enqueue {
                message: format!("m{key}"),
            },
            1 => QueueOp::Dequeue,
            _ => QueueOp::Peek,
        }),
    }
}

/// Runs the harness.
///
/// Engine errors abort the run; invariant breaks are collected as
/// failures, and a run stops at its first failure.
pub fn run_property_checks(
    engine: &Engine,
    config: &PropertyRunConfig,
) -> Result<PropertyReport, EngineError> {
    let mut rng = ChaCha8Rng::seed_from_u64(config.random_seed);
    let mut failures = Vec::new();
    let mut total_operations: u64 = 0;

    for &family in &config.families {
        for iteration in 0..config.iterations {
            let mut model = family.empty_model();
            let mut history = Vec::with_capacity(config.operations as usize);
            for _ in 0..config.operations {
                let request = random_request(family, &mut rng, config.key_range);
                history.push(request.clone());
                total_operations += 1;

                let outcome = engine.execute(&model, &request)?;
                let mut violations = check_trace(&outcome);
                violations.extend(check_model(&outcome.new_model));

                let replay = engine.execute(&model, &request)?;
                if trace_fingerprint(&replay.trace)? != trace_fingerprint(&outcome.trace)? {
                    violations.push(InvariantViolation::new(
                        InvariantKind::Determinism,
                        None,
                        "replaying the request produced a different trace",
                    ));
                }

                if !violations.is_empty() {
                    tracing::warn!(?family, iteration, count = violations.len(), "invariant violated");
                    failures.push(PropertyFailure {
                        family,
                        iteration,
                        history,
                        violations,
                    });
                    break;
                }
                model = outcome.new_model;
            }
        }
    }

    Ok(PropertyReport {
        total_operations,
        failures,
        random_seed: config.random_seed,
    })
}
