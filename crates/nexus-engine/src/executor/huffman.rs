//! Huffman coding tree construction.
//!
//! Trees wait in a min-priority queue keyed by `(frequency, order)`, where
//! `order` is the creation ordinal: leaves take their input position, and
//! each merged node takes the next ordinal after all existing nodes. Equal
//! frequencies therefore resolve in favour of the older tree, and the first
//! tree popped becomes the left (`0`) child.

use std::cmp::Reverse;
use std::collections::{BTreeMap, BinaryHeap};

use indexmap::IndexMap;

use nexus_core::huffman::{HuffmanForest, HuffmanNode};
use nexus_core::{NodeId, Outcome, Phase};

use super::Executor;
use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::recorder::TraceRecorder;
use crate::request::HuffmanOp;

type Queue = BinaryHeap<Reverse<(u64, u64, NodeId)>>;

#[derive(Debug, Clone, Default)]
pub struct HuffmanExecutor {
    config: EngineConfig,
}

impl HuffmanExecutor {
    pub fn new(config: EngineConfig) -> Self {
        HuffmanExecutor { config }
    }

    /// Builds the coding tree for `frequencies` and assigns every symbol its
    /// code. Map order decides ties between equal frequencies.
    pub fn build(
        &self,
        frequencies: &IndexMap<String, u64>,
    ) -> Result<Outcome<HuffmanForest>, EngineError> {
        let mut rec = TraceRecorder::new(&self.config);
        let mut forest = HuffmanForest::new();

        if frequencies.is_empty() {
            rec.record(Phase::Error, [], &forest, "No symbols given: nothing to encode")?;
            return Ok(rec.finish(forest));
        }

        let mut queue = Queue::new();
        let mut order = 0u64;
        for (symbol, &frequency) in frequencies {
            let id = forest.ids.allocate()?;
            forest.nodes.insert(
                id,
                HuffmanNode {
                    id,
                    symbol: Some(symbol.clone()),
                    frequency,
                    order,
                    left: None,
                    right: None,
                },
            );
            queue.push(Reverse((frequency, order, id)));
            order += 1;
        }
        forest.roots = pending(&queue);
        let leaves: Vec<NodeId> = forest.nodes.keys().copied().collect();
        let listing = leaves
            .iter()
            .map(|id| forest.label(*id))
            .collect::<Vec<_>>()
            .join(", ");
        rec.record(
            Phase::Initialize,
            leaves,
            &forest,
            format!("One leaf per symbol: {listing}"),
        )?;

        if forest.nodes.len() == 1 {
            if let Some((symbol, _)) = frequencies.first() {
                forest.codes.insert(symbol.clone(), String::new());
            }
            let only = forest.roots.clone();
            rec.record(
                Phase::Degenerate,
                only,
                &forest,
                "Only one symbol: the tree is a single leaf and its code is empty",
            )?;
            return Ok(rec.finish(forest));
        }

        while queue.len() > 1 {
            let (Some(Reverse((f1, _, a))), Some(Reverse((f2, _, b)))) = (queue.pop(), queue.pop())
            else {
                break;
            };
            let Some(frequency) = f1.checked_add(f2) else {
                rec.record(
                    Phase::Error,
                    [a, b],
                    &forest,
                    format!(
                        "Merging {} and {} overflows the frequency range",
                        forest.label(a),
                        forest.label(b)
                    ),
                )?;
                return Ok(rec.finish(forest));
            };
            let parent = forest.ids.allocate()?;
            forest.nodes.insert(
                parent,
                HuffmanNode {
                    id: parent,
                    symbol: None,
                    frequency,
                    order,
                    left: Some(a),
                    right: Some(b),
                },
            );
            queue.push(Reverse((frequency, order, parent)));
            order += 1;
            forest.roots = pending(&queue);
            let description = format!(
                "Merge the two lightest trees {} and {} into a node of weight {frequency}",
                forest.label(a),
                forest.label(b)
            );
            rec.record(Phase::Merge, [a, b, parent], &forest, description)?;
        }

        let root = forest.root().ok_or(EngineError::MissingNode {
            node: forest.ids.peek(),
        })?;
        let codes = collect_codes(&forest, root);
        for symbol in frequencies.keys() {
            let Some((leaf, code)) = codes.get(symbol) else {
                continue;
            };
            forest.codes.insert(symbol.clone(), code.clone());
            rec.record(
                Phase::AssignCode,
                [*leaf],
                &forest,
                format!("{symbol} → {code}"),
            )?;
        }

        rec.record(
            Phase::Done,
            [root],
            &forest,
            format!(
                "Huffman tree complete: {} bits for the weighted message",
                forest.weighted_length()
            ),
        )?;
        Ok(rec.finish(forest))
    }
}

impl Executor for HuffmanExecutor {
    type Model = HuffmanForest;
    type Request = HuffmanOp;

    fn config(&self) -> &EngineConfig {
        &self.config
    }

    fn execute(
        &self,
        _model: &HuffmanForest,
        request: &HuffmanOp,
    ) -> Result<Outcome<HuffmanForest>, EngineError> {
        match request {
            HuffmanOp::Build { frequencies } => self.build(frequencies),
        }
    }
}

/// Queue contents in pop order.
fn pending(queue: &Queue) -> Vec<NodeId> {
    let mut entries: Vec<(u64, u64, NodeId)> = queue.iter().map(|Reverse(e)| *e).collect();
    entries.sort();
    entries.into_iter().map(|(_, _, id)| id).collect()
}

/// Symbol to `(leaf id, code)`; left edges are `0`, right edges `1`.
fn collect_codes(forest: &HuffmanForest, root: NodeId) -> BTreeMap<String, (NodeId, String)> {
    let mut codes = BTreeMap::new();
    let mut stack = vec![(root, String::new())];
    while let Some((id, prefix)) = stack.pop() {
        let Some(node) = forest.node(id) else {
            continue;
        };
        if let Some(symbol) = &node.symbol {
            codes.insert(symbol.clone(), (id, prefix));
            continue;
        }
        if let Some(right) = node.right {
            stack.push((right, format!("{prefix}1")));
        }
        if let Some(left) = node.left {
            stack.push((left, format!("{prefix}0")));
        }
    }
    codes
}
