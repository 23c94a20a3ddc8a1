//! Structural invariant checks for completed operations.
//!
//! Snapshots inside a trace may legitimately break these (a heap mid-sift,
//! a tree between rotations); only the `new_model` of an outcome is
//! expected to satisfy them.

use nexus_core::heap::{parent_index, HeapModel};
use nexus_core::huffman::HuffmanForest;
use nexus_core::polynomial::ProductModel;
use nexus_core::tree::{TreeKind, TreeModel};
use nexus_core::{NodeId, Outcome, StructureModel};

use super::{InvariantKind, InvariantViolation};

/// Every applicable check for `model`. Empty means healthy.
pub fn check_model(model: &StructureModel) -> Vec<InvariantViolation> {
    if let Err(err) = model.validate() {
        return vec![InvariantViolation::new(
            InvariantKind::Structure,
            None,
            err.to_string(),
        )];
    }
    match model {
        StructureModel::Tree(tree) => check_tree(tree),
        StructureModel::Heap(heap) => check_heap_order(heap),
        StructureModel::Huffman(forest) => check_prefix_codes(forest),
        StructureModel::Polynomial(product) => check_product_terms(product),
        StructureModel::List(_)
        | StructureModel::Stack(_)
        | StructureModel::Queue(_)
        | StructureModel::Graph(_)
        | StructureModel::Expression(_) => Vec::new(),
    }
}

/// Search order and cached heights, plus balance for AVL trees.
pub fn check_tree(tree: &TreeModel) -> Vec<InvariantViolation> {
    let mut out = check_search_order(tree);
    let mut walker = HeightWalk {
        tree,
        out: &mut out,
    };
    walker.height(tree.root);
    out
}

pub fn check_search_order(tree: &TreeModel) -> Vec<InvariantViolation> {
    let mut out = Vec::new();
    let ids = tree.traversal(nexus_core::tree::TraversalOrder::InOrder);
    for pair in ids.windows(2) {
        let (Some(a), Some(b)) = (tree.key(pair[0]), tree.key(pair[1])) else {
            continue;
        };
        if a >= b {
            out.push(InvariantViolation::new(
                InvariantKind::SearchOrder,
                Some(pair[1]),
                format!("in-order walk reaches {b} after {a}"),
            ));
        }
    }
    out
}

/// Recomputes heights bottom-up, comparing with the cache and, for AVL
/// trees, checking every balance factor.
struct HeightWalk<'a> {
    tree: &'a TreeModel,
    out: &'a mut Vec<InvariantViolation>,
}

impl HeightWalk<'_> {
    fn height(&mut self, id: Option<NodeId>) -> u32 {
        let Some(node) = id.and_then(|id| self.tree.node(id)) else {
            return 0;
        };
        let left = self.height(node.left);
        let right = self.height(node.right);
        let actual = 1 + left.max(right);
        if node.height != actual {
            self.out.push(InvariantViolation::new(
                InvariantKind::HeightCache,
                Some(node.id),
                format!("node {} caches height {} but is {actual} high", node.key, node.height),
            ));
        }
        let balance = i64::from(left) - i64::from(right);
        if self.tree.kind == TreeKind::Avl && balance.abs() > 1 {
            self.out.push(InvariantViolation::new(
                InvariantKind::AvlBalance,
                Some(node.id),
                format!("node {} has balance factor {balance:+}", node.key),
            ));
        }
        actual
    }
}

pub fn check_heap_order(heap: &HeapModel) -> Vec<InvariantViolation> {
    let mut out = Vec::new();
    for (slot, entry) in heap.slots.iter().enumerate() {
        let Some(parent) = parent_index(slot).and_then(|p| heap.slots.get(p)) else {
            continue;
        };
        if !heap.kind.holds(parent.value, entry.value) {
            out.push(InvariantViolation::new(
                InvariantKind::HeapOrder,
                Some(entry.id),
                format!("{} at index {slot} beats its parent {}", entry.value, parent.value),
            ));
        }
    }
    out
}

pub fn check_prefix_codes(forest: &HuffmanForest) -> Vec<InvariantViolation> {
    let mut out = Vec::new();
    let codes: Vec<(&String, &String)> = forest.codes.iter().collect();
    for (i, (sym_a, code_a)) in codes.iter().enumerate() {
        for (sym_b, code_b) in codes.iter().skip(i + 1) {
            if code_a.starts_with(code_b.as_str()) || code_b.starts_with(code_a.as_str()) {
                out.push(InvariantViolation::new(
                    InvariantKind::PrefixCode,
                    None,
                    format!("codes of '{sym_a}' ({code_a}) and '{sym_b}' ({code_b}) overlap"),
                ));
            }
        }
    }
    out
}

pub fn check_product_terms(product: &ProductModel) -> Vec<InvariantViolation> {
    let mut out = Vec::new();
    for pair in product.result.windows(2) {
        if pair[1].exponent >= pair[0].exponent {
            out.push(InvariantViolation::new(
                InvariantKind::TermOrder,
                Some(pair[1].id),
                format!("{} follows {}", pair[1], pair[0]),
            ));
        }
    }
    for term in product.result.iter().filter(|t| t.coefficient == 0) {
        out.push(InvariantViolation::new(
            InvariantKind::TermOrder,
            Some(term.id),
            format!("zero term x^{} kept", term.exponent),
        ));
    }
    out
}

/// Trace shape: at least one step, indices `0..n`, and the last snapshot
/// equal to the returned model.
pub fn check_trace<M: PartialEq>(outcome: &Outcome<M>) -> Vec<InvariantViolation> {
    let mut out = Vec::new();
    if outcome.trace.is_empty() {
        out.push(InvariantViolation::new(
            InvariantKind::TraceShape,
            None,
            "trace has no steps",
        ));
        return out;
    }
    for (expected, step) in outcome.trace.iter().enumerate() {
        if step.index != expected {
            out.push(InvariantViolation::new(
                InvariantKind::TraceShape,
                None,
                format!("step {expected} is numbered {}", step.index),
            ));
        }
    }
    if !outcome.is_complete() {
        out.push(InvariantViolation::new(
            InvariantKind::TraceShape,
            None,
            "last snapshot differs from the returned model",
        ));
    }
    out
}
