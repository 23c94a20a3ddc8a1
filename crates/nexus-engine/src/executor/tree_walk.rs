//! Search-tree moves shared by the plain and AVL executors: descent with
//! compare steps, lookup, structural unlinking, and traversal.

use std::cmp::Ordering;

use nexus_core::tree::{Side, TraversalOrder, TreeKind, TreeModel, TreeNode};
use nexus_core::{NodeId, Phase};

use crate::error::EngineError;
use crate::recorder::TraceRecorder;

pub(crate) type TreeRecorder = TraceRecorder<TreeModel>;

/// Where a descent for `key` stopped.
pub(crate) enum Descent {
    /// The tree has no nodes.
    Empty,
    /// A node already holds the key.
    Found(NodeId),
    /// The key belongs in the empty `side` slot of `parent`.
    Vacant { parent: NodeId, side: Side },
}

pub(crate) fn lookup(tree: &TreeModel, id: NodeId) -> Result<&TreeNode, EngineError> {
    tree.node(id).ok_or(EngineError::MissingNode { node: id })
}

pub(crate) fn key_of(tree: &TreeModel, id: NodeId) -> Result<i64, EngineError> {
    Ok(lookup(tree, id)?.key)
}

pub(crate) fn require_kind(
    tree: &TreeModel,
    kind: TreeKind,
    executor: &'static str,
) -> Result<(), EngineError> {
    if tree.kind == kind {
        return Ok(());
    }
    Err(EngineError::TreeKindMismatch {
        executor,
        kind: match tree.kind {
            TreeKind::Bst => "bst",
            TreeKind::Avl => "avl",
        },
    })
}

/// Walks from the root towards `key`, recording one `Compare` step per node
/// visited.
pub(crate) fn descend(
    rec: &mut TreeRecorder,
    tree: &TreeModel,
    key: i64,
) -> Result<Descent, EngineError> {
    let Some(mut cursor) = tree.root else {
        return Ok(Descent::Empty);
    };
    loop {
        let node = lookup(tree, cursor)?;
        let (next, side, symbol) = match key.cmp(&node.key) {
            Ordering::Equal => {
                rec.record(
                    Phase::Compare,
                    [cursor],
                    tree,
                    format!("{key} = {}", node.key),
                )?;
                return Ok(Descent::Found(cursor));
            }
            Ordering::Less => (node.left, Side::Left, '<'),
            Ordering::Greater => (node.right, Side::Right, '>'),
        };
        rec.record(
            Phase::Compare,
            [cursor],
            tree,
            format!("{key} {symbol} {}: go {side}", node.key),
        )?;
        match next {
            Some(child) => cursor = child,
            None => {
                return Ok(Descent::Vacant {
                    parent: cursor,
                    side,
                })
            }
        }
    }
}

/// Attaches a fresh leaf for `key` at the spot a descent found, refreshes
/// heights, and records the `Link` step. Returns the new node's id.
pub(crate) fn attach(
    rec: &mut TreeRecorder,
    tree: &mut TreeModel,
    key: i64,
    spot: Option<(NodeId, Side)>,
) -> Result<NodeId, EngineError> {
    let id = tree.allocate_leaf(key)?;
    match spot {
        None => {
            tree.root = Some(id);
            rec.record(
                Phase::Link,
                [id],
                tree,
                format!("Tree is empty: {key} becomes the root"),
            )?;
        }
        Some((parent, side)) => {
            tree.set_child(parent, side, Some(id));
            tree.refresh_heights_upward(Some(parent));
            let parent_key = key_of(tree, parent)?;
            rec.record(
                Phase::Link,
                [parent, id],
                tree,
                format!("Attach {key} as the {side} child of {parent_key}"),
            )?;
        }
    }
    Ok(id)
}

/// Records the outcome of a lookup for `key`.
pub(crate) fn find(rec: &mut TreeRecorder, tree: &TreeModel, key: i64) -> Result<(), EngineError> {
    match descend(rec, tree, key)? {
        Descent::Empty => rec.record(
            Phase::NotFound,
            [],
            tree,
            format!("Tree is empty: {key} is not present"),
        ),
        Descent::Found(id) => rec.record(Phase::Found, [id], tree, format!("Found {key}")),
        Descent::Vacant { parent, side } => {
            let parent_key = key_of(tree, parent)?;
            rec.record(
                Phase::NotFound,
                [parent],
                tree,
                format!("{parent_key} has no {side} child: {key} is not in the tree"),
            )
        }
    }
}

/// Removes `target` from the tree, recording successor search, key
/// replacement, and unlink steps. Returns the deepest node whose subtree
/// changed, where height refresh or rebalancing should start.
pub(crate) fn unlink(
    rec: &mut TreeRecorder,
    tree: &mut TreeModel,
    target: NodeId,
) -> Result<Option<NodeId>, EngineError> {
    let node = lookup(tree, target)?.clone();
    match (node.left, node.right) {
        (Some(_), Some(right)) => {
            rec.record(
                Phase::SuccessorSearch,
                [target, right],
                tree,
                format!(
                    "{} has two children: look for its in-order successor in the right subtree",
                    node.key
                ),
            )?;
            let mut successor = right;
            while let Some(left) = tree.child(successor, Side::Left) {
                let (from, to) = (key_of(tree, successor)?, key_of(tree, left)?);
                rec.record(
                    Phase::SuccessorSearch,
                    [successor, left],
                    tree,
                    format!("{from} has a left child: move left to {to}"),
                )?;
                successor = left;
            }
            let heir = lookup(tree, successor)?.clone();
            rec.record(
                Phase::SuccessorSearch,
                [successor],
                tree,
                format!("{} has no left child: it is the successor", heir.key),
            )?;

            if let Some(slot) = tree.node_mut(target) {
                slot.key = heir.key;
            }
            rec.record(
                Phase::Replace,
                [target, successor],
                tree,
                format!("Copy successor key {} over {}", heir.key, node.key),
            )?;

            tree.replace_in_parent(successor, heir.right);
            tree.remove_node(successor);
            tree.refresh_heights_upward(heir.parent);
            let highlighted: Vec<NodeId> = heir.parent.into_iter().chain(heir.right).collect();
            let description = match heir.right.and_then(|r| tree.key(r)) {
                Some(k) => format!("Unlink the old successor node; its right child {k} moves up"),
                None => "Unlink the old successor leaf".to_string(),
            };
            rec.record(Phase::Unlink, highlighted, tree, description)?;
            Ok(heir.parent)
        }
        (child, None) | (None, child) => {
            tree.replace_in_parent(target, child);
            tree.remove_node(target);
            tree.refresh_heights_upward(node.parent);
            let highlighted: Vec<NodeId> = node.parent.into_iter().chain(child).collect();
            let description = match child.and_then(|c| tree.key(c)) {
                Some(k) => format!("Unlink {}: its only child {k} takes its place", node.key),
                None => format!("Unlink leaf {}", node.key),
            };
            rec.record(Phase::Unlink, highlighted, tree, description)?;
            Ok(node.parent)
        }
    }
}

/// Records one `Visit` step per node in `order` and returns the visited keys.
pub(crate) fn traverse(
    rec: &mut TreeRecorder,
    tree: &TreeModel,
    order: TraversalOrder,
) -> Result<Vec<i64>, EngineError> {
    let ids = tree.traversal(order);
    let mut keys = Vec::with_capacity(ids.len());
    for (position, id) in ids.into_iter().enumerate() {
        let key = key_of(tree, id)?;
        keys.push(key);
        rec.record(
            Phase::Visit,
            [id],
            tree,
            format!("Visit {key} ({order} #{})", position + 1),
        )?;
    }
    Ok(keys)
}

pub(crate) fn join_keys(keys: &[i64]) -> String {
    keys.iter()
        .map(i64::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
