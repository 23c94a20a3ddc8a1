//! Self-balancing (AVL) tree executor.
//!
//! Insert and delete reuse the plain search-tree moves, then walk back up
//! from the deepest changed node. Every ancestor gets a `Balance` step; an
//! ancestor whose balance factor leaves `[-1, 1]` gets an `Imbalance` step
//! followed by one or two rotation steps:
//!
//! | case | trigger                          | rotations                       |
//! |------|----------------------------------|---------------------------------|
//! | LL   | bf > 1, bf(left) >= 0            | right at node                   |
//! | LR   | bf > 1, bf(left) < 0             | left at left child, right at node |
//! | RR   | bf < -1, bf(right) <= 0          | left at node                    |
//! | RL   | bf < -1, bf(right) > 0           | right at right child, left at node |

use nexus_core::tree::{Side, TraversalOrder, TreeKind, TreeModel};
use nexus_core::{NodeId, Outcome, Phase};

use super::tree_walk::{self, Descent, TreeRecorder};
use super::Executor;
use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::recorder::TraceRecorder;
use crate::request::TreeOp;

#[derive(Debug, Clone, Default)]
pub struct AvlExecutor {
    config: EngineConfig,
}

impl AvlExecutor {
    pub fn new(config: EngineConfig) -> Self {
        AvlExecutor { config }
    }

    fn begin(&self, model: &TreeModel) -> Result<(TreeRecorder, TreeModel), EngineError> {
        model.validate()?;
        tree_walk::require_kind(model, TreeKind::Avl, "avl")?;
        Ok((TraceRecorder::new(&self.config), model.clone()))
    }

    pub fn insert(&self, model: &TreeModel, key: i64) -> Result<Outcome<TreeModel>, EngineError> {
        let (mut rec, mut tree) = self.begin(model)?;
        let spot = match tree_walk::descend(&mut rec, &tree, key)? {
            Descent::Found(id) => {
                rec.record(
                    Phase::Duplicate,
                    [id],
                    &tree,
                    format!("{key} is already in the tree: nothing inserted"),
                )?;
                return Ok(rec.finish(tree));
            }
            Descent::Empty => None,
            Descent::Vacant { parent, side } => Some((parent, side)),
        };
        let id = tree_walk::attach(&mut rec, &mut tree, key, spot)?;
        let parent = tree.parent(id);
        rebalance(&mut rec, &mut tree, parent)?;
        rec.record(
            Phase::Done,
            [id],
            &tree,
            format!("Inserted {key}: {}", tree.shape()),
        )?;
        Ok(rec.finish(tree))
    }

    pub fn delete(&self, model: &TreeModel, key: i64) -> Result<Outcome<TreeModel>, EngineError> {
        let (mut rec, mut tree) = self.begin(model)?;
        match tree_walk::descend(&mut rec, &tree, key)? {
            Descent::Empty => {
                rec.record(
                    Phase::Rejected,
                    [],
                    &tree,
                    format!("Tree is empty: cannot delete {key}"),
                )?;
            }
            Descent::Vacant { parent, .. } => {
                rec.record(
                    Phase::NotFound,
                    [parent],
                    &tree,
                    format!("{key} is not in the tree: nothing deleted"),
                )?;
            }
            Descent::Found(id) => {
                rec.record(Phase::Found, [id], &tree, format!("Found {key}"))?;
                let start = tree_walk::unlink(&mut rec, &mut tree, id)?;
                rebalance(&mut rec, &mut tree, start)?;
                rec.record(
                    Phase::Done,
                    tree.root,
                    &tree,
                    format!("Deleted {key}: {}", tree.shape()),
                )?;
            }
        }
        Ok(rec.finish(tree))
    }

    pub fn find(&self, model: &TreeModel, key: i64) -> Result<Outcome<TreeModel>, EngineError> {
        let (mut rec, tree) = self.begin(model)?;
        tree_walk::find(&mut rec, &tree, key)?;
        Ok(rec.finish(tree))
    }

    pub fn traverse(
        &self,
        model: &TreeModel,
        order: TraversalOrder,
    ) -> Result<Outcome<TreeModel>, EngineError> {
        let (mut rec, tree) = self.begin(model)?;
        let keys = tree_walk::traverse(&mut rec, &tree, order)?;
        rec.record(
            Phase::Done,
            [],
            &tree,
            format!("{order}: [{}]", tree_walk::join_keys(&keys)),
        )?;
        Ok(rec.finish(tree))
    }
}

impl Executor for AvlExecutor {
    type Model = TreeModel;
    type Request = TreeOp;

    fn config(&self) -> &EngineConfig {
        &self.config
    }

    fn execute(&self, model: &TreeModel, request: &TreeOp) -> Result<Outcome<TreeModel>, EngineError> {
        match *request {
            TreeOp::Insert { key } => self.insert(model, key),
            TreeOp::Delete { key } => self.delete(model, key),
            TreeOp::Find { key } => self.find(model, key),
            TreeOp::Traverse { order } => self.traverse(model, order),
        }
    }
}

// ---------------------------------------------------------------------------
// Rebalancing
// ---------------------------------------------------------------------------

/// Walks from `start` to the root, refreshing heights and restoring balance.
fn rebalance(
    rec: &mut TreeRecorder,
    tree: &mut TreeModel,
    start: Option<NodeId>,
) -> Result<(), EngineError> {
    let mut cursor = start;
    while let Some(id) = cursor {
        tree.refresh_height(id);
        let balance = tree.balance_factor(id);
        let key = tree_walk::key_of(tree, id)?;
        rec.record(
            Phase::Balance,
            [id],
            tree,
            format!("Balance factor of {key} is {balance:+}"),
        )?;
        let subtree_root = if balance.abs() > 1 {
            restore(rec, tree, id, balance)?
        } else {
            id
        };
        cursor = tree.parent(subtree_root);
    }
    Ok(())
}

/// Applies the single or double rotation for an unbalanced node and returns
/// the new root of its subtree.
fn restore(
    rec: &mut TreeRecorder,
    tree: &mut TreeModel,
    id: NodeId,
    balance: i64,
) -> Result<NodeId, EngineError> {
    let heavy = if balance > 0 { Side::Left } else { Side::Right };
    let child = tree
        .child(id, heavy)
        .ok_or(EngineError::MissingNode { node: id })?;
    let child_balance = tree.balance_factor(child);
    // the child leans away from its parent: double rotation
    let zigzag = match heavy {
        Side::Left => child_balance < 0,
        Side::Right => child_balance > 0,
    };
    let case = match (heavy, zigzag) {
        (Side::Left, false) => "LL",
        (Side::Left, true) => "LR",
        (Side::Right, false) => "RR",
        (Side::Right, true) => "RL",
    };
    let key = tree_walk::key_of(tree, id)?;
    rec.record(
        Phase::Imbalance,
        [id, child],
        tree,
        format!("{key} is unbalanced ({balance:+}): {case} case"),
    )?;
    if zigzag {
        rotate(rec, tree, child, heavy)?;
    }
    rotate(rec, tree, id, heavy.opposite())
}

/// Rotates the subtree at `pivot` in `direction`; the child on the opposite
/// side rises. Returns the risen node.
fn rotate(
    rec: &mut TreeRecorder,
    tree: &mut TreeModel,
    pivot: NodeId,
    direction: Side,
) -> Result<NodeId, EngineError> {
    let rising_side = direction.opposite();
    let riser = tree
        .child(pivot, rising_side)
        .ok_or(EngineError::MissingNode { node: pivot })?;
    let inner = tree.child(riser, direction);

    tree.replace_in_parent(pivot, Some(riser));
    tree.set_child(pivot, rising_side, inner);
    tree.set_child(riser, direction, Some(pivot));
    tree.refresh_height(pivot);
    tree.refresh_height(riser);

    let (pivot_key, riser_key) = (tree_walk::key_of(tree, pivot)?, tree_walk::key_of(tree, riser)?);
    let phase = match direction {
        Side::Left => Phase::RotateLeft,
        Side::Right => Phase::RotateRight,
    };
    rec.record(
        phase,
        [pivot, riser],
        tree,
        format!("Rotate {direction} at {pivot_key}: {riser_key} moves up"),
    )?;
    Ok(riser)
}

#[cfg(test)]
mod tests {
    use super::*;
    use nexus_core::{CoreError, IdAllocator};

    fn build(keys: &[i64]) -> TreeModel {
        let exec = AvlExecutor::default();
        keys.iter().fold(TreeModel::new(TreeKind::Avl), |tree, &k| {
            exec.insert(&tree, k).unwrap().new_model
        })
    }

    #[test]
    fn right_right_case_rotates_left() {
        let tree = build(&[1, 2]);
        let outcome = AvlExecutor::default().insert(&tree, 3).unwrap();
        let phases = outcome.trace.phases();
        assert!(phases.contains(&Phase::Imbalance));
        assert_eq!(outcome.trace.count(Phase::RotateLeft), 1);
        assert_eq!(outcome.trace.count(Phase::RotateRight), 0);
        assert_eq!(outcome.new_model.shape(), "2(1,3)");
        assert!(outcome.new_model.validate().is_ok());
    }

    #[test]
    fn left_right_case_rotates_twice() {
        let tree = build(&[3, 1]);
        let outcome = AvlExecutor::default().insert(&tree, 2).unwrap();
        let rotations: Vec<Phase> = outcome
            .trace
            .phases()
            .into_iter()
            .filter(|p| matches!(p, Phase::RotateLeft | Phase::RotateRight))
            .collect();
        assert_eq!(rotations, vec![Phase::RotateLeft, Phase::RotateRight]);
        assert_eq!(outcome.new_model.shape(), "2(1,3)");
    }

    #[test]
    fn right_left_case_rotates_twice() {
        let tree = build(&[1, 3]);
        let outcome = AvlExecutor::default().insert(&tree, 2).unwrap();
        assert_eq!(outcome.trace.count(Phase::RotateRight), 1);
        assert_eq!(outcome.trace.count(Phase::RotateLeft), 1);
        assert_eq!(outcome.new_model.shape(), "2(1,3)");
    }

    #[test]
    fn duplicate_insert_is_refused() {
        let tree = build(&[5, 3, 8]);
        let outcome = AvlExecutor::default().insert(&tree, 3).unwrap();
        assert_eq!(outcome.trace.terminal_phase(), Some(Phase::Duplicate));
        assert_eq!(outcome.new_model.shape(), "5(3,8)");
    }

    #[test]
    fn ascending_inserts_stay_logarithmic() {
        let keys: Vec<i64> = (1..=31).collect();
        let tree = build(&keys);
        assert_eq!(tree.height(), 5);
        assert_eq!(tree.keys(), keys);
    }

    #[test]
    fn heights_are_cached_correctly() {
        let tree = build(&[10, 20, 30, 40, 50, 25]);
        assert_eq!(tree.shape(), "30(20(10,25),40(-,50))");
        let root = tree.root.unwrap();
        assert_eq!(tree.node(root).unwrap().height, 3);
    }

    #[test]
    fn delete_rebalances() {
        let tree = build(&[2, 1, 3, 4]);
        let outcome = AvlExecutor::default().delete(&tree, 1).unwrap();
        assert_eq!(outcome.trace.count(Phase::RotateLeft), 1);
        assert_eq!(outcome.new_model.shape(), "3(2,4)");
        assert!(outcome.new_model.validate().is_ok());
    }

    #[test]
    fn every_ancestor_gets_a_balance_step() {
        let tree = build(&[4, 2, 6]);
        let outcome = AvlExecutor::default().insert(&tree, 1).unwrap();
        // parent 2 and root 4
        assert_eq!(outcome.trace.count(Phase::Balance), 2);
        assert_eq!(outcome.trace.count(Phase::Imbalance), 0);
    }

    #[test]
    fn bst_model_is_refused() {
        let err = AvlExecutor::default()
            .find(&TreeModel::new(TreeKind::Bst), 1)
            .unwrap_err();
        assert!(matches!(err, EngineError::TreeKindMismatch { .. }));
    }

    #[test]
    fn exhausted_id_space_is_an_error() {
        let tree = TreeModel {
            ids: IdAllocator::starting_at(u32::MAX),
            ..TreeModel::new(TreeKind::Avl)
        };
        let err = AvlExecutor::default().insert(&tree, 1).unwrap_err();
        assert!(matches!(
            err,
            EngineError::InvalidModel(CoreError::IdsExhausted)
        ));
    }
}
