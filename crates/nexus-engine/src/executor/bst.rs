//! Unbalanced binary search tree executor.

use nexus_core::tree::{TraversalOrder, TreeKind, TreeModel};
use nexus_core::{Outcome, Phase};

use super::tree_walk::{self, Descent};
use super::Executor;
use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::recorder::TraceRecorder;
use crate::request::TreeOp;

#[derive(Debug, Clone, Default)]
pub struct BstExecutor {
    config: EngineConfig,
}

impl BstExecutor {
    pub fn new(config: EngineConfig) -> Self {
        BstExecutor { config }
    }

    fn begin(&self, model: &TreeModel) -> Result<(TraceRecorder<TreeModel>, TreeModel), EngineError> {
        model.validate()?;
        tree_walk::require_kind(model, TreeKind::Bst, "bst")?;
        Ok((TraceRecorder::new(&self.config), model.clone()))
    }

    /// Inserts `key`. A key already present yields a `Duplicate` step and an
    /// unchanged tree.
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
        rec.record(
            Phase::Done,
            [id],
            &tree,
            format!("Inserted {key}: {}", tree.shape()),
        )?;
        Ok(rec.finish(tree))
    }

    /// Deletes `key`. Two-child nodes take their in-order successor's key.
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
                tree_walk::unlink(&mut rec, &mut tree, id)?;
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

impl Executor for BstExecutor {
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
