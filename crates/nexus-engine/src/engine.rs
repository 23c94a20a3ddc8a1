//! Request dispatch.
//!
//! [`Engine::execute`] routes an [`OperationRequest`] to the executor for
//! its family and lifts the typed outcome into [`StructureModel`]. Editing
//! requests must match the current model's family; constructive requests
//! (Huffman build, infix conversion, polynomial multiply) build a fresh model
//! whatever the current one is.

use nexus_core::expression::ConversionModel;
use nexus_core::huffman::HuffmanForest;
use nexus_core::polynomial::ProductModel;
use nexus_core::tree::TreeKind;
use nexus_core::{Outcome, StructureModel};

use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::executor::{
    AvlExecutor, BstExecutor, DijkstraExecutor, Executor, ExpressionExecutor, HeapExecutor,
    HuffmanExecutor, LinkedListExecutor, PolynomialExecutor, QueueExecutor, StackExecutor,
};
use crate::request::OperationRequest;

#[derive(Debug, Clone, Default)]
pub struct Engine {
    config: EngineConfig,
}

impl Engine {
    pub fn new(config: EngineConfig) -> Self {
        Engine { config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Runs one request against `model`. The input model is never mutated.
    pub fn execute(
        &self,
        model: &StructureModel,
        request: &OperationRequest,
    ) -> Result<Outcome<StructureModel>, EngineError> {
        let config = self.config.clone();
        let outcome = match (model, request) {
            (StructureModel::Tree(tree), OperationRequest::Tree(op)) => match tree.kind {
                TreeKind::Bst => BstExecutor::new(config)
                    .execute(tree, op)?
                    .map(StructureModel::Tree),
                TreeKind::Avl => AvlExecutor::new(config)
                    .execute(tree, op)?
                    .map(StructureModel::Tree),
            },
            (StructureModel::Heap(heap), OperationRequest::Heap(op)) => HeapExecutor::new(config)
                .execute(heap, op)?
                .map(StructureModel::Heap),
            (StructureModel::List(list), OperationRequest::List(op)) => {
                LinkedListExecutor::new(config)
                    .execute(list, op)?
                    .map(StructureModel::List)
            }
            (StructureModel::Stack(stack), OperationRequest::Stack(op)) => {
                StackExecutor::new(config)
                    .execute(stack, op)?
                    .map(StructureModel::Stack)
            }
            (StructureModel::Queue(queue), OperationRequest::Queue(op)) => {
                QueueExecutor::new(config)
                    .execute(queue, op)?
                    .map(StructureModel::Queue)
            }
            (StructureModel::Graph(graph), OperationRequest::Graph(op)) => {
                DijkstraExecutor::new(config)
                    .execute(graph, op)?
                    .map(StructureModel::Graph)
            }
            (_, OperationRequest::Huffman(op)) => HuffmanExecutor::new(config)
                .execute(&HuffmanForest::new(), op)?
                .map(StructureModel::Huffman),
            (_, OperationRequest::Expression(op)) => ExpressionExecutor::new(config)
                .execute(&ConversionModel::default(), op)?
                .map(StructureModel::Expression),
            (_, OperationRequest::Polynomial(op)) => {
                let empty = ProductModel::new(Default::default(), Default::default());
                PolynomialExecutor::new(config)
                    .execute(&empty, op)?
                    .map(StructureModel::Polynomial)
            }
            (model, request) => {
                tracing::warn!(
                    request = request.family(),
                    structure = model.family(),
                    "request does not match the model"
                );
                return Err(EngineError::StructureMismatch {
                    request: request.family(),
                    structure: model.family(),
                })
            }
        };
        tracing::debug!(
            structure = outcome.new_model.family(),
            steps = outcome.trace.len(),
            terminal = ?outcome.trace.terminal_phase(),
            "operation traced"
        );
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::{QueueOp, StackOp, TreeOp};
    use nexus_core::linear::StackModel;
    use nexus_core::tree::TreeModel;
    use nexus_core::Phase;

    #[test]
    fn dispatches_by_tree_kind() {
        let engine = Engine::default();
        let avl = StructureModel::Tree(TreeModel::new(TreeKind::Avl));
        let mut model = avl;
        for key in [1, 2, 3] {
            model = engine
                .execute(&model, &OperationRequest::Tree(TreeOp::Insert { key }))
                .unwrap()
                .new_model;
        }
        let StructureModel::Tree(tree) = &model else {
            panic!("expected a tree");
        };
        assert_eq!(tree.shape(), "2(1,3)");
    }

    #[test]
    fn mismatched_family_is_an_error() {
        let engine = Engine::default();
        let stack = StructureModel::Stack(StackModel::with_capacity(1));
        let err = engine
            .execute(&stack, &OperationRequest::Queue(QueueOp::Dequeue))
            .unwrap_err();
        assert!(matches!(
            err,
            EngineError::StructureMismatch {
                request: "queue",
                structure: "stack"
            }
        ));
    }

    #[test]
    fn constructive_request_replaces_model() {
        let engine = Engine::default();
        let stack = StructureModel::Stack(StackModel::with_capacity(1));
        let request: OperationRequest = serde_json::from_str(
            r#"{"structure":"expression","request":{"op":"infix-to-postfix","tokens":["a","+","b"]}}"#,
        )
        .unwrap();
        let outcome = engine.execute(&stack, &request).unwrap();
        assert_eq!(outcome.new_model.family(), "expression");
        assert_eq!(outcome.trace.terminal_phase(), Some(Phase::Done));
    }

    #[test]
    fn step_limit_surfaces_as_error() {
        let engine = Engine::new(EngineConfig::with_step_limit(0));
        let stack = StructureModel::Stack(StackModel::with_capacity(1));
        let err = engine
            .execute(&stack, &OperationRequest::Stack(StackOp::Push { value: 1 }))
            .unwrap_err();
        assert!(matches!(err, EngineError::StepLimitExceeded { limit: 0 }));
    }
}
