//! Per-family executors.
//!
//! Each executor owns an [`EngineConfig`] and exposes its operations as
//! inherent methods that take the current model by reference. The
//! [`Executor`] trait gives the dispatcher a uniform entry point keyed by
//! the family's request enum.

pub mod avl;
pub mod bst;
pub mod dijkstra;
pub mod expression;
pub mod heap;
pub mod huffman;
pub mod linked_list;
pub mod polynomial;
pub mod queue;
pub mod stack;
mod tree_walk;

use nexus_core::{Outcome, Structure};

use crate::config::EngineConfig;
use crate::error::EngineError;

pub use avl::AvlExecutor;
pub use bst::BstExecutor;
pub use dijkstra::DijkstraExecutor;
pub use expression::ExpressionExecutor;
pub use heap::HeapExecutor;
pub use huffman::HuffmanExecutor;
pub use linked_list::LinkedListExecutor;
pub use polynomial::PolynomialExecutor;
pub use queue::QueueExecutor;
pub use stack::StackExecutor;

/// A trace-producing algorithm family.
pub trait Executor {
    type Model: Structure;
    type Request;

    fn config(&self) -> &EngineConfig;

    /// Runs `request` against a copy of `model`. Constructive requests
    /// ignore `model` and build a fresh one.
    fn execute(
        &self,
        model: &Self::Model,
        request: &Self::Request,
    ) -> Result<Outcome<Self::Model>, EngineError>;
}
