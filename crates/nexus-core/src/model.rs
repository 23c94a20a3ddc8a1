//! The [`Structure`] contract and the [`StructureModel`] union exchanged
//! with presentation code.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::expression::ConversionModel;
use crate::graph::GraphModel;
use crate::heap::HeapModel;
use crate::huffman::HuffmanForest;
use crate::linear::{QueueModel, StackModel};
use crate::list::ListModel;
use crate::polynomial::ProductModel;
use crate::tree::TreeModel;

/// Behaviour every structure model shares.
///
/// Models are plain values: cloning one yields an independent snapshot.
pub trait Structure: Clone + PartialEq {
    /// Short lowercase name used in logs and descriptions.
    const NAME: &'static str;

    /// Checks relation integrity. Errors indicate a malformed model supplied
    /// by the caller, not a learner mistake.
    fn validate(&self) -> Result<(), CoreError>;
}

macro_rules! impl_structure {
    ($ty:ty, $name:literal) => {
        impl Structure for $ty {
            const NAME: &'static str = $name;

            fn validate(&self) -> Result<(), CoreError> {
                <$ty>::validate(self)
            }
        }
    };
}

impl_structure!(TreeModel, "tree");
impl_structure!(HeapModel, "heap");
impl_structure!(ListModel, "list");
impl_structure!(StackModel, "stack");
impl_structure!(QueueModel, "queue");
impl_structure!(GraphModel, "graph");
impl_structure!(HuffmanForest, "huffman");
impl_structure!(ConversionModel, "expression");
impl_structure!(ProductModel, "polynomial");

/// Any supported structure, tagged by family on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "structure", rename_all = "kebab-case")]
pub enum StructureModel {
    Tree(TreeModel),
    Heap(HeapModel),
    List(ListModel),
    Stack(StackModel),
    Queue(QueueModel),
    Graph(GraphModel),
    Huffman(HuffmanForest),
    Expression(ConversionModel),
    Polynomial(ProductModel),
}

impl StructureModel {
    /// Family name, matching the serde tag.
    pub fn family(&self) -> &'static str {
        match self {
            StructureModel::Tree(_) => TreeModel::NAME,
            StructureModel::Heap(_) => HeapModel::NAME,
            StructureModel::List(_) => ListModel::NAME,
            StructureModel::Stack(_) => StackModel::NAME,
            StructureModel::Queue(_) => QueueModel::NAME,
            StructureModel::Graph(_) => GraphModel::NAME,
            StructureModel::Huffman(_) => HuffmanForest::NAME,
            StructureModel::Expression(_) => ConversionModel::NAME,
            StructureModel::Polynomial(_) => ProductModel::NAME,
        }
    }

    pub fn validate(&self) -> Result<(), CoreError> {
        match self {
            StructureModel::Tree(m) => m.validate(),
            StructureModel::Heap(m) => m.validate(),
            StructureModel::List(m) => m.validate(),
            StructureModel::Stack(m) => m.validate(),
            StructureModel::Queue(m) => m.validate(),
            StructureModel::Graph(m) => m.validate(),
            StructureModel::Huffman(m) => m.validate(),
            StructureModel::Expression(m) => m.validate(),
            StructureModel::Polynomial(m) => m.validate(),
        }
    }
}
