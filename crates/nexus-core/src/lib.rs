pub mod error;
pub mod expression;
pub mod graph;
pub mod heap;
pub mod huffman;
pub mod id;
pub mod linear;
pub mod list;
pub mod model;
pub mod polynomial;
pub mod step;
pub mod tree;

// Re-export commonly used types
pub use error::CoreError;
pub use id::{IdAllocator, NodeId};
pub use model::{Structure, StructureModel};
pub use step::{Highlight, Outcome, Phase, Step, Trace};
