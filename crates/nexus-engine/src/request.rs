//! Operation requests.
//!
//! A request names the structure family and one operation of that family.
//! On the wire it is adjacently tagged:
//!
//! ```json
//! {"structure": "tree", "request": {"op": "insert", "key": 42}}
//! ```

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use nexus_core::polynomial::Polynomial;
use nexus_core::tree::TraversalOrder;
use nexus_core::NodeId;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "kebab-case")]
pub enum TreeOp {
    Insert { key: i64 },
    Delete { key: i64 },
    Find { key: i64 },
    Traverse { order: TraversalOrder },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "kebab-case")]
pub enum HeapOp {
    Insert { value: i64 },
    ExtractRoot,
    Peek,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "kebab-case")]
pub enum ListOp {
    InsertHead { value: i64 },
    InsertTail { value: i64 },
    InsertAt { index: usize, value: i64 },
    Delete { value: i64 },
    Search { value: i64 },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "kebab-case")]
pub enum StackOp {
    Push { value: i64 },
    Pop,
    Peek,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "kebab-case")]
pub enum QueueOp {
    Enqueue { message: String },
    Dequeue,
    Peek,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "kebab-case")]
pub enum GraphOp {
    ShortestPaths { source: NodeId },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "kebab-case")]
pub enum HuffmanOp {
    /// Symbols with their frequencies. Map order is the tie-break order.
    Build { frequencies: IndexMap<String, u64> },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "kebab-case")]
pub enum ExpressionOp {
    InfixToPostfix { tokens: Vec<String> },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "kebab-case")]
pub enum PolynomialOp {
    Multiply { left: Polynomial, right: Polynomial },
}

/// One operation against one structure family.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "structure", content = "request", rename_all = "kebab-case")]
pub enum OperationRequest {
    Tree(TreeOp),
    Heap(HeapOp),
    List(ListOp),
    Stack(StackOp),
    Queue(QueueOp),
    Graph(GraphOp),
    Huffman(HuffmanOp),
    Expression(ExpressionOp),
    Polynomial(PolynomialOp),
}

impl OperationRequest {
    /// Family name, matching [`StructureModel::family`](nexus_core::StructureModel::family).
    pub fn family(&self) -> &'static str {
        match self {
            OperationRequest::Tree(_) => "tree",
            OperationRequest::Heap(_) => "heap",
            OperationRequest::List(_) => "list",
            OperationRequest::Stack(_) => "stack",
            OperationRequest::Queue(_) => "queue",
            OperationRequest::Graph(_) => "graph",
            OperationRequest::Huffman(_) => "huffman",
            OperationRequest::Expression(_) => "expression",
            OperationRequest::Polynomial(_) => "polynomial",
        }
    }

    /// Whether the request builds a fresh model instead of editing the
    /// current one.
    pub fn is_constructive(&self) -> bool {
        matches!(
            self,
            OperationRequest::Huffman(_)
                | OperationRequest::Expression(_)
                | OperationRequest::Polynomial(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tree_insert_wire_format() {
        let req = OperationRequest::Tree(TreeOp::Insert { key: 42 });
        let json = serde_json::to_string(&req).unwrap();
        assert_eq!(json, r#"{"structure":"tree","request":{"op":"insert","key":42}}"#);
        let back: OperationRequest = serde_json::from_str(&json).unwrap();
        assert_eq!(back, req);
    }

    #[test]
    fn unit_ops_parse() {
        let req: OperationRequest =
            serde_json::from_str(r#"{"structure":"heap","request":{"op":"extract-root"}}"#).unwrap();
        assert_eq!(req, OperationRequest::Heap(HeapOp::ExtractRoot));
    }

    #[test]
    fn traversal_order_is_kebab_case() {
        let req: OperationRequest = serde_json::from_str(
            r#"{"structure":"tree","request":{"op":"traverse","order":"level-order"}}"#,
        )
        .unwrap();
        assert_eq!(
            req,
            OperationRequest::Tree(TreeOp::Traverse {
                order: TraversalOrder::LevelOrder
            })
        );
    }

    #[test]
    fn constructive_requests() {
        let build = OperationRequest::Huffman(HuffmanOp::Build {
            frequencies: IndexMap::new(),
        });
        assert!(build.is_constructive());
        assert!(!OperationRequest::Stack(StackOp::Pop).is_constructive());
        assert_eq!(build.family(), "huffman");
    }
}
