//! Huffman forest model.
//!
//! Leaves carry a symbol; internal nodes carry only the summed frequency and
//! their `left`/`right` children. `roots` lists the trees still waiting to be
//! merged, in priority order. Once construction finishes a single root
//! remains and `codes` holds the prefix code of every symbol.

use std::collections::BTreeMap;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::id::{id_map, IdAllocator, Identified, NodeId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HuffmanNode {
    pub id: NodeId,
    /// `Some` for leaves.
    pub symbol: Option<String>,
    pub frequency: u64,
    /// Creation ordinal; breaks frequency ties in favour of older nodes.
    pub order: u64,
    pub left: Option<NodeId>,
    pub right: Option<NodeId>,
}

impl Identified for HuffmanNode {
    fn id(&self) -> NodeId {
        self.id
    }
}

impl HuffmanNode {
    pub fn is_leaf(&self) -> bool {
        self.left.is_none() && self.right.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct HuffmanForest {
    #[serde(with = "id_map")]
    pub nodes: BTreeMap<NodeId, HuffmanNode>,
    /// Trees not yet merged, lowest `(frequency, order)` first.
    pub roots: Vec<NodeId>,
    /// Symbol to bit-string, filled in once the tree is complete.
    pub codes: IndexMap<String, String>,
    pub ids: IdAllocator,
}

impl HuffmanForest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn node(&self, id: NodeId) -> Option<&HuffmanNode> {
        self.nodes.get(&id)
    }

    /// The final tree root, once exactly one tree remains.
    pub fn root(&self) -> Option<NodeId> {
        match self.roots.as_slice() {
            [only] => Some(*only),
            _ => None,
        }
    }

    /// Short label for descriptions: the symbol for leaves, `*` otherwise.
    pub fn label(&self, id: NodeId) -> String {
        match self.nodes.get(&id) {
            Some(HuffmanNode {
                symbol: Some(s),
                frequency,
                ..
            }) => format!("{s}:{frequency}"),
            Some(node) => format!("*:{}", node.frequency),
            None => id.to_string(),
        }
    }

    /// Depth of every leaf symbol below the single root, in root-first
    /// pre-order. Empty while more than one tree remains.
    pub fn leaf_depths(&self) -> Vec<(String, usize)> {
        let mut out = Vec::new();
        if let Some(root) = self.root() {
            let mut stack = vec![(root, 0usize)];
            while let Some((id, depth)) = stack.pop() {
                let Some(node) = self.nodes.get(&id) else {
                    continue;
                };
                if let Some(symbol) = &node.symbol {
                    out.push((symbol.clone(), depth));
                }
                if let Some(r) = node.right {
                    stack.push((r, depth + 1));
                }
                if let Some(l) = node.left {
                    stack.push((l, depth + 1));
                }
            }
        }
        out
    }

    /// Sum of `frequency * code length` over all symbols.
    pub fn weighted_length(&self) -> u64 {
        self.codes
            .iter()
            .filter_map(|(symbol, code)| {
                self.nodes
                    .values()
                    .find(|n| n.symbol.as_deref() == Some(symbol.as_str()))
                    .map(|n| n.frequency.saturating_mul(code.len() as u64))
            })
            .fold(0u64, u64::saturating_add)
    }

    pub fn validate(&self) -> Result<(), CoreError> {
        for (key, node) in &self.nodes {
            if *key != node.id {
                return Err(CoreError::MisfiledNode {
                    key: *key,
                    actual: node.id,
                });
            }
            if node.id >= self.ids.peek() {
                return Err(CoreError::StaleAllocator { next: self.ids.peek() });
            }
            for child in [node.left, node.right].into_iter().flatten() {
                if !self.nodes.contains_key(&child) {
                    return Err(CoreError::DanglingRelation {
                        from: node.id,
                        to: child,
                    });
                }
            }
            if node.left.is_some() != node.right.is_some() {
                return Err(CoreError::Inconsistent {
                    node: node.id,
                    reason: "internal node needs two children".into(),
                });
            }
        }
        for root in &self.roots {
            if !self.nodes.contains_key(root) {
                return Err(CoreError::MissingRoot { id: *root });
            }
        }
        Ok(())
    }
}
