//! Singly linked list model.
//!
//! Nodes are stored by id and chained through `next`. The list owns exactly
//! one `head` (or none when empty) and must be acyclic.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::id::{id_map, IdAllocator, Identified, NodeId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListNode {
    pub id: NodeId,
    pub value: i64,
    pub next: Option<NodeId>,
}

impl Identified for ListNode {
    fn id(&self) -> NodeId {
        self.id
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ListModel {
    pub head: Option<NodeId>,
    #[serde(with = "id_map")]
    pub nodes: BTreeMap<NodeId, ListNode>,
    pub ids: IdAllocator,
}

impl ListModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: NodeId) -> Option<&ListNode> {
        self.nodes.get(&id)
    }

    pub fn next(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(&id).and_then(|n| n.next)
    }

    pub fn set_next(&mut self, id: NodeId, next: Option<NodeId>) {
        if let Some(node) = self.nodes.get_mut(&id) {
            node.next = next;
        }
    }

    /// Creates an unlinked node and returns its id.
    pub fn allocate(&mut self, value: i64) -> Result<NodeId, CoreError> {
        let id = self.ids.allocate()?;
        self.nodes.insert(id, ListNode { id, value, next: None });
        Ok(id)
    }

    /// Ids from head to tail. Stops early on a cycle, which `validate`
    /// reports separately.
    pub fn order(&self) -> Vec<NodeId> {
        let mut out = Vec::with_capacity(self.nodes.len());
        let mut seen = BTreeSet::new();
        let mut cursor = self.head;
        while let Some(id) = cursor {
            if !seen.insert(id) {
                break;
            }
            out.push(id);
            cursor = self.next(id);
        }
        out
    }

    pub fn values(&self) -> Vec<i64> {
        self.order()
            .into_iter()
            .filter_map(|id| self.nodes.get(&id).map(|n| n.value))
            .collect()
    }

    pub fn tail(&self) -> Option<NodeId> {
        self.order().last().copied()
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
            if let Some(next) = node.next {
                if !self.nodes.contains_key(&next) {
                    return Err(CoreError::DanglingRelation {
                        from: node.id,
                        to: next,
                    });
                }
            }
        }
        match self.head {
            None if !self.nodes.is_empty() => {
                let first = self.nodes.keys().next().copied().unwrap_or(NodeId(0));
                Err(CoreError::Inconsistent {
                    node: first,
                    reason: "list has nodes but no head".into(),
                })
            }
            None => Ok(()),
            Some(head) => {
                if !self.nodes.contains_key(&head) {
                    return Err(CoreError::MissingRoot { id: head });
                }
                let order = self.order();
                if let Some(&last) = order.last() {
                    if self.next(last).is_some() {
                        return Err(CoreError::Inconsistent {
                            node: last,
                            reason: "cycle in next links".into(),
                        });
                    }
                }
                if order.len() != self.nodes.len() {
                    let seen: BTreeSet<NodeId> = order.into_iter().collect();
                    let orphan = self
                        .nodes
                        .keys()
                        .find(|id| !seen.contains(id))
                        .copied()
                        .unwrap_or(head);
                    return Err(CoreError::Inconsistent {
                        node: orphan,
                        reason: "node unreachable from head".into(),
                    });
                }
                Ok(())
            }
        }
    }
}

impl ListModel {
    /// Builds a list holding `values` in order.
    pub fn from_values(values: impl IntoIterator<Item = i64>) -> Result<Self, CoreError> {
        let mut list = ListModel::new();
        let mut prev: Option<NodeId> = None;
        for value in values {
            let id = list.allocate(value)?;
            match prev {
                Some(p) => list.set_next(p, Some(id)),
                None => list.head = Some(id),
            }
            prev = Some(id);
        }
        Ok(list)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collects_in_order() {
        let list = ListModel::from_values([4, 7, 1]).unwrap();
        assert_eq!(list.values(), vec![4, 7, 1]);
        assert_eq!(list.tail(), Some(NodeId(2)));
        assert!(list.validate().is_ok());
    }

    #[test]
    fn empty_list_is_valid() {
        assert!(ListModel::new().validate().is_ok());
    }

    #[test]
    fn cycle_is_rejected() {
        let mut list = ListModel::from_values([1, 2]).unwrap();
        list.set_next(NodeId(1), Some(NodeId(0)));
        assert!(matches!(list.validate(), Err(CoreError::Inconsistent { .. })));
    }

    #[test]
    fn dangling_next_is_rejected() {
        let mut list = ListModel::from_values([1]).unwrap();
        list.set_next(NodeId(0), Some(NodeId(5)));
        assert!(matches!(list.validate(), Err(CoreError::DanglingRelation { .. })));
    }
}
