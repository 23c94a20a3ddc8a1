//! Binary search tree model shared by the BST and AVL executors.
//!
//! Nodes live in an id-keyed map and refer to each other by [`NodeId`]
//! (`parent`, `left`, `right`), never by reference. Heights are cached on
//! every node so snapshots can show balance factors without recomputation.

use std::collections::{BTreeMap, VecDeque};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::id::{id_map, IdAllocator, Identified, NodeId};

/// Which balancing discipline a tree follows. Fixed at creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TreeKind {
    Bst,
    Avl,
}

/// Left or right child slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Side {
    Left,
    Right,
}

impl Side {
    pub fn opposite(self) -> Side {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Side::Left => "left",
            Side::Right => "right",
        })
    }
}

/// A single tree node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeNode {
    pub id: NodeId,
    pub key: i64,
    pub parent: Option<NodeId>,
    pub left: Option<NodeId>,
    pub right: Option<NodeId>,
    /// Height of the subtree rooted here; a leaf has height 1.
    pub height: u32,
}

impl Identified for TreeNode {
    fn id(&self) -> NodeId {
        self.id
    }
}

impl TreeNode {
    pub fn leaf(id: NodeId, key: i64, parent: Option<NodeId>) -> Self {
        TreeNode {
            id,
            key,
            parent,
            left: None,
            right: None,
            height: 1,
        }
    }

    pub fn child(&self, side: Side) -> Option<NodeId> {
        match side {
            Side::Left => self.left,
            Side::Right => self.right,
        }
    }

    pub fn child_count(&self) -> usize {
        usize::from(self.left.is_some()) + usize::from(self.right.is_some())
    }
}

/// Traversal orders offered by the tree executors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TraversalOrder {
    InOrder,
    PreOrder,
    PostOrder,
    LevelOrder,
}

impl fmt::Display for TraversalOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TraversalOrder::InOrder => "in-order",
            TraversalOrder::PreOrder => "pre-order",
            TraversalOrder::PostOrder => "post-order",
            TraversalOrder::LevelOrder => "level-order",
        })
    }
}

/// A binary search tree snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeModel {
    pub kind: TreeKind,
    pub root: Option<NodeId>,
    #[serde(with = "id_map")]
    pub nodes: BTreeMap<NodeId, TreeNode>,
    pub ids: IdAllocator,
}

impl TreeModel {
    pub fn new(kind: TreeKind) -> Self {
        TreeModel {
            kind,
            root: None,
            nodes: BTreeMap::new(),
            ids: IdAllocator::default(),
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: NodeId) -> Option<&TreeNode> {
        self.nodes.get(&id)
    }

    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut TreeNode> {
        self.nodes.get_mut(&id)
    }

    /// Key of `id`. Callers only pass ids taken from this model.
    pub fn key(&self, id: NodeId) -> Option<i64> {
        self.nodes.get(&id).map(|n| n.key)
    }

    pub fn child(&self, id: NodeId, side: Side) -> Option<NodeId> {
        self.nodes.get(&id).and_then(|n| n.child(side))
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(&id).and_then(|n| n.parent)
    }

    /// Cached height of an optional subtree (0 for empty).
    pub fn height_of(&self, id: Option<NodeId>) -> u32 {
        id.and_then(|id| self.nodes.get(&id)).map_or(0, |n| n.height)
    }

    /// `height(left) - height(right)` for the node.
    pub fn balance_factor(&self, id: NodeId) -> i64 {
        match self.nodes.get(&id) {
            Some(n) => i64::from(self.height_of(n.left)) - i64::from(self.height_of(n.right)),
            None => 0,
        }
    }

    /// Recomputes the cached height of `id` from its children.
    pub fn refresh_height(&mut self, id: NodeId) {
        let Some(node) = self.nodes.get(&id) else {
            return;
        };
        let height = 1 + self.height_of(node.left).max(self.height_of(node.right));
        if let Some(node) = self.nodes.get_mut(&id) {
            node.height = height;
        }
    }

    /// Recomputes heights from `start` up to the root.
    pub fn refresh_heights_upward(&mut self, start: Option<NodeId>) {
        let mut cursor = start;
        while let Some(id) = cursor {
            self.refresh_height(id);
            cursor = self.parent(id);
        }
    }

    /// Which side of `parent` holds `child`, if any.
    pub fn side_of(&self, parent: NodeId, child: NodeId) -> Option<Side> {
        let node = self.nodes.get(&parent)?;
        if node.left == Some(child) {
            Some(Side::Left)
        } else if node.right == Some(child) {
            Some(Side::Right)
        } else {
            None
        }
    }

    /// Creates a detached leaf with a fresh id and returns the id.
    pub fn allocate_leaf(&mut self, key: i64) -> Result<NodeId, CoreError> {
        let id = self.ids.allocate()?;
        self.nodes.insert(id, TreeNode::leaf(id, key, None));
        Ok(id)
    }

    /// Sets `parent.side = child` and `child.parent = parent`.
    pub fn set_child(&mut self, parent: NodeId, side: Side, child: Option<NodeId>) {
        if let Some(node) = self.nodes.get_mut(&parent) {
            match side {
                Side::Left => node.left = child,
                Side::Right => node.right = child,
            }
        }
        if let Some(child) = child.and_then(|c| self.nodes.get_mut(&c)) {
            child.parent = Some(parent);
        }
    }

    /// Puts `replacement` where `old` hangs: under old's parent, or at the
    /// root. Does not touch `old`'s own links.
    pub fn replace_in_parent(&mut self, old: NodeId, replacement: Option<NodeId>) {
        let parent = self.parent(old);
        match parent {
            Some(p) => {
                if let Some(side) = self.side_of(p, old) {
                    self.set_child(p, side, replacement);
                }
            }
            None => {
                self.root = replacement;
                if let Some(r) = replacement.and_then(|r| self.nodes.get_mut(&r)) {
                    r.parent = None;
                }
            }
        }
    }

    /// Removes a node record. Links to it must already be rewritten.
    pub fn remove_node(&mut self, id: NodeId) -> Option<TreeNode> {
        self.nodes.remove(&id)
    }

    /// Node holding `key`, if present.
    pub fn find(&self, key: i64) -> Option<NodeId> {
        let mut cursor = self.root;
        while let Some(id) = cursor {
            let node = self.nodes.get(&id)?;
            cursor = match key.cmp(&node.key) {
                std::cmp::Ordering::Equal => return Some(id),
                std::cmp::Ordering::Less => node.left,
                std::cmp::Ordering::Greater => node.right,
            };
        }
        None
    }

    /// Ids in the requested traversal order.
    pub fn traversal(&self, order: TraversalOrder) -> Vec<NodeId> {
        let mut out = Vec::with_capacity(self.nodes.len());
        match order {
            TraversalOrder::LevelOrder => {
                let mut queue: VecDeque<NodeId> = self.root.into_iter().collect();
                while let Some(id) = queue.pop_front() {
                    out.push(id);
                    if let Some(node) = self.nodes.get(&id) {
                        queue.extend(node.left);
                        queue.extend(node.right);
                    }
                }
            }
            _ => self.walk(self.root, order, &mut out),
        }
        out
    }

    fn walk(&self, id: Option<NodeId>, order: TraversalOrder, out: &mut Vec<NodeId>) {
        let Some(node) = id.and_then(|id| self.nodes.get(&id)) else {
            return;
        };
        if order == TraversalOrder::PreOrder {
            out.push(node.id);
        }
        self.walk(node.left, order, out);
        if order == TraversalOrder::InOrder {
            out.push(node.id);
        }
        self.walk(node.right, order, out);
        if order == TraversalOrder::PostOrder {
            out.push(node.id);
        }
    }

    /// Keys in ascending order.
    pub fn keys(&self) -> Vec<i64> {
        self.traversal(TraversalOrder::InOrder)
            .into_iter()
            .filter_map(|id| self.key(id))
            .collect()
    }

    /// Height of the whole tree.
    pub fn height(&self) -> u32 {
        self.height_of(self.root)
    }

    /// Compact nested rendering such as `5(3,8)`, used in descriptions and
    /// test assertions. Empty subtrees render as `-`.
    pub fn shape(&self) -> String {
        let mut out = String::new();
        self.render(self.root, &mut out);
        out
    }

    fn render(&self, id: Option<NodeId>, out: &mut String) {
        let Some(node) = id.and_then(|id| self.nodes.get(&id)) else {
            out.push('-');
            return;
        };
        out.push_str(&node.key.to_string());
        if node.left.is_some() || node.right.is_some() {
            out.push('(');
            self.render(node.left, out);
            out.push(',');
            self.render(node.right, out);
            out.push(')');
        }
    }

    /// Checks that every relation resolves, parent and child links agree,
    /// and every node is reachable exactly once from the root.
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
            for link in [node.parent, node.left, node.right].into_iter().flatten() {
                if !self.nodes.contains_key(&link) {
                    return Err(CoreError::DanglingRelation {
                        from: node.id,
                        to: link,
                    });
                }
            }
            for side in [Side::Left, Side::Right] {
                if let Some(child) = node.child(side) {
                    if self.parent(child) != Some(node.id) {
                        return Err(CoreError::Inconsistent {
                            node: child,
                            reason: format!("child of {} but parent link disagrees", node.id),
                        });
                    }
                }
            }
        }

        let Some(root) = self.root else {
            return match self.nodes.keys().next() {
                Some(orphan) => Err(CoreError::Inconsistent {
                    node: *orphan,
                    reason: "node present in a tree without root".into(),
                }),
                None => Ok(()),
            };
        };
        let root_node = self.nodes.get(&root).ok_or(CoreError::MissingRoot { id: root })?;
        if root_node.parent.is_some() {
            return Err(CoreError::Inconsistent {
                node: root,
                reason: "root has a parent".into(),
            });
        }

        let reachable = self.traversal(TraversalOrder::PreOrder);
        if reachable.len() != self.nodes.len() {
            let seen: std::collections::BTreeSet<NodeId> = reachable.into_iter().collect();
            let orphan = self
                .nodes
                .keys()
                .find(|id| !seen.contains(id))
                .copied()
                .unwrap_or(root);
            return Err(CoreError::Inconsistent {
                node: orphan,
                reason: "node unreachable from root".into(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Builds `5(3,8)` by hand.
    fn small_tree() -> (TreeModel, NodeId, NodeId, NodeId) {
        let mut tree = TreeModel::new(TreeKind::Bst);
        let five = tree.allocate_leaf(5).unwrap();
        tree.root = Some(five);
        let three = tree.allocate_leaf(3).unwrap();
        tree.set_child(five, Side::Left, Some(three));
        let eight = tree.allocate_leaf(8).unwrap();
        tree.set_child(five, Side::Right, Some(eight));
        tree.refresh_height(five);
        (tree, five, three, eight)
    }

    #[test]
    fn shape_renders_nested() {
        let (tree, ..) = small_tree();
        assert_eq!(tree.shape(), "5(3,8)");
        assert_eq!(tree.height(), 2);
        assert!(tree.validate().is_ok());
    }

    #[test]
    fn traversal_orders() {
        let (tree, five, three, eight) = small_tree();
        assert_eq!(tree.traversal(TraversalOrder::InOrder), vec![three, five, eight]);
        assert_eq!(tree.traversal(TraversalOrder::PreOrder), vec![five, three, eight]);
        assert_eq!(tree.traversal(TraversalOrder::PostOrder), vec![three, eight, five]);
        assert_eq!(tree.traversal(TraversalOrder::LevelOrder), vec![five, three, eight]);
    }

    #[test]
    fn find_walks_by_key() {
        let (tree, _, _, eight) = small_tree();
        assert_eq!(tree.find(8), Some(eight));
        assert_eq!(tree.find(4), None);
    }

    #[test]
    fn replace_in_parent_at_root() {
        let (mut tree, five, three, _) = small_tree();
        tree.replace_in_parent(five, Some(three));
        assert_eq!(tree.root, Some(three));
        assert_eq!(tree.parent(three), None);
    }

    #[test]
    fn validate_rejects_dangling_child() {
        let (mut tree, five, ..) = small_tree();
        tree.node_mut(five).unwrap().left = Some(NodeId(99));
        assert!(matches!(
            tree.validate(),
            Err(CoreError::DanglingRelation { to: NodeId(99), .. })
        ));
    }

    #[test]
    fn validate_rejects_orphan() {
        let (mut tree, _, three, _) = small_tree();
        tree.node_mut(three).unwrap().parent = None;
        assert!(tree.validate().is_err());
    }

    #[test]
    fn balance_factor_of_left_heavy_node() {
        let mut tree = TreeModel::new(TreeKind::Avl);
        let a = tree.allocate_leaf(3).unwrap();
        tree.root = Some(a);
        let b = tree.allocate_leaf(2).unwrap();
        tree.set_child(a, Side::Left, Some(b));
        tree.refresh_heights_upward(Some(b));
        assert_eq!(tree.balance_factor(a), 1);
    }
}
