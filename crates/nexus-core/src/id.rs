//! Stable node identifiers.
//!
//! Every node in every structure model is addressed by a [`NodeId`]. Ids are
//! unique within one model value and never reused by that model, so a step
//! snapshot can be diffed against its neighbours by id alone.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Stable node identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NodeId(pub u32);

/// Hands out fresh ids for one model value.
///
/// The counter only moves forward; deleting a node never frees its id.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdAllocator {
    next: u32,
}

impl IdAllocator {
    /// Creates an allocator whose first id is `NodeId(start)`.
    pub fn starting_at(start: u32) -> Self {
        IdAllocator { next: start }
    }

    /// Returns a fresh id and advances the counter. Fails once the id
    /// space is used up, leaving the counter where it was.
    pub fn allocate(&mut self) -> Result<NodeId, CoreError> {
        let id = NodeId(self.next);
        self.next = self
            .next
            .checked_add(1)
            .ok_or(CoreError::IdsExhausted)?;
        Ok(id)
    }

    /// The id the next call to [`allocate`](Self::allocate) will return.
    pub fn peek(&self) -> NodeId {
        NodeId(self.next)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Records that carry their own id, so id-keyed maps can travel as plain
/// JSON arrays.
pub trait Identified {
    fn id(&self) -> NodeId;
}

/// `#[serde(with = "id_map")]` for `BTreeMap<NodeId, T>`: serializes the
/// values as a sequence and rebuilds the keys from each record's id.
///
/// Integer-keyed maps do not survive internally tagged enums, which is how
/// [`StructureModel`](crate::model::StructureModel) travels.
pub mod id_map {
    use std::collections::BTreeMap;

    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    use super::{Identified, NodeId};

    pub fn serialize<T, S>(map: &BTreeMap<NodeId, T>, serializer: S) -> Result<S::Ok, S::Error>
    where
        T: Serialize,
        S: Serializer,
    {
        serializer.collect_seq(map.values())
    }

    pub fn deserialize<'de, T, D>(deserializer: D) -> Result<BTreeMap<NodeId, T>, D::Error>
    where
        T: Deserialize<'de> + Identified,
        D: Deserializer<'de>,
    {
        let items = Vec::<T>::deserialize(deserializer)?;
        let mut map = BTreeMap::new();
        for item in items {
            let id = item.id();
            if map.insert(id, item).is_some() {
                return Err(D::Error::custom(format!("duplicate node id {id}")));
            }
        }
        Ok(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn node_id_display() {
        assert_eq!(format!("{}", NodeId(7)), "#7");
    }

    #[test]
    fn allocator_never_repeats() {
        let mut ids = IdAllocator::default();
        let a = ids.allocate().unwrap();
        let b = ids.allocate().unwrap();
        assert_eq!(a, NodeId(0));
        assert_eq!(b, NodeId(1));
        assert_eq!(ids.peek(), NodeId(2));
    }

    #[test]
    fn exhausted_allocator_is_an_error() {
        let mut ids = IdAllocator::starting_at(u32::MAX - 1);
        assert_eq!(ids.allocate().unwrap(), NodeId(u32::MAX - 1));
        assert_eq!(ids.allocate(), Err(CoreError::IdsExhausted));
        assert_eq!(ids.peek(), NodeId(u32::MAX));
    }

    #[test]
    fn node_id_orders_by_value() {
        assert!(NodeId(1) < NodeId(2));
    }

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Item {
        id: NodeId,
        label: String,
    }

    impl Identified for Item {
        fn id(&self) -> NodeId {
            self.id
        }
    }

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Holder {
        #[serde(with = "id_map")]
        items: std::collections::BTreeMap<NodeId, Item>,
    }

    #[test]
    fn id_map_travels_as_array() {
        let mut items = std::collections::BTreeMap::new();
        items.insert(NodeId(3), Item { id: NodeId(3), label: "x".into() });
        let holder = Holder { items };
        let json = serde_json::to_string(&holder).unwrap();
        assert_eq!(json, r#"{"items":[{"id":3,"label":"x"}]}"#);
        let back: Holder = serde_json::from_str(&json).unwrap();
        assert_eq!(back, holder);
    }

    #[test]
    fn id_map_rejects_duplicates() {
        let json = r#"{"items":[{"id":1,"label":"a"},{"id":1,"label":"b"}]}"#;
        let err = serde_json::from_str::<Holder>(json).unwrap_err();
        assert!(err.to_string().contains("duplicate node id"));
    }
}
