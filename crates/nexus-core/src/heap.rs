//! Array-backed binary heap model.
//!
//! Parent/child relations are implied by array position (`2i + 1`,
//! `2i + 2`), so the slot vector itself is the relation table. Each slot
//! still carries a stable id so the renderer can follow an element as it
//! moves during a sift.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::id::{IdAllocator, NodeId};

/// Heap comparator, fixed when the heap is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HeapKind {
    Min,
    Max,
}

impl HeapKind {
    /// True when `a` must sit above `b`, i.e. `a` strictly wins.
    pub fn prefers(self, a: i64, b: i64) -> bool {
        match self {
            HeapKind::Min => a < b,
            HeapKind::Max => a > b,
        }
    }

    /// True when `parent` above `child` satisfies heap order.
    pub fn holds(self, parent: i64, child: i64) -> bool {
        !self.prefers(child, parent)
    }

    /// "smaller" or "larger", for step descriptions.
    pub fn winner_word(self) -> &'static str {
        match self {
            HeapKind::Min => "smaller",
            HeapKind::Max => "larger",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeapEntry {
    pub id: NodeId,
    pub value: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeapModel {
    pub kind: HeapKind,
    pub slots: Vec<HeapEntry>,
    pub ids: IdAllocator,
}

pub fn parent_index(i: usize) -> Option<usize> {
    if i == 0 {
        None
    } else {
        Some((i - 1) / 2)
    }
}

pub fn left_index(i: usize) -> usize {
    2 * i + 1
}

pub fn right_index(i: usize) -> usize {
    2 * i + 2
}

impl HeapModel {
    pub fn new(kind: HeapKind) -> Self {
        HeapModel {
            kind,
            slots: Vec::new(),
            ids: IdAllocator::default(),
        }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn root(&self) -> Option<&HeapEntry> {
        self.slots.first()
    }

    pub fn values(&self) -> Vec<i64> {
        self.slots.iter().map(|e| e.value).collect()
    }

    /// First index whose parent breaks heap order, if any.
    pub fn first_violation(&self) -> Option<usize> {
        (1..self.slots.len()).find(|&i| {
            let p = (i - 1) / 2;
            !self.kind.holds(self.slots[p].value, self.slots[i].value)
        })
    }

    /// Ids are unique and all older than the allocator. Heap order is not
    /// checked here: it may be broken in mid-operation snapshots.
    pub fn validate(&self) -> Result<(), CoreError> {
        let mut seen = std::collections::BTreeSet::new();
        for entry in &self.slots {
            if !seen.insert(entry.id) {
                return Err(CoreError::DuplicateId { id: entry.id });
            }
            if entry.id >= self.ids.peek() {
                return Err(CoreError::StaleAllocator { next: self.ids.peek() });
            }
        }
        Ok(())
    }
}
