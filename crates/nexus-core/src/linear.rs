//! Bounded stack and message-queue models.
//!
//! Both keep their elements in order of arrival; the container order is the
//! relation (bottom-to-top for the stack, front-to-rear for the queue).
//! Capacity is fixed at creation.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::id::{IdAllocator, NodeId};

fn check_unique(
    ids: impl Iterator<Item = NodeId>,
    allocator: &IdAllocator,
) -> Result<(), CoreError> {
    let mut seen = std::collections::BTreeSet::new();
    for id in ids {
        if !seen.insert(id) {
            return Err(CoreError::DuplicateId { id });
        }
        if id >= allocator.peek() {
            return Err(CoreError::StaleAllocator { next: allocator.peek() });
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Stack
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StackItem {
    pub id: NodeId,
    pub value: i64,
}

/// LIFO stack; `items.last()` is the top.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StackModel {
    pub capacity: usize,
    pub items: Vec<StackItem>,
    pub ids: IdAllocator,
}

impl StackModel {
    pub fn with_capacity(capacity: usize) -> Self {
        StackModel {
            capacity,
            items: Vec::new(),
            ids: IdAllocator::default(),
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.items.len() >= self.capacity
    }

    pub fn top(&self) -> Option<&StackItem> {
        self.items.last()
    }

    pub fn validate(&self) -> Result<(), CoreError> {
        if self.items.len() > self.capacity {
            return Err(CoreError::CapacityExceeded {
                capacity: self.capacity,
                len: self.items.len(),
            });
        }
        check_unique(self.items.iter().map(|i| i.id), &self.ids)
    }
}

// ---------------------------------------------------------------------------
// Message queue
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: NodeId,
    pub payload: String,
}

/// Bounded FIFO queue between a simulated producer and consumer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueModel {
    pub capacity: usize,
    /// Front of the queue first.
    pub messages: VecDeque<Message>,
    /// Messages the consumer has taken, oldest first.
    pub delivered: Vec<Message>,
    pub ids: IdAllocator,
}

impl QueueModel {
    pub fn with_capacity(capacity: usize) -> Self {
        QueueModel {
            capacity,
            messages: VecDeque::new(),
            delivered: Vec::new(),
            ids: IdAllocator::default(),
        }
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.messages.len() >= self.capacity
    }

    pub fn front(&self) -> Option<&Message> {
        self.messages.front()
    }

    pub fn rear(&self) -> Option<&Message> {
        self.messages.back()
    }

    pub fn payloads(&self) -> Vec<&str> {
        self.messages.iter().map(|m| m.payload.as_str()).collect()
    }

    pub fn validate(&self) -> Result<(), CoreError> {
        if self.messages.len() > self.capacity {
            return Err(CoreError::CapacityExceeded {
                capacity: self.capacity,
                len: self.messages.len(),
            });
        }
        check_unique(
            self.messages.iter().chain(self.delivered.iter()).map(|m| m.id),
            &self.ids,
        )
    }
}
