//! Binary heap executor (min or max, fixed by the model).

use nexus_core::heap::{left_index, parent_index, right_index, HeapEntry, HeapModel};
use nexus_core::{Outcome, Phase};

use super::Executor;
use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::recorder::TraceRecorder;
use crate::request::HeapOp;

type HeapRecorder = TraceRecorder<HeapModel>;

#[derive(Debug, Clone, Default)]
pub struct HeapExecutor {
    config: EngineConfig,
}

impl HeapExecutor {
    pub fn new(config: EngineConfig) -> Self {
        HeapExecutor { config }
    }

    /// Appends `value` at the next free slot and sifts it up.
    pub fn insert(&self, model: &HeapModel, value: i64) -> Result<Outcome<HeapModel>, EngineError> {
        model.validate()?;
        let mut rec = TraceRecorder::new(&self.config);
        let mut heap = model.clone();

        let id = heap.ids.allocate()?;
        heap.slots.push(HeapEntry { id, value });
        let slot = heap.slots.len() - 1;
        rec.record(
            Phase::Append,
            [id],
            &heap,
            format!("Append {value} at index {slot}"),
        )?;
        sift_up(&mut rec, &mut heap, slot)?;
        rec.record(
            Phase::Done,
            [id],
            &heap,
            format!("Inserted {value}: {:?}", heap.values()),
        )?;
        Ok(rec.finish(heap))
    }

    /// Removes the root: swap it with the last slot, drop it, sift down.
    pub fn extract_root(&self, model: &HeapModel) -> Result<Outcome<HeapModel>, EngineError> {
        model.validate()?;
        let mut rec = TraceRecorder::new(&self.config);
        let mut heap = model.clone();

        let Some(root) = heap.root().cloned() else {
            rec.record(Phase::Rejected, [], &heap, "Heap is empty: nothing to extract")?;
            return Ok(rec.finish(heap));
        };
        let last = heap.slots.len() - 1;
        if last > 0 {
            heap.slots.swap(0, last);
            let moved = heap.slots[0].clone();
            rec.record(
                Phase::Swap,
                [root.id, moved.id],
                &heap,
                format!("Swap root {} with last element {}", root.value, moved.value),
            )?;
        }
        heap.slots.pop();
        rec.record(
            Phase::ExtractRoot,
            heap.root().map(|e| e.id),
            &heap,
            format!("Remove {} from the end", root.value),
        )?;
        sift_down(&mut rec, &mut heap, 0)?;
        rec.record(
            Phase::Done,
            heap.root().map(|e| e.id),
            &heap,
            format!("Extracted {}: {:?}", root.value, heap.values()),
        )?;
        Ok(rec.finish(heap))
    }

    pub fn peek(&self, model: &HeapModel) -> Result<Outcome<HeapModel>, EngineError> {
        model.validate()?;
        let mut rec = TraceRecorder::new(&self.config);
        let heap = model.clone();
        match heap.root() {
            Some(root) => rec.record(
                Phase::Peek,
                [root.id],
                &heap,
                format!("Root is {}", root.value),
            )?,
            None => rec.record(Phase::Rejected, [], &heap, "Heap is empty: nothing to peek at")?,
        }
        Ok(rec.finish(heap))
    }
}

impl Executor for HeapExecutor {
    type Model = HeapModel;
    type Request = HeapOp;

    fn config(&self) -> &EngineConfig {
        &self.config
    }

    fn execute(&self, model: &HeapModel, request: &HeapOp) -> Result<Outcome<HeapModel>, EngineError> {
        match *request {
            HeapOp::Insert { value } => self.insert(model, value),
            HeapOp::ExtractRoot => self.extract_root(model),
            HeapOp::Peek => self.peek(model),
        }
    }
}

fn sift_up(rec: &mut HeapRecorder, heap: &mut HeapModel, mut slot: usize) -> Result<(), EngineError> {
    while let Some(parent) = parent_index(slot) {
        let child = heap.slots[slot].clone();
        let above = heap.slots[parent].clone();
        let out_of_order = heap.kind.prefers(child.value, above.value);
        let verdict = if out_of_order { "out of order" } else { "in order" };
        rec.record(
            Phase::Compare,
            [child.id, above.id],
            heap,
            format!("Compare {} with parent {}: {verdict}", child.value, above.value),
        )?;
        if !out_of_order {
            break;
        }
        heap.slots.swap(slot, parent);
        rec.record(
            Phase::Swap,
            [child.id, above.id],
            heap,
            format!("Swap {} up past {}", child.value, above.value),
        )?;
        slot = parent;
    }
    Ok(())
}

fn sift_down(rec: &mut HeapRecorder, heap: &mut HeapModel, mut slot: usize) -> Result<(), EngineError> {
    let len = heap.slots.len();
    loop {
        let left = left_index(slot);
        if left >= len {
            break;
        }
        let right = right_index(slot);
        let winner = if right < len && heap.kind.prefers(heap.slots[right].value, heap.slots[left].value) {
            right
        } else {
            left
        };
        let current = heap.slots[slot].clone();
        let child = heap.slots[winner].clone();
        let out_of_order = heap.kind.prefers(child.value, current.value);
        let verdict = if out_of_order { "out of order" } else { "in order" };
        rec.record(
            Phase::Compare,
            [current.id, child.id],
            heap,
            format!(
                "Compare {} with its {} child {}: {verdict}",
                current.value,
                heap.kind.winner_word(),
                child.value
            ),
        )?;
        if !out_of_order {
            break;
        }
        heap.slots.swap(slot, winner);
        rec.record(
            Phase::Swap,
            [current.id, child.id],
            heap,
            format!("Swap {} down past {}", current.value, child.value),
        )?;
        slot = winner;
    }
    Ok(())
}
