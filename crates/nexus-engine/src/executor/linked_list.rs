//! Singly linked list executor.
//!
//! Walking the list records a `Visit` step per hop; every pointer rewrite
//! records a `Link` or `Unlink` step, so insertion shows the new node being
//! wired in before its predecessor is redirected.

use nexus_core::list::ListModel;
use nexus_core::{NodeId, Outcome, Phase};

use super::Executor;
use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::recorder::TraceRecorder;
use crate::request::ListOp;

type ListRecorder = TraceRecorder<ListModel>;

#[derive(Debug, Clone, Default)]
pub struct LinkedListExecutor {
    config: EngineConfig,
}

impl LinkedListExecutor {
    pub fn new(config: EngineConfig) -> Self {
        LinkedListExecutor { config }
    }

    fn begin(&self, model: &ListModel) -> Result<(ListRecorder, ListModel), EngineError> {
        model.validate()?;
        Ok((TraceRecorder::new(&self.config), model.clone()))
    }

    pub fn insert_head(&self, model: &ListModel, value: i64) -> Result<Outcome<ListModel>, EngineError> {
        let (mut rec, mut list) = self.begin(model)?;
        let id = link_front(&mut rec, &mut list, value)?;
        finish_with_listing(rec, list, [id], format!("Inserted {value} at the head"))
    }

    pub fn insert_tail(&self, model: &ListModel, value: i64) -> Result<Outcome<ListModel>, EngineError> {
        let (mut rec, mut list) = self.begin(model)?;
        let id = match walk_to(&mut rec, &list, list.len().saturating_sub(1))? {
            None => link_front(&mut rec, &mut list, value)?,
            Some(tail) => link_after(&mut rec, &mut list, tail, value)?,
        };
        finish_with_listing(rec, list, [id], format!("Inserted {value} at the tail"))
    }

    /// Inserts so that the new node ends up at position `index`.
    pub fn insert_at(
        &self,
        model: &ListModel,
        index: usize,
        value: i64,
    ) -> Result<Outcome<ListModel>, EngineError> {
        let (mut rec, mut list) = self.begin(model)?;
        if index > list.len() {
            rec.record(
                Phase::Rejected,
                [],
                &list,
                format!("Index {index} is out of range for a list of length {}", list.len()),
            )?;
            return Ok(rec.finish(list));
        }
        let id = if index == 0 {
            link_front(&mut rec, &mut list, value)?
        } else {
            let prev = walk_to(&mut rec, &list, index - 1)?
                .ok_or(EngineError::MissingNode { node: list.ids.peek() })?;
            link_after(&mut rec, &mut list, prev, value)?
        };
        finish_with_listing(rec, list, [id], format!("Inserted {value} at index {index}"))
    }

    /// Removes the first node holding `value`.
    pub fn delete(&self, model: &ListModel, value: i64) -> Result<Outcome<ListModel>, EngineError> {
        let (mut rec, mut list) = self.begin(model)?;
        if list.is_empty() {
            rec.record(
                Phase::Rejected,
                [],
                &list,
                format!("List is empty: cannot delete {value}"),
            )?;
            return Ok(rec.finish(list));
        }
        let Some((prev, target)) = scan_for(&mut rec, &list, value)? else {
            rec.record(
                Phase::NotFound,
                [],
                &list,
                format!("{value} is not in the list: nothing deleted"),
            )?;
            return Ok(rec.finish(list));
        };
        let next = list.next(target);
        match prev {
            None => {
                list.head = next;
                list.nodes.remove(&target);
                rec.record(
                    Phase::Unlink,
                    next,
                    &list,
                    format!("Head moves past {value}"),
                )?;
            }
            Some(p) => {
                list.set_next(p, next);
                list.nodes.remove(&target);
                let before = value_of(&list, p)?;
                rec.record(
                    Phase::Unlink,
                    Some(p).into_iter().chain(next),
                    &list,
                    format!("{before} now skips over {value}"),
                )?;
            }
        }
        finish_with_listing(rec, list, [], format!("Deleted {value}"))
    }

    pub fn search(&self, model: &ListModel, value: i64) -> Result<Outcome<ListModel>, EngineError> {
        let (mut rec, list) = self.begin(model)?;
        match scan_for(&mut rec, &list, value)? {
            Some((_, id)) => rec.record(Phase::Found, [id], &list, format!("Found {value}"))?,
            None => rec.record(
                Phase::NotFound,
                [],
                &list,
                format!("Reached the end: {value} is not in the list"),
            )?,
        }
        Ok(rec.finish(list))
    }
}

impl Executor for LinkedListExecutor {
    type Model = ListModel;
    type Request = ListOp;

    fn config(&self) -> &EngineConfig {
        &self.config
    }

    fn execute(&self, model: &ListModel, request: &ListOp) -> Result<Outcome<ListModel>, EngineError> {
        match *request {
            ListOp::InsertHead { value } => self.insert_head(model, value),
            ListOp::InsertTail { value } => self.insert_tail(model, value),
            ListOp::InsertAt { index, value } => self.insert_at(model, index, value),
            ListOp::Delete { value } => self.delete(model, value),
            ListOp::Search { value } => self.search(model, value),
        }
    }
}

// ---------------------------------------------------------------------------
// Pointer moves
// ---------------------------------------------------------------------------

fn value_of(list: &ListModel, id: NodeId) -> Result<i64, EngineError> {
    list.node(id)
        .map(|n| n.value)
        .ok_or(EngineError::MissingNode { node: id })
}

/// Visits nodes from the head up to position `index` and returns that node,
/// or `None` for an empty list.
fn walk_to(rec: &mut ListRecorder, list: &ListModel, index: usize) -> Result<Option<NodeId>, EngineError> {
    let mut cursor = list.head;
    let mut position = 0;
    while let Some(id) = cursor {
        let value = value_of(list, id)?;
        if position == index {
            rec.record(Phase::Visit, [id], list, format!("Stop at {value} (index {position})"))?;
            return Ok(Some(id));
        }
        rec.record(Phase::Visit, [id], list, format!("Visit {value}: follow next"))?;
        cursor = list.next(id);
        position += 1;
    }
    Ok(None)
}

/// Visits nodes until one holds `value`. Returns `(predecessor, node)`.
fn scan_for(
    rec: &mut ListRecorder,
    list: &ListModel,
    value: i64,
) -> Result<Option<(Option<NodeId>, NodeId)>, EngineError> {
    let mut prev = None;
    let mut cursor = list.head;
    while let Some(id) = cursor {
        let current = value_of(list, id)?;
        let verdict = if current == value { "match" } else { "no match" };
        rec.record(Phase::Visit, [id], list, format!("Visit {current}: {verdict}"))?;
        if current == value {
            return Ok(Some((prev, id)));
        }
        prev = Some(id);
        cursor = list.next(id);
    }
    Ok(None)
}

fn link_front(rec: &mut ListRecorder, list: &mut ListModel, value: i64) -> Result<NodeId, EngineError> {
    let id = list.allocate(value)?;
    let old_head = list.head;
    list.set_next(id, old_head);
    let description = match old_head.map(|h| value_of(list, h)).transpose()? {
        Some(v) => format!("New node {value} points at the old head {v}"),
        None => format!("New node {value} points at nothing"),
    };
    rec.record(Phase::Link, Some(id).into_iter().chain(old_head), list, description)?;
    list.head = Some(id);
    rec.record(Phase::Link, [id], list, format!("Head now points at {value}"))?;
    Ok(id)
}

fn link_after(
    rec: &mut ListRecorder,
    list: &mut ListModel,
    prev: NodeId,
    value: i64,
) -> Result<NodeId, EngineError> {
    let id = list.allocate(value)?;
    let next = list.next(prev);
    list.set_next(id, next);
    let description = match next.map(|n| value_of(list, n)).transpose()? {
        Some(v) => format!("New node {value} points at {v}"),
        None => format!("New node {value} points at nothing"),
    };
    rec.record(Phase::Link, Some(id).into_iter().chain(next), list, description)?;
    list.set_next(prev, Some(id));
    let before = value_of(list, prev)?;
    rec.record(Phase::Link, [prev, id], list, format!("{before} now points at {value}"))?;
    Ok(id)
}

fn finish_with_listing(
    mut rec: ListRecorder,
    list: ListModel,
    highlighted: impl IntoIterator<Item = NodeId>,
    headline: String,
) -> Result<Outcome<ListModel>, EngineError> {
    let rendered = list
        .values()
        .iter()
        .map(i64::to_string)
        .collect::<Vec<_>>()
        .join(" → ");
    rec.record(Phase::Done, highlighted, &list, format!("{headline}: [{rendered}]"))?;
    Ok(rec.finish(list))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn list(values: &[i64]) -> ListModel {
        ListModel::from_values(values.iter().copied()).unwrap()
    }

    #[test]
    fn insert_head_rewrites_two_pointers() {
        let outcome = LinkedListExecutor::default()
            .insert_head(&list(&[4, 1]), 7)
            .unwrap();
        assert_eq!(
            outcome.trace.phases(),
            vec![Phase::Link, Phase::Link, Phase::Done]
        );
        assert_eq!(outcome.new_model.values(), vec![7, 4, 1]);
    }

    #[test]
    fn insert_tail_walks_the_list() {
        let outcome = LinkedListExecutor::default()
            .insert_tail(&list(&[4, 1]), 9)
            .unwrap();
        assert_eq!(outcome.trace.count(Phase::Visit), 2);
        assert_eq!(outcome.new_model.values(), vec![4, 1, 9]);
        assert!(outcome.new_model.validate().is_ok());
    }

    #[test]
    fn insert_tail_on_empty_list_sets_head() {
        let outcome = LinkedListExecutor::default()
            .insert_tail(&ListModel::new(), 3)
            .unwrap();
        assert_eq!(outcome.new_model.values(), vec![3]);
        assert_eq!(outcome.trace.count(Phase::Visit), 0);
    }

    #[test]
    fn insert_at_middle() {
        let outcome = LinkedListExecutor::default()
            .insert_at(&list(&[1, 2, 4]), 2, 3)
            .unwrap();
        assert_eq!(outcome.new_model.values(), vec![1, 2, 3, 4]);
        assert_eq!(outcome.trace.count(Phase::Link), 2);
    }

    #[test]
    fn insert_at_end_index_appends() {
        let outcome = LinkedListExecutor::default()
            .insert_at(&list(&[1, 2]), 2, 3)
            .unwrap();
        assert_eq!(outcome.new_model.values(), vec![1, 2, 3]);
    }

    #[test]
    fn insert_at_out_of_range_is_rejected() {
        let original = list(&[1]);
        let outcome = LinkedListExecutor::default()
            .insert_at(&original, 5, 3)
            .unwrap();
        assert_eq!(outcome.trace.phases(), vec![Phase::Rejected]);
        assert_eq!(outcome.new_model, original);
    }

    #[test]
    fn delete_head_and_middle() {
        let exec = LinkedListExecutor::default();
        let outcome = exec.delete(&list(&[4, 7, 1]), 4).unwrap();
        assert_eq!(outcome.new_model.values(), vec![7, 1]);
        let outcome = exec.delete(&list(&[4, 7, 1]), 7).unwrap();
        assert_eq!(outcome.new_model.values(), vec![4, 1]);
        assert_eq!(outcome.trace.count(Phase::Unlink), 1);
        assert!(outcome.new_model.validate().is_ok());
    }

    #[test]
    fn delete_missing_value() {
        let original = list(&[4, 7]);
        let outcome = LinkedListExecutor::default().delete(&original, 5).unwrap();
        assert_eq!(outcome.trace.terminal_phase(), Some(Phase::NotFound));
        assert_eq!(outcome.new_model, original);
    }

    #[test]
    fn delete_from_empty_is_rejected() {
        let outcome = LinkedListExecutor::default()
            .delete(&ListModel::new(), 5)
            .unwrap();
        assert_eq!(outcome.trace.phases(), vec![Phase::Rejected]);
    }

    #[test]
    fn search_visits_until_match() {
        let outcome = LinkedListExecutor::default()
            .search(&list(&[4, 7, 1]), 7)
            .unwrap();
        assert_eq!(
            outcome.trace.phases(),
            vec![Phase::Visit, Phase::Visit, Phase::Found]
        );
    }
}
