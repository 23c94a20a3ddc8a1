//! Bounded stack executor.

use nexus_core::linear::{StackItem, StackModel};
use nexus_core::{Outcome, Phase};

use super::Executor;
use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::recorder::TraceRecorder;
use crate::request::StackOp;

#[derive(Debug, Clone, Default)]
pub struct StackExecutor {
    config: EngineConfig,
}

impl StackExecutor {
    pub fn new(config: EngineConfig) -> Self {
        StackExecutor { config }
    }

    pub fn push(&self, model: &StackModel, value: i64) -> Result<Outcome<StackModel>, EngineError> {
        model.validate()?;
        let mut rec = TraceRecorder::new(&self.config);
        let mut stack = model.clone();
        if stack.is_full() {
            let top = stack.top().map(|item| item.id);
            rec.record(
                Phase::Rejected,
                top,
                &stack,
                format!("Stack overflow: capacity {} reached, {value} not pushed", stack.capacity),
            )?;
            return Ok(rec.finish(stack));
        }
        let id = stack.ids.allocate()?;
        stack.items.push(StackItem { id, value });
        rec.record(
            Phase::Push,
            [id],
            &stack,
            format!("Push {value} ({}/{})", stack.len(), stack.capacity),
        )?;
        Ok(rec.finish(stack))
    }

    pub fn pop(&self, model: &StackModel) -> Result<Outcome<StackModel>, EngineError> {
        model.validate()?;
        let mut rec = TraceRecorder::new(&self.config);
        let mut stack = model.clone();
        match stack.items.pop() {
            Some(item) => {
                rec.record(
                    Phase::Pop,
                    stack.top().map(|top| top.id),
                    &stack,
                    format!("Pop {}", item.value),
                )?;
            }
            None => {
                rec.record(Phase::Rejected, [], &stack, "Stack underflow: nothing to pop")?;
            }
        }
        Ok(rec.finish(stack))
    }

    pub fn peek(&self, model: &StackModel) -> Result<Outcome<StackModel>, EngineError> {
        model.validate()?;
        let mut rec = TraceRecorder::new(&self.config);
        let stack = model.clone();
        match stack.top() {
            Some(top) => rec.record(Phase::Peek, [top.id], &stack, format!("Top is {}", top.value))?,
            None => rec.record(Phase::Rejected, [], &stack, "Stack is empty: nothing to peek at")?,
        }
        Ok(rec.finish(stack))
    }
}

impl Executor for StackExecutor {
    type Model = StackModel;
    type Request = StackOp;

    fn config(&self) -> &EngineConfig {
        &self.config
    }

    fn execute(&self, model: &StackModel, request: &StackOp) -> Result<Outcome<StackModel>, EngineError> {
        match *request {
            StackOp::Push { value } => self.push(model, value),
            StackOp::Pop => self.pop(model),
            StackOp::Peek => self.peek(model),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_pop_is_lifo() {
        let exec = StackExecutor::default();
        let stack = StackModel::with_capacity(3);
        let stack = exec.push(&stack, 1).unwrap().new_model;
        let stack = exec.push(&stack, 2).unwrap().new_model;
        let outcome = exec.pop(&stack).unwrap();
        assert_eq!(outcome.trace.last().unwrap().description, "Pop 2");
        assert_eq!(outcome.new_model.top().map(|i| i.value), Some(1));
    }

    #[test]
    fn overflow_is_rejected() {
        let exec = StackExecutor::default();
        let stack = exec.push(&StackModel::with_capacity(1), 1).unwrap().new_model;
        let outcome = exec.push(&stack, 2).unwrap();
        assert_eq!(outcome.trace.phases(), vec![Phase::Rejected]);
        assert_eq!(outcome.new_model, stack);
    }

    #[test]
    fn underflow_is_rejected() {
        let outcome = StackExecutor::default()
            .pop(&StackModel::with_capacity(2))
            .unwrap();
        assert_eq!(outcome.trace.terminal_phase(), Some(Phase::Rejected));
    }

    #[test]
    fn peek_does_not_change_stack() {
        let exec = StackExecutor::default();
        let stack = exec.push(&StackModel::with_capacity(2), 9).unwrap().new_model;
        let outcome = exec.peek(&stack).unwrap();
        assert_eq!(outcome.trace.phases(), vec![Phase::Peek]);
        assert_eq!(outcome.new_model, stack);
    }
}
