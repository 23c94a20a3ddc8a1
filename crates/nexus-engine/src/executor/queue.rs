//! Bounded message queue executor.
//!
//! Models a producer and a consumer sharing a fixed-capacity FIFO. A full
//! queue blocks the producer; an empty one leaves the consumer with nothing.
//! Dequeued messages move to the model's `delivered` list.

use nexus_core::linear::{Message, QueueModel};
use nexus_core::{Outcome, Phase};

use super::Executor;
use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::recorder::TraceRecorder;
use crate::request::QueueOp;

#[derive(Debug, Clone, Default)]
pub struct QueueExecutor {
    config: EngineConfig,
}

impl QueueExecutor {
    pub fn new(config: EngineConfig) -> Self {
        QueueExecutor { config }
    }

    pub fn enqueue(&self, model: &QueueModel, payload: &str) -> Result<Outcome<QueueModel>, EngineError> {
        model.validate()?;
        let mut rec = TraceRecorder::new(&self.config);
        let mut queue = model.clone();
        if queue.is_full() {
            let rear = queue.rear().map(|m| m.id);
            rec.record(
                Phase::Blocked,
                rear,
                &queue,
                format!(
                    "Queue is full ({}/{}): producer blocked, '{payload}' not enqueued",
                    queue.len(),
                    queue.capacity
                ),
            )?;
            return Ok(rec.finish(queue));
        }
        let id = queue.ids.allocate()?;
        queue.messages.push_back(Message {
            id,
            payload: payload.to_string(),
        });
        rec.record(
            Phase::Enqueue,
            [id],
            &queue,
            format!(
                "Producer enqueues '{payload}' at the rear ({}/{})",
                queue.len(),
                queue.capacity
            ),
        )?;
        Ok(rec.finish(queue))
    }

    pub fn dequeue(&self, model: &QueueModel) -> Result<Outcome<QueueModel>, EngineError> {
        model.validate()?;
        let mut rec = TraceRecorder::new(&self.config);
        let mut queue = model.clone();
        match queue.messages.pop_front() {
            Some(message) => {
                let (id, payload) = (message.id, message.payload.clone());
                queue.delivered.push(message);
                rec.record(
                    Phase::Dequeue,
                    [id],
                    &queue,
                    format!("Consumer takes '{payload}' from the front"),
                )?;
            }
            None => {
                rec.record(
                    Phase::Rejected,
                    [],
                    &queue,
                    "Queue is empty: the consumer has nothing to take",
                )?;
            }
        }
        Ok(rec.finish(queue))
    }

    pub fn peek(&self, model: &QueueModel) -> Result<Outcome<QueueModel>, EngineError> {
        model.validate()?;
        let mut rec = TraceRecorder::new(&self.config);
        let queue = model.clone();
        match queue.front() {
            Some(front) => rec.record(
                Phase::Peek,
                [front.id],
                &queue,
                format!("Front is '{}'", front.payload),
            )?,
            None => rec.record(Phase::Rejected, [], &queue, "Queue is empty: nothing to peek at")?,
        }
        Ok(rec.finish(queue))
    }
}

impl Executor for QueueExecutor {
    type Model = QueueModel;
    type Request = QueueOp;

    fn config(&self) -> &EngineConfig {
        &self.config
    }

    fn execute(&self, model: &QueueModel, request: &QueueOp) -> Result<Outcome<QueueModel>, EngineError> {
        match request {
            QueueOp::Enqueue { message } => self.enqueue(model, message),
            QueueOp::Dequeue => self.dequeue(model),
            QueueOp::Peek => self.peek(model),
        }
    }
}
