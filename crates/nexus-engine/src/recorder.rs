//! Step recording.
//!
//! Executors mutate a private working copy of the model and call
//! [`TraceRecorder::record`] after each meaningful change. The recorder
//! clones the working copy into the step, numbers the step, and enforces the
//! configured step limit.

use nexus_core::{Highlight, NodeId, Outcome, Phase, Step, Structure, Trace};

use crate::config::EngineConfig;
use crate::error::EngineError;

/// Accumulates the steps of one operation call.
#[derive(Debug)]
pub struct TraceRecorder<M> {
    steps: Vec<Step<M>>,
    step_limit: usize,
}

impl<M: Structure> TraceRecorder<M> {
    pub fn new(config: &EngineConfig) -> Self {
        TraceRecorder {
            steps: Vec::new(),
            step_limit: config.step_limit,
        }
    }

    /// Appends a step whose snapshot is a clone of `snapshot`.
    pub fn record(
        &mut self,
        phase: Phase,
        highlighted: impl IntoIterator<Item = NodeId>,
        snapshot: &M,
        description: impl Into<String>,
    ) -> Result<(), EngineError> {
        if self.steps.len() >= self.step_limit {
            return Err(EngineError::StepLimitExceeded {
                limit: self.step_limit,
            });
        }
        self.steps.push(Step {
            index: self.steps.len(),
            phase,
            highlighted: highlighted.into_iter().collect::<Highlight>(),
            snapshot: snapshot.clone(),
            description: description.into(),
        });
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Closes the trace. If the last snapshot does not already equal
    /// `new_model`, a closing `Done` step is appended so the trace always
    /// ends on the returned state.
    pub fn finish(mut self, new_model: M) -> Outcome<M> {
        let settled = self
            .steps
            .last()
            .is_some_and(|step| step.snapshot == new_model);
        if !settled {
            self.steps.push(Step {
                index: self.steps.len(),
                phase: Phase::Done,
                highlighted: Highlight::new(),
                snapshot: new_model.clone(),
                description: "Operation complete".into(),
            });
        }
        Outcome {
            new_model,
            trace: Trace::from_steps(self.steps),
        }
    }
}
