//! Operation history with undo/redo and named checkpoints.
//!
//! A [`Session`] owns the current model and applies requests through an
//! [`Engine`]. Models are immutable values, so history is just the list of
//! prior models: undo restores the model before the last applied request,
//! redo replays the stored result. Applying a new request clears the redo
//! stack. Requests that leave the model unchanged (refusals, lookups) are
//! not recorded.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use nexus_core::{StructureModel, Trace};

use crate::config::EngineConfig;
use crate::engine::Engine;
use crate::error::EngineError;
use crate::request::OperationRequest;

/// What moved the session from one model to the next.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum HistoryCause {
    Request { request: OperationRequest },
    Restore { checkpoint: String },
}

/// One history transition and the models on either side of it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub cause: HistoryCause,
    pub before: StructureModel,
    pub after: StructureModel,
}

impl HistoryEntry {
    fn label(&self) -> &str {
        match &self.cause {
            HistoryCause::Request { request } => request.family(),
            HistoryCause::Restore { checkpoint } => checkpoint,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Session {
    engine: Engine,
    current: StructureModel,
    undo_stack: Vec<HistoryEntry>,
    redo_stack: Vec<HistoryEntry>,
    checkpoints: BTreeMap<String, StructureModel>,
    last_trace: Option<Trace<StructureModel>>,
}

impl Session {
    pub fn new(model: StructureModel, config: EngineConfig) -> Self {
        Session {
            engine: Engine::new(config),
            current: model,
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            checkpoints: BTreeMap::new(),
            last_trace: None,
        }
    }

    pub fn model(&self) -> &StructureModel {
        &self.current
    }

    pub fn last_trace(&self) -> Option<&Trace<StructureModel>> {
        self.last_trace.as_ref()
    }

    /// Applies `request` to the current model and returns its trace. On
    /// error the session is left exactly as it was.
    pub fn apply(&mut self, request: &OperationRequest) -> Result<&Trace<StructureModel>, EngineError> {
        let outcome = self.engine.execute(&self.current, request)?;
        if outcome.new_model != self.current {
            let before = std::mem::replace(&mut self.current, outcome.new_model.clone());
            self.undo_stack.push(HistoryEntry {
                cause: HistoryCause::Request {
                    request: request.clone(),
                },
                before,
                after: outcome.new_model,
            });
            self.redo_stack.clear();
        }
        Ok(self.last_trace.insert(outcome.trace))
    }

    /// Steps back one applied request. Returns `false` when there is
    /// nothing to undo.
    pub fn undo(&mut self) -> bool {
        let Some(entry) = self.undo_stack.pop() else {
            return false;
        };
        self.current = entry.before.clone();
        tracing::debug!(entry = entry.label(), "undo");
        self.redo_stack.push(entry);
        true
    }

    /// Re-applies the most recently undone request.
    pub fn redo(&mut self) -> bool {
        let Some(entry) = self.redo_stack.pop() else {
            return false;
        };
        self.current = entry.after.clone();
        tracing::debug!(entry = entry.label(), "redo");
        self.undo_stack.push(entry);
        true
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Applied requests, oldest first.
    pub fn history(&self) -> &[HistoryEntry] {
        &self.undo_stack
    }

    /// Saves the current model under `name`, replacing any checkpoint of
    /// the same name.
    pub fn checkpoint(&mut self, name: impl Into<String>) {
        self.checkpoints.insert(name.into(), self.current.clone());
    }

    /// Restores a checkpoint as a new history entry, so it can be undone.
    /// Returns `false` for an unknown name.
    pub fn restore(&mut self, name: &str) -> bool {
        let Some(saved) = self.checkpoints.get(name).cloned() else {
            return false;
        };
        if saved != self.current {
            tracing::debug!(checkpoint = name, "restoring checkpoint");
            let before = std::mem::replace(&mut self.current, saved);
            self.redo_stack.clear();
            self.undo_stack.push(HistoryEntry {
                cause: HistoryCause::Restore {
                    checkpoint: name.to_string(),
                },
                before,
                after: self.current.clone(),
            });
        }
        true
    }

    pub fn checkpoints(&self) -> impl Iterator<Item = &str> {
        self.checkpoints.keys().map(String::as_str)
    }

    pub fn delete_checkpoint(&mut self, name: &str) -> bool {
        self.checkpoints.remove(name).is_some()
    }
}
