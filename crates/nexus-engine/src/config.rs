//! Engine configuration.

use serde::{Deserialize, Serialize};

/// Default cap on the number of steps one operation may record.
pub const DEFAULT_STEP_LIMIT: usize = 10_000;

/// Configuration shared by every executor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Maximum steps per trace. Exceeding it aborts the operation with
    /// [`EngineError::StepLimitExceeded`](crate::EngineError::StepLimitExceeded).
    /// Default: 10 000.
    pub step_limit: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            step_limit: DEFAULT_STEP_LIMIT,
        }
    }
}

impl EngineConfig {
    pub fn with_step_limit(step_limit: usize) -> Self {
        EngineConfig { step_limit }
    }
}
