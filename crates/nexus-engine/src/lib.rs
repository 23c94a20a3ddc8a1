//! Trace-producing executors for the NEXUS structure models.
//!
//! Every operation takes a model by reference and returns an
//! [`Outcome`](nexus_core::Outcome): the new model plus the ordered steps
//! that explain how it was reached. The caller's model is never mutated.
//!
//! - [`executor`]: one executor per algorithm family.
//! - [`engine`]: dispatch from a [`request::OperationRequest`] to the right
//!   executor.
//! - [`session`]: undo/redo history over a sequence of operations.
//! - [`verify`]: invariant checks, seeded property runs, trace fingerprints.

pub mod config;
pub mod engine;
pub mod error;
pub mod executor;
pub mod recorder;
pub mod request;
pub mod session;
pub mod verify;

pub use config::EngineConfig;
pub use engine::Engine;
pub use error::EngineError;
pub use recorder::TraceRecorder;
pub use request::OperationRequest;
pub use session::Session;
