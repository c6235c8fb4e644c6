//! Pipeline orchestration.
//!
//! - `station`: shared run state (single-flight slot + execution log)
//! - `orchestrator`: the ingest → generate → publish → report sequence
//! - `worker`: background consumer the trigger surface enqueues runs onto

pub mod orchestrator;
pub mod station;
pub mod worker;

pub use orchestrator::Orchestrator;
pub use station::{RunSlot, Station};
pub use worker::{RunRequest, WorkerHandle};

use thiserror::Error;

use crate::domain::{UnknownContentKind, UnknownPlatform};
use crate::generator::GenerationError;

/// Errors the pipeline surfaces to callers.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// A run is already in flight; the new attempt was rejected without
    /// touching it.
    #[error("A task is already running")]
    Busy,

    #[error(transparent)]
    Generation(#[from] GenerationError),

    #[error(transparent)]
    UnknownPlatform(#[from] UnknownPlatform),

    #[error(transparent)]
    UnknownContentKind(#[from] UnknownContentKind),

    /// The background worker is gone; the reserved run slot was released.
    #[error("Run worker is not available")]
    WorkerUnavailable,
}
