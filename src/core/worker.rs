//! Background run worker.
//!
//! The trigger surface reserves the run slot, then enqueues a RunRequest;
//! a single spawned consumer executes runs one at a time. Completion is
//! observed through the Station, not through join handles.

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::domain::{Platform, Task};

use super::{Orchestrator, PipelineError, RunSlot};

/// One queued pipeline run, carrying the reservation made for it.
#[derive(Debug)]
pub struct RunRequest {
    pub task: Task,
    pub slot: RunSlot,
    pub destinations: Vec<Platform>,
}

/// Sender half handed to the trigger surface.
#[derive(Clone)]
pub struct WorkerHandle {
    tx: mpsc::Sender<RunRequest>,
}

impl WorkerHandle {
    /// Hand a reserved run to the worker. `try_send` keeps the trigger
    /// surface non-blocking; with the single-flight slot reserved first,
    /// the queue never holds more than one request.
    pub fn enqueue(&self, request: RunRequest) -> Result<(), PipelineError> {
        self.tx
            .try_send(request)
            .map_err(|_| PipelineError::WorkerUnavailable)
    }
}

/// Spawn the single run consumer and return its handle.
pub fn spawn(orchestrator: Arc<Orchestrator>) -> WorkerHandle {
    let (tx, mut rx) = mpsc::channel::<RunRequest>(4);

    tokio::spawn(async move {
        info!("Run worker started");
        while let Some(request) = rx.recv().await {
            let result = orchestrator
                .run(&request.task, request.slot, &request.destinations)
                .await;
            info!(task_id = %result.task_id, status = ?result.status, "Run finished");
        }
        warn!("Run worker channel closed");
    });

    WorkerHandle { tx }
}
