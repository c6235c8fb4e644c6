//! Shared run state: the single-flight slot and the execution log.
//!
//! One Station is created at startup and handed by reference to the
//! orchestrator, the worker, and the HTTP layer. Only the orchestrator
//! writes the current-task slot; the busy check and the install happen
//! under one lock acquisition so two run attempts cannot both pass.
//!
//! The log buffer is append-only and bounded: beyond capacity the oldest
//! entry is dropped. Writers hold the lock only for the O(1) append, so
//! concurrent readers are never starved.

use std::collections::VecDeque;
use std::sync::{Mutex, RwLock};

use tracing::info;

use crate::domain::{LogEntry, LogLevel, RunMode, Task, TaskResult};

use super::PipelineError;

/// Maximum retained execution-log entries.
pub const LOG_CAPACITY: usize = 100;

/// Proof that the run slot was reserved. Only `Station::begin` can mint
/// one, and `Orchestrator::run` consumes it, so a run cannot start
/// without the slot held.
#[derive(Debug)]
#[must_use = "a reserved slot must be handed to the run that fills it"]
pub struct RunSlot {
    _reserved: (),
}

#[derive(Default)]
pub struct Station {
    current: Mutex<Option<TaskResult>>,
    logs: RwLock<VecDeque<LogEntry>>,
}

impl Station {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserve the run slot for a task. Rejects with `Busy` while a run is
    /// in flight, leaving the in-flight result untouched. On success the
    /// slot holds a fresh `Running` result and a `RunSlot` token is
    /// returned for the run that will fill it.
    pub fn begin(&self, task: &Task, mode: RunMode) -> Result<RunSlot, PipelineError> {
        let mut current = self.current.lock().expect("station lock poisoned");

        if current.as_ref().is_some_and(|r| r.is_running()) {
            return Err(PipelineError::Busy);
        }

        *current = Some(TaskResult::begin(task.id.as_str(), task.subject.as_str(), mode));
        Ok(RunSlot { _reserved: () })
    }

    /// Mutate the in-flight result. No-op when the slot is empty.
    pub fn update<F>(&self, mutate: F)
    where
        F: FnOnce(&mut TaskResult),
    {
        let mut current = self.current.lock().expect("station lock poisoned");
        if let Some(result) = current.as_mut() {
            mutate(result);
        }
    }

    /// Snapshot of the current (or most recent) run result.
    pub fn current(&self) -> Option<TaskResult> {
        self.current.lock().expect("station lock poisoned").clone()
    }

    /// Append an execution-log line, dropping the oldest beyond capacity.
    pub fn log(&self, level: LogLevel, message: impl Into<String>) {
        let entry = LogEntry::new(level, message);
        info!(target: "execution_log", "{}", entry.message);

        let mut logs = self.logs.write().expect("log lock poisoned");
        if logs.len() >= LOG_CAPACITY {
            logs.pop_front();
        }
        logs.push_back(entry);
    }

    /// The last `n` log entries, oldest first.
    pub fn tail(&self, n: usize) -> Vec<LogEntry> {
        let logs = self.logs.read().expect("log lock poisoned");
        let skip = logs.len().saturating_sub(n);
        logs.iter().skip(skip).cloned().collect()
    }

    /// The whole log buffer, oldest first.
    pub fn all_logs(&self) -> Vec<LogEntry> {
        let logs = self.logs.read().expect("log lock poisoned");
        logs.iter().cloned().collect()
    }

    pub fn clear_logs(&self) {
        self.logs.write().expect("log lock poisoned").clear();
        self.log(LogLevel::Info, "Logs cleared");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_begin_rejects_while_running() {
        let station = Station::new();

        let _slot = station.begin(&Task::sample(), RunMode::Demo).unwrap();
        let before = station.current().unwrap();

        let err = station
            .begin(&Task::new("a@b.c", "second", "body"), RunMode::Demo)
            .unwrap_err();
        assert!(matches!(err, PipelineError::Busy));

        // In-flight result untouched by the rejected attempt
        let after = station.current().unwrap();
        assert_eq!(after.task_id, before.task_id);
        assert_eq!(after.started_at, before.started_at);
        assert!(after.is_running());
    }

    #[test]
    fn test_begin_allowed_after_terminal_state() {
        let station = Station::new();

        let _slot = station.begin(&Task::sample(), RunMode::Demo).unwrap();
        station.update(|r| r.complete());

        let task = Task::new("a@b.c", "next", "body");
        let _slot = station.begin(&task, RunMode::Production).unwrap();
        assert_eq!(station.current().unwrap().task_id, task.id);
    }

    #[test]
    fn test_log_buffer_drops_oldest() {
        let station = Station::new();

        for i in 0..(LOG_CAPACITY + 10) {
            station.log(LogLevel::Info, format!("entry {i}"));
        }

        let logs = station.all_logs();
        assert_eq!(logs.len(), LOG_CAPACITY);
        assert_eq!(logs.first().unwrap().message, "entry 10");
        assert_eq!(
            logs.last().unwrap().message,
            format!("entry {}", LOG_CAPACITY + 9)
        );
    }

    #[test]
    fn test_tail_returns_most_recent() {
        let station = Station::new();
        for i in 0..30 {
            station.log(LogLevel::Info, format!("entry {i}"));
        }

        let tail = station.tail(20);
        assert_eq!(tail.len(), 20);
        assert_eq!(tail.first().unwrap().message, "entry 10");
        assert_eq!(tail.last().unwrap().message, "entry 29");
    }

    #[test]
    fn test_clear_logs_leaves_marker() {
        let station = Station::new();
        station.log(LogLevel::Error, "boom");
        station.clear_logs();

        let logs = station.all_logs();
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].message, "Logs cleared");
    }
}
