//! Run-level results and the operator-visible execution log.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{ContentPackage, Platform};

/// Outcome of one publish attempt against one destination.
///
/// Append-only: once recorded on a TaskResult it is never mutated, and a
/// platform appears at most once per run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublishResult {
    pub platform: Platform,

    /// Draft/preview or live link, for destinations that return one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,

    /// Status line for destinations that do not return a link
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_line: Option<String>,

    pub success: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl PublishResult {
    pub fn link(platform: Platform, link: impl Into<String>) -> Self {
        Self {
            platform,
            link: Some(link.into()),
            status_line: None,
            success: true,
            error: None,
        }
    }

    pub fn status(platform: Platform, status_line: impl Into<String>) -> Self {
        Self {
            platform,
            link: None,
            status_line: Some(status_line.into()),
            success: true,
            error: None,
        }
    }

    pub fn failure(platform: Platform, error: impl Into<String>) -> Self {
        Self {
            platform,
            link: None,
            status_line: None,
            success: false,
            error: Some(error.into()),
        }
    }
}

/// Where the run's task came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunMode {
    Demo,
    Production,
}

/// State of a pipeline run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Pending,
    Running,
    Completed,
    Failed,
}

/// The result record for one pipeline run.
///
/// Created when the task enters the pipeline and mutated in place as each
/// stage finishes. Terminal once Completed or Failed. `Completed` means the
/// pipeline ran to the end; per-destination success lives in
/// `publish_results`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskResult {
    pub task_id: String,
    pub task_subject: String,
    pub mode: RunMode,
    pub status: TaskStatus,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<ContentPackage>,

    pub publish_results: Vec<PublishResult>,

    pub started_at: DateTime<Utc>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl TaskResult {
    /// Create a fresh Running result for a task entering the pipeline.
    pub fn begin(task_id: impl Into<String>, task_subject: impl Into<String>, mode: RunMode) -> Self {
        Self {
            task_id: task_id.into(),
            task_subject: task_subject.into(),
            mode,
            status: TaskStatus::Running,
            content: None,
            publish_results: Vec::new(),
            started_at: Utc::now(),
            completed_at: None,
            error: None,
        }
    }

    pub fn is_running(&self) -> bool {
        self.status == TaskStatus::Running
    }

    /// Record a publish outcome, enforcing publish-once-per-platform.
    /// Returns false (and records nothing) when the platform already has
    /// a result for this run.
    pub fn record_publish(&mut self, result: PublishResult) -> bool {
        if self
            .publish_results
            .iter()
            .any(|r| r.platform == result.platform)
        {
            return false;
        }
        self.publish_results.push(result);
        true
    }

    /// Transition to Completed. The run made it to the end; individual
    /// destinations may still have failed.
    pub fn complete(&mut self) {
        self.status = TaskStatus::Completed;
        self.completed_at = Some(Utc::now());
    }

    /// Transition to Failed with a human-readable error.
    pub fn fail(&mut self, error: impl Into<String>) {
        self.status = TaskStatus::Failed;
        self.error = Some(error.into());
        self.completed_at = Some(Utc::now());
    }
}

/// Severity of an execution-log line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogLevel {
    Info,
    Success,
    Warn,
    Error,
}

/// One line in the operator-visible execution log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    /// Wall-clock time, HH:MM:SS
    pub timestamp: String,
    pub level: LogLevel,
    pub message: String,
}

impl LogEntry {
    pub fn new(level: LogLevel, message: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now().format("%H:%M:%S").to_string(),
            level,
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lifecycle_transitions() {
        let mut result = TaskResult::begin("t1", "subject", RunMode::Demo);
        assert!(result.is_running());
        assert!(result.completed_at.is_none());

        result.complete();
        assert_eq!(result.status, TaskStatus::Completed);
        assert!(result.completed_at.is_some());
    }

    #[test]
    fn test_fail_records_error_and_completed_at() {
        let mut result = TaskResult::begin("t1", "subject", RunMode::Production);
        result.fail("generation backend unreachable");

        assert_eq!(result.status, TaskStatus::Failed);
        assert_eq!(
            result.error.as_deref(),
            Some("generation backend unreachable")
        );
        assert!(result.completed_at.is_some());
    }

    #[test]
    fn test_publish_once_per_platform() {
        let mut result = TaskResult::begin("t1", "subject", RunMode::Demo);

        assert!(result.record_publish(PublishResult::link(
            Platform::WordPress,
            "https://demo.wordpress.com/?p=1234&preview=true"
        )));
        assert!(!result.record_publish(PublishResult::failure(
            Platform::WordPress,
            "duplicate attempt"
        )));
        assert_eq!(result.publish_results.len(), 1);
        assert!(result.publish_results[0].success);
    }

    #[test]
    fn test_log_entry_timestamp_shape() {
        let entry = LogEntry::new(LogLevel::Info, "hello");
        // HH:MM:SS
        assert_eq!(entry.timestamp.len(), 8);
        assert_eq!(entry.timestamp.matches(':').count(), 2);
    }
}
