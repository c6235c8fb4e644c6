//! Inbound task requests.
//!
//! A Task is one unit of work for the pipeline: an email-shaped record
//! identifying who asked for content and what they asked for. Immutable
//! once handed to the orchestrator.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A content request, as pulled from the inbox or supplied by a caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    /// Unique identifier for this task
    pub id: String,

    /// Who requested the content
    pub sender: String,

    /// Request subject line
    pub subject: String,

    /// Request body (what to create)
    pub body: String,

    /// Source conversation thread, when the task came from a mailbox
    pub thread_id: Option<String>,
}

/// Caller-supplied task fields, as accepted on the trigger surface.
/// Missing fields get filled in by [`Task::from_payload`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TaskPayload {
    pub sender: Option<String>,
    pub subject: String,
    pub body: String,
    pub thread_id: Option<String>,
}

impl Task {
    pub fn new(
        sender: impl Into<String>,
        subject: impl Into<String>,
        body: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            sender: sender.into(),
            subject: subject.into(),
            body: body.into(),
            thread_id: None,
        }
    }

    /// Build a task from a caller-supplied payload.
    pub fn from_payload(payload: TaskPayload) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            sender: payload
                .sender
                .unwrap_or_else(|| "operator@dashboard.local".to_string()),
            subject: payload.subject,
            body: payload.body,
            thread_id: payload.thread_id,
        }
    }

    /// The canonical demo task: a marketing lead asking for content about
    /// a recycled paper notebook.
    pub fn sample() -> Self {
        Self {
            id: "msg_98765".to_string(),
            sender: "marketing_lead@giftservice.com".to_string(),
            subject: "TASK: Create Content for Eco-Friendly Notebook".to_string(),
            body: "We have a new product: 'Recycled Paper Notebook'. Please generate \
                   a blog post about the importance of sustainable stationery and a \
                   LinkedIn post. Price: $12."
                .to_string(),
            thread_id: Some("thread_98765".to_string()),
        }
    }

    /// Synthetic task used by the preview surface (generate, never publish).
    pub fn preview(subject: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            id: "preview".to_string(),
            sender: "preview@dashboard.local".to_string(),
            subject: subject.into(),
            body: body.into(),
            thread_id: Some("preview_thread".to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_payload_fills_sender() {
        let task = Task::from_payload(TaskPayload {
            subject: "New launch".to_string(),
            body: "Write about it".to_string(),
            ..Default::default()
        });

        assert_eq!(task.sender, "operator@dashboard.local");
        assert!(!task.id.is_empty());
    }

    #[test]
    fn test_sample_task_shape() {
        let task = Task::sample();
        assert!(task.subject.contains("Notebook"));
        assert!(task.body.contains("Recycled Paper Notebook"));
        assert!(task.thread_id.is_some());
    }
}
