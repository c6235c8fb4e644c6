//! Main orchestrator for pipeline runs.
//!
//! Sequences generate → publish → report for one task and normalizes the
//! heterogeneous adapter outputs into uniform PublishResults. The slot for
//! the run must already be reserved via `Station::begin`; the orchestrator
//! only ever moves it out of `Running`, on every return path.

use std::sync::Arc;

use tracing::{error, info, instrument, warn};

use crate::core::{PipelineError, RunSlot, Station};
use crate::domain::{LogLevel, Platform, PublishResult, RunMode, Task, TaskResult};
use crate::generator::ContentGenerator;
use crate::mailbox::Mailbox;
use crate::publishers::PublisherRegistry;

/// Destinations a full pipeline run attempts, in order.
pub const DEFAULT_DESTINATIONS: [Platform; 3] =
    [Platform::WordPress, Platform::LinkedIn, Platform::Twitter];

pub struct Orchestrator {
    station: Arc<Station>,
    generator: Arc<ContentGenerator>,
    registry: Arc<PublisherRegistry>,
    mailbox: Arc<Mailbox>,
}

impl Orchestrator {
    pub fn new(
        station: Arc<Station>,
        generator: Arc<ContentGenerator>,
        registry: Arc<PublisherRegistry>,
        mailbox: Arc<Mailbox>,
    ) -> Self {
        Self {
            station,
            generator,
            registry,
            mailbox,
        }
    }

    /// Reserve the run slot and execute the pipeline in one call.
    /// Used by the CLI; the HTTP surface reserves first and enqueues.
    pub async fn start(
        &self,
        task: &Task,
        mode: RunMode,
        destinations: &[Platform],
    ) -> Result<TaskResult, PipelineError> {
        let slot = self.station.begin(task, mode)?;
        Ok(self.run(task, slot, destinations).await)
    }

    /// Execute the pipeline for a task whose slot is already reserved.
    ///
    /// Generation failure ends the run as `Failed` before any publish.
    /// Each destination is attempted independently, in caller order; one
    /// failure never aborts the rest. The run finishes `Completed` as long
    /// as the pipeline reached the end, even when some destinations failed.
    #[instrument(skip(self, task, slot), fields(task_id = %task.id))]
    pub async fn run(&self, task: &Task, slot: RunSlot, destinations: &[Platform]) -> TaskResult {
        info!(subject = %task.subject, "Starting pipeline run");
        self.station
            .log(LogLevel::Info, "Starting content automation pipeline...");

        // Stage 1: generate
        let package = match self.generator.generate_package(task).await {
            Ok(package) => package,
            Err(e) => {
                error!(error = %e, "Content generation failed");
                self.station
                    .log(LogLevel::Error, format!("Pipeline failed: {e}"));
                self.station.update(|r| r.fail(e.to_string()));
                return self.finish(slot);
            }
        };

        self.station.log(
            LogLevel::Success,
            format!("Content generated: \"{}\"", package.blog_post.title),
        );
        let attached = package.clone();
        self.station.update(move |r| r.content = Some(attached));

        // Stage 2: publish, one destination at a time
        for &platform in destinations {
            let result = self.publish_to(platform, &package).await;

            let line = match (&result.success, &result.link, &result.status_line) {
                (true, Some(link), _) => format!("Published to {platform}: {link}"),
                (true, None, Some(status)) => format!("{platform}: {status}"),
                (true, None, None) => format!("Published to {platform}"),
                (false, ..) => format!(
                    "Publishing to {platform} failed: {}",
                    result.error.as_deref().unwrap_or("unknown error")
                ),
            };
            let level = if result.success {
                LogLevel::Success
            } else {
                LogLevel::Error
            };
            self.station.log(level, line);

            self.station.update(move |r| {
                if !r.record_publish(result) {
                    warn!(%platform, "Duplicate destination ignored");
                }
            });
        }

        // Stage 3: report back to the requester. Never fatal.
        let summary = self.report_body();
        self.mailbox
            .send_report(
                &task.sender,
                &format!("Re: {} [Content Ready]", task.subject),
                &summary,
            )
            .await;

        self.station
            .log(LogLevel::Success, "Pipeline completed successfully!");
        self.station.update(|r| r.complete());
        self.finish(slot)
    }

    /// Route one destination to its adapter and normalize the outcome.
    async fn publish_to(
        &self,
        platform: Platform,
        package: &crate::domain::ContentPackage,
    ) -> PublishResult {
        let Some(publisher) = self.registry.get(platform) else {
            return PublishResult::failure(platform, "No adapter registered for destination");
        };

        let outcome = match platform {
            // Long-form goes to the CMS as a draft for review
            Platform::WordPress => {
                publisher
                    .create_draft(&package.blog_post.title, &package.blog_post.content, None)
                    .await
            }
            // Short-form goes straight out
            Platform::LinkedIn | Platform::Twitter => {
                publisher.publish("", &package.social_post, None).await
            }
        };

        match outcome {
            Ok(result) => result,
            Err(e) => PublishResult::failure(platform, e.to_string()),
        }
    }

    fn report_body(&self) -> String {
        let Some(result) = self.station.current() else {
            return String::new();
        };

        let mut lines = vec![format!("Content pipeline report for: {}", result.task_subject)];
        if let Some(ref package) = result.content {
            lines.push(format!("Blog post: {}", package.blog_post.title));
        }
        for publish in &result.publish_results {
            let outcome = if publish.success {
                publish
                    .link
                    .clone()
                    .or_else(|| publish.status_line.clone())
                    .unwrap_or_else(|| "ok".to_string())
            } else {
                format!(
                    "failed ({})",
                    publish.error.as_deref().unwrap_or("unknown error")
                )
            };
            lines.push(format!("- {}: {}", publish.platform, outcome));
        }
        lines.join("\n")
    }

    /// Snapshot the terminal result, consuming the reservation token.
    /// Holding the token means `begin` installed a result, so the
    /// snapshot always exists.
    fn finish(&self, _slot: RunSlot) -> TaskResult {
        self.station
            .current()
            .expect("run slot empty at end of run")
    }
}
