//! Command-line interface for postpilot.
//!
//! Provides commands for serving the dashboard API, running the pipeline
//! once from the terminal, previewing generated content, and inspecting
//! the capability snapshot.

use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::config::{Config, Integration};
use crate::core::orchestrator::DEFAULT_DESTINATIONS;
use crate::core::{worker, Orchestrator, Station};
use crate::domain::{RunMode, Task, TaskPayload};
use crate::generator::ContentGenerator;
use crate::mailbox::Mailbox;
use crate::publishers::PublisherRegistry;
use crate::server::{self, AppContext};

/// postpilot - dual-mode content-marketing pipeline
#[derive(Parser, Debug)]
#[command(name = "postpilot")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the dashboard API server
    Serve {
        /// Address to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Port to listen on
        #[arg(short, long, default_value = "5000")]
        port: u16,
    },

    /// Run the pipeline once and print the result
    Run {
        /// Use the built-in sample task even when credentials are present
        #[arg(long)]
        demo: bool,

        /// Subject of a custom task (requires --body)
        #[arg(long, requires = "body")]
        subject: Option<String>,

        /// Body of a custom task (requires --subject)
        #[arg(long, requires = "subject")]
        body: Option<String>,
    },

    /// Generate content for a request without publishing
    Preview {
        #[arg(long)]
        subject: String,

        #[arg(long)]
        body: String,
    },

    /// Show the capability snapshot
    Config,
}

impl Cli {
    pub async fn execute(self) -> Result<()> {
        let config = Config::from_env();

        match self.command {
            Commands::Serve { host, port } => serve(config, &host, port).await,
            Commands::Run {
                demo,
                subject,
                body,
            } => run_once(config, demo, subject, body).await,
            Commands::Preview { subject, body } => preview(config, &subject, &body).await,
            Commands::Config => show_config(&config),
        }
    }
}

async fn build_context(config: Config) -> Arc<AppContext> {
    let station = Arc::new(Station::new());
    let generator = Arc::new(ContentGenerator::new(&config));
    let registry = Arc::new(PublisherRegistry::connect(&config).await);
    let mailbox = Arc::new(Mailbox::new(&config));

    let orchestrator = Arc::new(Orchestrator::new(
        station.clone(),
        generator.clone(),
        registry.clone(),
        mailbox.clone(),
    ));
    let worker = worker::spawn(orchestrator);

    Arc::new(AppContext {
        config,
        station,
        generator,
        registry,
        mailbox,
        worker,
    })
}

async fn serve(config: Config, host: &str, port: u16) -> Result<()> {
    let ctx = build_context(config).await;
    server::serve(ctx, host, port).await
}

async fn run_once(
    config: Config,
    demo: bool,
    subject: Option<String>,
    body: Option<String>,
) -> Result<()> {
    let station = Arc::new(Station::new());
    let generator = Arc::new(ContentGenerator::new(&config));
    let registry = Arc::new(PublisherRegistry::connect(&config).await);
    let mailbox = Arc::new(Mailbox::new(&config));
    let orchestrator = Orchestrator::new(station, generator, registry, mailbox);

    let (task, mode) = match (subject, body) {
        (Some(subject), Some(body)) => (
            Task::from_payload(TaskPayload {
                subject,
                body,
                ..Default::default()
            }),
            RunMode::Production,
        ),
        _ => {
            let mode = if demo || config.demo_mode {
                RunMode::Demo
            } else {
                RunMode::Production
            };
            (Task::sample(), mode)
        }
    };

    let result = orchestrator
        .start(&task, mode, &DEFAULT_DESTINATIONS)
        .await?;

    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}

async fn preview(config: Config, subject: &str, body: &str) -> Result<()> {
    let generator = ContentGenerator::new(&config);
    let package = generator.preview(subject, body).await?;
    println!("{}", serde_json::to_string_pretty(&package)?);
    Ok(())
}

fn show_config(config: &Config) -> Result<()> {
    let snapshot = config.snapshot();

    println!("Demo mode: {}", snapshot.demo_mode);
    println!("Integrations:");
    for integration in Integration::ALL {
        let configured = snapshot
            .integrations
            .get(integration.key())
            .copied()
            .unwrap_or(false);
        let marker = if configured { "configured" } else { "not configured" };
        println!("  {:<14} {}", integration.display_name(), marker);
    }

    Ok(())
}
