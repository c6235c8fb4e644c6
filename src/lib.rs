//! postpilot - dual-mode content-marketing pipeline
//!
//! Detects a content task request, generates marketing content for it, and
//! publishes the result to one or more destinations, reporting status back
//! to the operator. Works identically with or without live credentials:
//! every integration substitutes deterministic mock responses when it is
//! unconfigured, demo mode is on, or its real call fails.
//!
//! # Modules
//!
//! - `config`: credential bundles and the capability registry
//! - `domain`: tasks, content packages, publish results
//! - `generator`: mock/OpenAI content generation
//! - `publishers`: per-destination adapters with mock fallback
//! - `mailbox`: task source and report sink
//! - `core`: orchestrator, shared run state, background worker
//! - `server`: HTTP trigger surface
//! - `cli`: command-line interface
//!
//! # Usage
//!
//! ```bash
//! # Start the dashboard API
//! postpilot serve --port 5000
//!
//! # Run the pipeline once against the sample task
//! postpilot run --demo
//!
//! # Generate without publishing
//! postpilot preview --subject "New product" --body "Write about our desk mat"
//! ```

pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod generator;
pub mod mailbox;
pub mod publishers;
pub mod server;

// Re-export main types at crate root for convenience
pub use config::{CapabilitySnapshot, Config, Integration};
pub use crate::core::{Orchestrator, PipelineError, RunSlot, Station};
pub use domain::{
    ContentPackage, Platform, PublishResult, RunMode, Task, TaskResult, TaskStatus,
};
pub use generator::{ContentGenerator, GenerationError};
pub use publishers::{Publisher, PublisherRegistry};
