//! Data structures for the content pipeline.
//!
//! - `task`: inbound task requests (email-shaped records)
//! - `content`: generated content packages and single items
//! - `result`: per-destination publish results and the run-level TaskResult

pub mod content;
pub mod result;
pub mod task;

pub use content::{BlogPost, ContentItem, ContentKind, ContentPackage, UnknownContentKind};
pub use result::{LogEntry, LogLevel, PublishResult, RunMode, TaskResult, TaskStatus};
pub use task::{Task, TaskPayload};

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// A publish destination. Closed set: unknown platform strings are
/// rejected at the boundary instead of being dispatched on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    WordPress,
    LinkedIn,
    Twitter,
}

impl Platform {
    pub fn key(&self) -> &'static str {
        match self {
            Platform::WordPress => "wordpress",
            Platform::LinkedIn => "linkedin",
            Platform::Twitter => "twitter",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Raised when a request names a platform outside the closed set.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Unknown platform: {0}")]
pub struct UnknownPlatform(pub String);

impl FromStr for Platform {
    type Err = UnknownPlatform;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "wordpress" => Ok(Platform::WordPress),
            "linkedin" => Ok(Platform::LinkedIn),
            "twitter" | "x" => Ok(Platform::Twitter),
            other => Err(UnknownPlatform(other.to_string())),
        }
    }
}
