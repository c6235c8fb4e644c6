//! Publisher adapters for content destinations.
//!
//! Each adapter fixes real-vs-mock mode at construction: configured and not
//! in demo mode means one connectivity probe decides `use_real_api` for the
//! adapter's whole lifetime. On the real path, any failed call degrades to
//! the mock response for that single call; the failure is logged, never
//! propagated, and the mode is never flipped. Callers therefore always get
//! a usable result. The one error that does cross the trait surface is
//! `Unsupported`: asking an adapter for an operation its destination does
//! not have is a programming error, not a degraded call.

pub mod linkedin;
pub mod twitter;
pub mod wordpress;

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::Config;
use crate::domain::{Platform, PublishResult};

pub use linkedin::LinkedInPublisher;
pub use twitter::TwitterPublisher;
pub use wordpress::WordPressPublisher;

/// Connectivity probe bound.
pub const PROBE_TIMEOUT: Duration = Duration::from_secs(10);
/// Bound for create/publish/update/list calls.
pub const CALL_TIMEOUT: Duration = Duration::from_secs(30);
/// Bound for media uploads.
pub const MEDIA_TIMEOUT: Duration = Duration::from_secs(60);

/// Simulated network latency on the mock path.
pub const DEFAULT_MOCK_LATENCY: Duration = Duration::from_millis(1500);

/// Errors inside the publisher layer. Backend/Transport/Timeout stay inside
/// the adapter (caught once and mapped to the mock path); Unsupported is the
/// caller-visible programming error.
#[derive(Debug, Error)]
pub enum PublishError {
    #[error("{platform} does not support {operation}")]
    Unsupported {
        platform: Platform,
        operation: &'static str,
    },

    #[error("Destination returned status {status}: {detail}")]
    Backend { status: u16, detail: String },

    #[error("Destination transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Destination call timed out after {0:?}")]
    Timeout(Duration),
}

/// Fields accepted by an update call. Absent fields are left untouched.
#[derive(Debug, Clone, Default, Serialize)]
pub struct UpdateFields {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

/// Filter for listing posts.
#[derive(Debug, Clone)]
pub struct PostFilter {
    /// "draft", "publish", or None for any
    pub status: Option<String>,
    pub per_page: u32,
}

impl Default for PostFilter {
    fn default() -> Self {
        Self {
            status: None,
            per_page: 10,
        }
    }
}

/// Summary of an existing post at a destination.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostSummary {
    pub id: u64,
    pub title: String,
    pub status: String,
}

/// Handle to an uploaded media item.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaRef {
    pub id: u64,
    pub url: String,
}

/// A content destination. The CMS adapter supports every operation; social
/// adapters support only `publish` and report `Unsupported` for the rest.
#[async_trait]
pub trait Publisher: Send + Sync {
    fn platform(&self) -> Platform;

    /// Create a draft and return a result carrying its preview link.
    async fn create_draft(
        &self,
        title: &str,
        body: &str,
        excerpt: Option<&str>,
    ) -> Result<PublishResult, PublishError> {
        let _ = (title, body, excerpt);
        Err(PublishError::Unsupported {
            platform: self.platform(),
            operation: "create_draft",
        })
    }

    /// Publish directly and return a result carrying the live link or a
    /// status line.
    async fn publish(
        &self,
        title: &str,
        body: &str,
        excerpt: Option<&str>,
    ) -> Result<PublishResult, PublishError>;

    /// Update an existing post. Returns whether the update took effect.
    async fn update(&self, post_id: u64, fields: UpdateFields) -> Result<bool, PublishError> {
        let _ = (post_id, fields);
        Err(PublishError::Unsupported {
            platform: self.platform(),
            operation: "update",
        })
    }

    /// List existing posts matching the filter.
    async fn list(&self, filter: PostFilter) -> Result<Vec<PostSummary>, PublishError> {
        let _ = filter;
        Err(PublishError::Unsupported {
            platform: self.platform(),
            operation: "list",
        })
    }

    /// Upload a media file and return its handle.
    async fn upload_media(
        &self,
        file_ref: &str,
        title: Option<&str>,
    ) -> Result<MediaRef, PublishError> {
        let _ = (file_ref, title);
        Err(PublishError::Unsupported {
            platform: self.platform(),
            operation: "upload_media",
        })
    }
}

/// Synthesize the 4-digit pseudo-random id mock create operations use.
pub(crate) fn mock_post_id() -> u64 {
    rand::thread_rng().gen_range(1000..=9999)
}

/// Registry mapping each platform to its connected adapter.
///
/// Built once at startup; injectable so tests can plant stubs.
pub struct PublisherRegistry {
    publishers: HashMap<Platform, Arc<dyn Publisher>>,
}

impl PublisherRegistry {
    /// Connect an adapter for every destination per the current config.
    pub async fn connect(config: &Config) -> Self {
        let mut registry = Self::empty();
        registry.insert(Arc::new(WordPressPublisher::connect(config).await));
        registry.insert(Arc::new(LinkedInPublisher::connect(config).await));
        registry.insert(Arc::new(TwitterPublisher::connect(config).await));
        registry
    }

    pub fn empty() -> Self {
        Self {
            publishers: HashMap::new(),
        }
    }

    /// Register an adapter under its own platform, replacing any existing one.
    pub fn insert(&mut self, publisher: Arc<dyn Publisher>) {
        self.publishers.insert(publisher.platform(), publisher);
    }

    pub fn get(&self, platform: Platform) -> Option<Arc<dyn Publisher>> {
        self.publishers.get(&platform).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct PublishOnly;

    #[async_trait]
    impl Publisher for PublishOnly {
        fn platform(&self) -> Platform {
            Platform::LinkedIn
        }

        async fn publish(
            &self,
            _title: &str,
            body: &str,
            _excerpt: Option<&str>,
        ) -> Result<PublishResult, PublishError> {
            Ok(PublishResult::status(Platform::LinkedIn, body.to_string()))
        }
    }

    #[tokio::test]
    async fn test_default_operations_are_unsupported() {
        let publisher = PublishOnly;

        let err = publisher.create_draft("t", "b", None).await.unwrap_err();
        assert!(matches!(
            err,
            PublishError::Unsupported {
                platform: Platform::LinkedIn,
                operation: "create_draft"
            }
        ));

        assert!(publisher.list(PostFilter::default()).await.is_err());
        assert!(publisher.upload_media("logo.png", None).await.is_err());
    }

    #[test]
    fn test_mock_post_id_range() {
        for _ in 0..100 {
            let id = mock_post_id();
            assert!((1000..=9999).contains(&id));
        }
    }

    #[tokio::test]
    async fn test_registry_insert_and_get() {
        let mut registry = PublisherRegistry::empty();
        assert!(registry.get(Platform::LinkedIn).is_none());

        registry.insert(Arc::new(PublishOnly));
        let publisher = registry.get(Platform::LinkedIn).unwrap();
        assert_eq!(publisher.platform(), Platform::LinkedIn);
    }
}
