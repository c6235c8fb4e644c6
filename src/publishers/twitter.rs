//! Twitter/X adapter. Text posts only.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use tracing::{info, warn};

use crate::config::{Config, Integration};
use crate::domain::{Platform, PublishResult};

use super::{
    mock_post_id, PublishError, Publisher, CALL_TIMEOUT, DEFAULT_MOCK_LATENCY, PROBE_TIMEOUT,
};

const API_BASE: &str = "https://api.twitter.com";
const TWEET_MAX_CHARS: usize = 280;

/// Twitter/X post client with mock fallback.
pub struct TwitterPublisher {
    access_token: String,
    use_real_api: bool,
    client: reqwest::Client,
    mock_latency: Duration,
}

#[derive(Debug, Deserialize)]
struct TweetResponse {
    data: TweetData,
}

#[derive(Debug, Deserialize)]
struct TweetData {
    id: String,
}

impl TwitterPublisher {
    pub async fn connect(config: &Config) -> Self {
        let mut publisher = Self {
            access_token: config.twitter_access_token.clone(),
            use_real_api: false,
            client: reqwest::Client::new(),
            mock_latency: DEFAULT_MOCK_LATENCY,
        };

        if config.integration_enabled(Integration::Twitter) {
            publisher.use_real_api = publisher.verify_connection().await;
        } else {
            info!("Twitter adapter running in demo mode");
        }

        publisher
    }

    pub fn with_mock_latency(mut self, mock_latency: Duration) -> Self {
        self.mock_latency = mock_latency;
        self
    }

    async fn verify_connection(&self) -> bool {
        let result = self
            .client
            .get(format!("{API_BASE}/2/users/me"))
            .bearer_auth(&self.access_token)
            .timeout(PROBE_TIMEOUT)
            .send()
            .await;

        match result {
            Ok(response) if response.status().is_success() => {
                info!("Twitter connection verified");
                true
            }
            Ok(response) => {
                warn!(status = %response.status(), "Twitter connection check failed");
                false
            }
            Err(error) => {
                warn!(%error, "Twitter connection error");
                false
            }
        }
    }

    async fn post_real(&self, text: &str) -> Result<String, PublishError> {
        let response = self
            .client
            .post(format!("{API_BASE}/2/tweets"))
            .bearer_auth(&self.access_token)
            .timeout(CALL_TIMEOUT)
            .json(&json!({ "text": text }))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let detail = response.text().await.unwrap_or_default();
            return Err(PublishError::Backend { status, detail });
        }

        let tweet: TweetResponse = response.json().await?;
        info!(tweet_id = %tweet.data.id, "Tweet published");
        Ok(format!("https://x.com/i/web/status/{}", tweet.data.id))
    }

    async fn post_mock(&self) -> String {
        tokio::time::sleep(self.mock_latency).await;

        let tweet_id = mock_post_id();
        info!(tweet_id, "Mock tweet published");
        format!("https://x.com/i/web/status/{tweet_id}")
    }
}

#[async_trait]
impl Publisher for TwitterPublisher {
    fn platform(&self) -> Platform {
        Platform::Twitter
    }

    /// Text post. Title and excerpt are ignored; the body is the tweet,
    /// truncated to the platform limit.
    async fn publish(
        &self,
        _title: &str,
        body: &str,
        _excerpt: Option<&str>,
    ) -> Result<PublishResult, PublishError> {
        let text: String = body.chars().take(TWEET_MAX_CHARS).collect();

        if self.use_real_api {
            match self.post_real(&text).await {
                Ok(link) => return Ok(PublishResult::link(Platform::Twitter, link)),
                Err(error) => {
                    warn!(%error, "Twitter real call failed, falling back to mock");
                }
            }
        }

        let link = self.post_mock().await;
        Ok(PublishResult::link(Platform::Twitter, link))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::publishers::UpdateFields;

    #[tokio::test]
    async fn test_demo_config_stays_on_mock_path() {
        let publisher = TwitterPublisher::connect(&Config::default()).await;
        assert!(!publisher.use_real_api);
    }

    #[tokio::test]
    async fn test_mock_publish_returns_status_link() {
        let publisher = TwitterPublisher::connect(&Config::default())
            .await
            .with_mock_latency(Duration::ZERO);

        let result = publisher.publish("ignored", "hello world", None).await.unwrap();
        assert!(result.success);
        assert!(result
            .link
            .unwrap()
            .starts_with("https://x.com/i/web/status/"));
    }

    #[tokio::test]
    async fn test_update_is_unsupported() {
        let publisher = TwitterPublisher::connect(&Config::default()).await;
        let err = publisher.update(1, UpdateFields::default()).await.unwrap_err();
        assert!(matches!(err, PublishError::Unsupported { .. }));
    }
}
