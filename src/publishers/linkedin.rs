//! LinkedIn adapter. Text posts only.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;
use tracing::{info, warn};

use crate::config::{Config, Integration};
use crate::domain::{Platform, PublishResult};

use super::{
    mock_post_id, PublishError, Publisher, CALL_TIMEOUT, DEFAULT_MOCK_LATENCY, PROBE_TIMEOUT,
};

const API_BASE: &str = "https://api.linkedin.com";
const MOCK_AUTHOR_URN: &str = "urn:li:person:123456";

/// LinkedIn share client with mock fallback.
pub struct LinkedInPublisher {
    access_token: String,
    use_real_api: bool,
    client: reqwest::Client,
    mock_latency: Duration,
}

impl LinkedInPublisher {
    pub async fn connect(config: &Config) -> Self {
        let mut publisher = Self {
            access_token: config.linkedin_access_token.clone(),
            use_real_api: false,
            client: reqwest::Client::new(),
            mock_latency: DEFAULT_MOCK_LATENCY,
        };

        if config.integration_enabled(Integration::LinkedIn) {
            publisher.use_real_api = publisher.verify_connection().await;
        } else {
            info!("LinkedIn adapter running in demo mode");
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
            .get(format!("{API_BASE}/v2/userinfo"))
            .bearer_auth(&self.access_token)
            .timeout(PROBE_TIMEOUT)
            .send()
            .await;

        match result {
            Ok(response) if response.status().is_success() => {
                info!("LinkedIn connection verified");
                true
            }
            Ok(response) => {
                warn!(status = %response.status(), "LinkedIn connection check failed");
                false
            }
            Err(error) => {
                warn!(%error, "LinkedIn connection error");
                false
            }
        }
    }

    async fn post_real(&self, text: &str) -> Result<String, PublishError> {
        let response = self
            .client
            .post(format!("{API_BASE}/v2/ugcPosts"))
            .bearer_auth(&self.access_token)
            .timeout(CALL_TIMEOUT)
            .json(&json!({
                "author": MOCK_AUTHOR_URN,
                "lifecycleState": "PUBLISHED",
                "specificContent": {
                    "com.linkedin.ugc.ShareContent": {
                        "shareCommentary": { "text": text },
                        "shareMediaCategory": "NONE",
                    }
                },
                "visibility": {
                    "com.linkedin.ugc.MemberNetworkVisibility": "PUBLIC"
                },
            }))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let detail = response.text().await.unwrap_or_default();
            return Err(PublishError::Backend { status, detail });
        }

        let urn = response
            .headers()
            .get("x-restli-id")
            .and_then(|v| v.to_str().ok())
            .unwrap_or("urn:li:share:unknown")
            .to_string();

        info!(%urn, "LinkedIn post published");
        Ok(format!("Posted to LinkedIn ({urn})"))
    }

    async fn post_mock(&self) -> String {
        tokio::time::sleep(self.mock_latency).await;

        let share_id = mock_post_id();
        info!(share_id, "LinkedIn mock post published");
        format!("Posted to LinkedIn (urn:li:share:{share_id}, HTTP 201 Created)")
    }
}

#[async_trait]
impl Publisher for LinkedInPublisher {
    fn platform(&self) -> Platform {
        Platform::LinkedIn
    }

    /// Text post. Title and excerpt are ignored; the body is the share text.
    async fn publish(
        &self,
        _title: &str,
        body: &str,
        _excerpt: Option<&str>,
    ) -> Result<PublishResult, PublishError> {
        if self.use_real_api {
            match self.post_real(body).await {
                Ok(status_line) => {
                    return Ok(PublishResult::status(Platform::LinkedIn, status_line))
                }
                Err(error) => {
                    warn!(%error, "LinkedIn real call failed, falling back to mock");
                }
            }
        }

        let status_line = self.post_mock().await;
        Ok(PublishResult::status(Platform::LinkedIn, status_line))
    }
}
