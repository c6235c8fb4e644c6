//! Content generation, mock or OpenAI-backed.
//!
//! The generator decides its mode once at construction: real API only when
//! an OpenAI key is configured and demo mode is off. Either way it returns
//! a fully populated package or a GenerationError, never a partial one.
//! Retry policy belongs to the caller; there are no internal retries.

use std::time::Duration;

use serde::Deserialize;
use serde_json::json;
use thiserror::Error;
use tracing::{debug, info};

use crate::config::Config;
use crate::domain::{BlogPost, ContentItem, ContentKind, ContentPackage, Platform, Task};

const OPENAI_CHAT_URL: &str = "https://api.openai.com/v1/chat/completions";
const OPENAI_MODEL: &str = "gpt-4";
const GENERATION_TIMEOUT: Duration = Duration::from_secs(30);

/// Simulated model thinking time on the mock path.
const DEFAULT_THINK_DELAY: Duration = Duration::from_secs(2);

/// Fatal generation failures. Any of these aborts the run before publish.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("Generation backend returned status {status}: {detail}")]
    Backend { status: u16, detail: String },

    #[error("Generation transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Generation timed out after {0:?}")]
    Timeout(Duration),

    #[error("Generation backend returned an empty completion")]
    EmptyCompletion,
}

/// Dual-mode content generator.
pub struct ContentGenerator {
    use_real_api: bool,
    api_key: String,
    backend_url: String,
    client: reqwest::Client,
    think_delay: Duration,
    request_timeout: Duration,
}

#[derive(Debug, Deserialize)]
struct ChatCompletion {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: String,
}

impl ContentGenerator {
    /// Create a generator, fixing real-vs-mock mode from the config.
    pub fn new(config: &Config) -> Self {
        let use_real_api = config.is_openai_configured() && !config.demo_mode;
        if !use_real_api {
            info!("Content generator running in demo mode");
        }

        Self {
            use_real_api,
            api_key: config.openai_api_key.clone(),
            backend_url: OPENAI_CHAT_URL.to_string(),
            client: reqwest::Client::new(),
            think_delay: DEFAULT_THINK_DELAY,
            request_timeout: GENERATION_TIMEOUT,
        }
    }

    /// Override the simulated thinking delay (tests use zero).
    pub fn with_think_delay(mut self, think_delay: Duration) -> Self {
        self.think_delay = think_delay;
        self
    }

    /// Override the chat-completions endpoint (tests point at a local server).
    pub fn with_backend_url(mut self, backend_url: impl Into<String>) -> Self {
        self.backend_url = backend_url.into();
        self
    }

    /// Override the per-request bound (tests shorten it).
    pub fn with_request_timeout(mut self, request_timeout: Duration) -> Self {
        self.request_timeout = request_timeout;
        self
    }

    /// Generate the full content package (blog post + social post) for a task.
    pub async fn generate_package(&self, task: &Task) -> Result<ContentPackage, GenerationError> {
        info!(task_id = %task.id, subject = %task.subject, "Generating content package");

        if self.use_real_api {
            self.generate_package_real(task).await
        } else {
            Ok(self.generate_package_mock(task).await)
        }
    }

    /// Generate one content item of the requested kind.
    pub async fn generate_one(
        &self,
        kind: ContentKind,
        request: &str,
        platform: Option<Platform>,
    ) -> Result<ContentItem, GenerationError> {
        info!(%kind, "Generating single content item");

        if self.use_real_api {
            let prompt = single_item_prompt(kind, request, platform);
            let body = self.chat_completion(&prompt).await?;
            return Ok(ContentItem {
                kind,
                title: long_form_title(kind, request),
                body,
                platform,
            });
        }

        tokio::time::sleep(self.think_delay).await;

        let topic = extract_topic(request);
        let body = match kind {
            ContentKind::BlogPost => mock_blog_body(&topic),
            ContentKind::CaseStudy => format!(
                "<h1>How {topic} Delivered Results</h1>\
                 <p>The challenge: standing out in a crowded market. The approach: \
                 putting {topic} in front of the right audience. The outcome: \
                 a measurable lift in engagement within the first month.</p>"
            ),
            ContentKind::SocialPost => mock_social_post(&topic, platform),
            ContentKind::ProductDescription => format!(
                "{topic} combines thoughtful design with everyday practicality. \
                 Built to last, priced to move, and ready to ship."
            ),
        };

        Ok(ContentItem {
            kind,
            title: long_form_title(kind, request),
            body,
            platform,
        })
    }

    /// Generate a package for a preview request without publishing anything.
    pub async fn preview(
        &self,
        subject: &str,
        body: &str,
    ) -> Result<ContentPackage, GenerationError> {
        let task = Task::preview(subject, body);
        self.generate_package(&task).await
    }

    async fn generate_package_mock(&self, task: &Task) -> ContentPackage {
        debug!("Simulating model thinking time");
        tokio::time::sleep(self.think_delay).await;

        let topic = extract_topic(&format!("{} {}", task.subject, task.body));

        ContentPackage {
            blog_post: BlogPost {
                title: format!("Why {topic} Deserves a Spot in Your Routine"),
                content: mock_blog_body(&topic),
            },
            social_post: format!(
                "Big ideas start here! Check out {topic}. #Marketing #NewArrival"
            ),
        }
    }

    async fn generate_package_real(&self, task: &Task) -> Result<ContentPackage, GenerationError> {
        let blog_prompt = format!(
            "Write a short HTML blog post responding to this content request. \
             Subject: {}. Details: {}",
            task.subject, task.body
        );
        let blog_content = self.chat_completion(&blog_prompt).await?;

        let social_prompt = format!(
            "Write a one-sentence social media post with hashtags for this \
             content request: {}",
            task.body
        );
        let social_post = self.chat_completion(&social_prompt).await?;

        let topic = extract_topic(&format!("{} {}", task.subject, task.body));

        Ok(ContentPackage {
            blog_post: BlogPost {
                title: format!("Why {topic} Deserves a Spot in Your Routine"),
                content: blog_content,
            },
            social_post,
        })
    }

    async fn chat_completion(&self, prompt: &str) -> Result<String, GenerationError> {
        // The per-request bound covers the whole exchange, body reads
        // included, so a backend that trickles a 200 body cannot wedge
        // the run.
        let response = self
            .client
            .post(&self.backend_url)
            .bearer_auth(&self.api_key)
            .timeout(self.request_timeout)
            .json(&json!({
                "model": OPENAI_MODEL,
                "messages": [{"role": "user", "content": prompt}],
            }))
            .send()
            .await
            .map_err(|e| self.map_transport(e))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(GenerationError::Backend {
                status: status.as_u16(),
                detail,
            });
        }

        let completion: ChatCompletion = response
            .json()
            .await
            .map_err(|e| self.map_transport(e))?;
        let content = completion
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .unwrap_or_default();

        if content.trim().is_empty() {
            return Err(GenerationError::EmptyCompletion);
        }

        Ok(content)
    }

    fn map_transport(&self, error: reqwest::Error) -> GenerationError {
        if error.is_timeout() {
            GenerationError::Timeout(self.request_timeout)
        } else {
            GenerationError::Transport(error)
        }
    }
}

/// Pull a topic out of free-form request text: prefer a 'single-quoted'
/// product name, otherwise take the text after the last colon, otherwise
/// the text itself.
fn extract_topic(text: &str) -> String {
    if let Some(start) = text.find('\'') {
        if let Some(len) = text[start + 1..].find('\'') {
            let quoted = text[start + 1..start + 1 + len].trim();
            if !quoted.is_empty() {
                return quoted.to_string();
            }
        }
    }

    let after_colon = text.rsplit(':').next().unwrap_or(text).trim();
    let topic = if after_colon.is_empty() { text.trim() } else { after_colon };

    // Keep titles readable: cap at the first sentence / a handful of words
    let topic = topic.split('.').next().unwrap_or(topic).trim();
    let words: Vec<&str> = topic.split_whitespace().take(6).collect();
    if words.is_empty() {
        "Your Product".to_string()
    } else {
        words.join(" ")
    }
}

fn mock_blog_body(topic: &str) -> String {
    format!(
        "<h1>The Case for {topic}</h1>\
         <p>In today's world, every choice matters. <b>{topic}</b> is not just \
         another product, but a statement about what you value.</p>\
         <p>Here is why it belongs on your shortlist, and what early adopters \
         are already saying about it.</p>"
    )
}

fn mock_social_post(topic: &str, platform: Option<Platform>) -> String {
    match platform {
        Some(Platform::Twitter) => format!("{topic} just dropped. You in? #Launch"),
        _ => format!(
            "Excited to share {topic} with our community. Take a look and tell \
             us what you think. #Marketing #Launch"
        ),
    }
}

fn single_item_prompt(kind: ContentKind, request: &str, platform: Option<Platform>) -> String {
    match kind {
        ContentKind::BlogPost => {
            format!("Write a short HTML blog post for this request: {request}")
        }
        ContentKind::CaseStudy => {
            format!("Write a brief case study (challenge, approach, outcome) for: {request}")
        }
        ContentKind::SocialPost => format!(
            "Write a social media post for {} about: {request}",
            platform.map(|p| p.key()).unwrap_or("linkedin")
        ),
        ContentKind::ProductDescription => {
            format!("Write a two-sentence product description for: {request}")
        }
    }
}

fn long_form_title(kind: ContentKind, request: &str) -> Option<String> {
    match kind {
        ContentKind::BlogPost => Some(format!("Why {} Matters", extract_topic(request))),
        ContentKind::CaseStudy => Some(format!("Case Study: {}", extract_topic(request))),
        ContentKind::SocialPost | ContentKind::ProductDescription => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn demo_generator() -> ContentGenerator {
        ContentGenerator::new(&Config::default()).with_think_delay(Duration::ZERO)
    }

    #[test]
    fn test_extract_topic_prefers_quoted_name() {
        let topic = extract_topic("We have a new product: 'Recycled Paper Notebook'. Go.");
        assert_eq!(topic, "Recycled Paper Notebook");
    }

    #[test]
    fn test_extract_topic_falls_back_to_text() {
        assert_eq!(extract_topic("Eco friendly pens"), "Eco friendly pens");
        assert_eq!(extract_topic(""), "Your Product");
    }

    #[tokio::test]
    async fn test_mock_package_is_fully_populated() {
        let generator = demo_generator();
        let package = generator.generate_package(&Task::sample()).await.unwrap();

        assert!(!package.blog_post.title.is_empty());
        assert!(!package.blog_post.content.is_empty());
        assert!(!package.social_post.is_empty());
        assert!(package.blog_post.title.contains("Notebook"));
    }

    #[tokio::test]
    async fn test_generate_one_social_post_has_no_title() {
        let generator = demo_generator();
        let item = generator
            .generate_one(
                ContentKind::SocialPost,
                "Launch week for our new espresso kit",
                Some(Platform::Twitter),
            )
            .await
            .unwrap();

        assert!(item.title.is_none());
        assert!(!item.body.is_empty());
        assert_eq!(item.platform, Some(Platform::Twitter));
    }

    #[tokio::test]
    async fn test_stalled_backend_body_hits_the_request_bound() {
        use tokio::io::AsyncWriteExt;

        // Backend that answers 200 with headers, then never finishes the body
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            if let Ok((mut socket, _)) = listener.accept().await {
                let _ = socket
                    .write_all(
                        b"HTTP/1.1 200 OK\r\ncontent-length: 100000\r\n\r\n{\"choices\"",
                    )
                    .await;
                tokio::time::sleep(Duration::from_secs(60)).await;
            }
        });

        let mut config = Config::default();
        config.demo_mode = false;
        config.openai_api_key = "sk-test".to_string();

        let generator = ContentGenerator::new(&config)
            .with_backend_url(format!("http://{addr}/v1/chat/completions"))
            .with_request_timeout(Duration::from_millis(250));

        let started = std::time::Instant::now();
        let err = generator.generate_package(&Task::sample()).await.unwrap_err();

        // Bounded, not wedged: the run fails promptly instead of holding
        // the worker slot forever
        assert!(started.elapsed() < Duration::from_secs(5));
        assert!(matches!(err, GenerationError::Timeout(_)));
    }

    #[tokio::test]
    async fn test_preview_builds_synthetic_task() {
        let generator = demo_generator();
        let package = generator
            .preview("Preview Request", "Generate sample content for 'Desk Mat'")
            .await
            .unwrap();

        assert!(package.blog_post.title.contains("Desk Mat"));
    }
}
