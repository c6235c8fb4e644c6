//! Configuration and capability registry for postpilot.
//!
//! Configuration sources (highest priority first):
//! 1. Environment variables (DEMO_MODE, WP_URL, ...)
//! 2. Defaults (demo mode on, every credential bundle empty)
//!
//! An integration counts as configured only when every required field of
//! its credential bundle is non-empty. Missing configuration is never an
//! error here; it just routes the integration onto the mock path.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// A named external integration with its own credential bundle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Integration {
    OpenAi,
    WordPress,
    Smtp,
    LinkedIn,
    Twitter,
}

impl Integration {
    /// All integrations, in status-surface order.
    pub const ALL: [Integration; 5] = [
        Integration::OpenAi,
        Integration::WordPress,
        Integration::Smtp,
        Integration::LinkedIn,
        Integration::Twitter,
    ];

    /// Key used in snapshots and API payloads.
    pub fn key(&self) -> &'static str {
        match self {
            Integration::OpenAi => "openai",
            Integration::WordPress => "wordpress",
            Integration::Smtp => "gmail",
            Integration::LinkedIn => "linkedin",
            Integration::Twitter => "twitter",
        }
    }

    /// Human-readable name for the status surface.
    pub fn display_name(&self) -> &'static str {
        match self {
            Integration::OpenAi => "OpenAI GPT-4",
            Integration::WordPress => "WordPress",
            Integration::Smtp => "Gmail/SMTP",
            Integration::LinkedIn => "LinkedIn",
            Integration::Twitter => "Twitter/X",
        }
    }
}

impl fmt::Display for Integration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Point-in-time view of which integrations are configured.
///
/// Recomputed from the config on every call; holds no state of its own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapabilitySnapshot {
    pub demo_mode: bool,
    /// integration key -> configured
    pub integrations: BTreeMap<String, bool>,
}

/// Centralized configuration: demo flag plus per-integration credential bundles.
#[derive(Debug, Clone)]
pub struct Config {
    /// Global demo flag: when true, every adapter skips real network calls
    /// regardless of credential presence.
    pub demo_mode: bool,

    // OpenAI
    pub openai_api_key: String,

    // WordPress (REST API base URL, e.g. https://site/wp-json/wp/v2)
    pub wp_url: String,
    pub wp_user: String,
    pub wp_app_password: String,

    // Email/SMTP
    pub smtp_email: String,
    pub smtp_password: String,

    // LinkedIn
    pub linkedin_client_id: String,
    pub linkedin_client_secret: String,
    pub linkedin_access_token: String,

    // Twitter
    pub twitter_api_key: String,
    pub twitter_api_secret: String,
    pub twitter_access_token: String,
    pub twitter_access_token_secret: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            demo_mode: true,
            openai_api_key: String::new(),
            wp_url: String::new(),
            wp_user: String::new(),
            wp_app_password: String::new(),
            smtp_email: String::new(),
            smtp_password: String::new(),
            linkedin_client_id: String::new(),
            linkedin_client_secret: String::new(),
            linkedin_access_token: String::new(),
            twitter_api_key: String::new(),
            twitter_api_secret: String::new(),
            twitter_access_token: String::new(),
            twitter_access_token_secret: String::new(),
        }
    }
}

fn env_var(key: &str) -> String {
    std::env::var(key).unwrap_or_default()
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let demo_mode = std::env::var("DEMO_MODE")
            .map(|v| v.to_lowercase() == "true")
            .unwrap_or(true);

        Self {
            demo_mode,
            openai_api_key: env_var("OPENAI_API_KEY"),
            wp_url: env_var("WP_URL"),
            wp_user: env_var("WP_USER"),
            wp_app_password: env_var("WP_APP_PASSWORD"),
            smtp_email: env_var("SMTP_EMAIL"),
            smtp_password: env_var("SMTP_PASSWORD"),
            linkedin_client_id: env_var("LINKEDIN_CLIENT_ID"),
            linkedin_client_secret: env_var("LINKEDIN_CLIENT_SECRET"),
            linkedin_access_token: env_var("LINKEDIN_ACCESS_TOKEN"),
            twitter_api_key: env_var("TWITTER_API_KEY"),
            twitter_api_secret: env_var("TWITTER_API_SECRET"),
            twitter_access_token: env_var("TWITTER_ACCESS_TOKEN"),
            twitter_access_token_secret: env_var("TWITTER_ACCESS_TOKEN_SECRET"),
        }
    }

    /// OpenAI keys must carry the `sk-` prefix to count as configured.
    pub fn is_openai_configured(&self) -> bool {
        !self.openai_api_key.is_empty() && self.openai_api_key.starts_with("sk-")
    }

    pub fn is_wordpress_configured(&self) -> bool {
        !self.wp_url.is_empty() && !self.wp_user.is_empty() && !self.wp_app_password.is_empty()
    }

    pub fn is_smtp_configured(&self) -> bool {
        !self.smtp_email.is_empty() && !self.smtp_password.is_empty()
    }

    pub fn is_linkedin_configured(&self) -> bool {
        !self.linkedin_access_token.is_empty()
    }

    pub fn is_twitter_configured(&self) -> bool {
        !self.twitter_api_key.is_empty()
            && !self.twitter_api_secret.is_empty()
            && !self.twitter_access_token.is_empty()
            && !self.twitter_access_token_secret.is_empty()
    }

    /// Check if a single integration has all required credential fields.
    pub fn is_configured(&self, integration: Integration) -> bool {
        match integration {
            Integration::OpenAi => self.is_openai_configured(),
            Integration::WordPress => self.is_wordpress_configured(),
            Integration::Smtp => self.is_smtp_configured(),
            Integration::LinkedIn => self.is_linkedin_configured(),
            Integration::Twitter => self.is_twitter_configured(),
        }
    }

    /// Configured AND not globally forced into demo mode.
    ///
    /// This is the gate adapters consult before attempting real API calls.
    pub fn integration_enabled(&self, integration: Integration) -> bool {
        self.is_configured(integration) && !self.demo_mode
    }

    /// Snapshot of all integration states. Pure function of the config:
    /// calling it twice without changing the config yields equal results.
    pub fn snapshot(&self) -> CapabilitySnapshot {
        let integrations = Integration::ALL
            .iter()
            .map(|i| (i.key().to_string(), self.is_configured(*i)))
            .collect();

        CapabilitySnapshot {
            demo_mode: self.demo_mode,
            integrations,
        }
    }
}
