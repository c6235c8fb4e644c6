//! Generated content structures.
//!
//! A ContentPackage is produced once per task and never mutated;
//! republishing reuses the same package.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use super::Platform;

/// Long-form article destined for the CMS.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlogPost {
    pub title: String,
    /// HTML body
    pub content: String,
}

/// Full content package generated for one task: a long-form blog post
/// plus a short-form social post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentPackage {
    pub blog_post: BlogPost,
    pub social_post: String,
}

/// Kinds of single-shot content the generate surface can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentKind {
    BlogPost,
    CaseStudy,
    SocialPost,
    ProductDescription,
}

impl ContentKind {
    pub fn key(&self) -> &'static str {
        match self {
            ContentKind::BlogPost => "blog_post",
            ContentKind::CaseStudy => "case_study",
            ContentKind::SocialPost => "social_post",
            ContentKind::ProductDescription => "product_description",
        }
    }
}

impl fmt::Display for ContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Raised when a request names a content type outside the closed set.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Unknown content type: {0}")]
pub struct UnknownContentKind(pub String);

impl FromStr for ContentKind {
    type Err = UnknownContentKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "blog_post" => Ok(ContentKind::BlogPost),
            "case_study" => Ok(ContentKind::CaseStudy),
            "social_post" => Ok(ContentKind::SocialPost),
            "product_description" => Ok(ContentKind::ProductDescription),
            other => Err(UnknownContentKind(other.to_string())),
        }
    }
}

/// One piece of generated content from the single-shot generate surface.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentItem {
    pub kind: ContentKind,

    /// Present for long-form kinds; social posts carry only a body.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    pub body: String,

    /// Target platform, when the kind is platform-specific.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub platform: Option<Platform>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_kind_parse() {
        assert_eq!(
            "case_study".parse::<ContentKind>().unwrap(),
            ContentKind::CaseStudy
        );
        assert!("press_release".parse::<ContentKind>().is_err());
    }

    #[test]
    fn test_content_item_serializes_without_empty_fields() {
        let item = ContentItem {
            kind: ContentKind::SocialPost,
            title: None,
            body: "short text".to_string(),
            platform: Some(Platform::LinkedIn),
        };

        let json = serde_json::to_value(&item).unwrap();
        assert!(json.get("title").is_none());
        assert_eq!(json["kind"], "social_post");
        assert_eq!(json["platform"], "linkedin");
    }
}
