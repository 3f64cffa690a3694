use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::Fingerprint;

/// A configured syndication feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedSource {
    pub name: String,
    #[serde(alias = "rss")]
    pub feed_url: String,
    pub category: String,
}

/// One item listed by a feed. Identity is the link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedEntry {
    pub link: String,
    pub title: String,
}

impl FeedEntry {
    pub fn new(link: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            link: link.into(),
            title: title.into(),
        }
    }

    pub fn fingerprint(&self) -> Fingerprint {
        Fingerprint::of_link(&self.link)
    }
}

/// Text and images pulled from a source page.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RawArticle {
    pub text: String,
    pub images: Vec<String>,
    /// `og:image` of the page, when it declares one.
    pub lead_image: Option<String>,
}

impl RawArticle {
    /// Lead image, else the first body image, else empty.
    pub fn thumbnail(&self) -> &str {
        self.lead_image
            .as_deref()
            .or_else(|| self.images.first().map(String::as_str))
            .unwrap_or("")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewrittenArticle {
    pub title: String,
    pub excerpt: String,
    /// HTML body.
    pub content: String,
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArticleStatus {
    Draft,
    Published,
}

impl ArticleStatus {
    pub fn from_auto_publish(auto_publish: bool) -> Self {
        if auto_publish {
            ArticleStatus::Published
        } else {
            ArticleStatus::Draft
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ArticleStatus::Draft => "draft",
            ArticleStatus::Published => "published",
        }
    }
}

/// The finished record written to the batch output and the content store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishableArticle {
    pub title: String,
    pub slug: String,
    pub excerpt: String,
    pub content: String,
    pub category: String,
    pub tags: Vec<String>,
    pub thumbnail: String,
    pub source_url: String,
    pub source_name: String,
    pub author: String,
    pub status: ArticleStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub published_at: DateTime<Utc>,
    pub views: u64,
}
