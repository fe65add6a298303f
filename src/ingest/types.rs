// src/ingest/types.rs
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ingest::{clean_line, format_display_date};

/// One normalized post, the only shape that leaves the ingest layer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct FeedPost {
    pub title: String,
    pub excerpt: String,
    /// `Mon D, YYYY`, e.g. "Feb 7, 2026"
    pub published_at: String,
    /// Outlet / journal / institution display name.
    pub source: String,
    pub url: String,
}

impl FeedPost {
    /// Build a post from upstream fields. Returns `None` when any field other
    /// than `excerpt` ends up empty after whitespace normalization.
    pub fn new(
        title: &str,
        excerpt: &str,
        published: DateTime<Utc>,
        source: &str,
        url: &str,
    ) -> Option<Self> {
        Self::with_display_date(title, excerpt, &format_display_date(published), source, url)
    }

    /// Same as [`FeedPost::new`] for sources that already carry a display date.
    pub fn with_display_date(
        title: &str,
        excerpt: &str,
        published_at: &str,
        source: &str,
        url: &str,
    ) -> Option<Self> {
        let post = Self {
            title: clean_line(title),
            excerpt: clean_line(excerpt),
            published_at: published_at.trim().to_string(),
            source: source.trim().to_string(),
            url: url.trim().to_string(),
        };
        post.is_complete().then_some(post)
    }

    pub fn is_complete(&self) -> bool {
        !self.title.is_empty()
            && !self.published_at.is_empty()
            && !self.source.is_empty()
            && !self.url.is_empty()
    }

    /// Case-folded, trimmed title used to detect the same story twice in one batch.
    pub fn dedup_key(&self) -> String {
        self.title.trim().to_lowercase()
    }
}

/// Everything that can go wrong while talking to an upstream.
/// Never crosses the adapter boundary; see [`crate::ingest::guarded`].
#[derive(Debug, thiserror::Error)]
pub enum FeedError {
    #[error("transport error: {0}")]
    Transport(String),
    #[error("upstream {url} answered HTTP {status}")]
    Status { status: u16, url: String },
    #[error("malformed payload: {0}")]
    Payload(String),
    #[error("invalid upstream url {0}")]
    InvalidUrl(String),
    #[error("timed out after {after:?}")]
    Timeout { after: Duration },
}

impl From<reqwest::Error> for FeedError {
    fn from(e: reqwest::Error) -> Self {
        FeedError::Transport(e.to_string())
    }
}

impl From<serde_json::Error> for FeedError {
    fn from(e: serde_json::Error) -> Self {
        FeedError::Payload(e.to_string())
    }
}

impl From<quick_xml::DeError> for FeedError {
    fn from(e: quick_xml::DeError) -> Self {
        FeedError::Payload(e.to_string())
    }
}
