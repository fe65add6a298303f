// src/ingest/providers/arxiv.rs
use std::time::Duration;

use quick_xml::de::from_str;
use serde::Deserialize;

use crate::ingest::providers::build_url;
use crate::ingest::transport::SharedTransport;
use crate::ingest::types::{FeedError, FeedPost};
use crate::ingest::{guarded, make_excerpt, published_or_now, sort_by_date_desc};

pub const SOURCE: &str = "arxiv";
const DISPLAY_NAME: &str = "arXiv";
const MAX_RESULTS: usize = 10;

#[derive(Debug, Deserialize)]
struct Feed {
    #[serde(rename = "entry", default)]
    entries: Vec<Entry>,
}

#[derive(Debug, Deserialize)]
struct Entry {
    id: Option<String>,
    title: Option<String>,
    summary: Option<String>,
    published: Option<String>,
    #[serde(rename = "link", default)]
    links: Vec<Link>,
}

#[derive(Debug, Deserialize)]
struct Link {
    #[serde(rename = "@href")]
    href: Option<String>,
    #[serde(rename = "@rel")]
    rel: Option<String>,
}

/// arXiv preprints for a set of subject categories (Atom query API).
pub struct ArxivSource {
    transport: SharedTransport,
    base: String,
    timeout: Duration,
}

impl ArxivSource {
    pub fn new(transport: SharedTransport, base: &str, timeout: Duration) -> Self {
        Self {
            transport,
            base: base.to_string(),
            timeout,
        }
    }

    /// Newest submissions in any of `categories`.
    pub async fn recent(&self, categories: &[&str]) -> Vec<FeedPost> {
        let mut posts = guarded(SOURCE, self.timeout, self.fetch(categories)).await;
        sort_by_date_desc(&mut posts);
        posts
    }

    async fn fetch(&self, categories: &[&str]) -> Result<Vec<FeedPost>, FeedError> {
        let max = MAX_RESULTS.to_string();
        let query = category_query(categories);
        let url = build_url(
            &self.base,
            &[
                ("search_query", query.as_str()),
                ("sortBy", "submittedDate"),
                ("sortOrder", "descending"),
                ("max_results", max.as_str()),
            ],
        )?;
        let body = self.transport.get_text(&url).await?;
        parse_feed(&body)
    }
}

/// `cat:cs.AI OR cat:cs.LG`
pub fn category_query(categories: &[&str]) -> String {
    categories
        .iter()
        .map(|c| format!("cat:{c}"))
        .collect::<Vec<_>>()
        .join(" OR ")
}

pub fn parse_feed(body: &str) -> Result<Vec<FeedPost>, FeedError> {
    let feed: Feed = from_str(body)?;
    Ok(feed
        .entries
        .into_iter()
        .filter_map(|e| {
            let url = e
                .links
                .iter()
                .find(|l| l.rel.as_deref() == Some("alternate"))
                .and_then(|l| l.href.clone())
                .or(e.id)
                .unwrap_or_default();
            FeedPost::new(
                e.title.as_deref().unwrap_or_default(),
                &make_excerpt(e.summary.as_deref().unwrap_or_default()),
                published_or_now(e.published.as_deref()),
                DISPLAY_NAME,
                &url,
            )
        })
        .collect())
}
