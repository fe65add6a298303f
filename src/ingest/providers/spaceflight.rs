// src/ingest/providers/spaceflight.rs
//! Spaceflight News API (v4 `articles/` endpoint). One upstream, three call shapes:
//! latest overall, fan-out over search terms, fan-out over news sites.

use std::time::Duration;

use serde::Deserialize;

use crate::ingest::providers::build_url;
use crate::ingest::transport::SharedTransport;
use crate::ingest::types::{FeedError, FeedPost};
use crate::ingest::{
    fan_out, guarded, make_excerpt, merge, published_or_now, sort_by_date_desc, MergePolicy,
};

pub const SOURCE: &str = "spaceflight";

const LATEST_LIMIT: usize = 10;
const PER_TERM_LIMIT: usize = 4;
const PER_SITE_LIMIT: usize = 3;
const MERGED_CAP: usize = 10;

#[derive(Debug, Deserialize)]
struct Page {
    #[serde(default)]
    results: Vec<Article>,
}

#[derive(Debug, Deserialize)]
struct Article {
    title: Option<String>,
    summary: Option<String>,
    published_at: Option<String>,
    news_site: Option<String>,
    url: Option<String>,
}

pub struct SpaceflightSource {
    transport: SharedTransport,
    base: String,
    timeout: Duration,
}

impl SpaceflightSource {
    pub fn new(transport: SharedTransport, base: &str, timeout: Duration) -> Self {
        Self {
            transport,
            base: base.to_string(),
            timeout,
        }
    }

    /// Latest articles across every site.
    pub async fn latest(&self) -> Vec<FeedPost> {
        let mut posts = guarded(SOURCE, self.timeout, self.fetch(LATEST_LIMIT, None)).await;
        sort_by_date_desc(&mut posts);
        posts
    }

    /// One search per term, merged, title-deduplicated, newest ten.
    pub async fn multi_search(&self, terms: &[&str]) -> Vec<FeedPost> {
        let calls = terms.iter().map(|term| {
            guarded(
                SOURCE,
                self.timeout,
                self.fetch(PER_TERM_LIMIT, Some(("search", *term))),
            )
        });
        merge(fan_out(calls).await, MergePolicy::dedup_capped(MERGED_CAP))
    }

    /// One query per news site. The same story reported by two agencies is kept twice.
    pub async fn by_site(&self, sites: &[&str]) -> Vec<FeedPost> {
        let calls = sites.iter().map(|site| {
            guarded(
                SOURCE,
                self.timeout,
                self.fetch(PER_SITE_LIMIT, Some(("news_site", *site))),
            )
        });
        merge(fan_out(calls).await, MergePolicy::capped(MERGED_CAP))
    }

    async fn fetch(
        &self,
        limit: usize,
        filter: Option<(&str, &str)>,
    ) -> Result<Vec<FeedPost>, FeedError> {
        let limit = limit.to_string();
        let mut pairs = vec![("limit", limit.as_str()), ("ordering", "-published_at")];
        pairs.extend(filter);
        let url = build_url(&self.base, &pairs)?;
        let body = self.transport.get_text(&url).await?;
        parse_articles(&body)
    }
}

pub fn parse_articles(body: &str) -> Result<Vec<FeedPost>, FeedError> {
    let page: Page = serde_json::from_str(body)?;
    Ok(page
        .results
        .into_iter()
        .filter_map(|a| {
            FeedPost::new(
                a.title.as_deref().unwrap_or_default(),
                &make_excerpt(a.summary.as_deref().unwrap_or_default()),
                published_or_now(a.published_at.as_deref()),
                a.news_site.as_deref().unwrap_or_default(),
                a.url.as_deref().unwrap_or_default(),
            )
        })
        .collect())
}
