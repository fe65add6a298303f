// src/aggregator.rs
//! Topic → posts, end to end: cache lookup, route resolution, concurrent
//! upstream calls, final ordering, cache fill.

use std::sync::Arc;
use std::time::{Duration, Instant};

use metrics::{counter, describe_counter, describe_histogram, histogram};
use once_cell::sync::OnceCell;
use tracing::{debug, info};

use crate::cache::TopicCache;
use crate::ingest::config::FeedsConfig;
use crate::ingest::providers::Sources;
use crate::ingest::sort_by_date_desc;
use crate::ingest::transport::{HttpTransport, SharedTransport};
use crate::ingest::types::FeedPost;
use crate::topics::{self, Route};

fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("feed_cache_hits_total", "Topic requests served from cache.");
        describe_counter!(
            "feed_cache_misses_total",
            "Topic requests that ran the upstream pipeline."
        );
        describe_counter!("feed_unknown_topic_total", "Requests for unknown topic keys.");
        describe_histogram!("feed_pipeline_ms", "Full topic pipeline time in milliseconds.");
    });
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheStatus {
    Hit,
    Miss,
    /// Unknown topic: nothing to cache.
    Bypass,
}

impl CacheStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CacheStatus::Hit => "HIT",
            CacheStatus::Miss => "MISS",
            CacheStatus::Bypass => "BYPASS",
        }
    }
}

#[derive(Debug, Clone)]
pub struct TopicPosts {
    pub posts: Arc<[FeedPost]>,
    pub cache: CacheStatus,
}

#[derive(Clone)]
pub struct Aggregator {
    sources: Sources,
    cache: Arc<TopicCache>,
}

impl Aggregator {
    pub fn new(sources: Sources, window: Duration) -> Self {
        Self {
            sources,
            cache: Arc::new(TopicCache::new(window)),
        }
    }

    /// Production wiring: real HTTP upstreams.
    pub fn from_config(cfg: &FeedsConfig) -> anyhow::Result<Self> {
        cfg.validate()?;
        let transport: SharedTransport = Arc::new(HttpTransport::new(cfg)?);
        Ok(Self::with_transport(transport, cfg))
    }

    pub fn with_transport(transport: SharedTransport, cfg: &FeedsConfig) -> Self {
        Self::new(Sources::new(transport, cfg), cfg.revalidate())
    }

    pub fn cache(&self) -> &TopicCache {
        &self.cache
    }

    /// Posts for `topic`, newest first. Unknown topics yield an empty list.
    pub async fn posts_for(&self, topic: &str) -> TopicPosts {
        ensure_metrics_described();

        let Some(route) = topics::resolve(topic) else {
            debug!(target: "feeds", topic, "unknown topic");
            counter!("feed_unknown_topic_total").increment(1);
            return TopicPosts {
                posts: Arc::from(Vec::new()),
                cache: CacheStatus::Bypass,
            };
        };

        if let Some(posts) = self.cache.get(topic) {
            counter!("feed_cache_hits_total", "topic" => topic.to_string()).increment(1);
            return TopicPosts {
                posts,
                cache: CacheStatus::Hit,
            };
        }

        counter!("feed_cache_misses_total", "topic" => topic.to_string()).increment(1);
        let posts = self.run_route(topic, route).await;
        TopicPosts {
            posts: self.cache.put(topic, posts),
            cache: CacheStatus::Miss,
        }
    }

    /// Run the pipeline for `route`, bypassing the cache.
    pub async fn run_route(&self, topic: &str, route: Route) -> Vec<FeedPost> {
        let t0 = Instant::now();
        let mut posts = route.run(&self.sources).await;
        sort_by_date_desc(&mut posts);

        let ms = t0.elapsed().as_secs_f64() * 1_000.0;
        histogram!("feed_pipeline_ms", "topic" => topic.to_string()).record(ms);
        info!(
            target: "feeds",
            topic,
            shape = route.shape().as_str(),
            posts = posts.len(),
            ms,
            "topic pipeline ran"
        );
        posts
    }
}
