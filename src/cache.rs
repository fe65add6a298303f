// src/cache.rs
//! Per-topic response cache with an absolute revalidate window.
//!
//! A slot is written once per pipeline run and never mutated afterwards; a
//! refresh swaps in a new `Arc` under the write lock, so readers always see
//! either the old or the new result, never a mix.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::Duration;

use tokio::time::Instant;

use crate::ingest::types::FeedPost;

#[derive(Debug)]
pub struct CacheSlot {
    pub posts: Arc<[FeedPost]>,
    pub fetched_at: Instant,
}

impl CacheSlot {
    fn is_fresh(&self, window: Duration) -> bool {
        self.fetched_at.elapsed() < window
    }
}

#[derive(Debug)]
pub struct TopicCache {
    window: Duration,
    slots: RwLock<HashMap<String, Arc<CacheSlot>>>,
}

impl TopicCache {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            slots: RwLock::new(HashMap::new()),
        }
    }

    /// Cached posts for `topic` if they were fetched less than one window ago.
    pub fn get(&self, topic: &str) -> Option<Arc<[FeedPost]>> {
        let slots = self.slots.read().unwrap_or_else(|e| e.into_inner());
        slots
            .get(topic)
            .filter(|slot| slot.is_fresh(self.window))
            .map(|slot| slot.posts.clone())
    }

    /// Replace whatever is stored for `topic`.
    pub fn put(&self, topic: &str, posts: Vec<FeedPost>) -> Arc<[FeedPost]> {
        let slot = Arc::new(CacheSlot {
            posts: posts.into(),
            fetched_at: Instant::now(),
        });
        let shared = slot.posts.clone();
        self.slots
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(topic.to_string(), slot);
        shared
    }

    pub fn len(&self) -> usize {
        self.slots.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
