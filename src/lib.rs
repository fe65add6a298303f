// src/lib.rs
// Public library surface for the binary and integration tests.

pub mod aggregator;
pub mod api;
pub mod cache;
pub mod ingest;
pub mod metrics;
pub mod topics;

// ---- Re-exports for stable public API ----
pub use crate::aggregator::{Aggregator, CacheStatus, TopicPosts};
pub use crate::api::router;
pub use crate::ingest::config::FeedsConfig;
pub use crate::ingest::types::{FeedError, FeedPost};
