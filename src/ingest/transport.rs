// src/ingest/transport.rs
//! How adapters reach their upstreams: real HTTP in production, canned
//! fixtures in tests and offline demos.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use crate::ingest::config::FeedsConfig;
use crate::ingest::types::FeedError;

#[async_trait]
pub trait Transport: Send + Sync {
    /// GET `url` and return the body. Non-2xx statuses are errors.
    async fn get_text(&self, url: &str) -> Result<String, FeedError>;
}

pub type SharedTransport = Arc<dyn Transport>;

pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new(cfg: &FeedsConfig) -> Result<Self, FeedError> {
        let client = reqwest::Client::builder()
            .user_agent(cfg.user_agent.as_str())
            .connect_timeout(Duration::from_secs(4).min(cfg.adapter_timeout()))
            .timeout(cfg.adapter_timeout())
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get_text(&self, url: &str) -> Result<String, FeedError> {
        let resp = self.client.get(url).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(FeedError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }
        Ok(resp.text().await?)
    }
}

#[derive(Debug, Clone)]
pub enum FixtureReply {
    Body(String),
    Status(u16),
    /// Answer with `body` after `delay`; used to exercise timeouts.
    Slow { delay: Duration, body: String },
}

/// In-memory upstream. The first route whose needle is contained in the
/// requested URL answers; unmatched URLs get a 404.
#[derive(Default)]
pub struct FixtureTransport {
    routes: Mutex<Vec<(String, FixtureReply)>>,
    hits: Mutex<Vec<String>>,
}

impl FixtureTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn route(self, needle: impl Into<String>, reply: FixtureReply) -> Self {
        self.set(needle, reply);
        self
    }

    pub fn body(self, needle: impl Into<String>, body: impl Into<String>) -> Self {
        self.route(needle, FixtureReply::Body(body.into()))
    }

    /// Replace (or add) the reply for `needle`, e.g. to simulate changed upstream data.
    pub fn set(&self, needle: impl Into<String>, reply: FixtureReply) {
        let needle = needle.into();
        let mut routes = self.routes.lock().unwrap_or_else(|e| e.into_inner());
        match routes.iter_mut().find(|(n, _)| *n == needle) {
            Some(slot) => slot.1 = reply,
            None => routes.push((needle, reply)),
        }
    }

    /// Every URL requested so far, in request order.
    pub fn requests(&self) -> Vec<String> {
        self.hits.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

#[async_trait]
impl Transport for FixtureTransport {
    async fn get_text(&self, url: &str) -> Result<String, FeedError> {
        self.hits
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(url.to_string());

        let reply = {
            let routes = self.routes.lock().unwrap_or_else(|e| e.into_inner());
            routes
                .iter()
                .find(|(needle, _)| url.contains(needle.as_str()))
                .map(|(_, r)| r.clone())
        };

        match reply {
            Some(FixtureReply::Body(b)) => Ok(b),
            Some(FixtureReply::Slow { delay, body }) => {
                tokio::time::sleep(delay).await;
                Ok(body)
            }
            Some(FixtureReply::Status(status)) => Err(FeedError::Status {
                status,
                url: url.to_string(),
            }),
            None => Err(FeedError::Status {
                status: 404,
                url: url.to_string(),
            }),
        }
    }
}
