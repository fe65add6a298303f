// src/ingest/providers/mod.rs
pub mod arxiv;
pub mod openalex;
pub mod pubmed;
pub mod security_rss;
pub mod spaceflight;
pub mod ssip;

use std::sync::Arc;

use crate::ingest::config::FeedsConfig;
use crate::ingest::transport::SharedTransport;
use crate::ingest::types::FeedError;

pub use arxiv::ArxivSource;
pub use openalex::OpenAlexSource;
pub use pubmed::PubMedSource;
pub use security_rss::SecurityRssSource;
pub use spaceflight::SpaceflightSource;

/// Every live adapter, wired to one transport. Cheap to clone.
#[derive(Clone)]
pub struct Sources {
    pub spaceflight: Arc<SpaceflightSource>,
    pub arxiv: Arc<ArxivSource>,
    pub pubmed: Arc<PubMedSource>,
    pub openalex: Arc<OpenAlexSource>,
    pub security: Arc<SecurityRssSource>,
}

impl Sources {
    pub fn new(transport: SharedTransport, cfg: &FeedsConfig) -> Self {
        let timeout = cfg.adapter_timeout();
        let up = &cfg.upstreams;
        Self {
            spaceflight: Arc::new(SpaceflightSource::new(
                transport.clone(),
                &up.spaceflight,
                timeout,
            )),
            arxiv: Arc::new(ArxivSource::new(transport.clone(), &up.arxiv, timeout)),
            pubmed: Arc::new(PubMedSource::new(transport.clone(), &up.pubmed, timeout)),
            openalex: Arc::new(OpenAlexSource::new(transport.clone(), &up.openalex, timeout)),
            security: Arc::new(SecurityRssSource::new(
                transport,
                security_rss::default_feeds(up),
                timeout,
            )),
        }
    }
}

/// `base?k=v&...` with proper query encoding.
pub(crate) fn build_url(base: &str, pairs: &[(&str, &str)]) -> Result<String, FeedError> {
    let mut url =
        reqwest::Url::parse(base).map_err(|e| FeedError::InvalidUrl(format!("{base}: {e}")))?;
    {
        let mut q = url.query_pairs_mut();
        for (k, v) in pairs {
            q.append_pair(k, v);
        }
    }
    Ok(url.into())
}

/// Replace HTML-only named entities that XML parsers reject.
pub(crate) fn scrub_html_entities_for_xml(s: &str) -> String {
    s.replace("&nbsp;", " ")
        .replace("&ndash;", "-")
        .replace("&mdash;", "-")
        .replace("&hellip;", "...")
        .replace("&ldquo;", "\"")
        .replace("&rdquo;", "\"")
        .replace("&lsquo;", "'")
        .replace("&rsquo;", "'")
}
