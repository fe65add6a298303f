// src/ingest/providers/pubmed.rs
//! PubMed via NCBI E-utilities: `esearch` for the newest ids, then one
//! `esummary` batch call for their metadata. Summaries carry no abstract.

use std::time::Duration;

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::ingest::providers::build_url;
use crate::ingest::transport::SharedTransport;
use crate::ingest::types::{FeedError, FeedPost};
use crate::ingest::{guarded, published_or_now, sort_by_date_desc};

pub const SOURCE: &str = "pubmed";
const FALLBACK_JOURNAL: &str = "PubMed";
const MAX_IDS: usize = 10;

#[derive(Debug, Deserialize)]
struct SearchResponse {
    esearchresult: Option<SearchResult>,
}

#[derive(Debug, Deserialize)]
struct SearchResult {
    #[serde(default)]
    idlist: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct SummaryResponse {
    result: Option<Map<String, Value>>,
}

#[derive(Debug, Deserialize)]
struct Summary {
    title: Option<String>,
    pubdate: Option<String>,
    fulljournalname: Option<String>,
    #[serde(default)]
    articleids: Vec<ArticleId>,
}

/// Loosely typed: a malformed id entry must not cost the whole summary.
#[derive(Debug, Deserialize)]
struct ArticleId {
    #[serde(default)]
    idtype: Value,
    #[serde(default)]
    value: Value,
}

impl ArticleId {
    fn doi(&self) -> Option<&str> {
        match (self.idtype.as_str(), self.value.as_str().map(str::trim)) {
            (Some("doi"), Some(v)) if !v.is_empty() => Some(v),
            _ => None,
        }
    }
}

pub struct PubMedSource {
    transport: SharedTransport,
    base: String,
    timeout: Duration,
}

impl PubMedSource {
    pub fn new(transport: SharedTransport, base: &str, timeout: Duration) -> Self {
        Self {
            transport,
            base: base.trim_end_matches('/').to_string(),
            timeout,
        }
    }

    /// Newest papers matching `query`. Both calls share one timeout.
    pub async fn search(&self, query: &str) -> Vec<FeedPost> {
        let mut posts = guarded(SOURCE, self.timeout, self.fetch(query)).await;
        sort_by_date_desc(&mut posts);
        posts
    }

    async fn fetch(&self, query: &str) -> Result<Vec<FeedPost>, FeedError> {
        let retmax = MAX_IDS.to_string();
        let search_url = build_url(
            &format!("{}/esearch.fcgi", self.base),
            &[
                ("db", "pubmed"),
                ("term", query),
                ("retmax", retmax.as_str()),
                ("sort", "date"),
                ("retmode", "json"),
            ],
        )?;
        let ids = parse_id_list(&self.transport.get_text(&search_url).await?)?;
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let joined = ids.join(",");
        let summary_url = build_url(
            &format!("{}/esummary.fcgi", self.base),
            &[("db", "pubmed"), ("id", joined.as_str()), ("retmode", "json")],
        )?;
        parse_summaries(&self.transport.get_text(&summary_url).await?)
    }
}

pub fn parse_id_list(body: &str) -> Result<Vec<String>, FeedError> {
    let resp: SearchResponse = serde_json::from_str(body)?;
    Ok(resp
        .esearchresult
        .map(|r| r.idlist)
        .unwrap_or_default()
        .into_iter()
        .take(MAX_IDS)
        .collect())
}

/// `result` maps each uid to its record, plus a `uids` array giving the order.
pub fn parse_summaries(body: &str) -> Result<Vec<FeedPost>, FeedError> {
    let resp: SummaryResponse = serde_json::from_str(body)?;
    let Some(mut result) = resp.result else {
        return Ok(Vec::new());
    };
    let uids: Vec<String> = match result.remove("uids") {
        Some(v) => serde_json::from_value(v)?,
        None => Vec::new(),
    };

    let mut out = Vec::with_capacity(uids.len());
    for uid in uids {
        let Some(raw) = result.remove(&uid) else {
            continue;
        };
        // one odd record must not sink the batch
        let Ok(article) = serde_json::from_value::<Summary>(raw) else {
            tracing::debug!(target: "feeds", %uid, "skipping unreadable pubmed summary");
            continue;
        };
        let url = article
            .articleids
            .iter()
            .find_map(ArticleId::doi)
            .map(|doi| format!("https://doi.org/{doi}"))
            .unwrap_or_else(|| format!("https://pubmed.ncbi.nlm.nih.gov/{uid}/"));
        let journal = article
            .fulljournalname
            .as_deref()
            .filter(|j| !j.trim().is_empty())
            .unwrap_or(FALLBACK_JOURNAL);

        if let Some(post) = FeedPost::new(
            article.title.as_deref().unwrap_or_default(),
            "",
            published_or_now(article.pubdate.as_deref()),
            journal,
            &url,
        ) {
            out.push(post);
        }
    }
    Ok(out)
}
