// src/ingest/providers/openalex.rs
//! OpenAlex works from a fixed set of Swiss institutions.
//! Abstracts arrive as an inverted index and are rebuilt into plain text.

use std::collections::BTreeMap;
use std::time::Duration;

use serde::Deserialize;

use crate::ingest::providers::build_url;
use crate::ingest::transport::SharedTransport;
use crate::ingest::types::{FeedError, FeedPost};
use crate::ingest::{fan_out, guarded, make_excerpt, merge, published_or_now, MergePolicy};

pub const SOURCE: &str = "openalex";

const SEARCH_PHRASE: &str = "space science microgravity";
const PER_INSTITUTION: usize = 3;
const SELECT_FIELDS: &str = "id,title,doi,publication_date,primary_location,abstract_inverted_index";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Institution {
    pub id: &'static str,
    pub name: &'static str,
}

pub const SWISS_INSTITUTIONS: &[Institution] = &[
    Institution { id: "I35440088", name: "ETH Zürich" },
    Institution { id: "I5124864", name: "EPFL" },
    Institution { id: "I202697423", name: "University of Zurich" },
    Institution { id: "I118564535", name: "University of Bern" },
    Institution { id: "I81007117", name: "HSLU" },
];

#[derive(Debug, Deserialize)]
struct WorksPage {
    #[serde(default)]
    results: Vec<Work>,
}

#[derive(Debug, Deserialize)]
struct Work {
    id: Option<String>,
    title: Option<String>,
    doi: Option<String>,
    publication_date: Option<String>,
    primary_location: Option<Location>,
    abstract_inverted_index: Option<BTreeMap<String, Vec<u32>>>,
}

#[derive(Debug, Deserialize)]
struct Location {
    landing_page_url: Option<String>,
}

pub struct OpenAlexSource {
    transport: SharedTransport,
    base: String,
    timeout: Duration,
}

impl OpenAlexSource {
    pub fn new(transport: SharedTransport, base: &str, timeout: Duration) -> Self {
        Self {
            transport,
            base: base.to_string(),
            timeout,
        }
    }

    /// Recent works across `institutions`, one request each, title-deduplicated.
    pub async fn institutions(&self, institutions: &[Institution]) -> Vec<FeedPost> {
        let calls = institutions
            .iter()
            .map(|inst| guarded(SOURCE, self.timeout, self.fetch(*inst)));
        merge(fan_out(calls).await, MergePolicy::dedup_only())
    }

    async fn fetch(&self, inst: Institution) -> Result<Vec<FeedPost>, FeedError> {
        let filter = format!("authorships.institutions.id:{}", inst.id);
        let per_page = PER_INSTITUTION.to_string();
        let url = build_url(
            &self.base,
            &[
                ("filter", filter.as_str()),
                ("search", SEARCH_PHRASE),
                ("sort", "publication_date:desc"),
                ("per_page", per_page.as_str()),
                ("select", SELECT_FIELDS),
            ],
        )?;
        let body = self.transport.get_text(&url).await?;
        parse_works(&body, inst.name)
    }
}

pub fn parse_works(body: &str, institution: &str) -> Result<Vec<FeedPost>, FeedError> {
    let page: WorksPage = serde_json::from_str(body)?;
    Ok(page
        .results
        .into_iter()
        .filter_map(|w| {
            let excerpt = w
                .abstract_inverted_index
                .as_ref()
                .map(reconstruct_abstract)
                .unwrap_or_default();
            let url = doi_url(w.doi.as_deref())
                .or_else(|| non_empty(w.primary_location.and_then(|l| l.landing_page_url)))
                .or_else(|| non_empty(w.id))
                .unwrap_or_default();
            FeedPost::new(
                w.title.as_deref().unwrap_or_default(),
                &make_excerpt(&excerpt),
                published_or_now(w.publication_date.as_deref()),
                institution,
                &url,
            )
        })
        .collect())
}

/// Flatten `word -> [positions]` into `(position, word)`, order by position, join with spaces.
pub fn reconstruct_abstract(index: &BTreeMap<String, Vec<u32>>) -> String {
    let mut positioned: Vec<(u32, &str)> = index
        .iter()
        .flat_map(|(word, positions)| positions.iter().map(move |p| (*p, word.as_str())))
        .collect();
    positioned.sort_by_key(|(p, _)| *p);
    positioned
        .into_iter()
        .map(|(_, w)| w)
        .collect::<Vec<_>>()
        .join(" ")
}

/// OpenAlex usually returns DOIs as `https://doi.org/...`; bare DOIs get the prefix.
fn doi_url(raw: Option<&str>) -> Option<String> {
    let doi = raw?.trim();
    if doi.is_empty() {
        None
    } else if doi.starts_with("http://") || doi.starts_with("https://") {
        Some(doi.to_string())
    } else {
        Some(format!("https://doi.org/{doi}"))
    }
}

fn non_empty(s: Option<String>) -> Option<String> {
    s.filter(|v| !v.trim().is_empty())
}
