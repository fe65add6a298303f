// src/topics.rs
//! Static topic table: which upstream calls produce a topic's feed.
//! Built from `match` arms and constants only; nothing here is mutable at runtime.

use crate::ingest::providers::openalex::{Institution, SWISS_INSTITUTIONS};
use crate::ingest::providers::{ssip, Sources};
use crate::ingest::types::FeedPost;
use crate::ingest::{fan_out, merge, MergePolicy};

/// One adapter invocation with its parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceCall {
    SpaceflightLatest,
    SpaceflightSearch(&'static [&'static str]),
    SpaceflightBySite(&'static [&'static str]),
    Arxiv(&'static [&'static str]),
    PubMed(&'static str),
    OpenAlex(&'static [Institution]),
    SecurityNews,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Call(SourceCall),
    /// Several distinct adapters; their results are merged under `merge`.
    Composite {
        calls: &'static [SourceCall],
        merge: MergePolicy,
    },
    Static,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteShape {
    Single,
    ParameterizedFanOut,
    CompositeFanOut,
    Static,
}

impl RouteShape {
    pub fn as_str(&self) -> &'static str {
        match self {
            RouteShape::Single => "single",
            RouteShape::ParameterizedFanOut => "parameterized_fan_out",
            RouteShape::CompositeFanOut => "composite_fan_out",
            RouteShape::Static => "static",
        }
    }
}

const SPACE_RESEARCH: &[SourceCall] = &[
    SourceCall::Arxiv(&["astro-ph.EP", "astro-ph.IM"]),
    SourceCall::PubMed("microgravity"),
];

/// Every topic key [`resolve`] understands.
pub const TOPICS: &[&str] = &[
    "space-news",
    "space-station",
    "space-agencies",
    "ai-ml",
    "materials",
    "life-sciences",
    "pharmaceuticals",
    "cybersecurity",
    "swiss-uni",
    "ssip",
    "space-research",
];

/// Unknown keys resolve to `None`; callers serve an empty feed for them.
pub fn resolve(topic: &str) -> Option<Route> {
    let route = match topic {
        "space-news" => Route::Call(SourceCall::SpaceflightLatest),
        "space-station" => Route::Call(SourceCall::SpaceflightSearch(&[
            "ISS",
            "space station",
            "Starlab",
            "Axiom",
        ])),
        "space-agencies" => Route::Call(SourceCall::SpaceflightBySite(&[
            "NASA", "ESA", "JAXA", "ISRO",
        ])),
        "ai-ml" => Route::Call(SourceCall::Arxiv(&["cs.AI", "cs.LG", "stat.ML"])),
        "materials" => Route::Call(SourceCall::Arxiv(&["cond-mat.mtrl-sci"])),
        "life-sciences" => Route::Call(SourceCall::PubMed(r#"microgravity OR "space medicine""#)),
        "pharmaceuticals" => Route::Call(SourceCall::PubMed(
            "pharmaceutical AND (space OR microgravity)",
        )),
        "cybersecurity" => Route::Call(SourceCall::SecurityNews),
        "swiss-uni" => Route::Call(SourceCall::OpenAlex(SWISS_INSTITUTIONS)),
        "ssip" => Route::Static,
        "space-research" => Route::Composite {
            calls: SPACE_RESEARCH,
            merge: MergePolicy::dedup_capped(10),
        },
        _ => return None,
    };
    Some(route)
}

impl SourceCall {
    pub fn shape(&self) -> RouteShape {
        match self {
            SourceCall::SpaceflightSearch(_)
            | SourceCall::SpaceflightBySite(_)
            | SourceCall::OpenAlex(_)
            | SourceCall::SecurityNews => RouteShape::ParameterizedFanOut,
            SourceCall::SpaceflightLatest | SourceCall::Arxiv(_) | SourceCall::PubMed(_) => {
                RouteShape::Single
            }
        }
    }

    /// Never fails: every adapter entry point is already failure-isolated.
    pub async fn invoke(&self, sources: &Sources) -> Vec<FeedPost> {
        match *self {
            SourceCall::SpaceflightLatest => sources.spaceflight.latest().await,
            SourceCall::SpaceflightSearch(terms) => sources.spaceflight.multi_search(terms).await,
            SourceCall::SpaceflightBySite(sites) => sources.spaceflight.by_site(sites).await,
            SourceCall::Arxiv(categories) => sources.arxiv.recent(categories).await,
            SourceCall::PubMed(query) => sources.pubmed.search(query).await,
            SourceCall::OpenAlex(institutions) => sources.openalex.institutions(institutions).await,
            SourceCall::SecurityNews => sources.security.latest().await,
        }
    }
}

impl Route {
    pub fn shape(&self) -> RouteShape {
        match self {
            Route::Call(call) => call.shape(),
            Route::Composite { .. } => RouteShape::CompositeFanOut,
            Route::Static => RouteShape::Static,
        }
    }

    pub async fn run(&self, sources: &Sources) -> Vec<FeedPost> {
        match self {
            Route::Call(call) => call.invoke(sources).await,
            Route::Composite { calls, merge: policy } => {
                let batches = fan_out(calls.iter().map(|c| c.invoke(sources))).await;
                merge(batches, *policy)
            }
            Route::Static => ssip::posts(),
        }
    }
}
