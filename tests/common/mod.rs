// tests/common/mod.rs
#![allow(dead_code)]

use std::sync::Arc;

use serde_json::json;
use topic_feeds::ingest::config::FeedsConfig;
use topic_feeds::ingest::parse_display_date;
use topic_feeds::ingest::providers::Sources;
use topic_feeds::ingest::transport::FixtureTransport;
use topic_feeds::FeedPost;

pub const ARXIV_AI: &str = include_str!("../fixtures/arxiv_ai.xml");
pub const KREBS_RSS: &str = include_str!("../fixtures/krebs_rss.xml");
pub const BLEEPING_RSS: &str = include_str!("../fixtures/bleeping_rss.xml");
pub const PUBMED_ESEARCH: &str = include_str!("../fixtures/pubmed_esearch.json");
pub const PUBMED_ESUMMARY: &str = include_str!("../fixtures/pubmed_esummary.json");

pub fn config() -> FeedsConfig {
    FeedsConfig::default()
}

pub fn sources(fx: &Arc<FixtureTransport>) -> Sources {
    Sources::new(fx.clone(), &config())
}

/// Spaceflight News API page with `(title, iso_timestamp, news_site)` rows.
pub fn spaceflight_page(rows: &[(&str, &str, &str)]) -> String {
    let results: Vec<_> = rows
        .iter()
        .enumerate()
        .map(|(i, (title, ts, site))| {
            json!({
                "id": i,
                "title": title,
                "summary": format!("Summary of {title}"),
                "published_at": ts,
                "news_site": site,
                "url": format!("https://news.test/{}", title.to_lowercase().replace(' ', "-")),
            })
        })
        .collect();
    json!({ "count": rows.len(), "next": null, "results": results }).to_string()
}

/// OpenAlex works page with `(title, publication_date)` rows.
pub fn openalex_page(rows: &[(&str, &str)]) -> String {
    let results: Vec<_> = rows
        .iter()
        .enumerate()
        .map(|(i, (title, date))| {
            json!({
                "id": format!("https://openalex.org/W{i}"),
                "title": title,
                "doi": format!("https://doi.org/10.9999/{i}"),
                "publication_date": date,
                "primary_location": { "landing_page_url": null },
                "abstract_inverted_index": { "Microgravity": [0], "matters": [1] },
            })
        })
        .collect();
    json!({ "meta": { "count": rows.len() }, "results": results }).to_string()
}

pub fn titles(posts: &[FeedPost]) -> Vec<&str> {
    posts.iter().map(|p| p.title.as_str()).collect()
}

pub fn assert_sorted_desc(posts: &[FeedPost]) {
    for pair in posts.windows(2) {
        let a = parse_display_date(&pair[0].published_at).expect("readable date");
        let b = parse_display_date(&pair[1].published_at).expect("readable date");
        assert!(a >= b, "{:?} must not precede {:?}", pair[0], pair[1]);
    }
}
