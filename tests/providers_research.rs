// tests/providers_research.rs
mod common;

use std::sync::Arc;
use std::time::Duration;

use common::{assert_sorted_desc, openalex_page, sources, titles, ARXIV_AI, PUBMED_ESEARCH, PUBMED_ESUMMARY};
use topic_feeds::ingest::providers::openalex::SWISS_INSTITUTIONS;
use topic_feeds::ingest::transport::{FixtureReply, FixtureTransport};

#[tokio::test]
async fn arxiv_builds_or_query_and_normalizes_entries() {
    let fx = Arc::new(FixtureTransport::new().body("export.arxiv.org", ARXIV_AI));
    let posts = sources(&fx)
        .arxiv
        .recent(&["cs.AI", "cs.LG", "stat.ML"])
        .await;

    let url = &fx.requests()[0];
    assert!(url.contains("search_query=cat%3Acs.AI+OR+cat%3Acs.LG+OR+cat%3Astat.ML"), "{url}");
    assert!(url.contains("sortBy=submittedDate"));
    assert!(url.contains("sortOrder=descending"));
    assert!(url.contains("max_results=10"));

    assert_eq!(posts.len(), 3);
    assert_sorted_desc(&posts);
    assert_eq!(posts[0].title, "Planning Under Uncertainty for Lunar Rovers");

    let debris = posts
        .iter()
        .find(|p| p.url == "http://arxiv.org/abs/2602.10001v1")
        .expect("alternate link used as url");
    assert_eq!(
        debris.title,
        "Scaling Laws for Orbital Debris Forecasting with Graph Transformers"
    );
    assert!(!debris.excerpt.contains('\n'));
    assert_eq!(debris.excerpt.chars().count(), 280);
    assert!(debris.excerpt.ends_with("..."));
    assert!(posts.iter().all(|p| p.source == "arXiv"));
}

#[tokio::test]
async fn arxiv_abstract_keeps_comparison_operators() {
    let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
<feed xmlns="http://www.w3.org/2005/Atom">
  <title>ArXiv Query</title>
  <entry>
    <id>http://arxiv.org/abs/2602.20001v1</id>
    <published>2026-02-12T09:00:00Z</published>
    <title>Quasar Demographics at Cosmic Noon</title>
    <summary>We find quasars at z &lt; 2 are rare,
  and masses M &gt; 10^9 dominate.</summary>
    <link href="http://arxiv.org/abs/2602.20001v1" rel="alternate" type="text/html"/>
    <link title="pdf" href="http://arxiv.org/pdf/2602.20001v1" rel="related" type="application/pdf"/>
  </entry>
</feed>"#;
    let fx = Arc::new(FixtureTransport::new().body("export.arxiv.org", xml));
    let posts = sources(&fx).arxiv.recent(&["astro-ph.GA"]).await;

    assert_eq!(posts.len(), 1);
    assert_eq!(
        posts[0].excerpt,
        "We find quasars at z < 2 are rare, and masses M > 10^9 dominate."
    );
    assert_eq!(posts[0].url, "http://arxiv.org/abs/2602.20001v1");
}

#[tokio::test]
async fn pubmed_two_step_prefers_doi() {
    let fx = Arc::new(
        FixtureTransport::new()
            .body("esearch.fcgi", PUBMED_ESEARCH)
            .body("esummary.fcgi", PUBMED_ESUMMARY),
    );
    let posts = sources(&fx).pubmed.search("microgravity").await;

    let reqs = fx.requests();
    assert_eq!(reqs.len(), 2);
    assert!(reqs[0].contains("term=microgravity") && reqs[0].contains("retmax=10"));
    assert!(reqs[1].contains("id=41000003%2C41000002%2C41000001"), "{}", reqs[1]);

    assert_eq!(posts.len(), 3);
    assert_sorted_desc(&posts);
    assert_eq!(posts[0].title, "Muscle atrophy markers in long-duration spaceflight.");
    assert_eq!(posts[0].url, "https://doi.org/10.1038/s41526-026-00001-1");
    assert_eq!(posts[0].source, "NPJ microgravity");
    assert_eq!(posts[1].url, "https://pubmed.ncbi.nlm.nih.gov/41000002/");
    assert_eq!(posts[1].published_at, "Feb 1, 2026");
    assert_eq!(posts[2].source, "PubMed");
    assert!(posts.iter().all(|p| p.excerpt.is_empty()));
}

#[tokio::test]
async fn pubmed_empty_search_skips_summary_call() {
    let fx = Arc::new(
        FixtureTransport::new()
            .body("esearch.fcgi", r#"{"esearchresult": {"count": "0", "idlist": []}}"#)
            .body("esummary.fcgi", PUBMED_ESUMMARY),
    );
    assert!(sources(&fx).pubmed.search("nothing matches").await.is_empty());
    assert_eq!(fx.requests().len(), 1);
}

#[tokio::test]
async fn pubmed_summary_failure_drops_whole_call() {
    let fx = Arc::new(
        FixtureTransport::new()
            .body("esearch.fcgi", PUBMED_ESEARCH)
            .route("esummary.fcgi", FixtureReply::Status(429)),
    );
    assert!(sources(&fx).pubmed.search("microgravity").await.is_empty());
}

#[tokio::test(start_paused = true)]
async fn openalex_survives_two_of_five_failures_and_dedups() {
    let fx = Arc::new(
        FixtureTransport::new()
            .body(
                "I35440088",
                openalex_page(&[
                    ("Microgravity and bone", "2026-01-20"),
                    ("Shared consortium paper", "2025-12-01"),
                ]),
            )
            .body(
                "I5124864",
                openalex_page(&[
                    ("SHARED CONSORTIUM PAPER", "2025-12-01"),
                    ("Plasma thrusters", "2026-02-02"),
                ]),
            )
            .body("I202697423", openalex_page(&[("Cells in orbit", "2025-11-11")]))
            .route("I118564535", FixtureReply::Status(500))
            .route(
                "I81007117",
                FixtureReply::Slow {
                    delay: Duration::from_secs(60),
                    body: openalex_page(&[("Too late", "2026-02-10")]),
                },
            ),
    );

    let posts = sources(&fx).openalex.institutions(SWISS_INSTITUTIONS).await;

    assert_eq!(fx.requests().len(), 5);
    assert!(fx.requests().iter().all(|u| u.contains("per_page=3")
        && u.contains("sort=publication_date%3Adesc")
        && u.contains("search=space+science+microgravity")));
    assert_eq!(
        titles(&posts),
        [
            "Plasma thrusters",
            "Microgravity and bone",
            "Shared consortium paper",
            "Cells in orbit"
        ]
    );
    assert_eq!(posts[0].source, "EPFL");
    assert_eq!(posts[2].source, "ETH Zürich");
    assert_eq!(posts[1].excerpt, "Microgravity matters");
}
