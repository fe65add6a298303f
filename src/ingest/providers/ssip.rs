// src/ingest/providers/ssip.rs
//! Hand-authored SSIP announcements. No upstream.

use crate::ingest::types::FeedPost;

struct StaticPost {
    title: &'static str,
    excerpt: &'static str,
    published_at: &'static str,
    url: &'static str,
}

const SOURCE_NAME: &str = "SSIP";

const POSTS: &[StaticPost] = &[
    StaticPost {
        title: "The Exploratorium Is Live — SSIP's New Experimental Web Space",
        excerpt: "The Swiss Space Innovation Platform has launched the Exploratorium, an open platform for experimental tools, interactive data visualisations, and team-driven projects. Access is open to SSIP members and the broader community.",
        published_at: "Feb 27, 2026",
        url: "https://exploratorium.ssip-pl.ch",
    },
    StaticPost {
        title: "SSIP Annual Conference 2026 — Call for Submissions Now Open",
        excerpt: "The 2026 SSIP Annual Conference will take place in Lucerne this autumn. Submissions for paper presentations, posters, and half-day workshops are accepted through 15 April via the conference portal.",
        published_at: "Feb 20, 2026",
        url: "https://ssip-pl.ch",
    },
    StaticPost {
        title: "SSIP Formalises Partnership with CERN IdeaSquare",
        excerpt: "A collaboration agreement between SSIP and CERN's IdeaSquare innovation hub enables joint workshops, student co-working access in Geneva, and shared mentorship resources for Swiss space entrepreneurship projects.",
        published_at: "Feb 14, 2026",
        url: "https://ssip-pl.ch",
    },
];

/// The fixed list, in authoring order. Ordering is left to the caller.
pub fn posts() -> Vec<FeedPost> {
    POSTS
        .iter()
        .filter_map(|p| {
            FeedPost::with_display_date(p.title, p.excerpt, p.published_at, SOURCE_NAME, p.url)
        })
        .collect()
}
