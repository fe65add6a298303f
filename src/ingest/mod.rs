// src/ingest/mod.rs
//! Upstream ingest: transport, source adapters and the shared normalization,
//! fan-out and merge primitives every adapter is built from.

pub mod config;
pub mod providers;
pub mod transport;
pub mod types;

use std::cmp::Reverse;
use std::collections::HashSet;
use std::future::Future;
use std::time::{Duration, Instant};

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use futures_util::future::join_all;
use metrics::{counter, describe_counter, describe_histogram, histogram};
use once_cell::sync::{Lazy, OnceCell};
use regex::Regex;
use time::{format_description::well_known::Rfc2822, OffsetDateTime};

use crate::ingest::types::{FeedError, FeedPost};

/// Hard cap on excerpt length, in characters.
pub const EXCERPT_MAX_CHARS: usize = 280;
const ELLIPSIS: &str = "...";

/// One-time metrics registration (so series show up on /metrics).
pub(crate) fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("feed_posts_total", "Posts returned by upstream calls.");
        describe_counter!(
            "feed_upstream_errors_total",
            "Upstream calls that failed, timed out or returned garbage."
        );
        describe_counter!(
            "feed_dedup_total",
            "Posts dropped because an earlier post had the same title."
        );
        describe_histogram!("feed_upstream_ms", "Upstream call latency in milliseconds.");
    });
}

static RE_TAGS: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?is)</?[^>]+>").unwrap());
static RE_WS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Collapse every whitespace run (newlines included) into a single space and trim.
pub fn clean_line(s: &str) -> String {
    RE_WS.replace_all(s, " ").trim().to_string()
}

/// Turn an HTML description into a plain snippet.
/// Tags are stripped before entities are decoded, so escaped text such as
/// `&lt;script&gt;` survives as literal text.
pub fn normalize_text(s: &str) -> String {
    let stripped = RE_TAGS.replace_all(s, " ");
    let decoded = html_escape::decode_html_entities(&stripped);

    // Normalize “ ” ‘ ’ « » to ASCII quotes
    let folded = decoded
        .replace(['\u{201C}', '\u{201D}', '\u{00AB}', '\u{00BB}'], "\"")
        .replace(['\u{2018}', '\u{2019}'], "'");

    clean_line(&folded)
}

/// Longer than [`EXCERPT_MAX_CHARS`] → first 277 chars plus `...` (280 total).
pub fn truncate_excerpt(s: &str) -> String {
    if s.chars().count() <= EXCERPT_MAX_CHARS {
        return s.to_string();
    }
    let keep = EXCERPT_MAX_CHARS - ELLIPSIS.len();
    let mut out: String = s.chars().take(keep).collect();
    out.push_str(ELLIPSIS);
    out
}

/// Single-line, length-capped excerpt from raw upstream text.
pub fn make_excerpt(raw: &str) -> String {
    truncate_excerpt(&clean_line(raw))
}

// ---- dates ----

pub fn format_display_date(dt: DateTime<Utc>) -> String {
    dt.format("%b %-d, %Y").to_string()
}

/// Inverse of [`format_display_date`]. Accepts zero-padded days too.
pub fn parse_display_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%b %d, %Y").ok()
}

pub fn parse_rfc3339(s: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s.trim())
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// RSS `pubDate`. Falls back to chrono for obsolete zone names (`GMT`, `EST`).
pub fn parse_rfc2822(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    OffsetDateTime::parse(s, &Rfc2822)
        .ok()
        .and_then(|dt| DateTime::from_timestamp(dt.unix_timestamp(), 0))
        .or_else(|| {
            DateTime::parse_from_rfc2822(s)
                .ok()
                .map(|dt| dt.with_timezone(&Utc))
        })
}

/// `2024-03-05`
pub fn parse_iso_date(s: &str) -> Option<DateTime<Utc>> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| Utc.from_utc_datetime(&dt))
}

/// Bibliographic dates such as `2024 Mar 5`, `2024 Mar`, `2024 Mar-Apr` or `2024`.
/// Missing parts default to the first month/day.
pub fn parse_loose_date(s: &str) -> Option<DateTime<Utc>> {
    let mut parts = s.split_whitespace();
    let year: i32 = parts.next()?.parse().ok()?;
    let month = parts
        .next()
        .and_then(|m| m.split('-').next())
        .filter(|m| m.len() >= 3 && m.is_char_boundary(3))
        .map(|m| m[..3].to_string())
        .unwrap_or_else(|| "Jan".to_string());
    let day: u32 = parts
        .next()
        .and_then(|d| {
            let end = d.find(|c: char| !c.is_ascii_digit()).unwrap_or(d.len());
            d[..end].parse().ok()
        })
        .unwrap_or(1);

    let date = NaiveDate::parse_from_str(&format!("{year} {month} {day}"), "%Y %b %d")
        .or_else(|_| NaiveDate::parse_from_str(&format!("{year} Jan 1"), "%Y %b %d"))
        .ok()?;
    date.and_hms_opt(0, 0, 0).map(|dt| Utc.from_utc_datetime(&dt))
}

/// Try every upstream date shape we know; `None` if nothing fits.
pub fn parse_any_date(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    parse_rfc3339(s)
        .or_else(|| parse_rfc2822(s))
        .or_else(|| parse_iso_date(s))
        .or_else(|| parse_loose_date(s))
}

/// Upstream date or "now" when the upstream has none we can read.
pub fn published_or_now(raw: Option<&str>) -> DateTime<Utc> {
    raw.and_then(parse_any_date).unwrap_or_else(Utc::now)
}

// ---- merge primitives ----

/// Drop every post whose dedup key was already seen; first seen wins.
pub fn dedup_by_title(posts: Vec<FeedPost>) -> Vec<FeedPost> {
    let before = posts.len();
    let mut seen: HashSet<String> = HashSet::with_capacity(before);
    let kept: Vec<FeedPost> = posts
        .into_iter()
        .filter(|p| seen.insert(p.dedup_key()))
        .collect();
    let dropped = before - kept.len();
    if dropped > 0 {
        counter!("feed_dedup_total").increment(dropped as u64);
    }
    kept
}

/// Newest first by display date. Stable; unreadable dates sink to the end.
pub fn sort_by_date_desc(posts: &mut [FeedPost]) {
    posts.sort_by_cached_key(|p| Reverse(parse_display_date(&p.published_at)));
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MergePolicy {
    pub dedup: bool,
    pub cap: Option<usize>,
}

impl MergePolicy {
    pub const fn dedup_capped(cap: usize) -> Self {
        Self {
            dedup: true,
            cap: Some(cap),
        }
    }

    pub const fn capped(cap: usize) -> Self {
        Self {
            dedup: false,
            cap: Some(cap),
        }
    }

    pub const fn dedup_only() -> Self {
        Self {
            dedup: true,
            cap: None,
        }
    }
}

/// Flatten fan-out batches (in call order), optionally dedup, sort, optionally cap.
pub fn merge(batches: Vec<Vec<FeedPost>>, policy: MergePolicy) -> Vec<FeedPost> {
    let flat: Vec<FeedPost> = batches.into_iter().flatten().collect();
    let mut out = if policy.dedup {
        dedup_by_title(flat)
    } else {
        flat
    };
    sort_by_date_desc(&mut out);
    if let Some(cap) = policy.cap {
        out.truncate(cap);
    }
    out
}

// ---- fan-out + failure isolation ----

/// Run all calls concurrently and wait for every one of them.
/// Calls are expected to be total (see [`guarded`]); batches come back in call order.
pub async fn fan_out<I, F>(calls: I) -> Vec<Vec<FeedPost>>
where
    I: IntoIterator<Item = F>,
    F: Future<Output = Vec<FeedPost>>,
{
    join_all(calls).await
}

/// Adapter boundary: bound the call by `timeout`, log + count any failure
/// and substitute an empty batch. Nothing escapes this function.
pub async fn guarded<F>(source: &'static str, timeout: Duration, call: F) -> Vec<FeedPost>
where
    F: Future<Output = Result<Vec<FeedPost>, FeedError>>,
{
    ensure_metrics_described();
    let t0 = Instant::now();

    let res = match tokio::time::timeout(timeout, call).await {
        Ok(r) => r,
        Err(_) => Err(FeedError::Timeout { after: timeout }),
    };

    histogram!("feed_upstream_ms", "source" => source).record(t0.elapsed().as_secs_f64() * 1_000.0);

    match res {
        Ok(posts) => {
            counter!("feed_posts_total", "source" => source).increment(posts.len() as u64);
            posts
        }
        Err(e) => {
            tracing::warn!(target: "feeds", error = %e, source, "upstream call failed");
            counter!("feed_upstream_errors_total", "source" => source).increment(1);
            Vec::new()
        }
    }
}
