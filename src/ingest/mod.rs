// src/ingest/mod.rs
pub mod providers;
pub mod types;
pub mod window;

use crate::ingest::types::{FeedSource, NewsEntry, RawEntry};
use chrono::{DateTime, Utc};
use metrics::{counter, histogram};
use once_cell::sync::Lazy;
use regex::Regex;
use time::format_description::well_known::{Rfc2822, Rfc3339};
use time::OffsetDateTime;

static RE_TAGS: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?is)</?[^>]+>").expect("tag regex"));
static RE_WS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("ws regex"));

/// Strip HTML, decode entities and collapse whitespace.
pub fn normalize_text(s: &str) -> String {
    // Tags first: entity-decoding before would turn `&lt;b&gt;` text into markup.
    let out = RE_TAGS.replace_all(s, "");
    let out = html_escape::decode_html_entities(&out);

    let out = out
        .replace(['\u{201C}', '\u{201D}', '\u{00AB}', '\u{00BB}'], "\"")
        .replace(['\u{2018}', '\u{2019}'], "'");

    let mut out = RE_WS.replace_all(&out, " ").trim().to_string();

    if out.chars().count() > 1500 {
        out = out.chars().take(1500).collect();
    }
    out
}

/// Cut `text` to `max_chars`, backing off to the last word boundary, and mark the cut with `…`.
pub fn truncate_summary(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let head: String = text.chars().take(max_chars).collect();
    let cut = match head.rfind(' ') {
        Some(idx) if idx > 0 => &head[..idx],
        _ => head.as_str(),
    };
    format!("{}…", cut.trim_end())
}

/// Parse an RSS (RFC 2822) or Atom (RFC 3339) timestamp into UTC.
pub fn parse_published(ts: &str) -> Option<DateTime<Utc>> {
    let ts = ts.trim();
    if ts.is_empty() {
        return None;
    }
    if let Ok(odt) =
        OffsetDateTime::parse(ts, &Rfc2822).or_else(|_| OffsetDateTime::parse(ts, &Rfc3339))
    {
        return DateTime::<Utc>::from_timestamp(odt.unix_timestamp(), odt.nanosecond());
    }
    // chrono also accepts obsolete zone names like "GMT"/"EST"
    DateTime::parse_from_rfc2822(ts)
        .or_else(|_| DateTime::parse_from_rfc3339(ts))
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Build the canonical record. Entries without a link have no identity and are dropped.
pub fn normalize_entry(raw: RawEntry, source: &str, now: DateTime<Utc>) -> Option<NewsEntry> {
    let link = raw.link.as_deref().map(str::trim).unwrap_or_default();
    if link.is_empty() {
        return None;
    }

    let summary_raw = raw
        .summary
        .as_deref()
        .filter(|s| !s.trim().is_empty())
        .or(raw.description.as_deref())
        .unwrap_or_default();

    let parsed = raw.published.as_deref().and_then(parse_published);

    Some(NewsEntry {
        title: normalize_text(raw.title.as_deref().unwrap_or_default()),
        summary: normalize_text(summary_raw),
        link: link.to_string(),
        published_at: parsed.unwrap_or(now),
        published_estimated: parsed.is_none(),
        source: source.to_string(),
    })
}

/// Fetch every source in order and normalize what comes back.
/// A failing source contributes nothing; the others still run.
pub async fn collect_entries(
    sources: &[Box<dyn FeedSource>],
    now: DateTime<Utc>,
) -> Vec<NewsEntry> {
    crate::metrics::ensure_described();

    let mut out = Vec::new();
    for src in sources {
        let t0 = std::time::Instant::now();
        match src.fetch_entries().await {
            Ok(raw) => {
                let before = out.len();
                out.extend(
                    raw.into_iter()
                        .filter_map(|r| normalize_entry(r, src.source_id(), now)),
                );
                let got = out.len() - before;
                histogram!(crate::metrics::FEED_PARSE_MS)
                    .record(t0.elapsed().as_secs_f64() * 1_000.0);
                counter!(crate::metrics::FETCHED_TOTAL).increment(got as u64);
                tracing::debug!(target: "ingest", source = src.source_id(), entries = got, "source fetched");
            }
            Err(e) => {
                tracing::warn!(target: "ingest", error = ?e, source = src.source_id(), "source skipped");
                counter!(crate::metrics::PROVIDER_ERRORS_TOTAL).increment(1);
            }
        }
    }
    out
}
