//! Near-duplicate title collapsing within one batch.
//!
//! Two titles are equivalent when they are equal, or, when both are at least
//! [`PREFIX_CHARS`] characters long, when the leading [`PREFIX_CHARS`] characters of
//! either one occur anywhere inside the other. Cross-source rewrites of the same
//! story usually keep the lead phrase, which this catches; it also over-merges
//! distinct stories that open with the same generic phrase.
//!
//! The first entry seen wins; later equivalents are dropped.

use crate::ingest::types::NewsEntry;

/// Prefix length (in characters, not bytes) used by the containment check.
pub const PREFIX_CHARS: usize = 20;

pub fn titles_equivalent(a: &str, b: &str) -> bool {
    // Untitled entries carry no signal to compare.
    if a.is_empty() || b.is_empty() {
        return false;
    }
    if a.chars().count() >= PREFIX_CHARS && b.chars().count() >= PREFIX_CHARS {
        let pa = prefix(a);
        let pb = prefix(b);
        b.contains(pa) || a.contains(pb)
    } else {
        a == b
    }
}

fn prefix(s: &str) -> &str {
    match s.char_indices().nth(PREFIX_CHARS) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

/// Remembers accepted titles for the current batch.
#[derive(Debug, Default)]
pub struct TitleDeduper {
    accepted: Vec<String>,
}

impl TitleDeduper {
    pub fn new() -> Self {
        Self::default()
    }

    /// True if `title` matches one already accepted; otherwise accepts it.
    pub fn should_drop(&mut self, title: &str) -> bool {
        if self.accepted.iter().any(|t| titles_equivalent(title, t)) {
            return true;
        }
        self.accepted.push(title.to_string());
        false
    }
}

/// Keep the first of each group of equivalent titles, in input order.
/// Returns (kept, dropped_count).
pub fn collapse_near_duplicates(entries: Vec<NewsEntry>) -> (Vec<NewsEntry>, usize) {
    let mut deduper = TitleDeduper::new();
    let mut kept = Vec::with_capacity(entries.len());
    let mut dropped = 0usize;
    for e in entries {
        if deduper.should_drop(&e.title) {
            tracing::debug!(target: "dedup", id = %crate::short_id(&e.link), "near-duplicate dropped");
            dropped += 1;
            continue;
        }
        kept.push(e);
    }
    (kept, dropped)
}
