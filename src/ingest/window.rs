// src/ingest/window.rs
use chrono::{DateTime, Duration as ChronoDuration, Utc};

use crate::ingest::types::NewsEntry;

/// Trailing time span an entry must fall into to count as recent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Window {
    Minutes(u32),
    Hours(u32),
}

impl Window {
    pub fn as_duration(self) -> ChronoDuration {
        match self {
            Window::Minutes(m) => ChronoDuration::minutes(i64::from(m)),
            Window::Hours(h) => ChronoDuration::hours(i64::from(h)),
        }
    }

    /// `now - published_at <= window`. Future timestamps pass.
    pub fn contains(self, published_at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        now.signed_duration_since(published_at) <= self.as_duration()
    }
}

/// Keep entries published within `window` of `now`, preserving order.
/// Entries with an estimated timestamp carry ingestion time, so they always pass.
pub fn filter_recent(entries: Vec<NewsEntry>, window: Window, now: DateTime<Utc>) -> Vec<NewsEntry> {
    entries
        .into_iter()
        .filter(|e| e.published_estimated || window.contains(e.published_at, now))
        .collect()
}
