// src/ingest/types.rs
use anyhow::Result;
use chrono::{DateTime, Utc};

/// One entry as handed over by a feed, before any cleanup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawEntry {
    pub title: Option<String>,
    pub summary: Option<String>,
    pub description: Option<String>,
    pub link: Option<String>,
    /// RFC 2822 (RSS) or RFC 3339 (Atom) as found in the document.
    pub published: Option<String>,
}

/// Canonical record for one news item. `link` is its identity.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct NewsEntry {
    pub title: String,
    pub summary: String, // plain text, HTML already stripped
    pub link: String,
    pub published_at: DateTime<Utc>,
    /// True when the feed timestamp was missing/unparsable and `published_at` is ingestion time.
    pub published_estimated: bool,
    pub source: String, // feed URL or fixture name
}

#[async_trait::async_trait]
pub trait FeedSource: Send + Sync {
    async fn fetch_entries(&self) -> Result<Vec<RawEntry>>;
    fn source_id(&self) -> &str;
}
