//! Run orchestration for the two modes. One call processes one batch and returns.

pub mod digest;
pub mod flash;

use std::sync::Arc;

use serde::Serialize;

use crate::analyze::ai_adapter::DynLlmClient;
use crate::config::AppConfig;
use crate::ingest::providers::rss::RssFeedProvider;
use crate::ingest::types::FeedSource;
use crate::notify::Notifier;

pub use digest::run_digest;
pub use flash::run_flash;

/// Everything a run needs, built once by the caller.
pub struct RunContext {
    pub cfg: AppConfig,
    pub sources: Vec<Box<dyn FeedSource>>,
    pub llm: DynLlmClient,
    pub notifier: Arc<dyn Notifier>,
    /// False for dry runs: the ledger is read but never written.
    pub record_deliveries: bool,
}

/// Per-stage counts for one run.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct RunReport {
    pub fetched: usize,
    pub recent: usize,
    pub duplicates: usize,
    pub unimportant: usize,
    pub already_sent: usize,
    pub enrich_attempted: usize,
    pub enrich_failures: usize,
    pub delivered: usize,
    pub chunks_sent: usize,
    /// Links in the ledger after recording; `None` when nothing was written.
    pub ledger_size: Option<usize>,
}

/// One RSS/Atom provider per configured feed URL. A URL the client cannot be built for is skipped.
pub fn sources_from_config(cfg: &AppConfig) -> Vec<Box<dyn FeedSource>> {
    let timeout = cfg.http_timeout();
    cfg.feeds
        .iter()
        .filter(|u| !u.trim().is_empty())
        .filter_map(|url| match RssFeedProvider::from_url(url.trim(), timeout) {
            Ok(p) => Some(Box::new(p) as Box<dyn FeedSource>),
            Err(e) => {
                tracing::warn!(target: "pipeline", error = ?e, feed = %url, "feed skipped");
                None
            }
        })
        .collect()
}
