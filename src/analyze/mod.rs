// src/analyze/mod.rs
//! Analysis stages between ingest and delivery: near-duplicate collapse, importance gate,
//! and LLM enrichment.

pub mod ai_adapter;
pub mod dedup;
pub mod enrich;
pub mod importance;

use std::time::Duration;

use metrics::counter;
use tracing::{debug, warn};

pub use crate::analyze::ai_adapter::{build_llm_client, DynLlmClient, LlmClient, LlmResponse};
pub use crate::analyze::dedup::{collapse_near_duplicates, TitleDeduper};
pub use crate::analyze::enrich::{extract, EnrichedEntry, Extracted, Sentiment, Urgency};
pub use crate::analyze::importance::ImportanceClassifier;

use crate::ingest::types::NewsEntry;

const ENRICH_MAX_TOKENS: u32 = 600;

/// Outcome of one enrichment pass.
#[derive(Debug, Default)]
pub struct EnrichOutcome {
    pub entries: Vec<EnrichedEntry>,
    pub attempted: usize,
    pub failures: usize,
}

/// Enrich English entries through `llm`, one call at a time with `delay` between calls.
///
/// Entries already in the target language, or every entry when `enabled` is false or the
/// client is disabled, pass through unchanged. A call that returns nothing usable leaves
/// that entry plain; it never drops it.
pub async fn enrich_entries(
    entries: Vec<NewsEntry>,
    llm: &dyn LlmClient,
    enabled: bool,
    delay: Duration,
) -> EnrichOutcome {
    let active = enabled && llm.is_enabled();
    let mut out = EnrichOutcome {
        entries: Vec::with_capacity(entries.len()),
        ..Default::default()
    };

    for entry in entries {
        if !active || !enrich::is_mostly_english(&entry.title) {
            out.entries.push(EnrichedEntry::plain(entry));
            continue;
        }

        if out.attempted > 0 && !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        out.attempted += 1;

        let prompt = enrich::build_user_prompt(&entry);
        let extracted = llm
            .complete(enrich::SYSTEM_PROMPT, &prompt, ENRICH_MAX_TOKENS)
            .await
            .map(|r| extract(r.text()))
            .unwrap_or_default();

        if extracted.is_empty() {
            out.failures += 1;
            counter!(crate::metrics::ENRICH_FAILURES_TOTAL).increment(1);
            warn!(
                target: "enrich",
                provider = llm.provider_name(),
                link = %crate::short_id(&entry.link),
                "no usable fields recovered, delivering original"
            );
            out.entries.push(EnrichedEntry::plain(entry));
        } else {
            debug!(
                target: "enrich",
                link = %crate::short_id(&entry.link),
                translated = extracted.title.is_some(),
                impact = ?extracted.impact,
                "entry enriched"
            );
            out.entries.push(EnrichedEntry::with_extraction(entry, extracted));
        }
    }
    out
}
