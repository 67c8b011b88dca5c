// src/pipeline/flash.rs
//! Breaking-news run:
//! fetch → normalize → window → dedup → classify → ledger filter → enrich → format → send → record.

use chrono::{DateTime, Utc};
use metrics::counter;
use tracing::{info, warn};

use super::{RunContext, RunReport};
use crate::analyze::{collapse_near_duplicates, enrich_entries, ImportanceClassifier};
use crate::error::RelayError;
use crate::ingest::collect_entries;
use crate::ingest::window::{filter_recent, Window};
use crate::ledger::{filter_unsent, DeliveryLedger};
use crate::metrics as m;
use crate::notify::format::format_flash;
use crate::notify::{split_into_chunks, DISCORD_MAX_CHARS};

pub async fn run_flash(ctx: &RunContext, now: DateTime<Utc>) -> Result<RunReport, RelayError> {
    let cfg = &ctx.cfg;
    let mut report = RunReport::default();

    let fetched = collect_entries(&ctx.sources, now).await;
    report.fetched = fetched.len();

    let recent = filter_recent(fetched, Window::Minutes(cfg.flash.window_minutes), now);
    report.recent = recent.len();

    let (unique, dups) = collapse_near_duplicates(recent);
    report.duplicates = dups;
    counter!(m::DEDUP_TOTAL).increment(dups as u64);

    let candidates = if cfg.flash.important_only {
        let classifier = ImportanceClassifier::new(&cfg.important_keywords, &cfg.specialist_sources);
        let before = unique.len();
        let kept: Vec<_> = unique.into_iter().filter(|e| classifier.is_important(e)).collect();
        report.unimportant = before - kept.len();
        counter!(m::UNIMPORTANT_TOTAL).increment(report.unimportant as u64);
        kept
    } else {
        unique
    };

    let ledger = DeliveryLedger::new(&cfg.flash.ledger_path, cfg.flash.ledger_cap);
    let sent = ledger.load();
    let (mut fresh, suppressed) = filter_unsent(candidates, &sent);
    report.already_sent = suppressed;
    counter!(m::LEDGER_SUPPRESSED_TOTAL).increment(suppressed as u64);

    info!(
        target: "pipeline",
        fetched = report.fetched,
        recent = report.recent,
        duplicates = report.duplicates,
        unimportant = report.unimportant,
        already_sent = report.already_sent,
        remaining = fresh.len(),
        "flash batch filtered"
    );

    if fresh.is_empty() {
        info!(target: "pipeline", window_minutes = cfg.flash.window_minutes, "nothing new to deliver");
        return Ok(report);
    }

    // newest first; sort_by is stable
    fresh.sort_by(|a, b| b.published_at.cmp(&a.published_at));

    let enriched = enrich_entries(fresh, ctx.llm.as_ref(), cfg.flash.translate, cfg.llm.call_delay()).await;
    report.enrich_attempted = enriched.attempted;
    report.enrich_failures = enriched.failures;

    let chunks: Vec<String> = enriched
        .entries
        .iter()
        .flat_map(|e| split_into_chunks(&format_flash(e, cfg.flash.summary_max_chars), DISCORD_MAX_CHARS))
        .collect();

    ctx.notifier
        .send(&chunks)
        .await
        .map_err(|e| RelayError::Send(format!("{e:#}")))?;

    report.delivered = enriched.entries.len();
    report.chunks_sent = chunks.len();
    counter!(m::DELIVERED_TOTAL).increment(report.delivered as u64);
    info!(
        target: "pipeline",
        notifier = ctx.notifier.name(),
        delivered = report.delivered,
        chunks = report.chunks_sent,
        "flash batch delivered"
    );

    if ctx.record_deliveries {
        let links = enriched.entries.into_iter().map(|e| e.entry.link);
        match ledger.record(links) {
            Ok(n) => report.ledger_size = Some(n),
            Err(e) => warn!(
                target: "ledger",
                error = ?e,
                path = %ledger.path().display(),
                "delivered but ledger write failed; entries may repeat next run"
            ),
        }
    }

    Ok(report)
}
