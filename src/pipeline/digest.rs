// src/pipeline/digest.rs
//! Daily roundup: fetch → normalize → window(hours) → dedup → format → send.
//! No importance gate and no ledger; an empty batch still produces a short notice.

use chrono::{DateTime, Utc};
use metrics::counter;
use tracing::{info, warn};

use super::{RunContext, RunReport};
use crate::analyze::ai_adapter::LlmClient;
use crate::analyze::collapse_near_duplicates;
use crate::error::RelayError;
use crate::ingest::collect_entries;
use crate::ingest::types::NewsEntry;
use crate::ingest::window::{filter_recent, Window};
use crate::metrics as m;
use crate::notify::format::{format_digest_empty, format_digest_llm, format_digest_plain};
use crate::notify::{split_into_chunks, DIGEST_CHUNK_CHARS};

/// Items handed to the model; the plain fallback uses `max_items` from config.
pub const LLM_DIGEST_ITEMS: usize = 50;
const LLM_DIGEST_MAX_TOKENS: u32 = 2048;

pub const DIGEST_SYSTEM_PROMPT: &str = "あなたはニュース編集者です。以下のニュース一覧を、Discordで読みやすい形にまとめてください。\
見出し・箇条書き・重要そうなトピックを簡潔に要約してよい。\
各項目のリンクURLは必ずそのまま含めてください。\
出力は日本語で、2000文字以内に収めてください。";

pub fn build_digest_prompt(entries: &[NewsEntry]) -> String {
    let list = entries
        .iter()
        .take(LLM_DIGEST_ITEMS)
        .enumerate()
        .map(|(i, e)| format!("{}. {}\n   {}", i + 1, e.title.trim(), e.link.trim()))
        .collect::<Vec<_>>()
        .join("\n");
    format!("以下のニュース一覧を整形してください：\n\n{list}")
}

async fn format_with_llm(llm: &dyn LlmClient, entries: &[NewsEntry]) -> Option<String> {
    let prompt = build_digest_prompt(entries);
    let resp = llm.complete(DIGEST_SYSTEM_PROMPT, &prompt, LLM_DIGEST_MAX_TOKENS).await?;
    let text = resp.text().trim();
    if text.is_empty() {
        None
    } else {
        Some(format_digest_llm(text))
    }
}

pub async fn run_digest(ctx: &RunContext, now: DateTime<Utc>) -> Result<RunReport, RelayError> {
    let cfg = &ctx.cfg;
    let hours = cfg.digest.hours;
    let mut report = RunReport::default();

    let fetched = collect_entries(&ctx.sources, now).await;
    report.fetched = fetched.len();
    let recent = filter_recent(fetched, Window::Hours(hours), now);
    report.recent = recent.len();
    let (mut items, dups) = collapse_near_duplicates(recent);
    report.duplicates = dups;
    counter!(m::DEDUP_TOTAL).increment(dups as u64);
    items.sort_by(|a, b| b.published_at.cmp(&a.published_at));

    let body = if items.is_empty() {
        info!(target: "pipeline", hours, "no entries in digest window, sending notice");
        format_digest_empty(hours)
    } else {
        let llm_body = if cfg.digest.use_llm && ctx.llm.is_enabled() {
            report.enrich_attempted = 1;
            let out = format_with_llm(ctx.llm.as_ref(), &items).await;
            if out.is_none() {
                report.enrich_failures = 1;
                counter!(m::ENRICH_FAILURES_TOTAL).increment(1);
                warn!(target: "pipeline", provider = ctx.llm.provider_name(), "digest formatting failed, using plain list");
            }
            out
        } else {
            None
        };
        llm_body.unwrap_or_else(|| format_digest_plain(&items, hours, cfg.digest.max_items))
    };

    let chunks = split_into_chunks(&body, DIGEST_CHUNK_CHARS);
    ctx.notifier
        .send(&chunks)
        .await
        .map_err(|e| RelayError::Send(format!("{e:#}")))?;

    report.delivered = items.len();
    report.chunks_sent = chunks.len();
    counter!(m::DELIVERED_TOTAL).increment(report.delivered as u64);
    info!(
        target: "pipeline",
        notifier = ctx.notifier.name(),
        items = report.delivered,
        chunks = report.chunks_sent,
        "digest delivered"
    );
    Ok(report)
}
