//! Message bodies for the two run modes.

use crate::analyze::enrich::{EnrichedEntry, Sentiment, Urgency};
use crate::ingest::truncate_summary;
use crate::ingest::types::NewsEntry;

pub const FLASH_MARKER: &str = "⚡速報⚡";
pub const UNTITLED: &str = "(タイトルなし)";
pub const DIGEST_HEADER: &str = "📢 **本日のニュースまとめ**";

fn sentiment_label(s: Sentiment) -> &'static str {
    match s {
        Sentiment::Positive => "ポジティブ",
        Sentiment::Neutral => "中立",
        Sentiment::Negative => "ネガティブ",
        Sentiment::Unknown => "不明",
    }
}

fn urgency_label(u: Urgency) -> &'static str {
    match u {
        Urgency::High => "高",
        Urgency::Medium => "中",
        Urgency::Low => "低",
        Urgency::Unknown => "不明",
    }
}

/// One breaking-news message.
pub fn format_flash(e: &EnrichedEntry, summary_max_chars: usize) -> String {
    let title = if e.display_title.trim().is_empty() {
        UNTITLED
    } else {
        e.display_title.as_str()
    };

    let mut lines = vec![FLASH_MARKER.to_string(), format!("**{title}**")];
    if e.display_title != e.entry.title && !e.entry.title.is_empty() {
        lines.push(format!("（原題: {}）", e.entry.title));
    }
    let summary = truncate_summary(&e.display_summary, summary_max_chars);
    if !summary.is_empty() {
        lines.push(summary);
    }

    if e.enriched {
        if !e.comment.is_empty() {
            lines.push(format!("💬 {}", e.comment));
        }
        lines.push(format!(
            "📊 影響度 {}/5 | センチメント: {} | 緊急度: {}",
            e.impact_score,
            sentiment_label(e.sentiment),
            urgency_label(e.urgency)
        ));
    }

    lines.push(e.entry.link.clone());
    lines.join("\n")
}

/// Plain digest list, capped at `max_items`.
pub fn format_digest_plain(entries: &[NewsEntry], hours: u32, max_items: usize) -> String {
    let mut lines = vec![format!("{DIGEST_HEADER}（過去{hours}時間）\n")];
    for e in entries.iter().take(max_items) {
        lines.push(format!("• {}\n  <{}>", e.title, e.link));
    }
    lines.join("\n")
}

pub fn format_digest_llm(body: &str) -> String {
    format!("{DIGEST_HEADER}（AI整形）\n\n{}", body.trim())
}

pub fn format_digest_empty(hours: u32) -> String {
    format!("{DIGEST_HEADER}\n\n過去{hours}時間のニュースはありません。")
}
