//! Enrichment: prompt construction and recovery of structured fields from free-text LLM output.
//!
//! The model is asked for labeled lines (`Title:`, `Summary:`, `Comment:`, `Impact:`,
//! `Sentiment:`, `Urgency:`) but regularly answers with a subset, with Japanese labels,
//! with reasoning wrapped around the answer, or with a bare one-line translation.
//! [`extract`] works through that in fixed order:
//!
//! 1. strip generic leading labels and code fences (`Output:`, `出力：`, ```` ``` ````);
//! 2. locate every known label (English or Japanese) and capture up to the next label;
//! 3. with no title label, take the first unlabeled line written in the target script;
//! 4. reject text fields shorter than [`MIN_TEXT_CHARS`];
//! 5. accept impact only as an integer in `0..=5`;
//! 6. map sentiment/urgency through a fixed synonym table.
//!
//! Anything not recovered stays at its neutral default. [`extract`] never panics.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::ingest::types::NewsEntry;

pub const MIN_TEXT_CHARS: usize = 4;
pub const MAX_IMPACT: u8 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    Neutral,
    Negative,
    #[default]
    Unknown,
}

impl Sentiment {
    pub fn from_label(s: &str) -> Self {
        match leading_word(s).as_str() {
            "positive" | "bullish" | "ポジティブ" | "強気" | "好材料" | "楽観" => Self::Positive,
            "negative" | "bearish" | "ネガティブ" | "弱気" | "悪材料" | "悲観" => Self::Negative,
            "neutral" | "mixed" | "ニュートラル" | "中立" | "中性" => Self::Neutral,
            _ => Self::Unknown,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Urgency {
    High,
    Medium,
    Low,
    #[default]
    Unknown,
}

impl Urgency {
    pub fn from_label(s: &str) -> Self {
        match leading_word(s).as_str() {
            "high" | "urgent" | "高" | "高い" | "緊急" => Self::High,
            "medium" | "moderate" | "mid" | "中" | "普通" => Self::Medium,
            "low" | "低" | "低い" => Self::Low,
            _ => Self::Unknown,
        }
    }
}

/// Fields recovered from one model response. `None` means "not recovered".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Extracted {
    pub title: Option<String>,
    pub summary: Option<String>,
    pub comment: Option<String>,
    pub impact: Option<u8>,
    pub sentiment: Sentiment,
    pub urgency: Urgency,
}

impl Extracted {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// An entry plus whatever enrichment it received. Without enrichment the display
/// fields mirror the original entry and the rest stay neutral.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnrichedEntry {
    pub entry: NewsEntry,
    pub display_title: String,
    pub display_summary: String,
    pub comment: String,
    pub impact_score: u8,
    pub sentiment: Sentiment,
    pub urgency: Urgency,
    pub enriched: bool,
}

impl EnrichedEntry {
    pub fn plain(entry: NewsEntry) -> Self {
        Self {
            display_title: entry.title.clone(),
            display_summary: entry.summary.clone(),
            comment: String::new(),
            impact_score: 0,
            sentiment: Sentiment::Unknown,
            urgency: Urgency::Unknown,
            enriched: false,
            entry,
        }
    }

    pub fn with_extraction(entry: NewsEntry, ex: Extracted) -> Self {
        let enriched = !ex.is_empty();
        let mut out = Self::plain(entry);
        if let Some(t) = ex.title {
            out.display_title = t;
        }
        if let Some(s) = ex.summary {
            out.display_summary = s;
        }
        out.comment = ex.comment.unwrap_or_default();
        out.impact_score = ex.impact.unwrap_or(0);
        out.sentiment = ex.sentiment;
        out.urgency = ex.urgency;
        out.enriched = enriched;
        out
    }
}

// ------------------------------------------------------------
// Prompt
// ------------------------------------------------------------

pub const SYSTEM_PROMPT: &str = "あなたは暗号資産・金融ニュースの翻訳者兼アナリストです。\
与えられた英語ニュースを日本語に翻訳し、次の形式だけで出力してください。説明や前置きは不要です。\n\
Title: <日本語タイトル>\n\
Summary: <日本語要約（1〜2文）>\n\
Comment: <市場への影響についての短いコメント>\n\
Impact: <0〜5の整数>\n\
Sentiment: <positive|neutral|negative>\n\
Urgency: <high|medium|low>";

pub fn build_user_prompt(entry: &NewsEntry) -> String {
    if entry.summary.is_empty() {
        format!("Title: {}", entry.title)
    } else {
        format!("Title: {}\nSummary: {}", entry.title, entry.summary)
    }
}

/// More than 70% ASCII characters. Titles already in Japanese skip the LLM.
pub fn is_mostly_english(text: &str) -> bool {
    let total = text.chars().count();
    if total == 0 {
        return false;
    }
    let ascii = text.chars().filter(|c| c.is_ascii()).count();
    ascii as f64 / total as f64 > 0.7
}

/// Hiragana, katakana or CJK unified ideographs.
pub fn has_target_script(text: &str) -> bool {
    text.chars().any(|c| {
        matches!(c,
            '\u{3040}'..='\u{309F}' | '\u{30A0}'..='\u{30FF}' | '\u{4E00}'..='\u{9FFF}')
    })
}

// ------------------------------------------------------------
// Extraction
// ------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Title,
    Summary,
    Comment,
    Impact,
    Sentiment,
    Urgency,
}

impl Field {
    fn from_label(label: &str) -> Option<Self> {
        let l = label.to_lowercase();
        let l = l.split_whitespace().collect::<Vec<_>>().join(" ");
        Some(match l.as_str() {
            "title" | "translated title" | "headline" | "タイトル" | "翻訳タイトル" | "見出し" => {
                Field::Title
            }
            "summary" | "要約" | "概要" => Field::Summary,
            "comment" | "commentary" | "コメント" | "解説" => Field::Comment,
            "impact" | "impact score" | "影響度" | "重要度" => Field::Impact,
            "sentiment" | "センチメント" | "市場心理" => Field::Sentiment,
            "urgency" | "緊急度" => Field::Urgency,
            _ => return None,
        })
    }
}

// Labels start a line, optionally behind a list bullet or bold marker.
// Longer alternatives first so "translated title" wins over "title".
static RE_LABEL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?im)^[ \t]*(?:[-*•][ \t]*)?(?:\*\*|__)?[ \t]*(?P<label>translated\s+title|impact\s+score|headline|title|summary|commentary|comment|impact|sentiment|urgency|翻訳タイトル|タイトル|見出し|要約|概要|コメント|解説|影響度|重要度|センチメント|市場心理|緊急度)[ \t]*(?:\*\*|__)?[ \t]*[:：]",
    )
    .expect("label regex")
});

static RE_LEADING_NOISE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(?:```[a-z]*\s*|(?:出力|output|result|answer|response|回答|翻訳|translation)[ \t]*[:：]\s*)")
        .expect("leading noise regex")
});

static RE_LIST_ARTIFACT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(?:[#*>|`\-•]|\d+[.)]\s|(?:入力|出力|input|output)[ \t]*[:：])")
        .expect("artifact regex")
});

/// Stage 1: drop generic leading labels and fences, repeatedly.
fn strip_leading_noise(raw: &str) -> &str {
    let mut s = raw.trim();
    while let Some(m) = RE_LEADING_NOISE.find(s) {
        if m.end() == 0 {
            break;
        }
        s = s[m.end()..].trim_start();
    }
    s.trim_end().trim_end_matches("```").trim_end()
}

fn clean_value(s: &str) -> &str {
    s.trim_matches(|c: char| {
        c.is_whitespace() || matches!(c, '*' | '_' | '"' | '「' | '」' | '`')
    })
}

fn first_line(s: &str) -> &str {
    s.lines()
        .map(clean_value)
        .find(|l| !l.is_empty())
        .unwrap_or("")
}

fn joined_lines(s: &str) -> String {
    s.lines()
        .map(clean_value)
        .filter(|l| !l.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

fn plausible_text(s: String) -> Option<String> {
    if s.chars().count() >= MIN_TEXT_CHARS {
        Some(s)
    } else {
        None
    }
}

/// Lowercased leading token, cut at whitespace or bracket/punctuation.
fn leading_word(s: &str) -> String {
    clean_value(s)
        .split(|c: char| {
            c.is_whitespace()
                || matches!(c, '(' | '（' | '[' | '【' | ',' | '、' | '.' | '。' | '/' | '-' | ':' | '：')
        })
        .next()
        .unwrap_or("")
        .to_lowercase()
}

fn parse_impact(s: &str) -> Option<u8> {
    let token = clean_value(first_line(s))
        .split(|c: char| c.is_whitespace() || c == '/' || c == '／')
        .next()
        .unwrap_or("")
        .trim_end_matches(['.', '。']);
    token.parse::<u8>().ok().filter(|v| *v <= MAX_IMPACT)
}

/// Stage 3: first line in the target script that is not a list/markdown/echo artifact.
fn fallback_title(region: &str) -> Option<String> {
    region
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .filter(|l| !RE_LIST_ARTIFACT.is_match(l))
        .find(|l| has_target_script(l))
        .map(str::to_string)
}

/// Recover structured fields from a model response. Total: any input yields a value.
pub fn extract(raw: &str) -> Extracted {
    let text = strip_leading_noise(raw);
    let mut out = Extracted::default();
    if text.is_empty() {
        return out;
    }

    // (field, mark_start, value_start)
    let marks: Vec<(Field, usize, usize)> = RE_LABEL
        .captures_iter(text)
        .filter_map(|c| {
            let label = c.name("label")?;
            let whole = c.get(0)?;
            Field::from_label(label.as_str()).map(|f| (f, whole.start(), whole.end()))
        })
        .collect();

    // A field is taken from its first occurrence that validates; echoed input is skipped.
    for (i, &(field, _, value_start)) in marks.iter().enumerate() {
        let value_end = marks.get(i + 1).map_or(text.len(), |m| m.1);
        let value = &text[value_start..value_end];

        match field {
            Field::Title if out.title.is_none() => {
                out.title = plausible_text(first_line(value).to_string())
                    .filter(|t| has_target_script(t));
            }
            Field::Summary if out.summary.is_none() => {
                out.summary = plausible_text(joined_lines(value)).filter(|t| has_target_script(t));
            }
            Field::Comment if out.comment.is_none() => {
                out.comment = plausible_text(joined_lines(value));
            }
            Field::Impact if out.impact.is_none() => out.impact = parse_impact(value),
            Field::Sentiment if out.sentiment == Sentiment::Unknown => {
                out.sentiment = Sentiment::from_label(first_line(value));
            }
            Field::Urgency if out.urgency == Urgency::Unknown => {
                out.urgency = Urgency::from_label(first_line(value));
            }
            _ => {}
        }
    }

    if out.title.is_none() {
        let region_end = marks.first().map_or(text.len(), |m| m.1);
        out.title = fallback_title(&text[..region_end]).and_then(plausible_text);
    }

    out
}
