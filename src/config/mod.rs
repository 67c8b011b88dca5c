// src/config/mod.rs
//! Run configuration: built-in defaults, then an optional TOML file, then env overrides.
//! Built once in `main` and passed down; nothing below reads the environment itself.

pub mod ai;

use anyhow::Context;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

pub use ai::LlmConfig;

use crate::error::RelayError;

pub const ENV_CONFIG_PATH: &str = "RELAY_CONFIG_PATH";
pub const DEFAULT_CONFIG_PATH: &str = "config/relay.toml";

pub const ENV_WEBHOOK_FLASH: &str = "DISCORD_WEBHOOK_URL_30M";
pub const ENV_WEBHOOK_DIGEST: &str = "DISCORD_WEBHOOK_URL_DAILY";

const DEFAULT_FEEDS: &[&str] = &[
    "https://www.coindesk.com/arc/outboundfeeds/rss/",
    "https://cointelegraph.com/rss",
    "https://decrypt.co/feed",
    "https://news.bitcoin.com/feed/",
    "https://cryptonews.com/news/feed/",
    "https://jp.cointelegraph.com/rss",
    "https://coinpost.jp/?feed=rss2",
    "https://www.cnbc.com/id/100003114/device/rss/rss.html",
    "https://www.reuters.com/finance/economy/rss",
    "https://www.aljazeera.com/xml/rss/all.xml",
    "https://www3.nhk.or.jp/rss/news/cat0.xml",
];

/// Markers matched against the feed URL; these outlets only need one keyword hit.
const DEFAULT_SPECIALISTS: &[&str] = &[
    "coindesk",
    "cointelegraph",
    "decrypt",
    "bitcoin.com",
    "cryptonews",
    "coinpost",
];

const DEFAULT_KEYWORDS: &[&str] = &[
    "FOMC", "利上げ", "利下げ", "インフレ", "破綻", "暴落", "金融", "混乱", "デフォルト",
    "制裁", "戦争", "侵攻", "大統領", "トランプ", "バイデン", "発表", "緊急", "G7", "BRICS",
    "SEC", "ETF", "訴訟", "規制", "禁止", "制限",
    "暗号資産", "仮想通貨", "暗号通貨", "ビットコイン", "イーサリアム", "取引所",
];

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub feeds: Vec<String>,
    pub specialist_sources: Vec<String>,
    pub important_keywords: Vec<String>,
    /// Per-request timeout for feed fetches and webhook posts.
    pub http_timeout_secs: u64,
    pub flash: FlashConfig,
    pub digest: DigestConfig,
    pub llm: LlmConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            feeds: strings(DEFAULT_FEEDS),
            specialist_sources: strings(DEFAULT_SPECIALISTS),
            important_keywords: strings(DEFAULT_KEYWORDS),
            http_timeout_secs: 30,
            flash: FlashConfig::default(),
            digest: DigestConfig::default(),
            llm: LlmConfig::default(),
        }
    }
}

/// Frequent "breaking news" run.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FlashConfig {
    pub webhook_url: Option<String>,
    pub window_minutes: u32,
    pub important_only: bool,
    pub summary_max_chars: usize,
    /// Translate/annotate English entries through the LLM when a key is configured.
    pub translate: bool,
    pub ledger_path: PathBuf,
    pub ledger_cap: usize,
}

impl Default for FlashConfig {
    fn default() -> Self {
        Self {
            webhook_url: None,
            window_minutes: 30,
            important_only: true,
            summary_max_chars: 120,
            translate: true,
            ledger_path: PathBuf::from(".cache/posted_links_30m.txt"),
            ledger_cap: crate::ledger::DEFAULT_CAP,
        }
    }
}

/// Once-a-day roundup run.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DigestConfig {
    pub webhook_url: Option<String>,
    pub hours: u32,
    pub use_llm: bool,
    pub max_items: usize,
}

impl Default for DigestConfig {
    fn default() -> Self {
        Self {
            webhook_url: None,
            hours: 24,
            use_llm: false,
            max_items: 80,
        }
    }
}

impl AppConfig {
    /// Process entry point: real environment.
    pub fn load() -> Result<Self, RelayError> {
        Self::load_with(|k| std::env::var(k).ok())
    }

    /// Same as [`AppConfig::load`] with an injectable env lookup.
    pub fn load_with<F>(lookup: F) -> Result<Self, RelayError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = match resolve_config_path(&lookup)? {
            Some(p) => Self::from_toml_file(&p).map_err(|e| RelayError::Config(format!("{e:#}")))?,
            None => Self::default(),
        };
        cfg.apply_env(&lookup)?;
        cfg.llm.sanitize();
        Ok(cfg)
    }

    pub fn from_toml_file(path: &Path) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading config from {}", path.display()))?;
        Self::from_toml_str(&content).with_context(|| format!("parsing {}", path.display()))
    }

    pub fn from_toml_str(s: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(s)?)
    }

    /// Env overrides. Blank values count as unset.
    pub fn apply_env<F>(&mut self, lookup: &F) -> Result<(), RelayError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |k: &str| lookup(k).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        if let Some(v) = get(ENV_WEBHOOK_FLASH) {
            self.flash.webhook_url = Some(v);
        }
        if let Some(v) = get(ENV_WEBHOOK_DIGEST) {
            self.digest.webhook_url = Some(v);
        }
        if let Some(v) = get("ALERT_30M_IMPORTANT_ONLY") {
            self.flash.important_only = parse_flag("ALERT_30M_IMPORTANT_ONLY", &v)?;
        }
        if let Some(v) = get("ALERT_30M_SUMMARY_CHARS") {
            self.flash.summary_max_chars = parse_num("ALERT_30M_SUMMARY_CHARS", &v)?;
        }
        if let Some(v) = get("ALERT_30M_TRANSLATE") {
            self.flash.translate = parse_flag("ALERT_30M_TRANSLATE", &v)?;
        }
        if let Some(v) = get("POSTED_LINKS_FILE") {
            self.flash.ledger_path = PathBuf::from(v);
        }
        if let Some(v) = get("POSTED_LINKS_CAP") {
            self.flash.ledger_cap = parse_num("POSTED_LINKS_CAP", &v)?;
        }
        if let Some(v) = get("DAILY_SUMMARY_HOURS") {
            self.digest.hours = parse_num("DAILY_SUMMARY_HOURS", &v)?;
        }
        if let Some(v) = get("USE_GLM_FOR_DAILY") {
            self.digest.use_llm = parse_flag("USE_GLM_FOR_DAILY", &v)?;
        }
        if let Some(v) = get("GLM_API_KEY") {
            self.llm.api_key = v;
        }
        if let Some(v) = get("GLM_API_URL") {
            self.llm.api_url = v;
        }
        if let Some(v) = get("GLM_MODEL") {
            self.llm.model = v;
        }
        Ok(())
    }

    pub fn flash_webhook(&self) -> Result<&str, RelayError> {
        non_blank(self.flash.webhook_url.as_deref()).ok_or(RelayError::MissingDestination(ENV_WEBHOOK_FLASH))
    }

    pub fn digest_webhook(&self) -> Result<&str, RelayError> {
        non_blank(self.digest.webhook_url.as_deref()).ok_or(RelayError::MissingDestination(ENV_WEBHOOK_DIGEST))
    }

    pub fn http_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.http_timeout_secs.max(1))
    }
}

fn non_blank(v: Option<&str>) -> Option<&str> {
    v.map(str::trim).filter(|s| !s.is_empty())
}

/// 1) $RELAY_CONFIG_PATH (must exist)  2) config/relay.toml if present  3) none
fn resolve_config_path<F>(lookup: &F) -> Result<Option<PathBuf>, RelayError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(p) = lookup(ENV_CONFIG_PATH).filter(|p| !p.trim().is_empty()) {
        let pb = PathBuf::from(p.trim());
        if pb.exists() {
            return Ok(Some(pb));
        }
        return Err(RelayError::Config(format!(
            "{ENV_CONFIG_PATH} points to non-existent path {}",
            pb.display()
        )));
    }
    let default = PathBuf::from(DEFAULT_CONFIG_PATH);
    Ok(default.exists().then_some(default))
}

fn parse_flag(key: &str, v: &str) -> Result<bool, RelayError> {
    match v.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(RelayError::Config(format!("{key}: expected a boolean, got {other:?}"))),
    }
}

fn parse_num<T: std::str::FromStr>(key: &str, v: &str) -> Result<T, RelayError> {
    v.parse::<T>()
        .map_err(|_| RelayError::Config(format!("{key}: expected a number, got {v:?}")))
}
