// tests/common/mod.rs
#![allow(dead_code)]

use std::path::Path;
use std::sync::{Arc, Mutex};

use anyhow::{anyhow, Result};
use chrono::{DateTime, Duration, TimeZone, Utc};
use crypto_news_relay::ai_adapter::{DisabledClient, DynLlmClient};
use crypto_news_relay::notify::Notifier;
use crypto_news_relay::{AppConfig, FeedSource, RawEntry, RunContext};

pub const SPECIALIST_FEED: &str = "https://www.coindesk.com/arc/outboundfeeds/rss/";
pub const GENERALIST_FEED: &str = "https://www.cnbc.com/id/100003114/device/rss/rss.html";

pub fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 14, 9, 30, 0).unwrap()
}

/// Raw entry published `mins_ago` minutes before [`fixed_now`].
pub fn raw(title: &str, link: &str, mins_ago: i64) -> RawEntry {
    RawEntry {
        title: Some(title.to_string()),
        summary: None,
        description: Some(format!("<p>{title} &amp; more</p>")),
        link: Some(link.to_string()),
        published: Some((fixed_now() - Duration::minutes(mins_ago)).to_rfc2822()),
    }
}

pub struct StaticSource {
    pub id: String,
    pub entries: Vec<RawEntry>,
}

impl StaticSource {
    pub fn boxed(id: &str, entries: Vec<RawEntry>) -> Box<dyn FeedSource> {
        Box::new(Self {
            id: id.to_string(),
            entries,
        })
    }
}

#[async_trait::async_trait]
impl FeedSource for StaticSource {
    async fn fetch_entries(&self) -> Result<Vec<RawEntry>> {
        Ok(self.entries.clone())
    }
    fn source_id(&self) -> &str {
        &self.id
    }
}

pub struct FailingSource;

#[async_trait::async_trait]
impl FeedSource for FailingSource {
    async fn fetch_entries(&self) -> Result<Vec<RawEntry>> {
        Err(anyhow!("connection reset"))
    }
    fn source_id(&self) -> &str {
        "https://down.test/rss"
    }
}

/// Keeps every batch it is handed.
#[derive(Default)]
pub struct RecordingNotifier {
    batches: Mutex<Vec<Vec<String>>>,
}

impl RecordingNotifier {
    pub fn batches(&self) -> Vec<Vec<String>> {
        self.batches.lock().unwrap().clone()
    }
    pub fn all_chunks(&self) -> Vec<String> {
        self.batches().into_iter().flatten().collect()
    }
}

#[async_trait::async_trait]
impl Notifier for RecordingNotifier {
    async fn send(&self, chunks: &[String]) -> Result<()> {
        self.batches.lock().unwrap().push(chunks.to_vec());
        Ok(())
    }
    fn name(&self) -> &'static str {
        "recording"
    }
}

pub struct FailingNotifier;

#[async_trait::async_trait]
impl Notifier for FailingNotifier {
    async fn send(&self, _chunks: &[String]) -> Result<()> {
        Err(anyhow!("HTTP 500: upstream unavailable"))
    }
    fn name(&self) -> &'static str {
        "failing"
    }
}

/// Defaults with the ledger under `dir`, no LLM delay and the importance gate off.
pub fn test_config(dir: &Path) -> AppConfig {
    let mut cfg = AppConfig::default();
    cfg.flash.ledger_path = dir.join(".cache/posted.txt");
    cfg.flash.important_only = false;
    cfg.llm.call_delay_ms = 0;
    cfg
}

pub fn ctx(cfg: AppConfig, sources: Vec<Box<dyn FeedSource>>, notifier: Arc<dyn Notifier>) -> RunContext {
    ctx_with_llm(cfg, sources, notifier, Arc::new(DisabledClient))
}

pub fn ctx_with_llm(
    cfg: AppConfig,
    sources: Vec<Box<dyn FeedSource>>,
    notifier: Arc<dyn Notifier>,
    llm: DynLlmClient,
) -> RunContext {
    RunContext {
        cfg,
        sources,
        llm,
        notifier,
        record_deliveries: true,
    }
}
