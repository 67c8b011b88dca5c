// src/ingest/providers/rss.rs
use anyhow::{Context, Result};
use async_trait::async_trait;
use quick_xml::de::from_str;
use serde::Deserialize;
use std::time::Duration;

use crate::ingest::types::{FeedSource, RawEntry};

pub const USER_AGENT: &str = "crypto-news-relay/0.1 (+scheduled news relay)";

// --- RSS 2.0 ---

#[derive(Debug, Deserialize)]
struct Rss {
    channel: Channel,
}

#[derive(Debug, Deserialize)]
struct Channel {
    #[serde(rename = "item", default)]
    item: Vec<Item>,
}

#[derive(Debug, Deserialize)]
struct Item {
    title: Option<String>,
    link: Option<String>,
    #[serde(rename = "pubDate")]
    pub_date: Option<String>,
    description: Option<String>,
}

// --- Atom ---

#[derive(Debug, Deserialize)]
struct AtomFeed {
    #[serde(rename = "entry", default)]
    entry: Vec<AtomEntry>,
}

#[derive(Debug, Deserialize)]
struct AtomEntry {
    title: Option<AtomText>,
    #[serde(rename = "link", default)]
    links: Vec<AtomLink>,
    published: Option<String>,
    updated: Option<String>,
    summary: Option<AtomText>,
    content: Option<AtomText>,
}

#[derive(Debug, Deserialize)]
struct AtomText {
    #[serde(rename = "$text", default)]
    value: String,
}

#[derive(Debug, Deserialize)]
struct AtomLink {
    #[serde(rename = "@href", default)]
    href: String,
    #[serde(rename = "@rel")]
    rel: Option<String>,
}

impl AtomEntry {
    fn alternate_link(&self) -> Option<String> {
        self.links
            .iter()
            .find(|l| l.rel.as_deref().map_or(true, |r| r == "alternate"))
            .or_else(|| self.links.first())
            .map(|l| l.href.clone())
    }
}

/// Parse an RSS 2.0 document, falling back to Atom.
pub fn parse_feed(xml: &str) -> Result<Vec<RawEntry>> {
    let xml_clean = scrub_html_entities_for_xml(xml);

    match from_str::<Rss>(&xml_clean) {
        Ok(rss) => Ok(rss
            .channel
            .item
            .into_iter()
            .map(|it| RawEntry {
                title: it.title,
                summary: None,
                description: it.description,
                link: it.link,
                published: it.pub_date,
            })
            .collect()),
        Err(rss_err) => {
            let atom: AtomFeed = from_str(&xml_clean)
                .with_context(|| format!("not rss ({rss_err}) and not atom"))?;
            Ok(atom
                .entry
                .into_iter()
                .map(|e| {
                    let link = e.alternate_link();
                    RawEntry {
                        title: e.title.map(|t| t.value),
                        summary: e.summary.map(|t| t.value),
                        description: e.content.map(|t| t.value),
                        link,
                        published: e.published.or(e.updated),
                    }
                })
                .collect())
        }
    }
}

pub struct RssFeedProvider {
    id: String,
    mode: Mode,
}

enum Mode {
    Fixture(String),
    Http { url: String, client: reqwest::Client },
}

impl RssFeedProvider {
    /// Static document, used by tests and dry runs.
    pub fn from_fixture(id: &str, xml: &str) -> Self {
        Self {
            id: id.to_string(),
            mode: Mode::Fixture(xml.to_string()),
        }
    }

    pub fn from_url(url: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .context("building feed http client")?;
        Ok(Self {
            id: url.to_string(),
            mode: Mode::Http {
                url: url.to_string(),
                client,
            },
        })
    }
}

#[async_trait]
impl FeedSource for RssFeedProvider {
    async fn fetch_entries(&self) -> Result<Vec<RawEntry>> {
        match &self.mode {
            Mode::Fixture(s) => parse_feed(s),
            Mode::Http { url, client } => {
                let body = client
                    .get(url)
                    .send()
                    .await
                    .with_context(|| format!("GET {url}"))?
                    .error_for_status()
                    .with_context(|| format!("GET {url} status"))?
                    .text()
                    .await
                    .with_context(|| format!("reading body of {url}"))?;
                parse_feed(&body).with_context(|| format!("parsing feed {url}"))
            }
        }
    }

    fn source_id(&self) -> &str {
        &self.id
    }
}

/// Named HTML entities are not valid XML; replace the common ones before parsing.
fn scrub_html_entities_for_xml(s: &str) -> String {
    s.replace("&nbsp;", " ")
        .replace("&ndash;", "-")
        .replace("&mdash;", "-")
        .replace("&ldquo;", "\"")
        .replace("&rdquo;", "\"")
        .replace("&lsquo;", "'")
        .replace("&rsquo;", "'")
        .replace("&hellip;", "...")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_minimal_rss() {
        let xml = r#"<?xml version="1.0"?>
<rss version="2.0"><channel><title>t</title>
<item><title>SEC delays ETF decision</title><link>https://a.test/1</link>
<pubDate>Tue, 10 Jun 2025 12:30:00 +0000</pubDate>
<description><![CDATA[<p>Body&nbsp;text</p>]]></description></item>
</channel></rss>"#;
        let out = parse_feed(xml).unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].title.as_deref(), Some("SEC delays ETF decision"));
        assert_eq!(out[0].link.as_deref(), Some("https://a.test/1"));
        assert!(out[0].description.as_deref().unwrap().contains("Body"));
    }

    #[test]
    fn empty_channel_is_ok() {
        let xml = r#"<rss version="2.0"><channel><title>t</title></channel></rss>"#;
        assert!(parse_feed(xml).unwrap().is_empty());
    }

    #[test]
    fn parses_atom_with_alternate_link() {
        let xml = r#"<?xml version="1.0" encoding="utf-8"?>
<feed xmlns="http://www.w3.org/2005/Atom"><title>t</title>
<entry><title type="text">Ethereum upgrade ships</title>
<link rel="self" href="https://b.test/self"/>
<link rel="alternate" href="https://b.test/post"/>
<updated>2025-06-10T12:30:00Z</updated>
<summary>Short summary</summary></entry>
</feed>"#;
        let out = parse_feed(xml).unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].link.as_deref(), Some("https://b.test/post"));
        assert_eq!(out[0].published.as_deref(), Some("2025-06-10T12:30:00Z"));
        assert_eq!(out[0].summary.as_deref(), Some("Short summary"));
    }
}
