// tests/providers_rss.rs
use chrono::{TimeZone, Utc};
use crypto_news_relay::ingest::collect_entries;
use crypto_news_relay::ingest::providers::rss::{parse_feed, RssFeedProvider};
use crypto_news_relay::FeedSource;

fn fixture(name: &str) -> String {
    std::fs::read_to_string(format!("tests/fixtures/{name}")).expect("fixture")
}

#[tokio::test]
async fn rss_fixture_normalizes_entries() {
    let now = Utc.with_ymd_and_hms(2025, 3, 14, 9, 30, 0).unwrap();
    let src: Vec<Box<dyn FeedSource>> = vec![Box::new(RssFeedProvider::from_fixture(
        "https://www.coindesk.com/arc/outboundfeeds/rss/",
        &fixture("coindesk_rss.xml"),
    ))];

    let out = collect_entries(&src, now).await;

    // the item without a link is dropped
    assert_eq!(out.len(), 3);
    let etf = &out[0];
    assert_eq!(etf.title, "SEC Approves Spot Ether ETFs in Landmark Decision");
    assert_eq!(
        etf.summary,
        "The regulator signed off on the products after months of review & public comment."
    );
    assert_eq!(etf.published_at, Utc.with_ymd_and_hms(2025, 3, 14, 9, 20, 0).unwrap());
    assert!(!etf.published_estimated);
    assert_eq!(etf.source, "https://www.coindesk.com/arc/outboundfeeds/rss/");

    assert_eq!(out[1].published_at, Utc.with_ymd_and_hms(2025, 3, 14, 8, 5, 0).unwrap());

    let undated = &out[2];
    assert!(undated.published_estimated);
    assert_eq!(undated.published_at, now);
}

#[test]
fn atom_fixture_parses() {
    let out = parse_feed(&fixture("atom_feed.xml")).unwrap();
    assert_eq!(out.len(), 2);
    assert_eq!(
        out[0].link.as_deref(),
        Some("https://decrypt.co/300001/stablecoin-bill-clears-senate-committee")
    );
    assert_eq!(out[0].published.as_deref(), Some("2025-03-14T09:10:00Z"));
    assert_eq!(out[1].link.as_deref(), Some("https://decrypt.co/300002/layer-2-activity-record"));
    assert_eq!(out[1].published.as_deref(), Some("2025-03-14T07:00:00+00:00"));
    assert!(out[1].description.as_deref().unwrap().contains("Rollups"));
}

#[tokio::test]
async fn fixture_provider_reports_its_id() {
    let p = RssFeedProvider::from_fixture("fixture:atom", &fixture("atom_feed.xml"));
    assert_eq!(p.source_id(), "fixture:atom");
    assert_eq!(p.fetch_entries().await.unwrap().len(), 2);
}
