//! Keyword-based importance gate with a per-source threshold.
//!
//! Specialist outlets (whose whole output is on-topic) need a single keyword hit;
//! everything else needs two, so an incidental mention does not pass on its own.

use crate::ingest::types::NewsEntry;

pub const SPECIALIST_THRESHOLD: usize = 1;
pub const GENERALIST_THRESHOLD: usize = 2;

#[derive(Debug, Clone)]
pub struct ImportanceClassifier {
    keywords: Vec<String>,   // lowercased
    specialists: Vec<String>, // lowercased markers matched against the source id
}

impl ImportanceClassifier {
    pub fn new<K, S>(keywords: K, specialists: S) -> Self
    where
        K: IntoIterator,
        K::Item: AsRef<str>,
        S: IntoIterator,
        S::Item: AsRef<str>,
    {
        fn clean<I>(items: I) -> Vec<String>
        where
            I: IntoIterator,
            I::Item: AsRef<str>,
        {
            let mut out: Vec<String> = items
                .into_iter()
                .map(|s| s.as_ref().trim().to_lowercase())
                .filter(|s| !s.is_empty())
                .collect();
            out.sort();
            out.dedup();
            out
        }
        Self {
            keywords: clean(keywords),
            specialists: clean(specialists),
        }
    }

    /// Number of distinct keywords occurring as case-insensitive substrings of `text`.
    pub fn count_keywords(&self, text: &str) -> usize {
        if text.is_empty() {
            return 0;
        }
        let hay = text.to_lowercase();
        self.keywords.iter().filter(|k| hay.contains(k.as_str())).count()
    }

    /// A source is a specialist when any configured marker occurs in its id (usually the feed URL).
    pub fn is_specialist(&self, source: &str) -> bool {
        let s = source.to_lowercase();
        self.specialists.iter().any(|m| s.contains(m.as_str()))
    }

    pub fn threshold(&self, source: &str) -> usize {
        if self.is_specialist(source) {
            SPECIALIST_THRESHOLD
        } else {
            GENERALIST_THRESHOLD
        }
    }

    pub fn is_important_for_source(&self, text: &str, source: &str) -> bool {
        self.count_keywords(text) >= self.threshold(source)
    }

    /// Classification looks at the title only; summaries mention too many things in passing.
    pub fn is_important(&self, entry: &NewsEntry) -> bool {
        self.is_important_for_source(&entry.title, &entry.source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clf() -> ImportanceClassifier {
        ImportanceClassifier::new(["SEC", "ETF", "利上げ", "FOMC"], ["coindesk", "coinpost"])
    }

    #[test]
    fn counts_case_insensitive_distinct_keywords() {
        let c = clf();
        assert_eq!(c.count_keywords("sec approves etf"), 2);
        assert_eq!(c.count_keywords("ETF ETF ETF"), 1);
        assert_eq!(c.count_keywords("日銀が利上げを決定"), 1);
        assert_eq!(c.count_keywords(""), 0);
    }

    #[test]
    fn specialist_threshold_is_one() {
        let c = clf();
        let src = "https://www.coindesk.com/arc/outboundfeeds/rss/";
        assert!(c.is_specialist(src));
        assert!(c.is_important_for_source("SEC delays decision", src));
    }

    #[test]
    fn generalist_needs_two_hits() {
        let c = clf();
        let src = "https://www.cnbc.com/id/100003114/device/rss/rss.html";
        assert!(!c.is_important_for_source("SEC delays decision", src));
        assert!(c.is_important_for_source("SEC delays ETF decision", src));
    }

    #[test]
    fn empty_text_is_never_important() {
        let c = clf();
        assert!(!c.is_important_for_source("", "https://www.coindesk.com/"));
    }
}
