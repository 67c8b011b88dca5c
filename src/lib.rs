// src/lib.rs
// Public library surface for the binary and integration tests.

pub mod analyze;
pub mod config;
pub mod error;
pub mod ingest;
pub mod ledger;
pub mod metrics;
pub mod notify;
pub mod pipeline;

// ---- Re-exports for stable public API ----
pub use analyze::ai_adapter;
pub use config::AppConfig;
pub use error::RelayError;
pub use ingest::types::{FeedSource, NewsEntry, RawEntry};
pub use notify::Notifier;
pub use pipeline::{run_digest, run_flash, RunContext, RunReport};

/// Short stable fingerprint of a link for log lines (first 6 bytes of SHA-256, hex).
pub fn short_id(text: &str) -> String {
    use sha2::{Digest, Sha256};
    let digest = Sha256::digest(text.as_bytes());
    let mut out = String::with_capacity(12);
    for b in digest.iter().take(6) {
        use std::fmt::Write as _;
        let _ = write!(&mut out, "{:02x}", b);
    }
    out
}
