//! Metric names and one-time descriptions.
//! Series are emitted through the `metrics` facade; without an installed recorder they are no-ops.

use metrics::{describe_counter, describe_histogram};
use once_cell::sync::OnceCell;

pub const FETCHED_TOTAL: &str = "relay_fetched_total";
pub const PROVIDER_ERRORS_TOTAL: &str = "relay_provider_errors_total";
pub const DEDUP_TOTAL: &str = "relay_dedup_total";
pub const UNIMPORTANT_TOTAL: &str = "relay_unimportant_total";
pub const LEDGER_SUPPRESSED_TOTAL: &str = "relay_ledger_suppressed_total";
pub const ENRICH_FAILURES_TOTAL: &str = "relay_enrich_failures_total";
pub const DELIVERED_TOTAL: &str = "relay_delivered_total";
pub const FEED_PARSE_MS: &str = "relay_feed_parse_ms";

/// Register descriptions once so series show up with help text.
pub fn ensure_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!(FETCHED_TOTAL, "Entries normalized from all feed sources.");
        describe_counter!(PROVIDER_ERRORS_TOTAL, "Feed sources that failed to fetch or parse.");
        describe_counter!(DEDUP_TOTAL, "Entries dropped as near-duplicate titles.");
        describe_counter!(UNIMPORTANT_TOTAL, "Entries dropped by the importance classifier.");
        describe_counter!(LEDGER_SUPPRESSED_TOTAL, "Entries dropped because they were already delivered.");
        describe_counter!(ENRICH_FAILURES_TOTAL, "LLM enrichment calls that returned nothing usable.");
        describe_counter!(DELIVERED_TOTAL, "Entries handed to the notifier successfully.");
        describe_histogram!(FEED_PARSE_MS, "Feed fetch+parse time in milliseconds.");
    });
}
