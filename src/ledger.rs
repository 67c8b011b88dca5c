//! ledger.rs: persisted record of links already delivered.
//!
//! Flat UTF-8 file, one link per line, oldest first. Line order is write order, so
//! truncating to the cap drops the links written longest ago.

use std::collections::HashSet;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::warn;

use crate::ingest::types::NewsEntry;

pub const DEFAULT_CAP: usize = 800;

#[derive(Debug, Clone)]
pub struct DeliveryLedger {
    path: PathBuf,
    cap: usize,
}

impl DeliveryLedger {
    pub fn new(path: impl Into<PathBuf>, cap: usize) -> Self {
        Self {
            path: path.into(),
            cap: cap.max(1),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn cap(&self) -> usize {
        self.cap
    }

    /// Links delivered so far. Missing or unreadable store reads as "nothing sent".
    pub fn load(&self) -> HashSet<String> {
        match read_lines(&self.path) {
            Ok(lines) => {
                let start = lines.len().saturating_sub(self.cap);
                lines.into_iter().skip(start).collect()
            }
            Err(e) => {
                warn!(target: "ledger", error = %e, path = %self.path.display(), "ledger unreadable, treating as empty");
                HashSet::new()
            }
        }
    }

    /// Merge `new_links` into what is on disk now, keep the newest `cap`, write back.
    /// Returns the number of links persisted.
    pub fn record<I, S>(&self, new_links: I) -> Result<usize>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        // Re-read rather than reuse the startup snapshot: another run may have written since.
        let existing = read_lines(&self.path).unwrap_or_else(|e| {
            warn!(target: "ledger", error = %e, "existing ledger unreadable, rewriting from scratch");
            Vec::new()
        });
        let merged = merge_bounded(existing, new_links.into_iter().map(Into::into), self.cap);
        write_lines(&self.path, &merged)
            .with_context(|| format!("writing ledger {}", self.path.display()))?;
        Ok(merged.len())
    }
}

/// Keep entries whose link is not in `sent`. Returns (kept, suppressed_count).
pub fn filter_unsent(entries: Vec<NewsEntry>, sent: &HashSet<String>) -> (Vec<NewsEntry>, usize) {
    let before = entries.len();
    let kept: Vec<NewsEntry> = entries
        .into_iter()
        .filter(|e| !sent.contains(&e.link))
        .collect();
    let suppressed = before - kept.len();
    (kept, suppressed)
}

/// Append `new` after `existing`; a link written again moves to its latest position.
/// Only the last `cap` links survive.
pub fn merge_bounded<I>(existing: Vec<String>, new: I, cap: usize) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    let combined: Vec<String> = existing
        .into_iter()
        .chain(new)
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect();

    let mut seen = HashSet::with_capacity(combined.len());
    let mut newest_first: Vec<String> = Vec::with_capacity(combined.len().min(cap));
    for link in combined.into_iter().rev() {
        if newest_first.len() >= cap {
            break;
        }
        if seen.insert(link.clone()) {
            newest_first.push(link);
        }
    }
    newest_first.reverse();
    newest_first
}

fn read_lines(path: &Path) -> io::Result<Vec<String>> {
    match fs::read_to_string(path) {
        Ok(s) => Ok(s
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(str::to_string)
            .collect()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Vec::new()),
        Err(e) => Err(e),
    }
}

/// Write via a temp file + rename so a crash never leaves a half-written ledger.
fn write_lines(path: &Path, lines: &[String]) -> io::Result<()> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir)?;
    }
    let tmp = path.with_extension("tmp");
    let mut body = lines.join("\n");
    if !body.is_empty() {
        body.push('\n');
    }
    let mut f = fs::File::create(&tmp)?;
    f.write_all(body.as_bytes())?;
    f.sync_all()?;
    fs::rename(tmp, path)?;
    Ok(())
}
