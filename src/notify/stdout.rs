use super::Notifier;
use anyhow::Result;
use std::io::Write;

/// Prints chunks instead of posting them. Used by `--dry-run`.
#[derive(Debug, Default, Clone, Copy)]
pub struct DryRunNotifier;

#[async_trait::async_trait]
impl Notifier for DryRunNotifier {
    async fn send(&self, chunks: &[String]) -> Result<()> {
        let stdout = std::io::stdout();
        let mut out = stdout.lock();
        for (i, chunk) in chunks.iter().enumerate() {
            writeln!(out, "----- chunk {}/{} ({} chars) -----", i + 1, chunks.len(), chunk.chars().count())?;
            writeln!(out, "{chunk}")?;
        }
        out.flush()?;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "dry-run"
    }
}
