pub mod discord;
pub mod format;
pub mod stdout;

use anyhow::Result;

pub use discord::DiscordWebhook;
pub use stdout::DryRunNotifier;

/// Hard per-message limit of the webhook destination.
pub const DISCORD_MAX_CHARS: usize = 2000;
/// Digest bodies are cut a little below the hard limit.
pub const DIGEST_CHUNK_CHARS: usize = 1900;

/// Delivery sink. One call delivers one batch, chunk by chunk, in order.
/// An `Err` means the batch must be treated as not delivered.
#[async_trait::async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, chunks: &[String]) -> Result<()>;
    fn name(&self) -> &'static str;
}

/// Split `text` into pieces of at most `max_chars` characters.
///
/// Prefers to cut at a newline in the second half of the window; otherwise cuts hard.
/// The newline at a cut is dropped and whitespace-only pieces are skipped.
pub fn split_into_chunks(text: &str, max_chars: usize) -> Vec<String> {
    let max = max_chars.max(1);
    let mut out = Vec::new();
    let mut push = |s: &str| {
        if !s.trim().is_empty() {
            out.push(s.to_string());
        }
    };

    let mut rest = text;
    while !rest.is_empty() {
        let Some((cut, _)) = rest.char_indices().nth(max) else {
            push(rest);
            break;
        };
        let window = &rest[..cut];
        let half = window.char_indices().nth(max / 2).map_or(0, |(b, _)| b);
        match window.rfind('\n').filter(|&nl| nl >= half) {
            Some(nl) => {
                push(&window[..nl]);
                rest = &rest[nl + 1..];
            }
            None => {
                push(window);
                rest = &rest[cut..];
            }
        }
    }
    out
}
