use super::{Notifier, DISCORD_MAX_CHARS};
use anyhow::{anyhow, Context, Result};
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;

/// Incoming-webhook sender. Plain `content` messages, no bot token.
#[derive(Clone)]
pub struct DiscordWebhook {
    webhook: String,
    client: Client,
}

impl DiscordWebhook {
    pub fn new(webhook: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .user_agent(crate::ingest::providers::rss::USER_AGENT)
            .timeout(timeout)
            .build()
            .context("building webhook http client")?;
        Ok(Self {
            webhook: webhook.to_string(),
            client,
        })
    }

    async fn post(&self, content: &str) -> Result<()> {
        let payload = WebhookPayload::content(content);
        let rsp = self
            .client
            .post(&self.webhook)
            .json(&payload)
            .send()
            .await
            .map_err(|e| anyhow!("webhook request failed: {e}"))?;

        let status = rsp.status();
        if status.is_success() {
            return Ok(());
        }
        let body = rsp.text().await.unwrap_or_default();
        let head: String = body.chars().take(200).collect();
        Err(anyhow!("HTTP {}: {}", status.as_u16(), head))
    }
}

#[async_trait::async_trait]
impl Notifier for DiscordWebhook {
    async fn send(&self, chunks: &[String]) -> Result<()> {
        for (i, chunk) in chunks.iter().enumerate() {
            self.post(chunk)
                .await
                .with_context(|| format!("chunk {}/{}", i + 1, chunks.len()))?;
            tracing::debug!(target: "notify", chunk = i + 1, total = chunks.len(), "webhook accepted chunk");
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "discord"
    }
}

#[derive(Serialize)]
struct WebhookPayload {
    content: String,
}

impl WebhookPayload {
    /// Over-long content is cut at the destination limit.
    fn content(text: &str) -> Self {
        Self {
            content: text.chars().take(DISCORD_MAX_CHARS).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_is_capped_at_limit() {
        let p = WebhookPayload::content(&"a".repeat(DISCORD_MAX_CHARS + 50));
        assert_eq!(p.content.chars().count(), DISCORD_MAX_CHARS);
        let json = serde_json::to_value(WebhookPayload::content("hi")).unwrap();
        assert_eq!(json, serde_json::json!({ "content": "hi" }));
    }
}
