// src/config/ai.rs
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_API_URL: &str = "https://api.z.ai/api/paas/v4/chat/completions";
pub const DEFAULT_MODEL: &str = "glm-4-flash";

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}
fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}
fn default_call_delay_ms() -> u64 {
    2_000
}
fn default_timeout_secs() -> u64 {
    30
}
fn default_temperature() -> f32 {
    0.3
}

/// OpenAI-compatible chat-completions endpoint used for translation and digests.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Empty means enrichment is off.
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_api_url")]
    pub api_url: String,
    #[serde(default = "default_model")]
    pub model: String,
    /// Fixed wait between consecutive calls in one run (upstream rate limit).
    #[serde(default = "default_call_delay_ms")]
    pub call_delay_ms: u64,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            api_url: default_api_url(),
            model: default_model(),
            call_delay_ms: default_call_delay_ms(),
            timeout_secs: default_timeout_secs(),
            temperature: default_temperature(),
        }
    }
}

impl LlmConfig {
    pub fn is_configured(&self) -> bool {
        !self.api_key.trim().is_empty() && !self.api_url.trim().is_empty()
    }

    pub fn call_delay(&self) -> Duration {
        Duration::from_millis(self.call_delay_ms)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }

    /// Temperature outside 0..=2 falls back to the default.
    pub(crate) fn sanitize(&mut self) {
        if !(0.0..=2.0).contains(&self.temperature) {
            self.temperature = default_temperature();
        }
        if self.model.trim().is_empty() {
            self.model = default_model();
        }
    }
}
