//! LLM adapter: client abstraction over an OpenAI-compatible chat-completions endpoint.
//! No retries; a failed call is `None` and the caller degrades.

use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::LlmConfig;

// ------------------------------------------------------------
// Public surface
// ------------------------------------------------------------

/// Raw model output. Some models put the answer only in `reasoning`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LlmResponse {
    pub content: String,
    pub reasoning: String,
}

impl LlmResponse {
    pub fn from_content(content: &str) -> Self {
        Self {
            content: content.to_string(),
            reasoning: String::new(),
        }
    }

    /// Whichever of the two fields carries text, `content` first.
    pub fn text(&self) -> &str {
        if !self.content.trim().is_empty() {
            &self.content
        } else {
            &self.reasoning
        }
    }
}

pub type LlmFuture<'a> = Pin<Box<dyn Future<Output = Option<LlmResponse>> + Send + 'a>>;

pub trait LlmClient: Send + Sync {
    fn complete<'a>(&'a self, system: &'a str, user: &'a str, max_tokens: u32) -> LlmFuture<'a>;
    /// Provider name for diagnostics.
    fn provider_name(&self) -> &'static str;
    fn is_enabled(&self) -> bool {
        true
    }
}

pub type DynLlmClient = Arc<dyn LlmClient>;

/// Real client when an API key is configured, otherwise the disabled client.
pub fn build_llm_client(cfg: &LlmConfig) -> anyhow::Result<DynLlmClient> {
    if !cfg.is_configured() {
        debug!(target: "llm", "no API key configured, enrichment disabled");
        return Ok(Arc::new(DisabledClient));
    }
    Ok(Arc::new(ChatCompletionsClient::new(cfg)?))
}

// ------------------------------------------------------------
// Chat completions
// ------------------------------------------------------------

pub struct ChatCompletionsClient {
    http: reqwest::Client,
    api_url: String,
    api_key: String,
    model: String,
    temperature: f32,
}

impl ChatCompletionsClient {
    pub fn new(cfg: &LlmConfig) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(crate::ingest::providers::rss::USER_AGENT)
            .timeout(cfg.timeout())
            .build()?;
        Ok(Self {
            http,
            api_url: cfg.api_url.clone(),
            api_key: cfg.api_key.clone(),
            model: cfg.model.clone(),
            temperature: cfg.temperature,
        })
    }

    async fn complete_impl(&self, system: &str, user: &str, max_tokens: u32) -> Option<LlmResponse> {
        #[derive(Serialize)]
        struct Msg<'a> {
            role: &'a str,
            content: &'a str,
        }
        #[derive(Serialize)]
        struct Req<'a> {
            model: &'a str,
            messages: Vec<Msg<'a>>,
            temperature: f32,
            max_tokens: u32,
        }
        #[derive(Deserialize)]
        struct Resp {
            #[serde(default)]
            choices: Vec<Choice>,
        }
        #[derive(Deserialize)]
        struct Choice {
            message: ChoiceMsg,
        }
        #[derive(Deserialize)]
        struct ChoiceMsg {
            #[serde(default)]
            content: Option<String>,
            #[serde(default)]
            reasoning_content: Option<String>,
        }

        let req = Req {
            model: &self.model,
            messages: vec![
                Msg {
                    role: "system",
                    content: system,
                },
                Msg {
                    role: "user",
                    content: user,
                },
            ],
            temperature: self.temperature,
            max_tokens,
        };

        let resp = match self
            .http
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .json(&req)
            .send()
            .await
        {
            Ok(r) => r,
            Err(e) => {
                warn!(target: "llm", error = %e, model = %self.model, "request failed");
                return None;
            }
        };

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            let head: String = body.chars().take(300).collect();
            warn!(target: "llm", %status, body = %head, "non-success response");
            return None;
        }

        let body: Resp = match resp.json().await {
            Ok(b) => b,
            Err(e) => {
                warn!(target: "llm", error = %e, "undecodable response body");
                return None;
            }
        };
        let Some(msg) = body.choices.into_iter().next().map(|c| c.message) else {
            warn!(target: "llm", "response had no choices");
            return None;
        };

        let out = LlmResponse {
            content: msg.content.unwrap_or_default(),
            reasoning: msg.reasoning_content.unwrap_or_default(),
        };
        debug!(
            target: "llm",
            content_len = out.content.len(),
            reasoning_len = out.reasoning.len(),
            "completion received"
        );
        if out.text().trim().is_empty() {
            None
        } else {
            Some(out)
        }
    }
}

impl LlmClient for ChatCompletionsClient {
    fn complete<'a>(&'a self, system: &'a str, user: &'a str, max_tokens: u32) -> LlmFuture<'a> {
        Box::pin(self.complete_impl(system, user, max_tokens))
    }
    fn provider_name(&self) -> &'static str {
        "chat-completions"
    }
}

// ------------------------------------------------------------
// Disabled + mock
// ------------------------------------------------------------

/// Returns `None` always; used when no key is configured.
pub struct DisabledClient;

impl LlmClient for DisabledClient {
    fn complete<'a>(&'a self, _system: &'a str, _user: &'a str, _max_tokens: u32) -> LlmFuture<'a> {
        Box::pin(async { None })
    }
    fn provider_name(&self) -> &'static str {
        "disabled"
    }
    fn is_enabled(&self) -> bool {
        false
    }
}

/// Canned responses for tests and local runs. Replies in order, then repeats the last one.
pub struct MockClient {
    replies: Vec<Option<LlmResponse>>,
    calls: AtomicUsize,
    prompts: Mutex<Vec<String>>,
}

impl MockClient {
    pub fn new(replies: Vec<Option<LlmResponse>>) -> Self {
        Self {
            replies,
            calls: AtomicUsize::new(0),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn fixed(content: &str) -> Self {
        Self::new(vec![Some(LlmResponse::from_content(content))])
    }

    pub fn failing() -> Self {
        Self::new(vec![None])
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// User prompts received so far.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().map(|p| p.clone()).unwrap_or_default()
    }
}

impl LlmClient for MockClient {
    fn complete<'a>(&'a self, _system: &'a str, user: &'a str, _max_tokens: u32) -> LlmFuture<'a> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut p) = self.prompts.lock() {
            p.push(user.to_string());
        }
        let reply = self
            .replies
            .get(n)
            .or_else(|| self.replies.last())
            .cloned()
            .flatten();
        Box::pin(async move { reply })
    }
    fn provider_name(&self) -> &'static str {
        "mock"
    }
}
