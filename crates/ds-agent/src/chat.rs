//! Chat-model clients for scope judgment, classification, and time parsing.
//!
//! Two providers are supported behind the [`ChatModel`] trait: a local
//! Ollama server (`/api/chat`) and an OpenAI-compatible endpoint
//! (`/v1/chat/completions`). The rest of the agent never cares which one
//! is configured.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

/// Sampling temperature for every request. Kept low so classification and
/// JSON extraction stay stable across runs.
const TEMPERATURE: f64 = 0.3;

/// A single message in a chat exchange.
#[derive(Debug, Clone, Serialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// Chat invocation failure.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ChatError {
    /// Request never produced a usable HTTP response.
    #[error("chat transport error: {0}")]
    Transport(String),
    /// The response arrived but its body was not what the provider documents.
    #[error("malformed chat response: {0}")]
    Malformed(String),
}

/// A conversational model that turns an ordered message list into one reply.
#[async_trait]
pub trait ChatModel: Send + Sync {
    async fn invoke(&self, messages: &[ChatMessage]) -> Result<String, ChatError>;

    /// Model identifier, for logging.
    fn model_name(&self) -> &str;
}

/// Which provider backs the chat model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LlmProvider {
    Ollama,
    OpenAi,
}

/// Chat-model settings, loadable from the `[llm]` TOML table.
#[derive(Debug, Clone, Deserialize)]
pub struct LlmConfig {
    #[serde(default = "default_provider")]
    pub provider: LlmProvider,
    /// Model to use for inference.
    #[serde(default = "default_model")]
    pub model: String,
    /// Ollama HTTP API base URL.
    #[serde(default = "default_host")]
    pub host: String,
    /// OpenAI-compatible API base URL.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// API key for the openai provider. Ignored by ollama.
    #[serde(default)]
    pub api_key: Option<String>,
    /// Request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_provider() -> LlmProvider {
    LlmProvider::Ollama
}
fn default_model() -> String {
    "llama3.2".into()
}
fn default_host() -> String {
    "http://localhost:11434".into()
}
fn default_base_url() -> String {
    "https://api.openai.com".into()
}
fn default_timeout_secs() -> u64 {
    30
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            model: default_model(),
            host: default_host(),
            base_url: default_base_url(),
            api_key: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Build the configured chat model.
pub fn build_chat_model(config: &LlmConfig) -> anyhow::Result<Arc<dyn ChatModel>> {
    match config.provider {
        LlmProvider::Ollama => Ok(Arc::new(OllamaChat::new(config.clone()))),
        LlmProvider::OpenAi => {
            let api_key = config
                .api_key
                .clone()
                .ok_or_else(|| anyhow::anyhow!("llm.api_key is required when provider = \"openai\""))?;
            Ok(Arc::new(OpenAiChat::new(config.clone(), api_key)))
        }
    }
}

/// Ollama chat API request body.
#[derive(Serialize)]
struct OllamaRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    stream: bool,
    options: OllamaOptions,
}

#[derive(Serialize)]
struct OllamaOptions {
    temperature: f64,
}

/// Ollama chat API response (only fields we need).
#[derive(Deserialize)]
struct OllamaResponse {
    message: Option<OllamaMessage>,
}

#[derive(Deserialize)]
struct OllamaMessage {
    content: String,
}

/// Client for a local Ollama endpoint.
pub struct OllamaChat {
    client: reqwest::Client,
    config: LlmConfig,
}

impl OllamaChat {
    pub fn new(config: LlmConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .expect("failed to build reqwest client");
        Self { client, config }
    }
}

#[async_trait]
impl ChatModel for OllamaChat {
    async fn invoke(&self, messages: &[ChatMessage]) -> Result<String, ChatError> {
        let url = format!("{}/api/chat", self.config.host.trim_end_matches('/'));
        let body = OllamaRequest {
            model: &self.config.model,
            messages,
            stream: false,
            options: OllamaOptions {
                temperature: TEMPERATURE,
            },
        };

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| ChatError::Transport(format!("ollama request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ChatError::Transport(format!("ollama returned {status}")));
        }

        let parsed: OllamaResponse = response
            .json()
            .await
            .map_err(|e| ChatError::Malformed(format!("ollama response body: {e}")))?;

        let content = parsed
            .message
            .map(|m| m.content)
            .ok_or_else(|| ChatError::Malformed("ollama response had no message".to_string()))?;
        Ok(content.trim().to_string())
    }

    fn model_name(&self) -> &str {
        &self.config.model
    }
}

/// OpenAI chat completions request body.
#[derive(Serialize)]
struct OpenAiRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: f64,
}

#[derive(Deserialize)]
struct OpenAiResponse {
    choices: Vec<OpenAiChoice>,
}

#[derive(Deserialize)]
struct OpenAiChoice {
    message: OpenAiChoiceMessage,
}

#[derive(Deserialize)]
struct OpenAiChoiceMessage {
    content: String,
}

/// Client for an OpenAI-compatible chat completions endpoint.
pub struct OpenAiChat {
    client: reqwest::Client,
    config: LlmConfig,
    api_key: String,
}

impl OpenAiChat {
    pub fn new(config: LlmConfig, api_key: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .expect("failed to build reqwest client");
        Self {
            client,
            config,
            api_key: api_key.into(),
        }
    }
}

#[async_trait]
impl ChatModel for OpenAiChat {
    async fn invoke(&self, messages: &[ChatMessage]) -> Result<String, ChatError> {
        let url = format!(
            "{}/v1/chat/completions",
            self.config.base_url.trim_end_matches('/')
        );
        let body = OpenAiRequest {
            model: &self.config.model,
            messages,
            temperature: TEMPERATURE,
        };

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| ChatError::Transport(format!("openai request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ChatError::Transport(format!("openai returned {status}")));
        }

        let parsed: OpenAiResponse = response
            .json()
            .await
            .map_err(|e| ChatError::Malformed(format!("openai response body: {e}")))?;

        let content = parsed
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| ChatError::Malformed("openai response had no choices".to_string()))?;
        Ok(content.trim().to_string())
    }

    fn model_name(&self) -> &str {
        &self.config.model
    }
}

/// Scripted chat model for tests. Replies pop in FIFO order; an exhausted
/// queue is a transport error.
pub struct MockChatModel {
    replies: Mutex<VecDeque<Result<String, ChatError>>>,
    prompts: Mutex<Vec<String>>,
}

impl MockChatModel {
    pub fn new() -> Self {
        Self {
            replies: Mutex::new(VecDeque::new()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Queue a successful reply.
    pub fn queue_reply(&self, reply: impl Into<String>) {
        self.replies
            .lock()
            .unwrap()
            .push_back(Ok(reply.into()));
    }

    /// Queue a failure.
    pub fn queue_error(&self, error: ChatError) {
        self.replies.lock().unwrap().push_back(Err(error));
    }

    /// Every prompt sent so far, message contents joined per invocation.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

impl Default for MockChatModel {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ChatModel for MockChatModel {
    async fn invoke(&self, messages: &[ChatMessage]) -> Result<String, ChatError> {
        let joined = messages
            .iter()
            .map(|m| m.content.as_str())
            .collect::<Vec<_>>()
            .join("\n");
        self.prompts.lock().unwrap().push(joined);
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(ChatError::Transport("no scripted reply".to_string())))
    }

    fn model_name(&self) -> &str {
        "mock"
    }
}

/// Slice the first `{` through the last `}` out of a model reply.
///
/// Tolerates assistant preambles and code fences around the JSON object.
pub fn json_slice(reply: &str) -> Option<&str> {
    let start = reply.find('{')?;
    let end = reply.rfind('}')?;
    if end < start {
        return None;
    }
    Some(&reply[start..=end])
}

/// Parse an ISO-8601 timestamp with or without a timezone suffix into UTC.
pub fn parse_iso_utc(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S")
        .ok()
        .map(|naive| naive.and_utc())
}
