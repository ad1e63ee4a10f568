// crates/llm_connector/src/lib.rs

use async_trait::async_trait;
use intentor_core::{IntentorError, IntentorResult};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;
use tracing::{debug, warn};

pub mod deepseek;
pub mod gemini;
pub mod openrouter;
pub mod prompt_builder;

pub use prompt_builder::{build_prompt, PromptBuilder};

/// LLM configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    #[serde(default)]
    pub provider: ProviderKind,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
    /// TOML file holding the key under `API-KEY`, consulted when the
    /// environment variable is unset.
    #[serde(default)]
    pub secrets_file: Option<PathBuf>,
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default)]
    pub max_tokens: Option<usize>,
    #[serde(default)]
    pub temperature: Option<f32>,
    #[serde(default)]
    pub top_p: Option<f32>,
    #[serde(default = "default_timeout_s")]
    pub timeout_s: u64,
}

fn default_model() -> String {
    "gemini-pro".to_string()
}

fn default_api_key_env() -> String {
    "GEMINI_API_KEY".to_string()
}

const fn default_timeout_s() -> u64 {
    30
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: ProviderKind::default(),
            model: default_model(),
            api_key_env: default_api_key_env(),
            secrets_file: None,
            base_url: None,
            max_tokens: None,
            temperature: None,
            top_p: None,
            timeout_s: default_timeout_s(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    #[default]
    Gemini,
    OpenRouter,
    DeepSeek,
}

impl std::str::FromStr for ProviderKind {
    type Err = IntentorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "gemini" => Ok(ProviderKind::Gemini),
            "openrouter" => Ok(ProviderKind::OpenRouter),
            "deepseek" => Ok(ProviderKind::DeepSeek),
            other => Err(IntentorError::Config(format!("Unsupported LLM provider: {}", other))),
        }
    }
}

/// Credential for the completion service. Never printed.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    pub fn new(key: impl Into<String>) -> IntentorResult<Self> {
        let key = key.into().trim().to_string();
        if key.is_empty() {
            return Err(IntentorError::Config("API key cannot be empty".to_string()));
        }
        Ok(Self(key))
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(<redacted>)")
    }
}

/// LLM provider trait
#[async_trait]
pub trait LlmProvider: Send + Sync {
    async fn complete(&self, request: CompletionRequest) -> IntentorResult<CompletionResponse>;
    fn name(&self) -> &str;
}

/// Completion request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionRequest {
    pub messages: Vec<Message>,
    pub max_tokens: Option<usize>,
    pub temperature: Option<f32>,
    pub top_p: Option<f32>,
}

impl CompletionRequest {
    /// A request carrying a single user prompt.
    pub fn prompt(prompt: impl Into<String>) -> Self {
        Self {
            messages: vec![Message {
                role: Role::User,
                content: prompt.into(),
            }],
            max_tokens: None,
            temperature: None,
            top_p: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// Completion response
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CompletionResponse {
    pub content: String,
    pub usage: Usage,
}

impl CompletionResponse {
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            usage: Usage::default(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Usage {
    pub prompt_tokens: usize,
    pub completion_tokens: usize,
    pub total_tokens: usize,
}

/// Builds the provider selected by `config.provider`.
pub fn build_provider(config: &LlmConfig, api_key: ApiKey) -> IntentorResult<Arc<dyn LlmProvider>> {
    let provider: Arc<dyn LlmProvider> = match config.provider {
        ProviderKind::Gemini => Arc::new(gemini::GeminiProvider::new(config.clone(), api_key)?),
        ProviderKind::OpenRouter => {
            Arc::new(openrouter::OpenRouterProvider::new(config.clone(), api_key)?)
        }
        ProviderKind::DeepSeek => Arc::new(deepseek::DeepSeekProvider::new(config.clone(), api_key)?),
    };
    Ok(provider)
}

/// Fills request sampling parameters from config where the caller left them unset.
pub(crate) fn apply_defaults(config: &LlmConfig, mut request: CompletionRequest) -> CompletionRequest {
    request.max_tokens = request.max_tokens.or(config.max_tokens);
    request.temperature = request.temperature.or(config.temperature);
    request.top_p = request.top_p.or(config.top_p);
    request
}

/// Maps a non-2xx body to an error, preferring the JSON `error.message` field.
pub(crate) fn error_from_body(status: u16, body: &str) -> IntentorError {
    let message = serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|json| {
            json.pointer("/error/message")
                .and_then(Value::as_str)
                .map(str::to_string)
        })
        .unwrap_or_else(|| body.trim().to_string());
    IntentorError::from_status(status, message)
}

pub(crate) fn error_from_reqwest(err: reqwest::Error) -> IntentorError {
    if err.is_timeout() {
        IntentorError::Network(format!("request timed out: {}", err))
    } else if err.is_connect() {
        IntentorError::Network(format!("connection failed: {}", err))
    } else {
        IntentorError::Network(format!("request failed: {}", err))
    }
}

/// Extracts `choices[0].message.content` from an OpenAI-compatible body.
pub(crate) fn chat_completion_content(json: &Value) -> IntentorResult<CompletionResponse> {
    let content = json
        .pointer("/choices/0/message/content")
        .and_then(Value::as_str)
        .ok_or_else(|| IntentorError::Provider("Missing message content in completion".to_string()))?
        .to_string();

    let usage = Usage {
        prompt_tokens: json["usage"]["prompt_tokens"].as_u64().unwrap_or(0) as usize,
        completion_tokens: json["usage"]["completion_tokens"].as_u64().unwrap_or(0) as usize,
        total_tokens: json["usage"]["total_tokens"].as_u64().unwrap_or(0) as usize,
    };

    Ok(CompletionResponse { content, usage })
}

/// LLM connector
///
/// Front for a single provider. Limits the number of completions in flight;
/// failures are returned to the caller as-is.
pub struct LlmConnector {
    provider: Arc<dyn LlmProvider>,
    permits: Semaphore,
}

impl LlmConnector {
    pub fn new(provider: Arc<dyn LlmProvider>, max_concurrent_requests: usize) -> Self {
        Self {
            provider,
            permits: Semaphore::new(max_concurrent_requests.max(1)),
        }
    }

    pub async fn complete(&self, request: CompletionRequest) -> IntentorResult<CompletionResponse> {
        let _permit = self
            .permits
            .acquire()
            .await
            .map_err(|e| IntentorError::Provider(format!("connector closed: {}", e)))?;

        let start = Instant::now();
        let result = self.provider.complete(request).await;
        let elapsed: Duration = start.elapsed();

        match &result {
            Ok(response) => debug!(
                provider = self.provider.name(),
                elapsed_ms = elapsed.as_millis() as u64,
                total_tokens = response.usage.total_tokens,
                "LLM completion received"
            ),
            Err(e) => warn!(
                provider = self.provider.name(),
                elapsed_ms = elapsed.as_millis() as u64,
                "LLM completion failed: {}",
                e
            ),
        }

        result
    }
}
