// crates/llm_connector/src/openrouter.rs

use std::time::Duration;

use async_trait::async_trait;
use intentor_core::{IntentorError, IntentorResult};
use reqwest::Client;
use serde_json::{json, Value};

use crate::{
    apply_defaults, chat_completion_content, error_from_body, error_from_reqwest, ApiKey,
    CompletionRequest, CompletionResponse, LlmConfig, LlmProvider,
};

pub struct OpenRouterProvider {
    config: LlmConfig,
    client: Client,
    api_key: ApiKey,
}

impl OpenRouterProvider {
    pub fn new(config: LlmConfig, api_key: ApiKey) -> IntentorResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_s))
            .build()
            .map_err(|e| IntentorError::Config(e.to_string()))?;

        Ok(Self {
            config,
            client,
            api_key,
        })
    }
}

#[async_trait]
impl LlmProvider for OpenRouterProvider {
    async fn complete(&self, request: CompletionRequest) -> IntentorResult<CompletionResponse> {
        let url = self
            .config
            .base_url
            .as_ref()
            .map(|u| format!("{}/chat/completions", u.trim_end_matches('/')))
            .unwrap_or_else(|| "https://openrouter.ai/api/v1/chat/completions".to_string());

        let request = apply_defaults(&self.config, request);
        let mut payload = json!({
            "model": self.config.model,
            "messages": request.messages,
        });
        if let Some(max_tokens) = request.max_tokens {
            payload["max_tokens"] = json!(max_tokens);
        }
        if let Some(temperature) = request.temperature {
            payload["temperature"] = json!(temperature);
        }
        if let Some(top_p) = request.top_p {
            payload["top_p"] = json!(top_p);
        }

        let response = self
            .client
            .post(&url)
            .bearer_auth(self.api_key.expose())
            .header("X-Title", "intentor")
            .json(&payload)
            .send()
            .await
            .map_err(error_from_reqwest)?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(error_from_body(status.as_u16(), &text));
        }

        let json: Value = response
            .json()
            .await
            .map_err(|e| IntentorError::Provider(format!("Failed to parse response: {}", e)))?;

        chat_completion_content(&json)
    }

    fn name(&self) -> &str {
        "openrouter"
    }
}
