use std::time::Duration;

use async_trait::async_trait;
use intentor_core::{IntentorError, IntentorResult};
use reqwest::Client;
use serde_json::{json, Value};

use crate::{
    apply_defaults, chat_completion_content, error_from_body, error_from_reqwest, ApiKey,
    CompletionRequest, CompletionResponse, LlmConfig, LlmProvider,
};

pub struct DeepSeekProvider {
    config: LlmConfig,
    client: Client,
    api_key: ApiKey,
}

impl DeepSeekProvider {
    pub fn new(config: LlmConfig, api_key: ApiKey) -> IntentorResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_s))
            .build()
            .map_err(|err| IntentorError::Config(format!("failed to build client: {err}")))?;

        Ok(Self {
            config,
            client,
            api_key,
        })
    }

    fn endpoint(&self) -> String {
        self.config
            .base_url
            .as_ref()
            .map(|base| format!("{}/chat/completions", base.trim_end_matches('/')))
            .unwrap_or_else(|| "https://api.deepseek.com/chat/completions".to_string())
    }
}

#[async_trait]
impl LlmProvider for DeepSeekProvider {
    async fn complete(&self, request: CompletionRequest) -> IntentorResult<CompletionResponse> {
        let request = apply_defaults(&self.config, request);
        let mut payload = json!({
            "model": self.config.model,
            "messages": request.messages,
            "response_format": {"type": "json_object"},
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
            .post(self.endpoint())
            .bearer_auth(self.api_key.expose())
            .json(&payload)
            .send()
            .await
            .map_err(error_from_reqwest)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(error_from_body(status.as_u16(), &body));
        }

        let json: Value = response
            .json()
            .await
            .map_err(|err| IntentorError::Provider(format!("Failed to parse DeepSeek response: {err}")))?;

        chat_completion_content(&json)
    }

    fn name(&self) -> &str {
        "deepseek"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ProviderKind;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn requests_json_mode_and_reads_first_choice() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(body_partial_json(json!({
                "model": "deepseek-chat",
                "response_format": {"type": "json_object"},
                "temperature": 0.0
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{"message": {"content": "{}"}}]
            })))
            .mount(&server)
            .await;

        let config = LlmConfig {
            provider: ProviderKind::DeepSeek,
            model: "deepseek-chat".to_string(),
            base_url: Some(server.uri()),
            temperature: Some(0.0),
            ..LlmConfig::default()
        };
        let provider = DeepSeekProvider::new(config, ApiKey::new("ds-key").unwrap()).unwrap();

        let response = provider.complete(CompletionRequest::prompt("hi")).await.unwrap();
        assert_eq!(response.content, "{}");
        assert_eq!(response.usage.total_tokens, 0);
    }

    #[tokio::test]
    async fn missing_content_is_a_provider_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"choices": []})))
            .mount(&server)
            .await;

        let config = LlmConfig {
            provider: ProviderKind::DeepSeek,
            base_url: Some(server.uri()),
            ..LlmConfig::default()
        };
        let provider = DeepSeekProvider::new(config, ApiKey::new("ds-key").unwrap()).unwrap();

        let err = provider.complete(CompletionRequest::prompt("hi")).await.unwrap_err();
        assert!(matches!(err, IntentorError::Provider(_)));
    }
}
