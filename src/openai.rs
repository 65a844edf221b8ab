//! OpenAI-compatible chat-completion client used as the translation backend.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::Config;
use crate::retry::{with_retry_if, RetryConfig};

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<Message>,
    max_completion_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Serialize, Deserialize)]
struct Message {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Message,
}

/// Failure of one completion call, after retries.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("failed to reach completion API: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("completion API error ({status}): {body}")]
    Api { status: u16, body: String },

    #[error("completion response contained no choices")]
    EmptyResponse,
}

impl ServiceError {
    /// Rate limits and server errors are transient; other client errors are
    /// not worth retrying.
    fn is_retryable(&self) -> bool {
        match self {
            Self::Api { status, .. } => *status == 429 || *status >= 500,
            Self::Transport(_) => true,
            Self::EmptyResponse => false,
        }
    }
}

/// Thin client over one chat-completion endpoint. The underlying
/// `reqwest::Client` is built once and reused across batches.
pub struct CompletionClient {
    client: reqwest::Client,
    api_url: String,
    api_key: String,
    model: String,
    max_completion_tokens: u32,
    retry: RetryConfig,
}

impl CompletionClient {
    pub fn new(config: &Config) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_url: config.openai_api_url.clone(),
            api_key: config.openai_api_key.clone(),
            model: config.openai_model.clone(),
            max_completion_tokens: config.max_completion_tokens,
            retry: RetryConfig::api_call(),
        }
    }

    /// Override the retry schedule (shorter delays in tests).
    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// Send one prompt and return the raw completion text.
    pub async fn complete(&self, prompt: &str, temperature: f32) -> Result<String, ServiceError> {
        let request = ChatRequest {
            model: self.model.clone(),
            messages: vec![Message {
                role: "user".to_string(),
                content: prompt.to_string(),
            }],
            max_completion_tokens: self.max_completion_tokens,
            temperature,
        };

        with_retry_if(
            &self.retry,
            "Completion request",
            || async {
                let response = self
                    .client
                    .post(&self.api_url)
                    .header("Authorization", format!("Bearer {}", self.api_key))
                    .header("Content-Type", "application/json")
                    .json(&request)
                    .send()
                    .await?;

                if !response.status().is_success() {
                    let status = response.status().as_u16();
                    let body = response
                        .text()
                        .await
                        .unwrap_or_else(|e| format!("<failed to read body: {e}>"));
                    return Err(ServiceError::Api { status, body });
                }

                let chat_response: ChatResponse = response.json().await?;
                chat_response
                    .choices
                    .into_iter()
                    .next()
                    .map(|c| c.message.content)
                    .ok_or(ServiceError::EmptyResponse)
            },
            ServiceError::is_retryable,
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_client(api_url: &str) -> CompletionClient {
        let config = Config {
            openai_api_key: "test-openai-key".to_string(),
            openai_model: "gpt-4o-mini".to_string(),
            openai_api_url: api_url.to_string(),
            max_completion_tokens: 4096,
            project_dir: Path::new("/tmp").to_path_buf(),
            default_locale: "en".to_string(),
            batch_size: 30,
            batch_delay_ms: 0,
            temperature: 0.2,
            creative_temperature: 0.8,
        };
        // Keep retries fast in tests
        CompletionClient::new(&config)
            .with_retry(RetryConfig::new(3, std::time::Duration::from_millis(10)))
    }

    fn completion_response(content: &str) -> serde_json::Value {
        serde_json::json!({
            "id": "chatcmpl-123",
            "object": "chat.completion",
            "choices": [
                {
                    "index": 0,
                    "message": {
                        "role": "assistant",
                        "content": content
                    },
                    "finish_reason": "stop"
                }
            ]
        })
    }

    #[test]
    fn test_chat_request_serialization() {
        let request = ChatRequest {
            model: "gpt-4o-mini".to_string(),
            messages: vec![Message {
                role: "user".to_string(),
                content: "Translate this".to_string(),
            }],
            max_completion_tokens: 4096,
            temperature: 0.2,
        };

        let json = serde_json::to_string(&request).expect("Should serialize");
        assert!(json.contains("gpt-4o-mini"));
        assert!(json.contains("user"));
        assert!(json.contains("max_completion_tokens"));
        assert!(json.contains("0.2"));
    }

    #[test]
    fn test_chat_response_deserialization() {
        let json = r#"{
            "choices": [
                {
                    "message": {
                        "role": "assistant",
                        "content": "Bonjour"
                    }
                }
            ]
        }"#;

        let response: ChatResponse = serde_json::from_str(json).expect("Should deserialize");
        assert_eq!(response.choices.len(), 1);
        assert_eq!(response.choices[0].message.content, "Bonjour");
    }

    #[test]
    fn test_retryable_statuses() {
        assert!(ServiceError::Api { status: 429, body: String::new() }.is_retryable());
        assert!(ServiceError::Api { status: 500, body: String::new() }.is_retryable());
        assert!(ServiceError::Api { status: 503, body: String::new() }.is_retryable());
        assert!(!ServiceError::Api { status: 400, body: String::new() }.is_retryable());
        assert!(!ServiceError::Api { status: 401, body: String::new() }.is_retryable());
        assert!(!ServiceError::Api { status: 403, body: String::new() }.is_retryable());
        assert!(!ServiceError::EmptyResponse.is_retryable());
    }

    #[tokio::test]
    async fn test_complete_success() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(header("Authorization", "Bearer test-openai-key"))
            .and(header("Content-Type", "application/json"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(completion_response("Bonjour\nMerci")),
            )
            .mount(&mock_server)
            .await;

        let client = test_client(&format!("{}/v1/chat/completions", mock_server.uri()));
        let result = client.complete("prompt", 0.2).await.expect("Should succeed");
        assert_eq!(result, "Bonjour\nMerci");
    }

    #[tokio::test]
    async fn test_complete_retries_on_500_then_succeeds() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(500).set_body_string("Internal Server Error"))
            .up_to_n_times(2)
            .mount(&mock_server)
            .await;

        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion_response("Enfin")))
            .mount(&mock_server)
            .await;

        let client = test_client(&format!("{}/v1/chat/completions", mock_server.uri()));
        let result = client.complete("prompt", 0.2).await;
        assert!(result.is_ok(), "Should succeed after retries: {result:?}");
        assert_eq!(result.unwrap(), "Enfin");
    }

    #[tokio::test]
    async fn test_complete_no_retry_on_400() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(400).set_body_string("Bad request"))
            .expect(1) // No retries for client errors
            .mount(&mock_server)
            .await;

        let client = test_client(&format!("{}/v1/chat/completions", mock_server.uri()));
        let err = client.complete("prompt", 0.2).await.unwrap_err();
        assert!(matches!(err, ServiceError::Api { status: 400, .. }));
    }

    #[tokio::test]
    async fn test_complete_exhausts_retries_on_persistent_500() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(500).set_body_string("Persistent failure"))
            .expect(3) // api_call preset has 3 attempts
            .mount(&mock_server)
            .await;

        let client = test_client(&format!("{}/v1/chat/completions", mock_server.uri()));
        let err = client.complete("prompt", 0.2).await.unwrap_err();
        assert!(matches!(err, ServiceError::Api { status: 500, .. }));
    }

    #[tokio::test]
    async fn test_complete_empty_choices() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"choices": []})),
            )
            .mount(&mock_server)
            .await;

        let client = test_client(&format!("{}/v1/chat/completions", mock_server.uri()));
        let err = client.complete("prompt", 0.2).await.unwrap_err();
        assert!(matches!(err, ServiceError::EmptyResponse));
    }
}
