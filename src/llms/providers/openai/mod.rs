//! OpenAI provider over `reqwest`.
//!
//! [`OpenAICompletion`] talks to the Chat Completions API. The HTTP plumbing
//! in [`OpenAIConnection`] is shared with the embeddings provider.
//!
//! Each call is a single attempt. Failures are classified into
//! [`BackendError`] so the caller can decide whether a retry is worthwhile:
//! 429 and 5xx are transient, other 4xx are not.

use async_trait::async_trait;
use serde_json::Value;

use crate::config::Settings;
use crate::error::{BackendError, MindGlowError, Result};
use crate::llms::base_llm::{GenerationRequest, TextGenerator};

/// Default OpenAI API base URL.
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Maximum number of response-body bytes kept in error messages.
const ERROR_BODY_LIMIT: usize = 500;

// ---------------------------------------------------------------------------
// Shared connection
// ---------------------------------------------------------------------------

/// Authenticated HTTP access to an OpenAI-compatible API.
#[derive(Debug, Clone)]
pub struct OpenAIConnection {
    api_key: Option<String>,
    base_url: String,
    client: reqwest::Client,
}

impl OpenAIConnection {
    pub fn new(api_key: Option<String>, base_url: Option<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("mindglow/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| MindGlowError::Config(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self {
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            base_url: base_url
                .map(|u| u.trim_end_matches('/').to_string())
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            client,
        })
    }

    pub fn from_settings(settings: &Settings) -> Result<Self> {
        Self::new(
            Some(settings.openai_api_key.clone()),
            Some(settings.openai_base_url.clone()),
        )
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// POST `body` to `path` and return the decoded JSON response.
    pub async fn post_json(&self, path: &str, body: &Value) -> std::result::Result<Value, BackendError> {
        let api_key = self.api_key.as_deref().ok_or_else(|| {
            BackendError::NotConfigured("OpenAI API key not set (OPENAI_API_KEY)".to_string())
        })?;
        let endpoint = format!("{}/{}", self.base_url, path.trim_start_matches('/'));

        let response = self
            .client
            .post(&endpoint)
            .header("Content-Type", "application/json")
            .header("Authorization", format!("Bearer {}", api_key))
            .json(body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(BackendError::Status {
                status: status.as_u16(),
                body: truncate_body(&text),
            });
        }

        serde_json::from_str(&text).map_err(|e| {
            BackendError::InvalidResponse(format!(
                "failed to parse response: {} - body: {}",
                e,
                truncate_body(&text)
            ))
        })
    }
}

fn truncate_body(text: &str) -> String {
    if text.len() <= ERROR_BODY_LIMIT {
        return text.to_string();
    }
    let mut end = ERROR_BODY_LIMIT;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &text[..end])
}

// ---------------------------------------------------------------------------
// OpenAICompletion provider
// ---------------------------------------------------------------------------

/// Chat Completions text generator.
#[derive(Debug, Clone)]
pub struct OpenAICompletion {
    model: String,
    connection: OpenAIConnection,
}

impl OpenAICompletion {
    pub fn new(model: impl Into<String>, connection: OpenAIConnection) -> Self {
        Self {
            model: model.into(),
            connection,
        }
    }

    pub fn from_settings(settings: &Settings) -> Result<Self> {
        Ok(Self::new(
            settings.openai_model.clone(),
            OpenAIConnection::from_settings(settings)?,
        ))
    }

    /// Build the request body for the Chat Completions API.
    pub fn build_request_body(&self, request: &GenerationRequest) -> Value {
        serde_json::json!({
            "model": self.model,
            "messages": request.messages,
            "temperature": request.temperature,
            "max_tokens": request.max_tokens,
        })
    }

    /// Extract the reply text from a Chat Completions response.
    pub fn parse_completion_response(
        &self,
        response: &Value,
    ) -> std::result::Result<String, BackendError> {
        let content = response
            .get("choices")
            .and_then(|c| c.get(0))
            .and_then(|choice| choice.get("message"))
            .and_then(|message| message.get("content"))
            .and_then(Value::as_str)
            .ok_or_else(|| {
                BackendError::InvalidResponse("no message content in OpenAI response".to_string())
            })?;

        if let Some(usage) = response.get("usage") {
            log::debug!(
                "OpenAI token usage: prompt={}, completion={}, total={}",
                usage.get("prompt_tokens").and_then(Value::as_i64).unwrap_or(0),
                usage.get("completion_tokens").and_then(Value::as_i64).unwrap_or(0),
                usage.get("total_tokens").and_then(Value::as_i64).unwrap_or(0),
            );
        }

        Ok(content.trim().to_string())
    }
}

#[async_trait]
impl TextGenerator for OpenAICompletion {
    async fn generate(&self, request: &GenerationRequest) -> std::result::Result<String, BackendError> {
        log::debug!(
            "OpenAICompletion.generate: model={}, messages={}",
            self.model,
            request.messages.len(),
        );
        let body = self.build_request_body(request);
        let response = self.connection.post_json("chat/completions", &body).await?;
        self.parse_completion_response(&response)
    }

    fn model(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider(api_key: Option<&str>) -> OpenAICompletion {
        let connection =
            OpenAIConnection::new(api_key.map(String::from), Some("http://localhost:9/v1/".into()))
                .unwrap();
        OpenAICompletion::new("gpt-4o", connection)
    }

    #[test]
    fn test_build_request_body() {
        let p = provider(Some("sk-test"));
        let body = p.build_request_body(&GenerationRequest::single_turn("be gentle", "hello", 0.7, 500));
        assert_eq!(body["model"], "gpt-4o");
        assert_eq!(body["temperature"], 0.7);
        assert_eq!(body["max_tokens"], 500);
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][1]["content"], "hello");
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let p = provider(Some("sk-test"));
        assert_eq!(p.connection.base_url(), "http://localhost:9/v1");
    }

    #[test]
    fn test_parse_completion_response() {
        let p = provider(Some("sk-test"));
        let response = serde_json::json!({
            "choices": [{"message": {"role": "assistant", "content": "  What feels present?\n"}}],
            "usage": {"prompt_tokens": 10, "completion_tokens": 4, "total_tokens": 14}
        });
        assert_eq!(p.parse_completion_response(&response).unwrap(), "What feels present?");

        let err = p.parse_completion_response(&serde_json::json!({"choices": []})).unwrap_err();
        assert!(matches!(err, BackendError::InvalidResponse(_)));
        assert!(!err.is_transient());
    }

    #[tokio::test]
    async fn test_missing_api_key_is_not_configured() {
        let p = provider(None);
        let err = p
            .generate(&GenerationRequest::single_turn("system", "hi", 0.7, 10))
            .await
            .unwrap_err();
        assert!(matches!(err, BackendError::NotConfigured(_)));
    }

    #[test]
    fn test_truncate_body_respects_char_boundaries() {
        let body = "é".repeat(400);
        let truncated = truncate_body(&body);
        assert!(truncated.ends_with("..."));
        assert!(truncated.len() <= ERROR_BODY_LIMIT + 3);
    }
}
