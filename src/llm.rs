//! OpenAI-compatible chat-completion client.
//!
//! Implements the pipeline's [`ChatModel`] seam against any server exposing
//! `POST /v1/chat/completions` (OpenAI, Ollama, LM Studio, vLLM, llama.cpp).
//! Requests are non-streaming; the reply is the first choice's content.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use vera_web::{ChatMessage, ChatModel, GenerationOptions, WebError};

use crate::config::LlmConfig;
use crate::error::{Result, VeraError};

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ReplyMessage,
}

#[derive(Debug, Deserialize)]
struct ReplyMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Chat-completion client for one configured endpoint and model.
#[derive(Clone)]
pub struct OpenAiChat {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl std::fmt::Debug for OpenAiChat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiChat")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .finish_non_exhaustive()
    }
}

impl OpenAiChat {
    /// Build a client from the `[llm]` config section.
    ///
    /// # Errors
    ///
    /// Returns [`VeraError::Llm`] if the HTTP client cannot be constructed.
    pub fn new(config: &LlmConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs.max(1)))
            .build()
            .map_err(|e| VeraError::Llm(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            base_url: config.api_url.trim_end_matches('/').to_owned(),
            api_key: config.api_key.clone(),
            model: config.api_model.clone(),
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/v1/chat/completions", self.base_url)
    }
}

/// Build the JSON request body for the Chat Completions API.
pub fn build_completions_request(
    model: &str,
    messages: &[ChatMessage],
    options: &GenerationOptions,
) -> serde_json::Value {
    let mut body = serde_json::json!({
        "model": model,
        "messages": messages,
        "stream": false,
    });

    if let Some(obj) = body.as_object_mut() {
        if let Some(max_tokens) = options.max_tokens {
            obj.insert("max_tokens".into(), serde_json::json!(max_tokens));
        }
        if let Some(temp) = options.temperature {
            obj.insert("temperature".into(), serde_json::json!(temp));
        }
        if let Some(top_p) = options.top_p {
            obj.insert("top_p".into(), serde_json::json!(top_p));
        }
    }

    body
}

/// Extract an error message from an OpenAI error response body.
fn extract_error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| {
            v.get("error")
                .and_then(|e| e.get("message"))
                .and_then(|m| m.as_str())
                .map(String::from)
        })
        .unwrap_or_else(|| body.to_string())
}

#[async_trait]
impl ChatModel for OpenAiChat {
    async fn complete(
        &self,
        messages: &[ChatMessage],
        options: &GenerationOptions,
    ) -> std::result::Result<String, WebError> {
        let body = build_completions_request(&self.model, messages, options);

        let mut request = self.client.post(self.endpoint()).json(&body);
        if !self.api_key.is_empty() {
            request = request.bearer_auth(&self.api_key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| WebError::Llm(format!("request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body_text = response.text().await.unwrap_or_default();
            return Err(WebError::Llm(format!(
                "HTTP {}: {}",
                status.as_u16(),
                extract_error_message(&body_text)
            )));
        }

        let parsed: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| WebError::Llm(format!("invalid response: {e}")))?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| WebError::Llm("response has no message content".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_includes_only_set_options() {
        let messages = [ChatMessage::system("sys"), ChatMessage::user("hi")];
        let body = build_completions_request(
            "m",
            &messages,
            &GenerationOptions {
                max_tokens: Some(64),
                temperature: None,
                top_p: Some(0.9),
            },
        );
        assert_eq!(body["model"], "m");
        assert_eq!(body["stream"], false);
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][1]["content"], "hi");
        assert_eq!(body["max_tokens"], 64);
        assert_eq!(body["top_p"], 0.9);
        assert!(body.get("temperature").is_none());
    }

    #[test]
    fn error_message_prefers_json_message() {
        assert_eq!(
            extract_error_message(r#"{"error":{"message":"bad key"}}"#),
            "bad key"
        );
        assert_eq!(extract_error_message("plain text"), "plain text");
    }

    #[test]
    fn trailing_slash_trimmed_from_base_url() {
        let chat = OpenAiChat::new(&LlmConfig {
            api_url: "http://localhost:8080/".into(),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(chat.endpoint(), "http://localhost:8080/v1/chat/completions");
    }
}
