// SPDX-FileCopyrightText: 2026 Emblem Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! OpenAI chat-completion client used by the analysis and scenario stages.

use async_trait::async_trait;
use emblem_config::EmblemConfig;
use emblem_core::{AdapterType, ChatCompletion, ChatMessage, EmblemError, PluginAdapter};
use reqwest::header::HeaderMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::http::{build_client, header_value, post_json};
use crate::resolve_api_key;

const PROVIDER: &str = "openai";

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    max_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    refusal: Option<String>,
}

/// Chat completions over the OpenAI REST API.
#[derive(Debug, Clone)]
pub struct OpenAiChat {
    client: reqwest::Client,
    base_url: String,
    model: String,
}

impl OpenAiChat {
    pub fn new(api_key: &str, base_url: &str, model: &str) -> Result<Self, EmblemError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            "authorization",
            header_value("authorization", &format!("Bearer {api_key}"))?,
        );
        Ok(Self {
            client: build_client(headers)?,
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
        })
    }

    /// Builds the client from `[openai]`, falling back to `OPENAI_API_KEY`.
    pub fn from_config(config: &EmblemConfig) -> Result<Self, EmblemError> {
        let api_key = resolve_api_key(&config.openai.api_key, "OPENAI_API_KEY", "openai.api_key")?;
        Self::new(&api_key, &config.openai.base_url, &config.openai.chat_model)
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

impl PluginAdapter for OpenAiChat {
    fn name(&self) -> &str {
        "openai-chat"
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Chat
    }
}

#[async_trait]
impl ChatCompletion for OpenAiChat {
    async fn complete(&self, messages: &[ChatMessage], max_tokens: u32) -> Result<String, EmblemError> {
        let request = ChatRequest {
            model: &self.model,
            messages,
            max_tokens,
        };
        let url = format!("{}/chat/completions", self.base_url);
        let response: ChatResponse = post_json(&self.client, PROVIDER, &url, &request).await?;

        let Some(choice) = response.choices.into_iter().next() else {
            return Err(refusal("response contained no choices"));
        };
        if let Some(reason) = choice.message.refusal {
            return Err(refusal(&reason));
        }
        if choice.finish_reason.as_deref() == Some("content_filter") {
            return Err(refusal("content filtered"));
        }

        let content = choice.message.content.unwrap_or_default();
        let content = content.trim();
        if content.is_empty() {
            return Err(refusal("empty content"));
        }

        debug!(model = %self.model, chars = content.len(), "chat completion received");
        Ok(content.to_string())
    }
}

fn refusal(reason: &str) -> EmblemError {
    EmblemError::ProviderRefusal {
        provider: PROVIDER.to_string(),
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn client(server: &MockServer) -> OpenAiChat {
        OpenAiChat::new("sk-test", &server.uri(), "gpt-4o").unwrap()
    }

    fn messages() -> Vec<ChatMessage> {
        vec![
            ChatMessage::system("Describe usernames."),
            ChatMessage::user("The username is nightowl."),
        ]
    }

    fn completion(content: serde_json::Value, finish_reason: &str) -> serde_json::Value {
        serde_json::json!({
            "id": "chatcmpl-1",
            "choices": [{
                "index": 0,
                "message": {"role": "assistant", "content": content},
                "finish_reason": finish_reason
            }]
        })
    }

    #[tokio::test]
    async fn returns_trimmed_content() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(header("authorization", "Bearer sk-test"))
            .and(body_partial_json(serde_json::json!({
                "model": "gpt-4o",
                "max_tokens": 300
            })))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(completion("  An owl at midnight.\n".into(), "stop")),
            )
            .expect(1)
            .mount(&server)
            .await;

        let text = client(&server).complete(&messages(), 300).await.unwrap();
        assert_eq!(text, "An owl at midnight.");
    }

    #[tokio::test]
    async fn empty_content_is_a_refusal() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion("   ".into(), "stop")))
            .mount(&server)
            .await;

        let err = client(&server).complete(&messages(), 100).await.unwrap_err();
        assert!(matches!(err, EmblemError::ProviderRefusal { .. }), "got: {err:?}");
    }

    #[tokio::test]
    async fn null_content_with_content_filter_is_a_refusal() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(completion(serde_json::Value::Null, "content_filter")),
            )
            .mount(&server)
            .await;

        let err = client(&server).complete(&messages(), 100).await.unwrap_err();
        match err {
            EmblemError::ProviderRefusal { reason, .. } => assert_eq!(reason, "content filtered"),
            other => panic!("expected refusal, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn http_error_carries_api_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429).set_body_json(serde_json::json!({
                "error": {"message": "Rate limit reached", "type": "requests"}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let err = client(&server).complete(&messages(), 100).await.unwrap_err();
        let text = err.to_string();
        assert!(matches!(err, EmblemError::Provider { .. }));
        assert!(text.contains("Rate limit reached"), "got: {text}");
    }
}
