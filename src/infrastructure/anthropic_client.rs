// Anthropic Messages API client
use crate::application::completion_service::{
    Completion, CompletionRequest, CompletionService, ContentBlock,
};
use crate::infrastructure::config::AnthropicSettings;
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone)]
pub struct AnthropicClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
    api_version: String,
}

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    system: &'a str,
    messages: Vec<WireMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct WireMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<WireContentBlock>,
}

#[derive(Debug, Deserialize)]
struct WireContentBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: Option<String>,
}

impl AnthropicClient {
    pub fn new(settings: &AnthropicSettings) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            api_key: settings.api_key.clone(),
            model: settings.model.clone(),
            api_version: settings.api_version.clone(),
        }
    }

    fn messages_url(&self) -> String {
        format!("{}/v1/messages", self.base_url)
    }

    fn build_body<'a>(&'a self, request: &'a CompletionRequest) -> MessagesRequest<'a> {
        MessagesRequest {
            model: &self.model,
            max_tokens: request.max_tokens,
            system: &request.system,
            messages: request
                .messages
                .iter()
                .map(|m| WireMessage {
                    role: m.role.as_str(),
                    content: &m.content,
                })
                .collect(),
        }
    }
}

impl From<MessagesResponse> for Completion {
    fn from(response: MessagesResponse) -> Self {
        let content = response
            .content
            .into_iter()
            .map(|block| match (block.kind.as_str(), block.text) {
                ("text", Some(text)) => ContentBlock::Text(text),
                _ => ContentBlock::Other(block.kind),
            })
            .collect();
        Completion { content }
    }
}

#[async_trait]
impl CompletionService for AnthropicClient {
    async fn complete(&self, request: CompletionRequest) -> Result<Completion> {
        let body = self.build_body(&request);

        tracing::debug!(
            "Sending completion request: {} messages, system prompt {} chars",
            body.messages.len(),
            body.system.len()
        );

        let response = self
            .client
            .post(self.messages_url())
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", &self.api_version)
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await
            .context("Failed to send request to Anthropic")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Anthropic request failed with status {}: {}", status, body);
        }

        let data = response
            .json::<MessagesResponse>()
            .await
            .context("Failed to parse Anthropic response")?;

        Ok(data.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::conversation::Message;
    use serde_json::json;

    fn client() -> AnthropicClient {
        AnthropicClient::new(&AnthropicSettings {
            base_url: "https://api.example.test/".to_string(),
            api_key: "key".to_string(),
            model: "test-model".to_string(),
            api_version: "2023-06-01".to_string(),
        })
    }

    #[test]
    fn test_request_body_shape() {
        let client = client();
        let request = CompletionRequest {
            system: "be brief".to_string(),
            messages: vec![Message::user("hi"), Message::assistant("hello")],
            max_tokens: 64,
        };

        let body = serde_json::to_value(client.build_body(&request)).unwrap();

        assert_eq!(
            body,
            json!({
                "model": "test-model",
                "max_tokens": 64,
                "system": "be brief",
                "messages": [
                    {"role": "user", "content": "hi"},
                    {"role": "assistant", "content": "hello"}
                ]
            })
        );
        assert_eq!(client.messages_url(), "https://api.example.test/v1/messages");
    }

    #[test]
    fn test_response_mapping() {
        let response: MessagesResponse = serde_json::from_value(json!({
            "id": "msg_1",
            "role": "assistant",
            "content": [
                {"type": "text", "text": "SELECT 1"},
                {"type": "tool_use", "id": "t", "name": "x", "input": {}}
            ],
            "stop_reason": "end_turn"
        }))
        .unwrap();

        let completion = Completion::from(response);

        assert_eq!(completion.first_text(), Some("SELECT 1"));
        assert_eq!(completion.content[1], ContentBlock::Other("tool_use".to_string()));
    }
}
