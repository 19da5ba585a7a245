use futures::future::BoxFuture;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use weft_core::config::ChatConfig;
use weft_core::error::{Result, WeftError};
use weft_core::model::ChatMessage;
use weft_core::traits::ChatModel;

const OPENAI_API_URL: &str = "https://api.openai.com/v1";

/// OpenAI-compatible chat client. Works with OpenAI, Ollama, vLLM, Groq, etc.
pub struct OpenAiModel {
    http: Client,
    config: ChatConfig,
}

impl OpenAiModel {
    pub fn new(config: ChatConfig) -> Self {
        Self {
            http: Client::new(),
            config,
        }
    }

    fn endpoint(&self) -> String {
        let base = self
            .config
            .base_url
            .as_deref()
            .filter(|s| !s.is_empty())
            .unwrap_or(OPENAI_API_URL);
        format!("{}/chat/completions", base.trim_end_matches('/'))
    }
}

#[derive(Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

impl ChatModel for OpenAiModel {
    fn name(&self) -> &str {
        &self.config.model
    }

    fn complete(&self, messages: Vec<ChatMessage>) -> BoxFuture<'_, Result<String>> {
        Box::pin(async move {
            let body = CompletionRequest {
                model: &self.config.model,
                messages: &messages,
                temperature: if self.config.temperature > 0.0 {
                    Some(self.config.temperature)
                } else {
                    None
                },
            };

            debug!(
                model = %self.config.model,
                messages = messages.len(),
                "Chat completion request"
            );

            let mut req = self.http.post(self.endpoint()).json(&body);

            if let Some(api_key) = &self.config.api_key {
                req = req.header("Authorization", format!("Bearer {}", api_key));
            }

            let response = req
                .send()
                .await
                .map_err(|e| WeftError::ChatRequest(e.to_string()))?;

            if !response.status().is_success() {
                let status = response.status();
                let body = response
                    .text()
                    .await
                    .unwrap_or_else(|_| "unknown".to_string());
                return Err(WeftError::ChatRequest(format!("HTTP {}: {}", status, body)));
            }

            let parsed: CompletionResponse = response
                .json()
                .await
                .map_err(|e| WeftError::ChatRequest(e.to_string()))?;

            parsed
                .choices
                .into_iter()
                .next()
                .and_then(|c| c.message.content)
                .ok_or_else(|| WeftError::ChatRequest("empty completion".to_string()))
        })
    }
}
