use futures::future::BoxFuture;

use weft_core::error::Result;
use weft_core::model::ChatMessage;
use weft_core::traits::ChatModel;

/// Deterministic offline chat model.
///
/// Echoes a prefix of the last message, so tests and dry runs get a
/// stable, recognizable output without any network access.
pub struct StubChatModel {
    label: String,
    temperature: f32,
}

impl StubChatModel {
    pub fn new(temperature: f32) -> Self {
        Self {
            label: "chat-stub".to_string(),
            temperature,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }
}

impl ChatModel for StubChatModel {
    fn name(&self) -> &str {
        &self.label
    }

    fn complete(&self, messages: Vec<ChatMessage>) -> BoxFuture<'_, Result<String>> {
        Box::pin(async move {
            let content = messages
                .last()
                .map(|m| m.content.as_str())
                .unwrap_or_default();
            let snippet: String = content.chars().take(64).collect();
            Ok(format!(
                "[{} | temp={}] {}",
                self.label, self.temperature, snippet
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_deterministic_output() {
        let model = StubChatModel::new(0.0);
        let messages = vec![
            ChatMessage::system("You are helpful."),
            ChatMessage::user("Summarize the quarterly report"),
        ];

        let first = model.complete(messages.clone()).await.unwrap();
        let second = model.complete(messages).await.unwrap();
        assert_eq!(first, second);
        assert!(first.starts_with("[chat-stub | temp=0]"));
        assert!(first.contains("Summarize the quarterly report"));
    }

    #[tokio::test]
    async fn test_long_content_truncated() {
        let model = StubChatModel::new(0.0);
        let long = "x".repeat(200);
        let out = model.complete(vec![ChatMessage::user(long)]).await.unwrap();
        let echoed = out.split("] ").nth(1).unwrap();
        assert_eq!(echoed.len(), 64);
    }

    #[tokio::test]
    async fn test_empty_messages() {
        let model = StubChatModel::new(0.0);
        let out = model.complete(vec![]).await.unwrap();
        assert!(out.starts_with("[chat-stub"));
    }
}
