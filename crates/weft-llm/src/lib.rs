pub mod providers;

use std::sync::Arc;

use weft_core::config::ChatConfig;
use weft_core::error::{Result, WeftError};
use weft_core::traits::ChatModel;

pub use providers::openai::OpenAiModel;
pub use providers::stub::StubChatModel;

/// Create a chat model from the provider table.
///
/// "stub" is the deterministic offline model; the rest are
/// OpenAI-compatible HTTP backends. Unknown names fail at startup.
pub fn create_model(config: &ChatConfig) -> Result<Arc<dyn ChatModel>> {
    match config.provider.as_str() {
        "stub" => Ok(Arc::new(StubChatModel::new(config.temperature))),
        "openai" | "ollama" | "groq" | "openrouter" | "vllm" => {
            Ok(Arc::new(OpenAiModel::new(config.clone())))
        }
        other => Err(WeftError::UnsupportedProvider(other.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_table() {
        let mut config = ChatConfig::default();
        assert_eq!(config.provider, "stub");
        assert!(create_model(&config).is_ok());

        config.provider = "openai".to_string();
        assert!(create_model(&config).is_ok());

        config.provider = "ollama".to_string();
        assert!(create_model(&config).is_ok());
    }

    #[test]
    fn test_unknown_provider_rejected() {
        let config = ChatConfig {
            provider: "telepathy".to_string(),
            ..Default::default()
        };
        match create_model(&config) {
            Err(WeftError::UnsupportedProvider(name)) => assert_eq!(name, "telepathy"),
            Err(other) => panic!("expected UnsupportedProvider, got {other:?}"),
            Ok(_) => panic!("expected UnsupportedProvider, got a model"),
        }
    }
}
