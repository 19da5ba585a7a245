use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, WeftError};

/// Top-level weft configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub gateway: GatewayConfig,
    #[serde(default)]
    pub engines: EnginesConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Path to the sqlite database file.
    #[serde(default = "default_store_path")]
    pub path: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: default_store_path(),
        }
    }
}

fn default_store_path() -> String { "~/.weft/weft.db".to_string() }

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

fn default_bind() -> String { "127.0.0.1:8760".to_string() }

/// Engine selection and per-adapter settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnginesConfig {
    /// Engine used when a request does not name one.
    #[serde(rename = "default", default = "default_engine")]
    pub default_engine: String,
    #[serde(default)]
    pub remote: RemoteConfig,
    #[serde(default)]
    pub chat: ChatConfig,
}

impl Default for EnginesConfig {
    fn default() -> Self {
        Self {
            default_engine: default_engine(),
            remote: RemoteConfig::default(),
            chat: ChatConfig::default(),
        }
    }
}

fn default_engine() -> String { "fake".to_string() }

/// Whether the remote engine runs against the real runner service or a
/// local stand-in.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum EngineMode {
    #[default]
    Simulate,
    Live,
}

/// Settings for the remote runner adapter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteConfig {
    #[serde(default)]
    pub mode: EngineMode,
    /// Bearer credential for the runner service. Required in live mode.
    #[serde(default)]
    pub credential: Option<String>,
    #[serde(default = "default_remote_base_url")]
    pub base_url: String,
    #[serde(default = "default_remote_call_path")]
    pub call_path: String,
    /// Per-call timeout in seconds.
    #[serde(default = "default_remote_timeout")]
    pub timeout_secs: u64,
    /// Additional attempts after the first.
    #[serde(default = "default_remote_max_retries")]
    pub max_retries: u32,
    /// Linear backoff base: the wait before retry n is `backoff_ms * n`.
    #[serde(default = "default_remote_backoff")]
    pub backoff_ms: u64,
    #[serde(default = "default_remote_model")]
    pub model: String,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            mode: EngineMode::Simulate,
            credential: None,
            base_url: default_remote_base_url(),
            call_path: default_remote_call_path(),
            timeout_secs: default_remote_timeout(),
            max_retries: default_remote_max_retries(),
            backoff_ms: default_remote_backoff(),
            model: default_remote_model(),
        }
    }
}

impl RemoteConfig {
    /// The configured credential, if one is actually usable.
    /// An unexpanded `${VAR}` placeholder counts as absent.
    pub fn credential(&self) -> Option<&str> {
        match self.credential.as_deref() {
            Some(c) if !c.is_empty() && !c.starts_with("${") => Some(c),
            _ => None,
        }
    }
}

fn default_remote_base_url() -> String { "https://api.runner.example".to_string() }
fn default_remote_call_path() -> String { "/v1/run".to_string() }
fn default_remote_timeout() -> u64 { 30 }
fn default_remote_max_retries() -> u32 { 2 }
fn default_remote_backoff() -> u64 { 500 }
fn default_remote_model() -> String { "runner-large".to_string() }

/// Settings for the chat-model adapter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatConfig {
    /// Provider name: "stub", "openai", or any OpenAI-compatible API.
    #[serde(default = "default_chat_provider")]
    pub provider: String,
    #[serde(default = "default_chat_model")]
    pub model: String,
    #[serde(default)]
    pub api_key: Option<String>,
    /// Base URL override (e.g., "http://localhost:11434/v1").
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            provider: default_chat_provider(),
            model: default_chat_model(),
            api_key: None,
            base_url: None,
            temperature: default_temperature(),
        }
    }
}

fn default_chat_provider() -> String { "stub".to_string() }
fn default_chat_model() -> String { "gpt-4o-mini".to_string() }
fn default_temperature() -> f32 { 0.0 }

impl AppConfig {
    /// Load config from a TOML file, with env var expansion.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|_| WeftError::ConfigNotFound(path.display().to_string()))?;

        // Expand ${ENV_VAR} references
        let expanded = expand_env_vars(&content);

        toml::from_str(&expanded).map_err(|e| WeftError::Config(e.to_string()))
    }

    /// Resolve the store path (expand ~).
    pub fn store_path(&self) -> PathBuf {
        let path = &self.store.path;
        if let Some(rest) = path.strip_prefix("~/") {
            if let Some(home) = dirs_home() {
                return home.join(rest);
            }
        }
        PathBuf::from(path)
    }
}

/// Expand `${ENV_VAR}` patterns in a string.
fn expand_env_vars(input: &str) -> String {
    let mut result = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(c) = chars.next() {
        if c == '$' && chars.peek() == Some(&'{') {
            chars.next(); // consume '{'
            let mut var_name = String::new();
            for c in chars.by_ref() {
                if c == '}' {
                    break;
                }
                var_name.push(c);
            }
            match std::env::var(&var_name) {
                Ok(val) => result.push_str(&val),
                Err(_) => {
                    // Keep original if env var not set
                    result.push_str(&format!("${{{}}}", var_name));
                }
            }
        } else {
            result.push(c);
        }
    }
    result
}

fn dirs_home() -> Option<PathBuf> {
    std::env::var("HOME").ok().map(PathBuf::from)
}
