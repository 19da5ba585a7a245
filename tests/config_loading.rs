use std::io::Write;

use weft_core::config::{AppConfig, EngineMode};
use weft_core::error::WeftError;

#[test]
fn test_load_full_config_from_file() {
    let toml_content = r#"
[store]
path = "/tmp/weft-test/weft.db"

[gateway]
bind = "0.0.0.0:9999"

[engines]
default = "remote"

[engines.remote]
mode = "live"
credential = "rk-live-key"
base_url = "https://runner.internal"
call_path = "/v2/run"
timeout_secs = 12
max_retries = 4
backoff_ms = 250
model = "runner-small"

[engines.chat]
provider = "openai"
model = "gpt-4o"
api_key = "sk-test-key"
base_url = "http://localhost:11434/v1"
temperature = 0.3
"#;

    let mut tmp = tempfile::NamedTempFile::new().expect("create temp file");
    tmp.write_all(toml_content.as_bytes()).expect("write toml");

    let config = AppConfig::load(tmp.path()).expect("load config");

    assert_eq!(config.store.path, "/tmp/weft-test/weft.db");
    assert_eq!(config.gateway.bind, "0.0.0.0:9999");
    assert_eq!(config.engines.default_engine, "remote");

    let remote = &config.engines.remote;
    assert_eq!(remote.mode, EngineMode::Live);
    assert_eq!(remote.credential(), Some("rk-live-key"));
    assert_eq!(remote.base_url, "https://runner.internal");
    assert_eq!(remote.call_path, "/v2/run");
    assert_eq!(remote.timeout_secs, 12);
    assert_eq!(remote.max_retries, 4);
    assert_eq!(remote.backoff_ms, 250);
    assert_eq!(remote.model, "runner-small");

    let chat = &config.engines.chat;
    assert_eq!(chat.provider, "openai");
    assert_eq!(chat.model, "gpt-4o");
    assert_eq!(chat.api_key.as_deref(), Some("sk-test-key"));
    assert_eq!(chat.base_url.as_deref(), Some("http://localhost:11434/v1"));
}

#[test]
fn test_env_var_expansion_in_config() {
    std::env::set_var("WEFT_TEST_RUNNER_KEY", "expanded-key-value");

    let toml_content = r#"
[engines.remote]
mode = "live"
credential = "${WEFT_TEST_RUNNER_KEY}"
"#;

    let mut tmp = tempfile::NamedTempFile::new().expect("create temp file");
    tmp.write_all(toml_content.as_bytes()).expect("write toml");

    let config = AppConfig::load(tmp.path()).expect("load config");
    assert_eq!(config.engines.remote.credential(), Some("expanded-key-value"));

    std::env::remove_var("WEFT_TEST_RUNNER_KEY");
}

#[test]
fn test_unset_placeholder_leaves_credential_unusable() {
    let toml_content = r#"
[engines.remote]
credential = "${WEFT_UNSET_RUNNER_KEY}"
"#;

    let mut tmp = tempfile::NamedTempFile::new().expect("create temp file");
    tmp.write_all(toml_content.as_bytes()).expect("write toml");

    let config = AppConfig::load(tmp.path()).expect("load config");
    // Raw value survives, but a placeholder never counts as a credential.
    assert!(config.engines.remote.credential.is_some());
    assert_eq!(config.engines.remote.credential(), None);
}

#[test]
fn test_minimal_config_uses_defaults() {
    let toml_content = r#"
[gateway]
bind = "127.0.0.1:9100"
"#;

    let mut tmp = tempfile::NamedTempFile::new().expect("create temp file");
    tmp.write_all(toml_content.as_bytes()).expect("write toml");

    let config = AppConfig::load(tmp.path()).expect("load config");

    assert_eq!(config.gateway.bind, "127.0.0.1:9100");
    assert_eq!(config.store.path, "~/.weft/weft.db");
    assert_eq!(config.engines.default_engine, "fake");
    assert_eq!(config.engines.remote.mode, EngineMode::Simulate);
    assert_eq!(config.engines.remote.max_retries, 2);
    assert_eq!(config.engines.chat.provider, "stub");
}

#[test]
fn test_missing_config_file_is_reported() {
    let err = AppConfig::load(std::path::Path::new("/nonexistent/weft.toml")).unwrap_err();
    match err {
        WeftError::ConfigNotFound(path) => assert!(path.contains("weft.toml")),
        other => panic!("expected ConfigNotFound, got {other:?}"),
    }
}

#[test]
fn test_config_round_trips_through_toml() {
    let config = AppConfig::default();
    let rendered = toml::to_string_pretty(&config).expect("render");

    let mut tmp = tempfile::NamedTempFile::new().expect("create temp file");
    tmp.write_all(rendered.as_bytes()).expect("write toml");

    let reloaded = AppConfig::load(tmp.path()).expect("reload");
    assert_eq!(reloaded.store.path, config.store.path);
    assert_eq!(reloaded.gateway.bind, config.gateway.bind);
    assert_eq!(reloaded.engines.default_engine, config.engines.default_engine);
    assert_eq!(reloaded.engines.remote.mode, config.engines.remote.mode);
    assert_eq!(reloaded.engines.chat.provider, config.engines.chat.provider);
}
