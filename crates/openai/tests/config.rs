//! Tests for `ProviderConfig`.

use serde_json::json;
use ullm_openai::{BackendConfig, DEEPSEEK, OLLAMA, OllamaConfig, ProviderConfig, RemoteConfig};

fn remote(key: &str, base_url: Option<&str>) -> RemoteConfig {
    RemoteConfig {
        api_key: key.into(),
        base_url: base_url.map(Into::into),
    }
}

#[test]
fn decodes_flattened_backend() {
    let config: ProviderConfig = serde_json::from_value(json!({
        "provider": "deep_seek",
        "api_key": "sk-test",
        "models": ["deepseek-"],
    }))
    .unwrap();

    assert_eq!(config.name, "default");
    assert_eq!(config.kind(), "deepseek");
    assert_eq!(config.api_key(), Some("sk-test"));
    assert_eq!(config.endpoint(), DEEPSEEK);
}

#[test]
fn decodes_openai_and_ollama_tags() {
    let openai: ProviderConfig =
        serde_json::from_value(json!({ "provider": "openai", "api_key": "k" })).unwrap();
    assert!(matches!(openai.backend, BackendConfig::OpenAI(_)));

    let ollama: ProviderConfig =
        serde_json::from_value(json!({ "name": "local", "provider": "ollama" })).unwrap();
    assert_eq!(ollama.name, "local");
    assert_eq!(ollama.api_key(), None);
    assert_eq!(ollama.endpoint(), OLLAMA);
}

#[test]
fn unknown_provider_is_rejected() {
    let result = serde_json::from_value::<ProviderConfig>(json!({ "provider": "claude" }));
    assert!(result.is_err());
}

#[test]
fn base_url_gains_the_chat_path() {
    let config = ProviderConfig {
        name: "proxy".into(),
        models: vec!["gpt-".into()],
        backend: BackendConfig::OpenAI(remote("k", Some("http://localhost:8080/v1/"))),
    };
    assert_eq!(config.endpoint(), "http://localhost:8080/v1/chat/completions");

    let config = ProviderConfig {
        backend: BackendConfig::Ollama(OllamaConfig {
            base_url: Some("http://box:11434/v1/chat/completions".into()),
        }),
        ..config
    };
    assert_eq!(config.endpoint(), "http://box:11434/v1/chat/completions");
}

#[test]
fn serves_by_prefix() {
    let config = ProviderConfig {
        name: "default".into(),
        models: vec!["gpt-".into(), "o3".into()],
        backend: BackendConfig::OpenAI(remote("k", None)),
    };
    assert!(config.serves("gpt-4o"));
    assert!(config.serves("o3-mini"));
    assert!(!config.serves("deepseek-chat"));
}

#[test]
fn validate_remote_ok() {
    let config = ProviderConfig {
        name: "default".into(),
        models: vec!["grok-".into()],
        backend: BackendConfig::Grok(remote("k", None)),
    };
    assert!(config.validate().is_ok());
}

#[test]
fn validate_remote_with_base_url_no_key() {
    let config = ProviderConfig {
        name: "default".into(),
        models: vec!["qwen".into()],
        backend: BackendConfig::Qwen(remote("", Some("http://localhost:9000/v1"))),
    };
    assert!(config.validate().is_ok());
}

#[test]
fn validate_remote_missing_key_and_url() {
    let config = ProviderConfig {
        name: "kimi".into(),
        models: vec!["moonshot-".into()],
        backend: BackendConfig::Kimi(remote("", None)),
    };
    let err = config.validate().unwrap_err();
    assert!(err.to_string().contains("kimi"), "{err}");
}

#[test]
fn validate_empty_models() {
    let config = ProviderConfig {
        name: "default".into(),
        models: Vec::new(),
        backend: BackendConfig::Ollama(OllamaConfig::default()),
    };
    assert!(config.validate().is_err());
}
