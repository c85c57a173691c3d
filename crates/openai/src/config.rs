//! Provider configuration
//!
//! One entry per backend. The backend settings are flattened and
//! discriminated by the `provider` field, so all fields sit at the same
//! level in TOML:
//!
//! ```toml
//! [[provider]]
//! name = "deepseek"
//! provider = "deep_seek"
//! api_key = "sk-..."
//! models = ["deepseek-"]
//! ```

use anyhow::{Result, bail};
use serde::{Deserialize, Serialize};

/// The OpenAI chat completions endpoint
pub const OPENAI: &str = "https://api.openai.com/v1/chat/completions";

/// The DeepSeek chat completions endpoint
pub const DEEPSEEK: &str = "https://api.deepseek.com/chat/completions";

/// The Grok (xAI) chat completions endpoint
pub const GROK: &str = "https://api.x.ai/v1/chat/completions";

/// The Qwen (DashScope compatible mode) chat completions endpoint
pub const QWEN: &str = "https://dashscope.aliyuncs.com/compatible-mode/v1/chat/completions";

/// The Kimi (Moonshot) chat completions endpoint
pub const KIMI: &str = "https://api.moonshot.cn/v1/chat/completions";

/// The local Ollama chat completions endpoint
pub const OLLAMA: &str = "http://localhost:11434/v1/chat/completions";

const CHAT_COMPLETIONS: &str = "/chat/completions";

/// Named provider configuration.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ProviderConfig {
    /// Unique name for this entry. Defaults to `"default"`.
    #[serde(default = "default_name")]
    pub name: String,

    /// Model id prefixes this entry serves.
    #[serde(default)]
    pub models: Vec<String>,

    /// Backend settings, discriminated by the `provider` field.
    #[serde(flatten)]
    pub backend: BackendConfig,
}

impl ProviderConfig {
    /// Human-readable backend kind for logging.
    pub fn kind(&self) -> &'static str {
        match &self.backend {
            BackendConfig::OpenAI(_) => "openai",
            BackendConfig::DeepSeek(_) => "deepseek",
            BackendConfig::Grok(_) => "grok",
            BackendConfig::Qwen(_) => "qwen",
            BackendConfig::Kimi(_) => "kimi",
            BackendConfig::Ollama(_) => "ollama",
        }
    }

    /// The chat completions URL of this entry.
    ///
    /// A `base_url` is used as-is when it already names the chat
    /// completions path, otherwise the path is appended.
    pub fn endpoint(&self) -> String {
        let (base_url, default) = match &self.backend {
            BackendConfig::OpenAI(remote) => (&remote.base_url, OPENAI),
            BackendConfig::DeepSeek(remote) => (&remote.base_url, DEEPSEEK),
            BackendConfig::Grok(remote) => (&remote.base_url, GROK),
            BackendConfig::Qwen(remote) => (&remote.base_url, QWEN),
            BackendConfig::Kimi(remote) => (&remote.base_url, KIMI),
            BackendConfig::Ollama(ollama) => (&ollama.base_url, OLLAMA),
        };

        match base_url {
            Some(url) => {
                let url = url.trim_end_matches('/');
                if url.ends_with(CHAT_COMPLETIONS) {
                    url.to_owned()
                } else {
                    format!("{url}{CHAT_COMPLETIONS}")
                }
            }
            None => default.to_owned(),
        }
    }

    /// The API key, if the backend uses one.
    pub fn api_key(&self) -> Option<&str> {
        self.remote()
            .map(|remote| remote.api_key.as_str())
            .filter(|key| !key.is_empty())
    }

    /// Whether this entry serves `model`.
    pub fn serves(&self, model: &str) -> bool {
        self.models.iter().any(|prefix| model.starts_with(prefix.as_str()))
    }

    /// Check the entry is usable.
    pub fn validate(&self) -> Result<()> {
        if self.models.is_empty() {
            bail!("provider '{}' serves no models", self.name);
        }
        let Some(remote) = self.remote() else {
            return Ok(());
        };
        if remote.api_key.is_empty() && remote.base_url.is_none() {
            bail!(
                "provider '{}' ({}) requires an api_key or a base_url",
                self.name,
                self.kind()
            );
        }
        Ok(())
    }

    fn remote(&self) -> Option<&RemoteConfig> {
        match &self.backend {
            BackendConfig::OpenAI(remote)
            | BackendConfig::DeepSeek(remote)
            | BackendConfig::Grok(remote)
            | BackendConfig::Qwen(remote)
            | BackendConfig::Kimi(remote) => Some(remote),
            BackendConfig::Ollama(_) => None,
        }
    }
}

/// Backend settings, discriminated by the `provider` field in TOML/JSON.
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(tag = "provider", rename_all = "snake_case")]
pub enum BackendConfig {
    /// OpenAI API.
    #[serde(rename = "openai")]
    OpenAI(RemoteConfig),
    /// DeepSeek API.
    DeepSeek(RemoteConfig),
    /// Grok (xAI) API.
    Grok(RemoteConfig),
    /// Qwen (Alibaba DashScope) API.
    Qwen(RemoteConfig),
    /// Kimi (Moonshot) API.
    Kimi(RemoteConfig),
    /// Ollama local API, no key required.
    Ollama(OllamaConfig),
}

/// Configuration for remote HTTP API providers.
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct RemoteConfig {
    /// API key
    #[serde(default)]
    pub api_key: String,

    /// Optional base URL override for the provider endpoint.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

/// Configuration for Ollama.
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct OllamaConfig {
    /// Optional base URL override, defaults to [`OLLAMA`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

fn default_name() -> String {
    "default".to_owned()
}
