//! Configuration for the CLI

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::{
    path::{Path, PathBuf},
    sync::LazyLock,
};
use ullm::{
    Client, OpenAI, Registry,
    openai::{BackendConfig, ProviderConfig, RemoteConfig},
};

static CONFIG: LazyLock<PathBuf> = LazyLock::new(|| {
    dirs::home_dir()
        .unwrap_or_default()
        .join(".config/ullm.toml")
});

/// CLI configuration, stored at `~/.config/ullm.toml`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    /// The model to chat with by default
    pub model: String,

    /// The configured backends
    #[serde(default, rename = "provider")]
    pub providers: Vec<ProviderConfig>,
}

impl Config {
    /// The default configuration path
    pub fn path() -> &'static Path {
        CONFIG.as_path()
    }

    /// Load the configuration from the default path
    pub fn load() -> Result<Self> {
        Self::load_from(Self::path())
    }

    /// Load the configuration from `path`
    pub fn load_from(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).with_context(|| {
            format!(
                "failed to read {}, run `ullm generate` to create it",
                path.display()
            )
        })?;
        toml::from_str(&text).with_context(|| format!("invalid config {}", path.display()))
    }

    /// Save the configuration to the default path
    pub fn save(&self) -> Result<()> {
        self.save_to(Self::path())
    }

    /// Save the configuration to `path`
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)?;
        }
        std::fs::write(path, toml::to_string(self)?)?;
        tracing::info!("Configuration saved to {}", path.display());
        Ok(())
    }

    /// Write this configuration to `path` unless a file is already there.
    pub fn generate(&self, path: &Path, force: bool) -> Result<()> {
        if path.exists() && !force {
            bail!(
                "{} already exists, pass --force to overwrite it",
                path.display()
            );
        }
        self.save_to(path)?;
        println!("Wrote {}, set your api key there", path.display());
        Ok(())
    }

    /// The first provider serving `model`
    pub fn provider(&self, model: &str) -> Result<&ProviderConfig> {
        match self.providers.iter().find(|p| p.serves(model)) {
            Some(provider) => Ok(provider),
            None => bail!("no provider configured for model '{model}'"),
        }
    }

    /// A registry holding the adapter for `model`
    pub fn registry(&self, model: &str) -> Result<Registry> {
        let provider = self.provider(model)?;
        provider.validate()?;
        tracing::debug!("using provider '{}' for {model}", provider.name);

        let registry = Registry::new();
        registry.register(OpenAI::from_config(provider, Client::new())?);
        Ok(registry)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            model: "deepseek-chat".into(),
            providers: vec![ProviderConfig {
                name: "deepseek".into(),
                models: vec!["deepseek-".into()],
                backend: BackendConfig::DeepSeek(RemoteConfig {
                    api_key: "YOUR_API_KEY".into(),
                    base_url: None,
                }),
            }],
        }
    }
}
