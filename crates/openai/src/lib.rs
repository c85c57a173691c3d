//! OpenAI-compatible adapter for ullm.
//!
//! Serves every backend speaking the chat completions protocol: OpenAI,
//! DeepSeek, Grok, Qwen, Kimi and Ollama. Register an [`OpenAI`] adapter
//! in a [`ucore::Registry`] and send it [`ChatRequest`]s.

pub use config::{
    BackendConfig, DEEPSEEK, GROK, KIMI, OLLAMA, OPENAI, OllamaConfig, ProviderConfig, QWEN,
    RemoteConfig,
};
pub use http::HttpProvider;
pub use request::ChatRequest;
pub use reqwest::{self, Client};
pub use response::{ChatChoice, ChatResponse, Delta, Usage};
pub use sse::Lines;

use futures_core::Stream;
use ucore::{Adapter, BoxError, Decode, Request, Result, VendorError};

mod config;
mod http;
mod request;
mod response;
mod sse;
mod wire;

/// Adapter for OpenAI-compatible chat completions backends.
#[derive(Clone, Debug)]
pub struct OpenAI {
    http: HttpProvider,
    models: Vec<String>,
}

impl OpenAI {
    /// Create an adapter over a transport, accepting every model.
    pub fn new(http: HttpProvider) -> Self {
        Self {
            http,
            models: Vec::new(),
        }
    }

    /// Create an adapter for the OpenAI API.
    pub fn api(client: Client, key: &str) -> Result<Self> {
        HttpProvider::bearer(client, key, OPENAI).map(Self::new)
    }

    /// Create an adapter from a provider entry.
    pub fn from_config(config: &ProviderConfig, client: Client) -> Result<Self> {
        let endpoint = config.endpoint();
        let http = match config.api_key() {
            Some(key) => HttpProvider::bearer(client, key, &endpoint)?,
            None => HttpProvider::no_auth(client, &endpoint),
        };
        tracing::debug!("{} adapter '{}' at {endpoint}", config.kind(), config.name);
        Ok(Self::new(http).serving(config.models.clone()))
    }

    /// Only accept models starting with one of `prefixes`.
    pub fn serving<I, S>(mut self, prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.models = prefixes.into_iter().map(Into::into).collect();
        self
    }

    /// The transport, for calls outside the unified contract.
    pub fn http(&self) -> &HttpProvider {
        &self.http
    }
}

impl Decode for OpenAI {
    type Partial = ChatResponse;

    fn decode(&self, buffer: &str) -> std::result::Result<ChatResponse, BoxError> {
        Ok(serde_json::from_str(buffer)?)
    }

    fn vendor_error(&self, unit: &str) -> Option<VendorError> {
        wire::vendor_error(unit)
    }
}

impl Adapter for OpenAI {
    type Request = ChatRequest;

    fn accepts(&self, request: &ChatRequest) -> bool {
        self.models.is_empty()
            || self
                .models
                .iter()
                .any(|prefix| request.model().starts_with(prefix.as_str()))
    }

    async fn send(&self, request: &ChatRequest) -> Result<ChatResponse> {
        self.http.send(request).await
    }

    fn open(&self, request: &ChatRequest) -> impl Stream<Item = Result<String>> + Send {
        self.http.stream(request)
    }
}
