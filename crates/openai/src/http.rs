//! Shared HTTP transport for OpenAI-compatible backends.
//!
//! `HttpProvider` wraps a `reqwest::Client` with pre-configured headers and
//! endpoint URL. Provides `send()` for one JSON response and `stream()` for
//! the data payloads of a server-sent events response.

use crate::{sse::Lines, wire};
use async_stream::try_stream;
use futures_core::Stream;
use futures_util::StreamExt;
use reqwest::{
    Client, Method,
    header::{self, HeaderMap, HeaderName, HeaderValue},
};
use serde::{Serialize, de::DeserializeOwned};
use ucore::{Error, Result};

const JSON: &str = "application/json";
const EVENT_STREAM: &str = "text/event-stream";

/// Shared HTTP transport.
///
/// Holds a `reqwest::Client`, pre-built headers (auth + content-type),
/// and the target endpoint URL.
#[derive(Clone, Debug)]
pub struct HttpProvider {
    client: Client,
    headers: HeaderMap,
    endpoint: String,
}

impl HttpProvider {
    /// Create a provider with Bearer token authentication.
    pub fn bearer(client: Client, key: &str, endpoint: &str) -> Result<Self> {
        let mut provider = Self::no_auth(client, endpoint);
        let value = HeaderValue::try_from(format!("Bearer {key}")).map_err(Error::encoding)?;
        provider.headers.insert(header::AUTHORIZATION, value);
        Ok(provider)
    }

    /// Create a provider without authentication (e.g. Ollama).
    pub fn no_auth(client: Client, endpoint: &str) -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(header::CONTENT_TYPE, HeaderValue::from_static(JSON));
        headers.insert(header::ACCEPT, HeaderValue::from_static(JSON));
        Self {
            client,
            headers,
            endpoint: endpoint.to_owned(),
        }
    }

    /// Create a provider with a custom authentication header.
    pub fn custom_header(
        client: Client,
        header_name: &str,
        header_value: &str,
        endpoint: &str,
    ) -> Result<Self> {
        let mut provider = Self::no_auth(client, endpoint);
        provider.headers.insert(
            header_name.parse::<HeaderName>().map_err(Error::encoding)?,
            header_value.parse::<HeaderValue>().map_err(Error::encoding)?,
        );
        Ok(provider)
    }

    /// Send a request and decode the JSON response.
    pub async fn send<T: DeserializeOwned>(&self, body: &impl Serialize) -> Result<T> {
        let body = serde_json::to_vec(body).map_err(Error::encoding)?;
        tracing::trace!("request: {}", String::from_utf8_lossy(&body));
        let response = self
            .client
            .request(Method::POST, &self.endpoint)
            .headers(self.headers.clone())
            .body(body)
            .send()
            .await
            .map_err(Error::transport)?;

        let text = check(response, JSON)
            .await?
            .text()
            .await
            .map_err(Error::transport)?;
        tracing::trace!("response: {text}");
        serde_json::from_str(&text).map_err(|e| Error::StreamDecodeFailed {
            buffer: text,
            cause: e.into(),
        })
    }

    /// Send a request and stream the data payloads of the SSE response.
    ///
    /// Dropping the stream drops the connection.
    pub fn stream(&self, body: &impl Serialize) -> impl Stream<Item = Result<String>> + Send {
        let body = serde_json::to_vec(body).map_err(Error::encoding);
        let mut headers = self.headers.clone();
        headers.insert(header::ACCEPT, HeaderValue::from_static(EVENT_STREAM));
        let request = self
            .client
            .request(Method::POST, &self.endpoint)
            .headers(headers);

        try_stream! {
            let body = body?;
            tracing::trace!("request: {}", String::from_utf8_lossy(&body));
            let response = request.body(body).send().await.map_err(Error::transport)?;
            let response = check(response, EVENT_STREAM).await?;

            let mut lines = Lines::new();
            let mut bytes = response.bytes_stream();
            while let Some(chunk) = bytes.next().await {
                let chunk = chunk.map_err(Error::transport)?;
                for unit in lines.feed(&chunk) {
                    yield unit;
                }
            }
            if let Some(unit) = lines.finish() {
                yield unit;
            }
        }
    }

    /// Get the endpoint URL.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Get a reference to the headers.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }
}

/// Fail on a non-success status or an unexpected content type.
async fn check(response: reqwest::Response, expected: &str) -> Result<reqwest::Response> {
    let status = response.status();
    if !status.is_success() {
        let text = response.text().await.unwrap_or_default();
        tracing::debug!("unsuccessful status {status}: {text}");
        return Err(Error::UnsuccessfulStatus {
            status: status.as_u16(),
            payload: wire::vendor_error(&text),
        });
    }

    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();
    if !content_type.starts_with(expected) {
        return Err(Error::InvalidContentType(content_type.to_owned()));
    }
    Ok(response)
}
