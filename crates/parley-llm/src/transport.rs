//! # Backend Transport
//!
//! The HTTP collaborator adapters call through. [`BackendTransport`] is the
//! seam: adapters only see JSON bodies and chunk streams, so tests can swap in
//! a scripted transport. [`HttpTransport`] is the default `reqwest`
//! implementation with SSE parsing.
//!
//! Transport failures are never retried here.

use async_trait::async_trait;
use reqwest::header::{ACCEPT, CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use serde_json::Value;
use tokio_stream::StreamExt;
use tracing::{debug, warn};

use crate::adapter::NativeChunkStream;
use crate::error::{ProviderError, ProviderResult};
use crate::error_parsing::parse_api_error;
use crate::sse::parse_sse_lines;

/// Request/response channel to one backend.
#[async_trait]
pub trait BackendTransport: Send + Sync {
    /// POST `body` to `path` and return the JSON response.
    async fn send(&self, path: &str, body: &Value) -> ProviderResult<Value>;

    /// POST `body` to `path` and return the SSE data lines as JSON values.
    async fn stream(&self, path: &str, body: &Value) -> ProviderResult<NativeChunkStream>;
}

/// Configuration for [`HttpTransport`].
#[derive(Clone, Debug, Default)]
pub struct HttpTransportConfig {
    /// API root; request paths are appended to it.
    pub base_url: String,
    /// Extra headers sent with every request (auth, version).
    pub headers: Vec<(String, String)>,
}

impl HttpTransportConfig {
    /// Create a config for `base_url`.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            headers: Vec::new(),
        }
    }

    /// Add a header.
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }
}

/// `reqwest`-backed transport.
#[derive(Clone, Debug)]
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
    headers: HeaderMap,
}

impl HttpTransport {
    /// Build a transport, validating header names and values.
    pub fn new(config: HttpTransportConfig) -> ProviderResult<Self> {
        let mut headers = HeaderMap::new();
        let _ = headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        for (name, value) in &config.headers {
            let name = HeaderName::from_bytes(name.as_bytes()).map_err(|e| ProviderError::Auth {
                message: format!("invalid header name {name}: {e}"),
            })?;
            let value = HeaderValue::from_str(value).map_err(|e| ProviderError::Auth {
                message: format!("invalid header value for {name}: {e}"),
            })?;
            let _ = headers.insert(name, value);
        }
        Ok(Self {
            client: reqwest::Client::new(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            headers,
        })
    }

    /// API root this transport talks to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    async fn post(&self, path: &str, body: &Value, accept: &'static str) -> ProviderResult<reqwest::Response> {
        let url = self.url(path);
        debug!(%url, "sending backend request");

        let response = self
            .client
            .post(&url)
            .headers(self.headers.clone())
            .header(ACCEPT, accept)
            .json(body)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body_text = response.text().await.unwrap_or_default();
        let info = parse_api_error(&body_text, status.as_u16());
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            return Err(ProviderError::Auth {
                message: info.message,
            });
        }
        Err(ProviderError::Api {
            status: status.as_u16(),
            message: info.message,
            code: info.code,
            retryable: info.retryable,
        })
    }
}

#[async_trait]
impl BackendTransport for HttpTransport {
    async fn send(&self, path: &str, body: &Value) -> ProviderResult<Value> {
        let response = self.post(path, body, "application/json").await?;
        Ok(response.json::<Value>().await?)
    }

    async fn stream(&self, path: &str, body: &Value) -> ProviderResult<NativeChunkStream> {
        let response = self.post(path, body, "text/event-stream").await?;
        let chunks = parse_sse_lines(response.bytes_stream()).filter_map(|line| match line {
            Ok(data) => match serde_json::from_str::<Value>(&data) {
                Ok(value) => Some(Ok(value)),
                Err(e) => {
                    warn!(error = %e, data_preview = %data.chars().take(100).collect::<String>(), "skipping unparseable SSE data");
                    None
                }
            },
            Err(e) => Some(Err(e)),
        });
        Ok(Box::pin(chunks))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
