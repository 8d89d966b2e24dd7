//! Shared HTTP plumbing for the provider store and the risk screening API.

use reqwest::{Method, RequestBuilder, Response};
use serde_json::Value;
use tracing::debug;
use url::Url;

use crate::config::BackendConfig;

/// Failure to complete a request against the backend.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("backend responded {status} for {url}")]
    Status {
        url: String,
        status: u16,
        message: Option<String>,
    },
    #[error("could not build backend url from segments {segments:?}")]
    InvalidUrl { segments: Vec<String> },
}

impl TransportError {
    /// Backend-provided rejection message, if the error body carried one.
    pub fn backend_message(&self) -> Option<&str> {
        match self {
            TransportError::Status { message, .. } => message.as_deref(),
            _ => None,
        }
    }
}

/// Thin wrapper holding one connection pool and the backend base URL.
#[derive(Debug, Clone)]
pub struct BackendClient {
    http: reqwest::Client,
    base_url: Url,
}

impl BackendClient {
    pub fn new(config: &BackendConfig) -> Self {
        Self::with_client(reqwest::Client::new(), config.base_url.clone())
    }

    pub fn with_client(http: reqwest::Client, base_url: Url) -> Self {
        Self { http, base_url }
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Appends percent-encoded path segments to the base URL.
    pub fn endpoint(&self, segments: &[&str]) -> Result<Url, TransportError> {
        let mut url = self.base_url.clone();
        {
            let mut path = url.path_segments_mut().map_err(|_| TransportError::InvalidUrl {
                segments: segments.iter().map(|s| s.to_string()).collect(),
            })?;
            path.pop_if_empty();
            path.extend(segments);
        }
        Ok(url)
    }

    pub fn request(&self, method: Method, url: Url) -> RequestBuilder {
        self.http.request(method, url)
    }

    /// Sends the request and fails on transport errors and non-2xx statuses.
    pub async fn send(&self, url: &Url, request: RequestBuilder) -> Result<Response, TransportError> {
        let response = request.send().await.map_err(|source| TransportError::Request {
            url: url.to_string(),
            source,
        })?;

        let status = response.status();
        if status.is_success() {
            debug!(%url, status = status.as_u16(), "backend request completed");
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(TransportError::Status {
            url: url.to_string(),
            status: status.as_u16(),
            message: rejection_message(&body),
        })
    }

    /// Reads a JSON body leniently: empty bodies become `Null`, non-JSON text
    /// is kept as a string so callers can classify it rather than fail.
    pub async fn read_json(&self, url: &Url, response: Response) -> Result<Value, TransportError> {
        let text = response.text().await.map_err(|source| TransportError::Request {
            url: url.to_string(),
            source,
        })?;
        Ok(lenient_json(&text))
    }
}

pub(crate) fn lenient_json(text: &str) -> Value {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Value::Null;
    }
    serde_json::from_str(trimmed).unwrap_or_else(|_| Value::String(trimmed.to_string()))
}

fn rejection_message(body: &str) -> Option<String> {
    match lenient_json(body) {
        Value::Object(map) => map
            .get("message")
            .and_then(Value::as_str)
            .map(str::to_string),
        _ => None,
    }
}
