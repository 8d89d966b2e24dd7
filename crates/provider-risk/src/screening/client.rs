use async_trait::async_trait;
use reqwest::Method;
use serde_json::Value;

use crate::backend::{BackendClient, TransportError};
use crate::providers::ProviderId;

/// Lookups exposed by the external risk screening API.
///
/// Implementations return the raw JSON payload; shape tolerance lives in
/// [`super::payload::RiskPayload::classify`].
#[async_trait]
pub trait RiskApi: Send + Sync {
    async fn screen_all(&self, provider_id: ProviderId) -> Result<Value, TransportError>;

    async fn screen_source(
        &self,
        provider_id: ProviderId,
        api_identifier: &str,
    ) -> Result<Value, TransportError>;
}

/// `RiskApi` over HTTP: `POST /risk/{id}/all` and `POST /risk/{id}/source/{source}`.
#[derive(Debug, Clone)]
pub struct HttpRiskApi {
    backend: BackendClient,
}

impl HttpRiskApi {
    pub fn new(backend: BackendClient) -> Self {
        Self { backend }
    }

    async fn post(&self, segments: &[&str]) -> Result<Value, TransportError> {
        let url = self.backend.endpoint(segments)?;
        let request = self.backend.request(Method::POST, url.clone());
        let response = self.backend.send(&url, request).await?;
        self.backend.read_json(&url, response).await
    }
}

#[async_trait]
impl RiskApi for HttpRiskApi {
    async fn screen_all(&self, provider_id: ProviderId) -> Result<Value, TransportError> {
        let id = provider_id.to_string();
        self.post(&["risk", &id, "all"]).await
    }

    async fn screen_source(
        &self,
        provider_id: ProviderId,
        api_identifier: &str,
    ) -> Result<Value, TransportError> {
        let id = provider_id.to_string();
        self.post(&["risk", &id, "source", api_identifier]).await
    }
}
