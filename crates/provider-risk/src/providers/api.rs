use async_trait::async_trait;
use reqwest::Method;
use serde_json::Value;
use tracing::warn;

use super::domain::{Provider, ProviderDraft, ProviderId, ProviderUpdate};
use crate::backend::{BackendClient, TransportError};

/// Provider persistence exposed by the backend's `/Providers` resource.
#[async_trait]
pub trait ProviderApi: Send + Sync {
    async fn list(&self) -> Result<Vec<Provider>, TransportError>;
    async fn create(&self, draft: &ProviderDraft) -> Result<(), TransportError>;
    async fn update(&self, id: ProviderId, draft: &ProviderDraft) -> Result<(), TransportError>;
    async fn delete(&self, id: ProviderId) -> Result<(), TransportError>;
}

#[derive(Debug, Clone)]
pub struct HttpProviderApi {
    backend: BackendClient,
}

impl HttpProviderApi {
    pub fn new(backend: BackendClient) -> Self {
        Self { backend }
    }
}

#[async_trait]
impl ProviderApi for HttpProviderApi {
    async fn list(&self) -> Result<Vec<Provider>, TransportError> {
        let url = self.backend.endpoint(&["Providers"])?;
        let request = self.backend.request(Method::GET, url.clone());
        let response = self.backend.send(&url, request).await?;
        let payload = self.backend.read_json(&url, response).await?;
        Ok(providers_from(payload))
    }

    async fn create(&self, draft: &ProviderDraft) -> Result<(), TransportError> {
        let url = self.backend.endpoint(&["Providers"])?;
        let request = self.backend.request(Method::POST, url.clone()).json(draft);
        self.backend.send(&url, request).await?;
        Ok(())
    }

    async fn update(&self, id: ProviderId, draft: &ProviderDraft) -> Result<(), TransportError> {
        let segment = id.to_string();
        let url = self.backend.endpoint(&["Providers", &segment])?;
        let request = self
            .backend
            .request(Method::PUT, url.clone())
            .json(&ProviderUpdate { id, draft });
        self.backend.send(&url, request).await?;
        Ok(())
    }

    async fn delete(&self, id: ProviderId) -> Result<(), TransportError> {
        let segment = id.to_string();
        let url = self.backend.endpoint(&["Providers", &segment])?;
        let request = self.backend.request(Method::DELETE, url.clone());
        self.backend.send(&url, request).await?;
        Ok(())
    }
}

/// Reads the provider list, skipping records that do not deserialize.
fn providers_from(payload: Value) -> Vec<Provider> {
    let items = match payload {
        Value::Array(items) => items,
        other => {
            warn!(payload = %other, "provider list response is not an array");
            return Vec::new();
        }
    };

    items
        .into_iter()
        .filter_map(|item| match serde_json::from_value::<Provider>(item) {
            Ok(provider) => Some(provider),
            Err(error) => {
                warn!(%error, "skipping malformed provider record");
                None
            }
        })
        .collect()
}
