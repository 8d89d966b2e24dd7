use std::collections::BTreeSet;
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::api::ProviderApi;
use super::domain::{Provider, ProviderId};
use super::validation::{ProviderForm, ValidationErrors};
use crate::backend::TransportError;
use crate::pagination::{PageInfo, Paginator};

/// Submit error shown when the backend rejects a mutation without a message.
pub const SUBMIT_FAILURE_MESSAGE: &str = "An error occurred. Please try again.";

/// Error raised by provider directory operations.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error(transparent)]
    Validation(#[from] ValidationErrors),
    #[error("provider backend request failed: {0}")]
    Backend(#[from] TransportError),
    #[error("provider {0} not found")]
    NotFound(ProviderId),
}

impl ProviderError {
    /// Operator-facing message: the backend's own `message` when it sent one.
    pub fn user_message(&self) -> String {
        match self {
            ProviderError::Validation(errors) => errors.to_string(),
            ProviderError::Backend(error) => error
                .backend_message()
                .unwrap_or(SUBMIT_FAILURE_MESSAGE)
                .to_string(),
            ProviderError::NotFound(_) => self.to_string(),
        }
    }
}

/// Search box and country dropdown state.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderFilter {
    pub search: String,
    pub country: String,
}

impl ProviderFilter {
    pub fn is_empty(&self) -> bool {
        self.search.is_empty() && self.country.is_empty()
    }

    pub fn matches(&self, provider: &Provider) -> bool {
        let needle = self.search.to_lowercase();
        let matches_search = provider.legal_name.to_lowercase().contains(&needle)
            || provider.tax_id.contains(&self.search)
            || provider.trade_name.to_lowercase().contains(&needle);
        let matches_country = self.country.is_empty() || provider.country == self.country;
        matches_search && matches_country
    }
}

/// One page of the filtered provider list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProviderPage {
    pub providers: Vec<Provider>,
    pub page: PageInfo,
    pub total: usize,
}

/// Cached provider list kept in step with the backend.
///
/// Every mutation is followed by a full reload; the cache is never edited in
/// place.
pub struct ProviderDirectory<P> {
    api: Arc<P>,
    providers: Mutex<Vec<Provider>>,
    paginator: Paginator,
}

impl<P> ProviderDirectory<P>
where
    P: ProviderApi + 'static,
{
    pub fn new(api: Arc<P>) -> Self {
        Self {
            api,
            providers: Mutex::new(Vec::new()),
            paginator: Paginator::default(),
        }
    }

    /// Fetches the list, sorts it newest first and replaces the cache.
    pub async fn reload(&self) -> Result<usize, ProviderError> {
        let mut providers = self.api.list().await?;
        providers.sort_by(Provider::cmp_recent_first);

        let count = providers.len();
        *self.providers.lock().expect("provider cache mutex poisoned") = providers;
        info!(count, "provider list reloaded");
        Ok(count)
    }

    pub fn snapshot(&self) -> Vec<Provider> {
        self.providers
            .lock()
            .expect("provider cache mutex poisoned")
            .clone()
    }

    pub fn find(&self, id: ProviderId) -> Option<Provider> {
        self.providers
            .lock()
            .expect("provider cache mutex poisoned")
            .iter()
            .find(|provider| provider.id == Some(id))
            .cloned()
    }

    /// Cache lookup that reloads once before giving up.
    pub async fn lookup(&self, id: ProviderId) -> Result<Provider, ProviderError> {
        if let Some(provider) = self.find(id) {
            return Ok(provider);
        }
        self.reload().await?;
        self.find(id).ok_or(ProviderError::NotFound(id))
    }

    pub async fn add(&self, form: &ProviderForm) -> Result<(), ProviderError> {
        let draft = form.validate()?;
        self.api.create(&draft).await?;
        info!(legal_name = %draft.legal_name, "provider created");
        self.refresh_after("create").await;
        Ok(())
    }

    pub async fn edit(&self, id: ProviderId, form: &ProviderForm) -> Result<(), ProviderError> {
        let draft = form.validate()?;
        self.api.update(id, &draft).await?;
        info!(provider_id = %id, "provider updated");
        self.refresh_after("update").await;
        Ok(())
    }

    pub async fn remove(&self, id: ProviderId) -> Result<(), ProviderError> {
        self.api.delete(id).await?;
        info!(provider_id = %id, "provider deleted");
        self.refresh_after("delete").await;
        Ok(())
    }

    async fn refresh_after(&self, action: &'static str) {
        if let Err(error) = self.reload().await {
            warn!(action, %error, "provider list reload failed; keeping previous list");
        }
    }

    /// Filters the cached list and returns the requested page.
    pub fn query(&self, filter: &ProviderFilter, page: usize) -> ProviderPage {
        let providers = self.providers.lock().expect("provider cache mutex poisoned");
        let total = providers.len();
        let filtered: Vec<Provider> = providers
            .iter()
            .filter(|provider| filter.matches(provider))
            .cloned()
            .collect();
        drop(providers);

        let (rows, info) = self.paginator.slice(&filtered, page);
        ProviderPage {
            providers: rows.to_vec(),
            page: info,
            total,
        }
    }

    /// Distinct non-empty countries, sorted.
    pub fn countries(&self) -> Vec<String> {
        self.providers
            .lock()
            .expect("provider cache mutex poisoned")
            .iter()
            .filter(|provider| !provider.country.is_empty())
            .map(|provider| provider.country.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}
