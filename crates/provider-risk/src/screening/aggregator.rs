use std::sync::Arc;

use futures::future::join_all;
use serde::Serialize;
use tracing::{info, warn};

use super::client::RiskApi;
use super::merge::merge_payloads;
use super::payload::{RiskPayload, RiskResponse};
use super::selection::{LookupPlan, Selection};
use super::sources::{SourceCatalog, ALL_SOURCES_ID};
use crate::backend::TransportError;
use crate::providers::{Provider, ProviderId};

/// Message shown to operators whenever a screening run fails.
pub const SCREENING_FAILURE_MESSAGE: &str = "Failed to run screening. Please try again.";

/// Record a screening runs against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScreeningTarget {
    pub provider_id: ProviderId,
    pub display_name: String,
}

impl ScreeningTarget {
    pub fn new(provider_id: ProviderId, display_name: impl Into<String>) -> Self {
        Self {
            provider_id,
            display_name: display_name.into(),
        }
    }

    /// Unsaved providers have no id and cannot be screened.
    pub fn from_provider(provider: &Provider) -> Option<Self> {
        provider
            .id
            .map(|id| Self::new(id, provider.legal_name.clone()))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ScreeningError {
    #[error("no screening sources selected")]
    EmptySelection,
    #[error("risk lookup against '{source_id}' failed: {source}")]
    Lookup {
        source_id: String,
        #[source]
        source: TransportError,
    },
}

impl ScreeningError {
    pub fn user_message(&self) -> &'static str {
        SCREENING_FAILURE_MESSAGE
    }
}

/// Dispatches lookups for a selection and reduces them into one result.
pub struct ScreeningAggregator<R: ?Sized> {
    api: Arc<R>,
    catalog: &'static SourceCatalog,
}

impl<R: ?Sized> Clone for ScreeningAggregator<R> {
    fn clone(&self) -> Self {
        Self {
            api: Arc::clone(&self.api),
            catalog: self.catalog,
        }
    }
}

impl<R> ScreeningAggregator<R>
where
    R: RiskApi + ?Sized,
{
    pub fn new(api: Arc<R>) -> Self {
        Self::with_catalog(api, SourceCatalog::standard())
    }

    pub fn with_catalog(api: Arc<R>, catalog: &'static SourceCatalog) -> Self {
        Self { api, catalog }
    }

    pub fn catalog(&self) -> &'static SourceCatalog {
        self.catalog
    }

    pub async fn run(
        &self,
        target: &ScreeningTarget,
        selection: &Selection,
    ) -> Result<RiskResponse, ScreeningError> {
        match selection.plan() {
            None => Err(ScreeningError::EmptySelection),
            Some(LookupPlan::AllSources) => self.run_all_sources(target).await,
            Some(LookupPlan::PerSource(ids)) => self.run_per_source(target, ids).await,
        }
    }

    async fn run_all_sources(
        &self,
        target: &ScreeningTarget,
    ) -> Result<RiskResponse, ScreeningError> {
        info!(provider_id = %target.provider_id, "screening against all sources");

        let payload = self
            .api
            .screen_all(target.provider_id)
            .await
            .map_err(|source| {
                warn!(provider_id = %target.provider_id, error = %source, "all-sources lookup failed");
                ScreeningError::Lookup {
                    source_id: ALL_SOURCES_ID.to_string(),
                    source,
                }
            })?;

        let api_identifier = self.catalog.api_identifier(ALL_SOURCES_ID);
        let mut merged =
            merge_payloads([(api_identifier.to_string(), RiskPayload::classify(payload))]);
        if merged.entity_name.trim().is_empty() {
            merged.entity_name = target.display_name.clone();
        }

        info!(
            provider_id = %target.provider_id,
            total_hits = merged.total_hits,
            sources = merged.sources.len(),
            "screening completed"
        );
        Ok(merged)
    }

    async fn run_per_source(
        &self,
        target: &ScreeningTarget,
        ids: &[String],
    ) -> Result<RiskResponse, ScreeningError> {
        let requested: Vec<&str> = ids
            .iter()
            .map(|id| self.catalog.api_identifier(id))
            .collect();
        info!(provider_id = %target.provider_id, sources = ?requested, "screening selected sources");

        // All lookups stay in flight until every one settles; a failure does
        // not cancel its siblings. `join_all` yields in submission order.
        let settled = join_all(
            requested
                .iter()
                .map(|api_identifier| self.api.screen_source(target.provider_id, api_identifier)),
        )
        .await;

        let mut payloads = Vec::with_capacity(requested.len());
        let mut first_failure = None;
        for (api_identifier, outcome) in requested.iter().zip(settled) {
            match outcome {
                Ok(payload) => {
                    payloads.push((api_identifier.to_string(), RiskPayload::classify(payload)))
                }
                Err(source) => {
                    warn!(
                        provider_id = %target.provider_id,
                        source_id = api_identifier,
                        error = %source,
                        "per-source lookup failed"
                    );
                    if first_failure.is_none() {
                        first_failure = Some(ScreeningError::Lookup {
                            source_id: api_identifier.to_string(),
                            source,
                        });
                    }
                }
            }
        }

        if let Some(error) = first_failure {
            return Err(error);
        }

        let mut merged = merge_payloads(payloads);
        merged.entity_name = target.display_name.clone();

        info!(
            provider_id = %target.provider_id,
            total_hits = merged.total_hits,
            sources = merged.sources.len(),
            "screening completed"
        );
        Ok(merged)
    }
}
