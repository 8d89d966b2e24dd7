use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::response::Response;
use serde_json::{json, Value};
use tokio::sync::{Notify, Semaphore};

use crate::backend::TransportError;
use crate::providers::{Provider, ProviderApi, ProviderDirectory, ProviderDraft, ProviderId};
use crate::screening::{RiskApi, ScreeningAggregator, ScreeningService, ScreeningTarget};

pub(super) const LEGAL_NAME: &str = "Acme Trading S.A.C.";

enum Scripted {
    Reply(Value),
    Fail(u16),
}

/// Risk API double answering from a script keyed by source (`"all"` for the
/// all-sources lookup). Unscripted sources answer with zero hits.
#[derive(Default)]
pub(super) struct ScriptedRiskApi {
    replies: HashMap<String, Scripted>,
    waits: HashMap<String, Arc<Notify>>,
    releases: HashMap<String, Arc<Notify>>,
    gate: Option<Arc<Semaphore>>,
    pub(super) calls: Mutex<Vec<String>>,
    pub(super) completed: Mutex<Vec<String>>,
}

impl ScriptedRiskApi {
    pub(super) fn new() -> Self {
        Self::default()
    }

    pub(super) fn reply(mut self, source: &str, payload: Value) -> Self {
        self.replies.insert(source.to_string(), Scripted::Reply(payload));
        self
    }

    pub(super) fn fail(mut self, source: &str, status: u16) -> Self {
        self.replies.insert(source.to_string(), Scripted::Fail(status));
        self
    }

    /// `waiting` answers only after `releaser` has answered.
    pub(super) fn release_after(mut self, waiting: &str, releaser: &str) -> Self {
        let notify = Arc::new(Notify::new());
        self.waits.insert(waiting.to_string(), notify.clone());
        self.releases.insert(releaser.to_string(), notify);
        self
    }

    /// Every lookup waits for a permit from `gate`.
    pub(super) fn gated(mut self, gate: Arc<Semaphore>) -> Self {
        self.gate = Some(gate);
        self
    }

    pub(super) fn calls(&self) -> Vec<String> {
        self.calls.lock().expect("calls mutex poisoned").clone()
    }

    pub(super) fn completed(&self) -> Vec<String> {
        self.completed.lock().expect("completed mutex poisoned").clone()
    }

    async fn respond(&self, key: &str) -> Result<Value, TransportError> {
        self.calls
            .lock()
            .expect("calls mutex poisoned")
            .push(key.to_string());

        if let Some(gate) = &self.gate {
            gate.acquire().await.expect("gate stays open").forget();
        }
        if let Some(notify) = self.waits.get(key) {
            notify.notified().await;
        }

        let reply = match self.replies.get(key) {
            Some(Scripted::Reply(payload)) => Ok(payload.clone()),
            Some(Scripted::Fail(status)) => Err(TransportError::Status {
                url: format!("memory://risk/{key}"),
                status: *status,
                message: None,
            }),
            None => Ok(json!({"source": key, "hits": 0, "results": []})),
        };

        if let Some(notify) = self.releases.get(key) {
            notify.notify_one();
        }
        self.completed
            .lock()
            .expect("completed mutex poisoned")
            .push(key.to_string());
        reply
    }
}

#[async_trait]
impl RiskApi for ScriptedRiskApi {
    async fn screen_all(&self, _provider_id: ProviderId) -> Result<Value, TransportError> {
        self.respond("all").await
    }

    async fn screen_source(
        &self,
        _provider_id: ProviderId,
        api_identifier: &str,
    ) -> Result<Value, TransportError> {
        self.respond(api_identifier).await
    }
}

/// Read-only provider backend.
pub(super) struct StaticProviders(pub(super) Vec<Provider>);

#[async_trait]
impl ProviderApi for StaticProviders {
    async fn list(&self) -> Result<Vec<Provider>, TransportError> {
        Ok(self.0.clone())
    }

    async fn create(&self, _draft: &ProviderDraft) -> Result<(), TransportError> {
        Ok(())
    }

    async fn update(&self, _id: ProviderId, _draft: &ProviderDraft) -> Result<(), TransportError> {
        Ok(())
    }

    async fn delete(&self, _id: ProviderId) -> Result<(), TransportError> {
        Ok(())
    }
}

pub(super) fn target() -> ScreeningTarget {
    ScreeningTarget::new(ProviderId(7), LEGAL_NAME)
}

pub(super) fn provider() -> Provider {
    Provider {
        id: Some(ProviderId(7)),
        legal_name: LEGAL_NAME.to_string(),
        tax_id: "20123456789".to_string(),
        country: "Peru".to_string(),
        last_updated: "2025-03-01T12:00:00".to_string(),
        ..Provider::default()
    }
}

pub(super) fn aggregator(
    api: ScriptedRiskApi,
) -> (ScreeningAggregator<ScriptedRiskApi>, Arc<ScriptedRiskApi>) {
    let api = Arc::new(api);
    (ScreeningAggregator::new(api.clone()), api)
}

pub(super) fn service(
    api: ScriptedRiskApi,
) -> (
    Arc<ScreeningService<ScriptedRiskApi, StaticProviders>>,
    Arc<ScriptedRiskApi>,
) {
    let (aggregator, api) = aggregator(api);
    let directory = Arc::new(ProviderDirectory::new(Arc::new(StaticProviders(vec![
        provider(),
    ]))));
    (Arc::new(ScreeningService::new(aggregator, directory)), api)
}

pub(super) fn world_bank_matches(count: usize) -> Value {
    let results: Vec<Value> = (1..=count)
        .map(|n| json!({"firm_name": format!("Firm {n}"), "country": "Peru"}))
        .collect();
    json!({"source": "world-bank", "hits": count, "results": results})
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 256 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
