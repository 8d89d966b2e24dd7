use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::response::Response;
use serde_json::Value;

use crate::backend::TransportError;
use crate::providers::{
    Provider, ProviderApi, ProviderDirectory, ProviderDraft, ProviderForm, ProviderId,
};

/// In-memory `/Providers` backend.
#[derive(Default)]
pub(super) struct MemoryProviderApi {
    pub(super) records: Mutex<Vec<Provider>>,
    sequence: AtomicU64,
    pub(super) list_fails: AtomicBool,
    pub(super) rejection: Mutex<Option<String>>,
    pub(super) list_calls: AtomicU64,
}

impl MemoryProviderApi {
    pub(super) fn seeded(records: Vec<Provider>) -> Self {
        let api = Self::default();
        api.sequence.store(records.len() as u64, Ordering::SeqCst);
        *api.records.lock().expect("records mutex poisoned") = records;
        api
    }

    pub(super) fn reject_with(&self, message: Option<&str>) {
        *self.rejection.lock().expect("rejection mutex poisoned") =
            Some(message.unwrap_or_default().to_string());
    }

    fn check_rejection(&self, url: &str) -> Result<(), TransportError> {
        match self.rejection.lock().expect("rejection mutex poisoned").clone() {
            Some(message) => Err(TransportError::Status {
                url: url.to_string(),
                status: 400,
                message: (!message.is_empty()).then_some(message),
            }),
            None => Ok(()),
        }
    }

    fn stamp(&self) -> (u64, String) {
        let next = self.sequence.fetch_add(1, Ordering::SeqCst) + 1;
        (next, format!("2025-02-{:02}T09:00:00", next.min(28)))
    }
}

#[async_trait]
impl ProviderApi for MemoryProviderApi {
    async fn list(&self) -> Result<Vec<Provider>, TransportError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        if self.list_fails.load(Ordering::SeqCst) {
            return Err(TransportError::Status {
                url: "memory://Providers".to_string(),
                status: 503,
                message: None,
            });
        }
        Ok(self.records.lock().expect("records mutex poisoned").clone())
    }

    async fn create(&self, draft: &ProviderDraft) -> Result<(), TransportError> {
        self.check_rejection("memory://Providers")?;
        let (id, last_updated) = self.stamp();
        self.records
            .lock()
            .expect("records mutex poisoned")
            .push(provider(id, draft, &last_updated));
        Ok(())
    }

    async fn update(&self, id: ProviderId, draft: &ProviderDraft) -> Result<(), TransportError> {
        self.check_rejection("memory://Providers/id")?;
        let (_, last_updated) = self.stamp();
        let mut records = self.records.lock().expect("records mutex poisoned");
        match records.iter_mut().find(|record| record.id == Some(id)) {
            Some(record) => {
                *record = provider(id.0, draft, &last_updated);
                Ok(())
            }
            None => Err(TransportError::Status {
                url: format!("memory://Providers/{id}"),
                status: 404,
                message: None,
            }),
        }
    }

    async fn delete(&self, id: ProviderId) -> Result<(), TransportError> {
        self.check_rejection("memory://Providers/id")?;
        self.records
            .lock()
            .expect("records mutex poisoned")
            .retain(|record| record.id != Some(id));
        Ok(())
    }
}

fn provider(id: u64, draft: &ProviderDraft, last_updated: &str) -> Provider {
    Provider {
        id: Some(ProviderId(id)),
        legal_name: draft.legal_name.clone(),
        trade_name: draft.trade_name.clone(),
        tax_id: draft.tax_id.clone(),
        phone: draft.phone.clone(),
        email: draft.email.clone(),
        website: draft.website.clone(),
        address: draft.address.clone(),
        country: draft.country.clone(),
        annual_revenue: draft.annual_revenue,
        last_updated: last_updated.to_string(),
    }
}

pub(super) fn record(id: u64, legal_name: &str, country: &str, last_updated: &str) -> Provider {
    Provider {
        id: Some(ProviderId(id)),
        legal_name: legal_name.to_string(),
        trade_name: format!("{legal_name} Trade"),
        tax_id: format!("2010000{id:04}"),
        email: "ops@example.com".to_string(),
        country: country.to_string(),
        last_updated: last_updated.to_string(),
        ..Provider::default()
    }
}

pub(super) fn seeded_records() -> Vec<Provider> {
    vec![
        record(1, "Andes Mining S.A.", "Peru", "2025-01-05T10:00:00"),
        record(2, "Baltic Freight OU", "Estonia", "2025-01-20T10:00:00"),
        record(3, "Cordillera Foods", "Chile", "not a date"),
        record(4, "Delta Logistics", "Peru", "2025-01-12T08:30:00Z"),
    ]
}

pub(super) fn form() -> ProviderForm {
    ProviderForm {
        legal_name: "Evergreen Textiles".to_string(),
        trade_name: "Evergreen".to_string(),
        tax_id: "20999888777".to_string(),
        phone: "+51 987 654 321".to_string(),
        email: "kyc@evergreen.pe".to_string(),
        website: "https://evergreen.pe".to_string(),
        address: "Jr. Lampa 450".to_string(),
        country: "Peru".to_string(),
        annual_revenue: "500000".to_string(),
    }
}

pub(super) fn directory(
    api: MemoryProviderApi,
) -> (ProviderDirectory<MemoryProviderApi>, Arc<MemoryProviderApi>) {
    let api = Arc::new(api);
    (ProviderDirectory::new(api.clone()), api)
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
