use std::cmp::Ordering;
use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Backend-assigned provider identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProviderId(pub u64);

impl fmt::Display for ProviderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Provider record as stored by the backend.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Provider {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<ProviderId>,
    pub legal_name: String,
    pub trade_name: String,
    pub tax_id: String,
    pub phone: String,
    pub email: String,
    pub website: String,
    /// The backend spells this field `addresss`.
    #[serde(rename = "addresss")]
    pub address: String,
    pub country: String,
    pub annual_revenue: f64,
    pub last_updated: String,
}

impl Provider {
    pub fn last_updated_at(&self) -> Option<NaiveDateTime> {
        parse_timestamp(&self.last_updated)
    }

    /// Newest first; records without a readable timestamp sink to the end.
    pub fn cmp_recent_first(&self, other: &Provider) -> Ordering {
        match (self.last_updated_at(), other.last_updated_at()) {
            (Some(left), Some(right)) => right.cmp(&left),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        }
    }

    pub fn draft(&self) -> ProviderDraft {
        ProviderDraft {
            legal_name: self.legal_name.clone(),
            trade_name: self.trade_name.clone(),
            tax_id: self.tax_id.clone(),
            phone: self.phone.clone(),
            email: self.email.clone(),
            website: self.website.clone(),
            address: self.address.clone(),
            country: self.country.clone(),
            annual_revenue: self.annual_revenue,
        }
    }
}

/// Provider fields an operator submits; the backend owns `id` and `lastUpdated`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProviderDraft {
    pub legal_name: String,
    pub trade_name: String,
    pub tax_id: String,
    pub phone: String,
    pub email: String,
    pub website: String,
    #[serde(rename = "addresss")]
    pub address: String,
    pub country: String,
    pub annual_revenue: f64,
}

/// Update body: the draft plus the id being updated.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ProviderUpdate<'a> {
    pub(crate) id: ProviderId,
    #[serde(flatten)]
    pub(crate) draft: &'a ProviderDraft,
}

fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.naive_utc());
    }

    // ASP.NET-style backends commonly omit the offset.
    if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(dt);
    }

    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0);
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn deserializes_backend_record_with_misspelled_address() {
        let provider: Provider = serde_json::from_value(json!({
            "id": 7,
            "legalName": "Acme Trading S.A.C.",
            "tradeName": "Acme",
            "taxId": "20123456789",
            "phone": "+51 1 555 0101",
            "email": "compliance@acme.pe",
            "website": "https://acme.pe",
            "addresss": "Av. Arequipa 123",
            "country": "Peru",
            "annualRevenue": 1250000.5,
            "lastUpdated": "2025-03-02T14:05:00"
        }))
        .expect("record deserializes");

        assert_eq!(provider.id, Some(ProviderId(7)));
        assert_eq!(provider.address, "Av. Arequipa 123");
        assert!(provider.last_updated_at().is_some());
    }

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let provider: Provider =
            serde_json::from_value(json!({"id": 3, "legalName": "Solo"})).expect("deserializes");
        assert_eq!(provider.tax_id, "");
        assert_eq!(provider.annual_revenue, 0.0);
        assert!(provider.last_updated_at().is_none());
    }

    #[test]
    fn update_body_flattens_draft_and_keeps_id() {
        let draft = ProviderDraft {
            legal_name: "Acme".to_string(),
            address: "Main St".to_string(),
            ..ProviderDraft::default()
        };
        let body = serde_json::to_value(ProviderUpdate {
            id: ProviderId(4),
            draft: &draft,
        })
        .expect("serializes");

        assert_eq!(body["id"], 4);
        assert_eq!(body["legalName"], "Acme");
        assert_eq!(body["addresss"], "Main St");
        assert!(body.get("lastUpdated").is_none());
    }

    #[test]
    fn recent_first_ordering_handles_mixed_timestamp_formats() {
        let older = Provider {
            last_updated: "2024-12-31".to_string(),
            ..Provider::default()
        };
        let newer = Provider {
            last_updated: "2025-01-02T08:00:00Z".to_string(),
            ..Provider::default()
        };
        let unknown = Provider {
            last_updated: "yesterday".to_string(),
            ..Provider::default()
        };

        assert_eq!(newer.cmp_recent_first(&older), Ordering::Less);
        assert_eq!(older.cmp_recent_first(&unknown), Ordering::Less);
        assert_eq!(unknown.cmp_recent_first(&newer), Ordering::Greater);
    }
}
