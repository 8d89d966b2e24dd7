use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Matches reported by one source.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RiskSourceResult {
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub hits: u64,
    #[serde(default)]
    pub results: Vec<Value>,
}

impl RiskSourceResult {
    /// Zero-hit entry used when a response could not be read.
    pub fn placeholder(source: impl Into<String>, hits: u64) -> Self {
        Self {
            source: source.into(),
            hits,
            results: Vec::new(),
        }
    }

    /// Reads one breakdown entry without failing on missing or mistyped fields.
    pub fn from_lenient(entry: &Value) -> Self {
        match entry {
            Value::Object(fields) => Self {
                source: fields.get("source").map(label_of).unwrap_or_default(),
                hits: count_field(fields, "hits"),
                results: list_field(fields, "results"),
            },
            other => Self::placeholder(label_of(other), 0),
        }
    }
}

/// Unified screening result across every requested source.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RiskResponse {
    #[serde(default)]
    pub entity_name: String,
    #[serde(default)]
    pub total_hits: u64,
    #[serde(default)]
    pub sources: Vec<RiskSourceResult>,
}

impl RiskResponse {
    pub fn has_hits(&self) -> bool {
        self.total_hits > 0
    }

    pub fn sum_of_source_hits(&self) -> u64 {
        self.sources.iter().map(|entry| entry.hits).sum()
    }
}

/// Shape of a payload returned by the risk API.
///
/// Classification order is fixed: a payload that carries `source` and
/// `results` is single-source even if it also has a `sources` field.
#[derive(Debug, Clone, PartialEq)]
pub enum RiskPayload {
    /// `{ source, hits, results }`
    SingleSource(RiskSourceResult),
    /// `{ entity_name?, total_hits, sources: [...] }`
    Unified {
        entity_name: Option<String>,
        total_hits: u64,
        sources: Vec<RiskSourceResult>,
    },
    /// `sources` present but not a list.
    OpaqueSources(Value),
    /// Nothing recognizable; the raw payload is kept for diagnostics.
    Unrecognized(Value),
}

impl RiskPayload {
    pub fn classify(payload: Value) -> Self {
        let fields = match payload {
            Value::Object(fields) => fields,
            other => return RiskPayload::Unrecognized(other),
        };

        let source = fields.get("source").filter(|value| is_truthy(value));
        let results = fields.get("results").filter(|value| is_truthy(value));
        if let (Some(source), Some(_)) = (source, results) {
            return RiskPayload::SingleSource(RiskSourceResult {
                source: label_of(source),
                hits: count_field(&fields, "hits"),
                results: list_field(&fields, "results"),
            });
        }

        let sources = fields.get("sources");
        if let Some(Value::Array(entries)) = sources {
            return RiskPayload::Unified {
                entity_name: fields
                    .get("entity_name")
                    .and_then(Value::as_str)
                    .filter(|name| !name.trim().is_empty())
                    .map(str::to_string),
                total_hits: count_field(&fields, "total_hits"),
                sources: entries.iter().map(RiskSourceResult::from_lenient).collect(),
            };
        }

        if let Some(opaque) = sources.filter(|value| is_truthy(value)) {
            return RiskPayload::OpaqueSources(opaque.clone());
        }

        RiskPayload::Unrecognized(Value::Object(fields))
    }

    pub fn kind(&self) -> &'static str {
        match self {
            RiskPayload::SingleSource(_) => "single_source",
            RiskPayload::Unified { .. } => "unified",
            RiskPayload::OpaqueSources(_) => "opaque_sources",
            RiskPayload::Unrecognized(_) => "unrecognized",
        }
    }

    /// Best-effort hit count for payloads that could not be classified.
    pub fn fallback_hits(&self) -> u64 {
        match self {
            RiskPayload::Unrecognized(raw) => best_effort_hits(raw),
            _ => 0,
        }
    }
}

pub(crate) fn best_effort_hits(raw: &Value) -> u64 {
    match raw {
        Value::Object(fields) => count_field(fields, "total_hits"),
        _ => 0,
    }
}

/// Truthiness as the risk API's own clients judge optional fields.
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().is_some_and(|n| n != 0.0 && !n.is_nan()),
        Value::String(text) => !text.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn label_of(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn count_field(fields: &Map<String, Value>, key: &str) -> u64 {
    match fields.get(key) {
        Some(Value::Number(number)) => number.as_u64().unwrap_or_else(|| {
            number
                .as_f64()
                .filter(|n| n.is_finite() && *n > 0.0)
                .map(|n| n.trunc() as u64)
                .unwrap_or(0)
        }),
        Some(Value::String(text)) => text.trim().parse().unwrap_or(0),
        _ => 0,
    }
}

fn list_field(fields: &Map<String, Value>, key: &str) -> Vec<Value> {
    match fields.get(key) {
        Some(Value::Array(items)) => items.clone(),
        _ => Vec::new(),
    }
}
