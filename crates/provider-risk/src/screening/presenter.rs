//! Rendering of a [`RiskResponse`] into summary rows and per-source match tables.

use std::collections::BTreeMap;
use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;
use serde_json::Value;

use super::payload::{RiskResponse, RiskSourceResult};
use super::sources::SourceCatalog;
use crate::pagination::{PageInfo, Paginator};

/// Placeholder shown for missing or null cells.
pub const EMPTY_CELL: &str = "-";

const KNOWN_LABELS: [(&str, &str); 5] = [
    ("OFAC", "ofac"),
    ("Offshore Leaks", "offshore-leaks"),
    ("offshore leaks", "offshore-leaks"),
    ("The World Bank", "world-bank"),
    ("the world bank", "world-bank"),
];

/// One step of source label normalization, tried in [`NORMALIZATION_RULES`] order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NormalizationRule {
    /// Exact, case-sensitive match against the known label table.
    KnownLabel,
    /// Lowercased label looked up in the same table.
    KnownLabelIgnoringCase,
    /// Keyword containment: `offshore`, then `world`/`bank`, then `ofac`.
    Keyword,
    /// Lowercase with every whitespace run replaced by `-`, edges included.
    /// Always applies.
    Slug,
}

pub const NORMALIZATION_RULES: [NormalizationRule; 4] = [
    NormalizationRule::KnownLabel,
    NormalizationRule::KnownLabelIgnoringCase,
    NormalizationRule::Keyword,
    NormalizationRule::Slug,
];

impl NormalizationRule {
    pub fn apply(self, label: &str) -> Option<String> {
        match self {
            NormalizationRule::KnownLabel => known_label(label),
            NormalizationRule::KnownLabelIgnoringCase => known_label(&label.to_lowercase()),
            NormalizationRule::Keyword => {
                let lower = label.to_lowercase();
                let key = if lower.contains("offshore") {
                    "offshore-leaks"
                } else if lower.contains("world") || lower.contains("bank") {
                    "world-bank"
                } else if lower.contains("ofac") {
                    "ofac"
                } else {
                    return None;
                };
                Some(key.to_string())
            }
            NormalizationRule::Slug => Some(
                whitespace_runs()
                    .replace_all(&label.to_lowercase(), "-")
                    .trim()
                    .to_string(),
            ),
        }
    }
}

fn whitespace_runs() -> &'static Regex {
    static WHITESPACE_RUNS: OnceLock<Regex> = OnceLock::new();
    WHITESPACE_RUNS.get_or_init(|| Regex::new(r"\s+").expect("static pattern compiles"))
}

fn known_label(label: &str) -> Option<String> {
    KNOWN_LABELS
        .iter()
        .find(|(known, _)| *known == label)
        .map(|(_, key)| key.to_string())
}

/// Canonical lowercase hyphenated key for a raw upstream source label.
pub fn normalize_source_name(label: &str) -> String {
    NORMALIZATION_RULES
        .iter()
        .find_map(|rule| rule.apply(label))
        .unwrap_or_default()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ColumnSpec {
    pub key: &'static str,
    pub label: &'static str,
}

const fn column(key: &'static str, label: &'static str) -> ColumnSpec {
    ColumnSpec { key, label }
}

const WORLD_BANK_COLUMNS: &[ColumnSpec] = &[
    column("firm_name", "Firm Name"),
    column("address", "Address"),
    column("country", "Country"),
    column("from_date", "From Date"),
    column("to_date", "To Date"),
    column("grounds", "Grounds"),
];

const OFFSHORE_LEAKS_COLUMNS: &[ColumnSpec] = &[
    column("entity_name", "Entity"),
    column("entity_url", "Entity URL"),
    column("jurisdiction", "Jurisdiction"),
    column("linked_to", "Linked To"),
    column("data_from", "Data From"),
];

const OFAC_COLUMNS: &[ColumnSpec] = &[
    column("name", "Name"),
    column("name_url", "Name URL"),
    column("address", "Address"),
    column("type", "Type"),
    column("programs", "Program(s)"),
    column("list", "List"),
    column("score", "Score"),
];

/// How the match records of one source are laid out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableLayout {
    Columns(&'static [ColumnSpec]),
    /// Unknown source: one "Data" column holding the pretty-printed record.
    RawRecord,
}

impl TableLayout {
    pub fn for_source(normalized: &str) -> Self {
        match normalized {
            "world-bank" => TableLayout::Columns(WORLD_BANK_COLUMNS),
            "offshore-leaks" => TableLayout::Columns(OFFSHORE_LEAKS_COLUMNS),
            "ofac" => TableLayout::Columns(OFAC_COLUMNS),
            _ => TableLayout::RawRecord,
        }
    }

    pub fn headers(&self) -> Vec<String> {
        match self {
            TableLayout::Columns(columns) => {
                columns.iter().map(|column| column.label.to_string()).collect()
            }
            TableLayout::RawRecord => vec!["Data".to_string()],
        }
    }

    pub fn cells(&self, record: &Value) -> Vec<String> {
        match self {
            TableLayout::Columns(columns) => columns
                .iter()
                .map(|column| cell_value(record.get(column.key)))
                .collect(),
            TableLayout::RawRecord => vec![serde_json::to_string_pretty(record)
                .unwrap_or_else(|_| record.to_string())],
        }
    }
}

/// Text for one table cell.
pub fn cell_value(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => EMPTY_CELL.to_string(),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| match item {
                Value::String(text) => text.clone(),
                other => other.to_string(),
            })
            .collect::<Vec<_>>()
            .join(", "),
        Some(Value::String(text)) => text.clone(),
        Some(other) => other.to_string(),
    }
}

/// Current page of each match table, keyed by entry index.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageState {
    pages: BTreeMap<usize, usize>,
}

impl PageState {
    pub fn page_for(&self, entry: usize) -> usize {
        self.pages.get(&entry).copied().unwrap_or(1)
    }

    pub fn set(&mut self, entry: usize, page: usize) {
        self.pages.insert(entry, page.max(1));
    }

    pub fn reset(&mut self) {
        self.pages.clear();
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MatchStatus {
    Match,
    Clear,
}

impl MatchStatus {
    pub fn label(&self) -> &'static str {
        match self {
            MatchStatus::Match => "MATCH",
            MatchStatus::Clear => "CLEAR",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SummaryRow {
    pub source: String,
    pub display_name: String,
    pub hits: u64,
    pub status: MatchStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatchRow {
    pub number: usize,
    pub cells: Vec<String>,
}

/// One page of matches for a source with hits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatchTable {
    pub entry: usize,
    pub source: String,
    pub display_name: String,
    pub normalized_source: String,
    pub hits: u64,
    pub headers: Vec<String>,
    pub rows: Vec<MatchRow>,
    pub page: PageInfo,
}

/// Everything needed to show a screening result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScreeningView {
    pub entity_name: String,
    pub total_hits: u64,
    pub risk_detected: bool,
    pub headline: &'static str,
    pub summary: Vec<SummaryRow>,
    pub tables: Vec<MatchTable>,
}

impl ScreeningView {
    pub fn render(result: &RiskResponse, catalog: &SourceCatalog, pages: &PageState) -> Self {
        Self::render_with(result, catalog, pages, Paginator::default())
    }

    pub fn render_with(
        result: &RiskResponse,
        catalog: &SourceCatalog,
        pages: &PageState,
        paginator: Paginator,
    ) -> Self {
        let summary = result
            .sources
            .iter()
            .map(|entry| SummaryRow {
                source: entry.source.clone(),
                display_name: catalog.display_name(&entry.source).to_string(),
                hits: entry.hits,
                status: if entry.hits > 0 {
                    MatchStatus::Match
                } else {
                    MatchStatus::Clear
                },
            })
            .collect();

        let tables = result
            .sources
            .iter()
            .enumerate()
            .filter(|(_, entry)| entry.hits > 0)
            .map(|(index, entry)| {
                match_table(index, entry, catalog, paginator, pages.page_for(index))
            })
            .collect();

        let risk_detected = result.has_hits();
        Self {
            entity_name: result.entity_name.clone(),
            total_hits: result.total_hits,
            risk_detected,
            headline: if risk_detected {
                "Risk Detected"
            } else {
                "No Risk Found"
            },
            summary,
            tables,
        }
    }
}

fn match_table(
    index: usize,
    entry: &RiskSourceResult,
    catalog: &SourceCatalog,
    paginator: Paginator,
    page: usize,
) -> MatchTable {
    let normalized = normalize_source_name(&entry.source);
    let layout = TableLayout::for_source(&normalized);
    let (records, info) = paginator.slice(&entry.results, page);
    let first = info.first_row_number();

    MatchTable {
        entry: index,
        source: entry.source.clone(),
        display_name: catalog.display_name(&entry.source).to_string(),
        normalized_source: normalized,
        hits: entry.hits,
        headers: layout.headers(),
        rows: records
            .iter()
            .enumerate()
            .map(|(offset, record)| MatchRow {
                number: first + offset,
                cells: layout.cells(record),
            })
            .collect(),
        page: info,
    }
}
