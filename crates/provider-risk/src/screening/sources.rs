use serde::Serialize;
use std::sync::OnceLock;

/// Identifier of the "query every source" sentinel.
pub const ALL_SOURCES_ID: &str = "all";

/// Upper bound on explicitly chosen (non-sentinel) sources.
pub const MAX_EXPLICIT_SOURCES: usize = 3;

/// Static catalog entry for one screening source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SourceDescriptor {
    pub id: &'static str,
    pub display_name: &'static str,
    pub api_identifier: &'static str,
}

impl SourceDescriptor {
    pub fn is_sentinel(&self) -> bool {
        self.id == ALL_SOURCES_ID
    }
}

/// Immutable list of known screening sources, sentinel first.
#[derive(Debug)]
pub struct SourceCatalog {
    descriptors: Vec<SourceDescriptor>,
}

static STANDARD_CATALOG: OnceLock<SourceCatalog> = OnceLock::new();

impl SourceCatalog {
    pub fn new(descriptors: Vec<SourceDescriptor>) -> Self {
        Self { descriptors }
    }

    /// Process-wide catalog of the sources the risk API understands.
    pub fn standard() -> &'static SourceCatalog {
        STANDARD_CATALOG.get_or_init(|| {
            Self::new(vec![
                SourceDescriptor {
                    id: ALL_SOURCES_ID,
                    display_name: "All Sources (Automatic)",
                    api_identifier: "all",
                },
                SourceDescriptor {
                    id: "ofac",
                    display_name: "OFAC",
                    api_identifier: "ofac",
                },
                SourceDescriptor {
                    id: "offshore-leaks",
                    display_name: "Offshore Leaks",
                    api_identifier: "offshore-leaks",
                },
                SourceDescriptor {
                    id: "world-bank",
                    display_name: "The World Bank",
                    api_identifier: "world-bank",
                },
            ])
        })
    }

    pub fn descriptors(&self) -> &[SourceDescriptor] {
        &self.descriptors
    }

    pub fn get(&self, id: &str) -> Option<&SourceDescriptor> {
        self.descriptors.iter().find(|descriptor| descriptor.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// Identifier sent to the risk API; unknown ids are passed through.
    pub fn api_identifier<'a>(&'a self, id: &'a str) -> &'a str {
        self.get(id)
            .map(|descriptor| descriptor.api_identifier)
            .unwrap_or(id)
    }

    /// Human label for a source as reported by the risk API.
    pub fn display_name<'a>(&'a self, source_label: &'a str) -> &'a str {
        self.descriptors
            .iter()
            .find(|descriptor| {
                descriptor.api_identifier == source_label || descriptor.id == source_label
            })
            .map(|descriptor| descriptor.display_name)
            .unwrap_or(source_label)
    }
}
