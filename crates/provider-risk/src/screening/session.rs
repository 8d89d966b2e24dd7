use serde::Serialize;
use tracing::{debug, info, warn};

use super::aggregator::{ScreeningAggregator, ScreeningError, ScreeningTarget};
use super::client::RiskApi;
use super::payload::RiskResponse;
use super::presenter::{PageState, ScreeningView};
use super::selection::Selection;
use super::sources::SourceCatalog;

/// Lifecycle of the latest screening run in a session.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum ScreeningStatus {
    #[default]
    Idle,
    Loading,
    Ready(RiskResponse),
    Failed {
        message: String,
    },
}

impl ScreeningStatus {
    pub fn label(&self) -> &'static str {
        match self {
            ScreeningStatus::Idle => "idle",
            ScreeningStatus::Loading => "loading",
            ScreeningStatus::Ready(_) => "ready",
            ScreeningStatus::Failed { .. } => "failed",
        }
    }

    pub fn result(&self) -> Option<&RiskResponse> {
        match self {
            ScreeningStatus::Ready(result) => Some(result),
            _ => None,
        }
    }
}

/// Snapshot of a scheduled run. Outcomes are applied only while the ticket
/// still matches the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScreeningTicket {
    generation: u64,
    target: ScreeningTarget,
    selection: Selection,
}

impl ScreeningTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn target(&self) -> &ScreeningTarget {
        &self.target
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub async fn run<R>(
        &self,
        aggregator: &ScreeningAggregator<R>,
    ) -> Result<RiskResponse, ScreeningError>
    where
        R: RiskApi + ?Sized,
    {
        aggregator.run(&self.target, &self.selection).await
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    Applied,
    DiscardedStale,
}

/// Screening view state for one operator: target, selection and latest run.
#[derive(Debug, Clone, Default)]
pub struct ScreeningSession {
    target: Option<ScreeningTarget>,
    selection: Selection,
    generation: u64,
    status: ScreeningStatus,
    pages: PageState,
}

impl ScreeningSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn opened(target: ScreeningTarget) -> Self {
        let mut session = Self::new();
        session.open(target);
        session
    }

    /// Points the session at `target` and forgets everything else; runs
    /// still in flight become stale.
    pub fn open(&mut self, target: ScreeningTarget) {
        self.reset();
        info!(provider_id = %target.provider_id, "screening session opened");
        self.target = Some(target);
    }

    pub fn close(&mut self) {
        self.reset();
        self.target = None;
    }

    fn reset(&mut self) {
        self.generation += 1;
        self.selection = Selection::empty();
        self.status = ScreeningStatus::Idle;
        self.pages.reset();
    }

    pub fn target(&self) -> Option<&ScreeningTarget> {
        self.target.as_ref()
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn status(&self) -> &ScreeningStatus {
        &self.status
    }

    /// Applies a click on `source_id`. Returns the run to execute when the
    /// resulting selection is non-empty.
    pub fn toggle(&mut self, source_id: &str) -> Option<ScreeningTicket> {
        let target = self.target.clone()?;
        if self.selection.is_disabled(source_id) {
            debug!(source_id, "ignoring click on disabled source");
            return None;
        }

        let next = self.selection.toggle(source_id);
        if next == self.selection {
            return None;
        }

        self.generation += 1;
        self.selection = next;

        if self.selection.is_empty() {
            if self.status == ScreeningStatus::Loading {
                self.status = ScreeningStatus::Idle;
            }
            return None;
        }

        self.status = ScreeningStatus::Loading;
        self.pages.reset();
        Some(ScreeningTicket {
            generation: self.generation,
            target,
            selection: self.selection.clone(),
        })
    }

    pub fn apply(
        &mut self,
        ticket: &ScreeningTicket,
        outcome: Result<RiskResponse, ScreeningError>,
    ) -> ApplyOutcome {
        let current = ticket.generation == self.generation
            && self.target.as_ref() == Some(&ticket.target)
            && self.selection == ticket.selection;
        if !current {
            debug!(
                ticket_generation = ticket.generation,
                session_generation = self.generation,
                "discarding stale screening outcome"
            );
            return ApplyOutcome::DiscardedStale;
        }

        self.status = match outcome {
            Ok(result) => ScreeningStatus::Ready(result),
            Err(error) => {
                warn!(
                    provider_id = %ticket.target.provider_id,
                    %error,
                    "screening run failed"
                );
                ScreeningStatus::Failed {
                    message: error.user_message().to_string(),
                }
            }
        };
        self.pages.reset();
        ApplyOutcome::Applied
    }

    /// Moves one match table to `page`. Returns false when there is no such table.
    pub fn set_page(&mut self, entry: usize, page: usize) -> bool {
        let has_table = self
            .status
            .result()
            .and_then(|result| result.sources.get(entry))
            .is_some_and(|source| source.hits > 0);
        if has_table {
            self.pages.set(entry, page);
        }
        has_table
    }

    pub fn view(&self, catalog: &SourceCatalog) -> SessionView {
        let options = catalog
            .descriptors()
            .iter()
            .map(|descriptor| SourceOption {
                id: descriptor.id,
                display_name: descriptor.display_name,
                selected: self.selection.contains(descriptor.id),
                disabled: self.selection.is_disabled(descriptor.id),
            })
            .collect();

        let (message, result) = match &self.status {
            ScreeningStatus::Failed { message } => (Some(message.clone()), None),
            ScreeningStatus::Ready(result) => (
                None,
                Some(ScreeningView::render(result, catalog, &self.pages)),
            ),
            ScreeningStatus::Idle | ScreeningStatus::Loading => (None, None),
        };

        SessionView {
            target: self.target.clone(),
            selection: self.selection.clone(),
            generation: self.generation,
            status: self.status.label(),
            options,
            message,
            result,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceOption {
    pub id: &'static str,
    pub display_name: &'static str,
    pub selected: bool,
    pub disabled: bool,
}

/// Serializable projection of a session.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionView {
    pub target: Option<ScreeningTarget>,
    pub selection: Selection,
    pub generation: u64,
    pub status: &'static str,
    pub options: Vec<SourceOption>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<ScreeningView>,
}
