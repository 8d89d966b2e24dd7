//! Multi-source risk screening.
//!
//! A [`ScreeningSession`] tracks the operator's [`Selection`]; each change
//! that leaves the selection non-empty yields a [`ScreeningTicket`]. The
//! [`ScreeningAggregator`] runs the ticket against a [`RiskApi`], classifies
//! every upstream payload and merges them in request order. The
//! [`presenter`] turns the merged [`RiskResponse`] into summary rows and
//! per-source match tables.

pub mod aggregator;
pub mod client;
pub mod merge;
pub mod payload;
pub mod presenter;
pub mod registry;
pub mod router;
pub mod selection;
pub mod service;
pub mod session;
pub mod sources;

#[cfg(test)]
mod tests;

pub use aggregator::{
    ScreeningAggregator, ScreeningError, ScreeningTarget, SCREENING_FAILURE_MESSAGE,
};
pub use client::{HttpRiskApi, RiskApi};
pub use merge::merge_payloads;
pub use payload::{RiskPayload, RiskResponse, RiskSourceResult};
pub use presenter::{normalize_source_name, PageState, ScreeningView, TableLayout};
pub use registry::{SessionId, SessionRegistry};
pub use router::screening_router;
pub use selection::{LookupPlan, Selection};
pub use service::{ScreeningService, ScreeningServiceError, ToggleOutcome};
pub use session::{ApplyOutcome, ScreeningSession, ScreeningStatus, ScreeningTicket, SessionView};
pub use sources::{SourceCatalog, SourceDescriptor, ALL_SOURCES_ID, MAX_EXPLICIT_SOURCES};
