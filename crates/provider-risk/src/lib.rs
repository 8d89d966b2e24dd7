//! Provider records and multi-source risk screening.
//!
//! The [`screening`] module owns the selection rules, the concurrent lookup
//! fan-out and the reduction of heterogeneous upstream payloads into one
//! [`screening::RiskResponse`]. The [`providers`] module covers the record
//! store the screenings are run against.

pub mod backend;
pub mod config;
pub mod error;
pub mod pagination;
pub mod providers;
pub mod screening;
pub mod telemetry;
