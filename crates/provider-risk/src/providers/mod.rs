//! Provider records: wire model, form validation, backend API and the cached
//! directory the screening views are opened from.

pub mod api;
pub mod directory;
pub mod domain;
pub mod router;
pub mod validation;

#[cfg(test)]
mod tests;

pub use api::{HttpProviderApi, ProviderApi};
pub use directory::{
    ProviderDirectory, ProviderError, ProviderFilter, ProviderPage, SUBMIT_FAILURE_MESSAGE,
};
pub use domain::{Provider, ProviderDraft, ProviderId};
pub use router::provider_router;
pub use validation::{ProviderForm, ValidationErrors, FORM_REJECTED_MESSAGE};
