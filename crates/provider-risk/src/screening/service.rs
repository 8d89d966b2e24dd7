use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::debug;

use super::aggregator::{ScreeningAggregator, ScreeningTarget};
use super::client::RiskApi;
use super::registry::{SessionId, SessionRegistry};
use super::session::{ApplyOutcome, ScreeningTicket, SessionView};
use super::sources::SourceCatalog;
use crate::providers::{ProviderApi, ProviderDirectory, ProviderError, ProviderId};

/// Error raised by the screening session service.
#[derive(Debug, thiserror::Error)]
pub enum ScreeningServiceError {
    #[error("screening session {0} not found")]
    UnknownSession(SessionId),
    #[error("unknown screening source '{0}'")]
    UnknownSource(String),
    #[error("no match table at entry {0}")]
    NoMatchTable(usize),
    #[error(transparent)]
    Provider(#[from] ProviderError),
}

/// Result of a toggle: the updated view and, when a run was scheduled, its task.
#[derive(Debug)]
pub struct ToggleOutcome {
    pub view: SessionView,
    pub run: Option<JoinHandle<ApplyOutcome>>,
}

/// Owns the open sessions and executes the runs they schedule.
pub struct ScreeningService<R, P> {
    aggregator: ScreeningAggregator<R>,
    providers: Arc<ProviderDirectory<P>>,
    sessions: SessionRegistry,
}

impl<R, P> ScreeningService<R, P>
where
    R: RiskApi + 'static,
    P: ProviderApi + 'static,
{
    pub fn new(aggregator: ScreeningAggregator<R>, providers: Arc<ProviderDirectory<P>>) -> Self {
        Self {
            aggregator,
            providers,
            sessions: SessionRegistry::new(),
        }
    }

    pub fn catalog(&self) -> &'static SourceCatalog {
        self.aggregator.catalog()
    }

    pub fn sessions(&self) -> &SessionRegistry {
        &self.sessions
    }

    /// Opens a fresh session against a stored provider.
    pub async fn open_session(
        &self,
        provider_id: ProviderId,
    ) -> Result<(SessionId, SessionView), ScreeningServiceError> {
        let provider = self.providers.lookup(provider_id).await?;
        let target = ScreeningTarget::from_provider(&provider)
            .ok_or(ProviderError::NotFound(provider_id))?;

        let id = self.sessions.open(target);
        let view = self.session_view(&id)?;
        Ok((id, view))
    }

    pub fn session_view(&self, id: &SessionId) -> Result<SessionView, ScreeningServiceError> {
        let catalog = self.catalog();
        self.sessions
            .with_session(id, |session| session.view(catalog))
            .ok_or_else(|| ScreeningServiceError::UnknownSession(id.clone()))
    }

    /// Toggles a source and spawns the run the new selection calls for.
    pub fn toggle(
        self: &Arc<Self>,
        id: &SessionId,
        source_id: &str,
    ) -> Result<ToggleOutcome, ScreeningServiceError> {
        let catalog = self.catalog();
        if !catalog.contains(source_id) {
            return Err(ScreeningServiceError::UnknownSource(source_id.to_string()));
        }

        let (ticket, view) = self
            .sessions
            .with_session(id, |session| {
                let ticket = session.toggle(source_id);
                (ticket, session.view(catalog))
            })
            .ok_or_else(|| ScreeningServiceError::UnknownSession(id.clone()))?;

        let run = ticket.map(|ticket| {
            let service = Arc::clone(self);
            let session_id = id.clone();
            tokio::spawn(async move { service.execute(session_id, ticket).await })
        });

        Ok(ToggleOutcome { view, run })
    }

    async fn execute(&self, id: SessionId, ticket: ScreeningTicket) -> ApplyOutcome {
        let outcome = ticket.run(&self.aggregator).await;
        match self
            .sessions
            .with_session(&id, |session| session.apply(&ticket, outcome))
        {
            Some(applied) => applied,
            None => {
                debug!(session_id = %id, "session closed before the run finished");
                ApplyOutcome::DiscardedStale
            }
        }
    }

    pub fn set_page(
        &self,
        id: &SessionId,
        entry: usize,
        page: usize,
    ) -> Result<SessionView, ScreeningServiceError> {
        let catalog = self.catalog();
        let moved = self
            .sessions
            .with_session(id, |session| {
                session
                    .set_page(entry, page)
                    .then(|| session.view(catalog))
            })
            .ok_or_else(|| ScreeningServiceError::UnknownSession(id.clone()))?;
        moved.ok_or(ScreeningServiceError::NoMatchTable(entry))
    }

    pub fn close(&self, id: &SessionId) -> Result<(), ScreeningServiceError> {
        if self.sessions.close(id) {
            Ok(())
        } else {
            Err(ScreeningServiceError::UnknownSession(id.clone()))
        }
    }
}
