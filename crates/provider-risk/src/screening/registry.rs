use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::aggregator::ScreeningTarget;
use super::session::ScreeningSession;

/// Identifier handed to HTTP clients for an open screening session.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(pub String);

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

static SESSION_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_session_id() -> SessionId {
    let id = SESSION_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    SessionId(format!("scr-{id:06}"))
}

/// Open screening sessions keyed by id.
#[derive(Debug, Default)]
pub struct SessionRegistry {
    sessions: Mutex<HashMap<SessionId, ScreeningSession>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens a session for `target`, replacing any earlier session on the
    /// same provider.
    pub fn open(&self, target: ScreeningTarget) -> SessionId {
        let id = next_session_id();
        let mut sessions = self.sessions.lock().expect("session registry mutex poisoned");

        let before = sessions.len();
        sessions.retain(|_, session| {
            session.target().map(|open| open.provider_id) != Some(target.provider_id)
        });
        let evicted = before - sessions.len();
        if evicted > 0 {
            debug!(provider_id = %target.provider_id, evicted, "replaced earlier screening session");
        }

        sessions.insert(id.clone(), ScreeningSession::opened(target));
        id
    }

    /// Runs `f` against the session while holding the registry lock.
    pub fn with_session<T>(
        &self,
        id: &SessionId,
        f: impl FnOnce(&mut ScreeningSession) -> T,
    ) -> Option<T> {
        let mut sessions = self.sessions.lock().expect("session registry mutex poisoned");
        sessions.get_mut(id).map(f)
    }

    pub fn close(&self, id: &SessionId) -> bool {
        self.sessions
            .lock()
            .expect("session registry mutex poisoned")
            .remove(id)
            .is_some()
    }

    pub fn len(&self) -> usize {
        self.sessions
            .lock()
            .expect("session registry mutex poisoned")
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::ProviderId;

    fn target(id: u64) -> ScreeningTarget {
        ScreeningTarget::new(ProviderId(id), format!("Provider {id}"))
    }

    #[test]
    fn reopening_a_provider_replaces_its_session() {
        let registry = SessionRegistry::new();
        let first = registry.open(target(7));
        let other = registry.open(target(8));
        let second = registry.open(target(7));

        assert_ne!(first, second);
        assert_eq!(registry.len(), 2);
        assert!(registry.with_session(&first, |_| ()).is_none());
        assert!(registry.with_session(&other, |_| ()).is_some());
        assert_eq!(
            registry.with_session(&second, |session| session.target().map(|t| t.provider_id)),
            Some(Some(ProviderId(7)))
        );
    }

    #[test]
    fn close_removes_only_the_named_session() {
        let registry = SessionRegistry::new();
        let id = registry.open(target(3));

        assert!(registry.close(&id));
        assert!(!registry.close(&id));
        assert!(registry.is_empty());
    }
}
