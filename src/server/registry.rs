//! The live-session table.
//!
//! The server only ever holds weak references to sessions: a session is kept
//! alive by its own outstanding tasks, and the registry must not extend that
//! lifetime. Sessions insert themselves when the control loop starts and
//! remove themselves from their destructor.

use super::session::{Session, TraceId};
use std::collections::HashMap;
use std::sync::{Mutex, Weak};
use tokio::sync::Mutex as AsyncMutex;

#[derive(Debug, Default)]
pub struct SessionRegistry {
    sessions: Mutex<HashMap<TraceId, Weak<AsyncMutex<Session>>>>,
}

impl SessionRegistry {
    pub fn new() -> SessionRegistry {
        SessionRegistry::default()
    }

    pub fn insert(&self, id: TraceId, session: Weak<AsyncMutex<Session>>) {
        self.sessions.lock().expect("session registry mutex poisoned").insert(id, session);
    }

    pub fn remove(&self, id: TraceId) {
        self.sessions.lock().expect("session registry mutex poisoned").remove(&id);
    }

    /// Number of sessions that are still alive. Entries whose referent is
    /// already gone are pruned on the way.
    pub fn count(&self) -> usize {
        let mut sessions = self.sessions.lock().expect("session registry mutex poisoned");
        sessions.retain(|_, weak| weak.strong_count() > 0);
        sessions.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn count_tracks_live_sessions_only() {
        let registry = Arc::new(SessionRegistry::new());

        let session = Session::new(Arc::clone(&registry));
        let id = session.trace_id;
        let shared = Arc::new(AsyncMutex::new(session));
        registry.insert(id, Arc::downgrade(&shared));
        assert_eq!(registry.count(), 1);

        // The session unregisters itself when the last strong ref goes.
        drop(shared);
        assert_eq!(registry.count(), 0);
    }
}
