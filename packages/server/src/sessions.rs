//! In-memory planner sessions keyed by id.
//!
//! Sessions are isolated: each one sits behind its own lock, and the map
//! lock is only held long enough to look a session up.

use std::collections::BTreeMap;
use std::sync::Arc;

use route_planner_route::PlannerSession;
use route_planner_route_models::PlannerMode;
use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

/// A shared handle to one session.
pub type SessionHandle = Arc<Mutex<PlannerSession>>;

/// Every open session, up to a fixed number.
///
/// Sessions never expire on their own; they live until the client deletes
/// them.
pub struct SessionStore {
    sessions: RwLock<BTreeMap<Uuid, SessionHandle>>,
    limit: usize,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::with_limit(Self::DEFAULT_LIMIT)
    }
}

impl SessionStore {
    pub const DEFAULT_LIMIT: usize = 1024;

    /// An empty store that holds at most `limit` sessions.
    #[must_use]
    pub fn with_limit(limit: usize) -> Self {
        Self {
            sessions: RwLock::new(BTreeMap::new()),
            limit,
        }
    }

    #[must_use]
    pub const fn limit(&self) -> usize {
        self.limit
    }

    /// Opens a fresh session for `mode` and returns its id, or `None` when
    /// the store is full.
    pub async fn create(&self, mode: PlannerMode) -> Option<Uuid> {
        let mut sessions = self.sessions.write().await;
        if sessions.len() >= self.limit {
            log::warn!("Refusing {mode} session: {} sessions open", sessions.len());
            return None;
        }

        let id = Uuid::new_v4();
        sessions.insert(id, Arc::new(Mutex::new(PlannerSession::new(mode))));
        drop(sessions);
        log::debug!("Opened {mode} session {id}");
        Some(id)
    }

    /// Looks up a session.
    pub async fn get(&self, id: Uuid) -> Option<SessionHandle> {
        self.sessions.read().await.get(&id).cloned()
    }

    /// Closes a session. Returns `false` if it did not exist.
    pub async fn remove(&self, id: Uuid) -> bool {
        let removed = self.sessions.write().await.remove(&id).is_some();
        if removed {
            log::debug!("Closed session {id}");
        }
        removed
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}
