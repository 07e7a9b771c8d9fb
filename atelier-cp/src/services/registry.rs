//! In-memory session registry
//!
//! Explicitly injected via AppState; there is no module-level singleton.
//! The outer map lock only serializes inserts and lookups — each session
//! has its own RwLock, so sessions stay independent.

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::models::CurationSession;

/// Shared handle to one session's mutable state
pub type SessionHandle = Arc<RwLock<CurationSession>>;

/// Registry of all known curation sessions, keyed by session id
#[derive(Default)]
pub struct SessionRegistry {
    sessions: RwLock<HashMap<Uuid, SessionHandle>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a session and return its shared handle
    pub async fn insert(&self, session: CurationSession) -> SessionHandle {
        let id = session.session_id;
        let handle = Arc::new(RwLock::new(session));
        self.sessions.write().await.insert(id, handle.clone());
        handle
    }

    /// Look up a session handle
    pub async fn get(&self, session_id: Uuid) -> Option<SessionHandle> {
        self.sessions.read().await.get(&session_id).cloned()
    }

    /// Clone a point-in-time snapshot of a session
    pub async fn snapshot(&self, session_id: Uuid) -> Option<CurationSession> {
        let handle = self.get(session_id).await?;
        let session = handle.read().await;
        Some(session.clone())
    }

    /// Number of registered sessions
    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}
