//! # Sale Sessions
//!
//! Each client gets a [`SaleSession`] keyed by a v4 UUID it sends back in the
//! `x-session-id` header.
//!
//! ```text
//! POST /sessions ──► { "session_id": "6f1c…" }
//!
//! GET /cart
//! x-session-id: 6f1c…  ──► CurrentSession extractor ──► Arc<Mutex<SaleSession>>
//! ```
//!
//! Sessions idle for longer than the store's TTL are dropped the next time
//! the store is touched; their id then answers `NOT_FOUND`.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use mostrador_core::{SaleSession, ValidationError};
use tracing::debug;
use uuid::Uuid;

use super::AppState;
use crate::error::ApiError;

pub const SESSION_HEADER: &str = "x-session-id";

/// Idle time after which a session is forgotten (8 hours).
pub const DEFAULT_SESSION_TTL: Duration = Duration::from_secs(8 * 60 * 60);

/// A session shared between concurrent requests from the same client.
pub type SharedSession = Arc<tokio::sync::Mutex<SaleSession>>;

#[derive(Debug)]
struct SessionEntry {
    session: SharedSession,
    last_seen: Instant,
}

#[derive(Debug, Clone)]
pub struct SessionStore {
    sessions: Arc<Mutex<HashMap<Uuid, SessionEntry>>>,
    ttl: Duration,
}

impl Default for SessionStore {
    fn default() -> Self {
        SessionStore::new(DEFAULT_SESSION_TTL)
    }
}

impl SessionStore {
    pub fn new(ttl: Duration) -> Self {
        SessionStore {
            sessions: Arc::new(Mutex::new(HashMap::new())),
            ttl,
        }
    }

    /// Opens an empty session and returns its id.
    pub fn create(&self) -> Uuid {
        let id = Uuid::new_v4();
        let mut sessions = self.live_sessions();
        sessions.insert(
            id,
            SessionEntry {
                session: Arc::new(tokio::sync::Mutex::new(SaleSession::new())),
                last_seen: Instant::now(),
            },
        );

        debug!(session_id = %id, live = sessions.len(), "Session created");
        id
    }

    /// Looks up a live session and marks it as used.
    pub fn get(&self, id: &Uuid) -> Option<SharedSession> {
        let mut sessions = self.live_sessions();
        let entry = sessions.get_mut(id)?;
        entry.last_seen = Instant::now();
        Some(Arc::clone(&entry.session))
    }

    /// Number of sessions that have not expired.
    pub fn len(&self) -> usize {
        self.live_sessions().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Locks the map after dropping every entry idle for longer than the TTL.
    fn live_sessions(&self) -> MutexGuard<'_, HashMap<Uuid, SessionEntry>> {
        let mut sessions = self.sessions.lock().unwrap_or_else(PoisonError::into_inner);

        let before = sessions.len();
        let now = Instant::now();
        sessions.retain(|_, entry| now.duration_since(entry.last_seen) < self.ttl);

        let evicted = before - sessions.len();
        if evicted > 0 {
            debug!(evicted, live = sessions.len(), "Expired sessions evicted");
        }
        sessions
    }
}

/// Extractor resolving the `x-session-id` header to a live session.
pub struct CurrentSession {
    pub id: Uuid,
    pub session: SharedSession,
}

impl FromRequestParts<AppState> for CurrentSession {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let raw = parts
            .headers
            .get(SESSION_HEADER)
            .ok_or_else(|| ValidationError::required(SESSION_HEADER))?
            .to_str()
            .map_err(|_| ValidationError::invalid_format(SESSION_HEADER, "not ASCII"))?;

        let id = Uuid::parse_str(raw.trim())
            .map_err(|_| ValidationError::invalid_format(SESSION_HEADER, "not a UUID"))?;

        let session = state
            .sessions
            .get(&id)
            .ok_or_else(|| ApiError::not_found("Session", &id.to_string()))?;

        Ok(CurrentSession { id, session })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_sessions_are_independent() {
        let store = SessionStore::default();
        let a = store.create();
        let b = store.create();
        assert_ne!(a, b);
        assert_eq!(store.len(), 2);

        let session_a = store.get(&a).unwrap();
        session_a.lock().await.finish_sale();

        let session_b = store.get(&b).unwrap();
        assert!(session_b.lock().await.cart.is_empty());
        assert!(store.get(&Uuid::new_v4()).is_none());
    }

    #[tokio::test]
    async fn test_idle_sessions_expire() {
        let store = SessionStore::new(Duration::from_millis(50));
        let idle = store.create();
        let busy = store.create();
        assert_eq!(store.len(), 2);

        for _ in 0..4 {
            tokio::time::sleep(Duration::from_millis(20)).await;
            assert!(store.get(&busy).is_some());
        }

        assert!(store.get(&idle).is_none());
        assert_eq!(store.len(), 1);

        tokio::time::sleep(Duration::from_millis(80)).await;
        assert!(store.is_empty());
        assert!(store.get(&busy).is_none());
    }

    #[tokio::test]
    async fn test_expiry_does_not_cut_off_a_held_session() {
        let store = SessionStore::new(Duration::from_millis(20));
        let id = store.create();
        let held = store.get(&id).unwrap();

        tokio::time::sleep(Duration::from_millis(40)).await;
        assert!(store.get(&id).is_none());

        held.lock().await.finish_sale();
        assert!(held.lock().await.cart.is_empty());
    }
}
