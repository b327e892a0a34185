//! Admin session management.
//!
//! Sessions are opaque server-side tokens with a fixed TTL. The store is
//! held behind a trait so the in-memory implementation can be swapped for
//! an external one without touching the handlers.

use crate::error::{CheckinError, Result};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

/// Unique session identifier, used as the opaque bearer token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(pub Uuid);

impl SessionId {
    /// Generate a fresh random session id.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse a session id from its string form.
    ///
    /// # Errors
    ///
    /// Returns [`CheckinError::SessionNotFound`] if the token is not a
    /// valid id.
    pub fn parse(token: &str) -> Result<Self> {
        Uuid::parse_str(token)
            .map(Self)
            .map_err(|_| CheckinError::SessionNotFound)
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// An authenticated admin session.
#[derive(Debug, Clone)]
pub struct Session {
    /// Session identifier (the token)
    pub session_id: SessionId,
    /// Email the session was established for
    pub email: String,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Expiry timestamp
    pub expires_at: DateTime<Utc>,
}

/// Session store.
///
/// Expired sessions behave as absent on read; implementations may reap
/// them lazily.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Create a session.
    ///
    /// # Errors
    ///
    /// Returns an error if the session id already exists.
    async fn create_session(&self, session: Session) -> Result<()>;

    /// Get a session by id.
    ///
    /// # Errors
    ///
    /// Returns [`CheckinError::SessionNotFound`] for unknown ids and
    /// [`CheckinError::SessionExpired`] for expired ones.
    async fn get_session(&self, session_id: SessionId) -> Result<Session>;

    /// Delete a session. Deleting an absent session is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the store is unavailable.
    async fn delete_session(&self, session_id: SessionId) -> Result<()>;
}

/// In-memory session store.
///
/// Sufficient for the single-admin deployment model; sessions do not
/// survive a process restart.
#[derive(Debug, Clone, Default)]
pub struct InMemorySessionStore {
    sessions: Arc<Mutex<HashMap<SessionId, Session>>>,
}

impl InMemorySessionStore {
    /// Create a new empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<SessionId, Session>>> {
        self.sessions
            .lock()
            .map_err(|_| CheckinError::Database("Session lock poisoned".to_string()))
    }

    /// Number of live sessions (for tests).
    ///
    /// # Errors
    ///
    /// Returns an error if the lock is poisoned.
    pub fn session_count(&self) -> Result<usize> {
        Ok(self.lock()?.len())
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn create_session(&self, session: Session) -> Result<()> {
        let mut sessions = self.lock()?;
        if sessions.contains_key(&session.session_id) {
            return Err(CheckinError::Database(
                "Session ID already exists".to_string(),
            ));
        }
        sessions.insert(session.session_id, session);
        Ok(())
    }

    async fn get_session(&self, session_id: SessionId) -> Result<Session> {
        let mut sessions = self.lock()?;
        let session = sessions
            .get(&session_id)
            .cloned()
            .ok_or(CheckinError::SessionNotFound)?;
        if session.expires_at < Utc::now() {
            sessions.remove(&session_id);
            return Err(CheckinError::SessionExpired);
        }
        Ok(session)
    }

    async fn delete_session(&self, session_id: SessionId) -> Result<()> {
        self.lock()?.remove(&session_id);
        Ok(())
    }
}

/// Build a new session for `email` expiring after `ttl`.
#[must_use]
pub fn new_session(email: &str, ttl: Duration) -> Session {
    let now = Utc::now();
    Session {
        session_id: SessionId::new(),
        email: email.to_string(),
        created_at: now,
        expires_at: now + ttl,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn create_and_get_roundtrip() {
        let store = InMemorySessionStore::new();
        let session = new_session("admin@example.com", Duration::hours(8));
        let id = session.session_id;
        store.create_session(session).await.unwrap();

        let found = store.get_session(id).await.unwrap();
        assert_eq!(found.email, "admin@example.com");
        assert_eq!(store.session_count().unwrap(), 1);
    }

    #[tokio::test]
    async fn unknown_session_is_not_found() {
        let store = InMemorySessionStore::new();
        let err = store.get_session(SessionId::new()).await.unwrap_err();
        assert_eq!(err, CheckinError::SessionNotFound);
    }

    #[tokio::test]
    async fn expired_session_is_rejected_and_reaped() {
        let store = InMemorySessionStore::new();
        let session = new_session("admin@example.com", Duration::seconds(-1));
        let id = session.session_id;
        store.create_session(session).await.unwrap();

        let err = store.get_session(id).await.unwrap_err();
        assert_eq!(err, CheckinError::SessionExpired);
        assert_eq!(store.session_count().unwrap(), 0);
    }

    #[tokio::test]
    async fn delete_is_idempotent() {
        let store = InMemorySessionStore::new();
        let id = SessionId::new();
        store.delete_session(id).await.unwrap();
        store.delete_session(id).await.unwrap();
    }

    #[test]
    fn session_id_parse_rejects_garbage() {
        assert!(SessionId::parse("not-a-token").is_err());
    }
}
