//! Admin authentication.
//!
//! Login compares the submitted credentials against the configured admin
//! account in constant time and issues an opaque session token. Handlers
//! guard themselves by taking [`AdminSession`] as an extractor argument;
//! the token is accepted either as a bearer header or a `session` cookie.

use crate::error::{AppError, CheckinError, Result};
use crate::session::{new_session, Session, SessionId, SessionStore};
use crate::state::AppState;
use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::{header, request::Parts};
use chrono::Duration;
use constant_time_eq::constant_time_eq;
use std::sync::Arc;
use tracing::info;

/// Verify credentials and create a session.
///
/// Both the email and password comparisons run in constant time so a
/// failed login does not leak which of the two was wrong.
///
/// # Errors
///
/// Returns [`CheckinError::InvalidCredentials`] on a mismatch.
pub async fn login(
    sessions: &Arc<dyn SessionStore>,
    admin_email: &str,
    admin_password: &str,
    session_ttl: u64,
    email: &str,
    password: &str,
) -> Result<Session> {
    let email_ok = constant_time_eq(email.as_bytes(), admin_email.as_bytes());
    let password_ok = constant_time_eq(password.as_bytes(), admin_password.as_bytes());
    if !(email_ok && password_ok) {
        return Err(CheckinError::InvalidCredentials);
    }

    let ttl = Duration::seconds(i64::try_from(session_ttl).unwrap_or(28_800));
    let session = new_session(email, ttl);
    sessions.create_session(session.clone()).await?;
    info!(email = %email, "Admin logged in");
    Ok(session)
}

/// Delete a session. Unknown tokens are ignored.
///
/// # Errors
///
/// Returns an error if the session store is unavailable.
pub async fn logout(sessions: &Arc<dyn SessionStore>, token: &str) -> Result<()> {
    if let Ok(session_id) = SessionId::parse(token) {
        sessions.delete_session(session_id).await?;
    }
    Ok(())
}

/// Extract the session token from request headers.
///
/// Checks the `Authorization: Bearer` header first, then a `session`
/// cookie.
#[must_use]
pub fn extract_token(parts: &Parts) -> Option<String> {
    if let Some(value) = parts
        .headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
    {
        if let Some(token) = value.strip_prefix("Bearer ") {
            return Some(token.trim().to_string());
        }
    }

    parts
        .headers
        .get(header::COOKIE)
        .and_then(|v| v.to_str().ok())
        .and_then(|cookies| {
            cookies.split(';').find_map(|cookie| {
                cookie.trim().strip_prefix("session=").map(str::to_string)
            })
        })
}

/// Extractor for handlers that require an authenticated admin.
#[derive(Debug, Clone)]
pub struct AdminSession {
    /// The validated session
    pub session: Session,
}

#[async_trait]
impl FromRequestParts<AppState> for AdminSession {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> std::result::Result<Self, Self::Rejection> {
        let token = extract_token(parts)
            .ok_or_else(|| AppError::unauthorized("Not logged in or session expired"))?;
        let session_id = SessionId::parse(&token)?;
        let session = state.sessions.get_session(session_id).await?;
        Ok(Self { session })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::session::InMemorySessionStore;
    use axum::http::Request;

    fn sessions() -> Arc<dyn SessionStore> {
        Arc::new(InMemorySessionStore::new())
    }

    #[tokio::test]
    async fn valid_credentials_create_session() {
        let store = sessions();
        let session = login(
            &store,
            "admin@example.com",
            "change-me",
            28_800,
            "admin@example.com",
            "change-me",
        )
        .await
        .unwrap();
        assert_eq!(session.email, "admin@example.com");
        store.get_session(session.session_id).await.unwrap();
    }

    #[tokio::test]
    async fn wrong_password_is_rejected() {
        let err = login(
            &sessions(),
            "admin@example.com",
            "change-me",
            28_800,
            "admin@example.com",
            "wrong",
        )
        .await
        .unwrap_err();
        assert_eq!(err, CheckinError::InvalidCredentials);
    }

    #[tokio::test]
    async fn wrong_email_is_rejected() {
        let err = login(
            &sessions(),
            "admin@example.com",
            "change-me",
            28_800,
            "intruder@example.com",
            "change-me",
        )
        .await
        .unwrap_err();
        assert_eq!(err, CheckinError::InvalidCredentials);
    }

    #[tokio::test]
    async fn logout_removes_session() {
        let store = sessions();
        let session = login(
            &store,
            "admin@example.com",
            "change-me",
            28_800,
            "admin@example.com",
            "change-me",
        )
        .await
        .unwrap();

        logout(&store, &session.session_id.to_string())
            .await
            .unwrap();
        let err = store.get_session(session.session_id).await.unwrap_err();
        assert_eq!(err, CheckinError::SessionNotFound);
    }

    #[tokio::test]
    async fn logout_with_garbage_token_is_ok() {
        logout(&sessions(), "not-a-token").await.unwrap();
    }

    #[test]
    fn token_from_bearer_header() {
        let request = Request::builder()
            .header("Authorization", "Bearer abc123")
            .body(())
            .unwrap();
        let (parts, ()) = request.into_parts();
        assert_eq!(extract_token(&parts).as_deref(), Some("abc123"));
    }

    #[test]
    fn token_from_cookie() {
        let request = Request::builder()
            .header("Cookie", "theme=dark; session=abc123")
            .body(())
            .unwrap();
        let (parts, ()) = request.into_parts();
        assert_eq!(extract_token(&parts).as_deref(), Some("abc123"));
    }

    #[test]
    fn missing_token() {
        let request = Request::builder().body(()).unwrap();
        let (parts, ()) = request.into_parts();
        assert!(extract_token(&parts).is_none());
    }
}
