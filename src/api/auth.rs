//! Admin login and logout.

use crate::auth::{self, AdminSession};
use crate::error::AppError;
use crate::state::AppState;
use axum::extract::State;
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Login request body.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    /// Admin email
    pub email: String,
    /// Admin password
    pub password: String,
}

/// Login response body.
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    /// Opaque session token
    pub token: String,
    /// Authenticated email
    pub email: String,
    /// Session expiry
    pub expires_at: DateTime<Utc>,
}

/// `POST /admin/login`
///
/// Issues a session token, returned both in the body and as an
/// `HttpOnly` cookie so browser pages and API clients can share it.
///
/// # Errors
///
/// Returns 401 for invalid credentials.
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    let session = auth::login(
        &state.sessions,
        &state.config.admin.email,
        &state.config.admin.password,
        state.config.admin.session_ttl,
        &request.email,
        &request.password,
    )
    .await?;

    let cookie = format!(
        "session={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
        session.session_id, state.config.admin.session_ttl
    );
    let mut headers = HeaderMap::new();
    headers.insert(
        header::SET_COOKIE,
        cookie
            .parse()
            .map_err(|_| AppError::internal("Failed to build session cookie"))?,
    );

    Ok((
        headers,
        Json(LoginResponse {
            token: session.session_id.to_string(),
            email: session.email,
            expires_at: session.expires_at,
        }),
    ))
}

/// `POST /admin/logout`
///
/// Deletes the current session and clears the cookie. Requires a valid
/// session.
///
/// # Errors
///
/// Returns 401 without a valid session.
pub async fn logout(
    State(state): State<AppState>,
    session: AdminSession,
) -> Result<impl IntoResponse, AppError> {
    auth::logout(&state.sessions, &session.session.session_id.to_string()).await?;

    let mut headers = HeaderMap::new();
    headers.insert(
        header::SET_COOKIE,
        "session=; Path=/; HttpOnly; Max-Age=0"
            .parse()
            .map_err(|_| AppError::internal("Failed to build session cookie"))?,
    );
    Ok((StatusCode::NO_CONTENT, headers))
}

/// `GET /admin/session`
///
/// Reports who is logged in; used by the dashboard to restore state.
/// Rejects with 401 without a valid session.
pub async fn current_session(session: AdminSession) -> Json<LoginResponse> {
    Json(LoginResponse {
        token: session.session.session_id.to_string(),
        email: session.session.email,
        expires_at: session.session.expires_at,
    })
}
