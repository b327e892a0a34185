//! Building access code endpoints.
//!
//! The active list is public (the guest page shows it); management is
//! admin-only.

use crate::auth::AdminSession;
use crate::error::AppError;
use crate::state::AppState;
use crate::store::building_codes::{NewBuildingCode, UpdateBuildingCode};
use crate::types::BuildingCode;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;

/// `GET /api/building-codes`
///
/// Active codes in display order; public.
///
/// # Errors
///
/// Returns 500 on a store failure.
pub async fn list_active(
    State(state): State<AppState>,
) -> Result<Json<Vec<BuildingCode>>, AppError> {
    Ok(Json(state.store.list_building_codes(true).await?))
}

/// `GET /api/admin/building-codes`
///
/// All codes, including inactive ones.
///
/// # Errors
///
/// Returns 500 on a store failure.
pub async fn list_all(
    State(state): State<AppState>,
    _session: AdminSession,
) -> Result<Json<Vec<BuildingCode>>, AppError> {
    Ok(Json(state.store.list_building_codes(false).await?))
}

/// `POST /api/admin/building-codes`
///
/// # Errors
///
/// Returns 422 for an empty name or code.
pub async fn create(
    State(state): State<AppState>,
    _session: AdminSession,
    Json(new): Json<NewBuildingCode>,
) -> Result<impl IntoResponse, AppError> {
    let code = state.store.create_building_code(&new).await?;
    Ok((StatusCode::CREATED, Json(code)))
}

/// `PUT /api/admin/building-codes/{id}`
///
/// # Errors
///
/// Returns 404 for unknown ids and 422 for an empty update.
pub async fn update(
    State(state): State<AppState>,
    _session: AdminSession,
    Path(id): Path<i64>,
    Json(update): Json<UpdateBuildingCode>,
) -> Result<Json<BuildingCode>, AppError> {
    Ok(Json(state.store.update_building_code(id, &update).await?))
}

/// `DELETE /api/admin/building-codes/{id}`
///
/// # Errors
///
/// Returns 404 for unknown ids.
pub async fn delete(
    State(state): State<AppState>,
    _session: AdminSession,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    state.store.delete_building_code(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
