//! Admin reservation management.

use crate::auth::AdminSession;
use crate::error::AppError;
use crate::state::AppState;
use crate::store::reservations::{NewReservation, UpdateReservation};
use crate::types::Reservation;
use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use tracing::warn;

/// `POST /api/reservations`
///
/// Creates a reservation and, when a guest email was given, sends the
/// guest link. Email delivery is best-effort: a failure is logged and the
/// reservation is still returned.
///
/// # Errors
///
/// Returns 422 for a duplicate or empty reservation number.
pub async fn create(
    State(state): State<AppState>,
    _session: AdminSession,
    Json(new): Json<NewReservation>,
) -> Result<impl IntoResponse, AppError> {
    let reservation = state.store.create_reservation(&new).await?;

    if let Some(email) = reservation.email.as_deref() {
        let link = state.config.guest_link(&reservation.reservation_number);
        if let Err(e) = state
            .mailer
            .send_guest_link(
                email,
                &reservation.reservation_number,
                &link,
                reservation.checkin_date,
                reservation.checkout_date,
            )
            .await
        {
            warn!(
                reservation = %reservation.reservation_number,
                error = %e,
                "Guest link email failed"
            );
        }
    }

    Ok((StatusCode::CREATED, Json(reservation)))
}

/// `GET /api/reservations`
///
/// # Errors
///
/// Returns 500 on a store failure.
pub async fn list(
    State(state): State<AppState>,
    _session: AdminSession,
) -> Result<Json<Vec<Reservation>>, AppError> {
    Ok(Json(state.store.list_reservations().await?))
}

/// `GET /api/reservations/{id}`
///
/// # Errors
///
/// Returns 404 for unknown ids.
pub async fn get(
    State(state): State<AppState>,
    _session: AdminSession,
    Path(id): Path<i64>,
) -> Result<Json<Reservation>, AppError> {
    Ok(Json(state.store.get_reservation(id).await?))
}

/// `PUT /api/reservations/{id}`
///
/// # Errors
///
/// Returns 404 for unknown ids and 422 for an empty update or a
/// colliding reservation number.
pub async fn update(
    State(state): State<AppState>,
    _session: AdminSession,
    Path(id): Path<i64>,
    Json(update): Json<UpdateReservation>,
) -> Result<Json<Reservation>, AppError> {
    Ok(Json(state.store.update_reservation(id, &update).await?))
}

/// `DELETE /api/reservations/{id}`
///
/// # Errors
///
/// Returns 404 for unknown ids.
pub async fn delete(
    State(state): State<AppState>,
    _session: AdminSession,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    state.store.delete_reservation(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `POST /api/reservations/{id}/reset`
///
/// Clears the guest submission and invoice data so the guest can start
/// over; the stay itself is kept.
///
/// # Errors
///
/// Returns 404 for unknown ids.
pub async fn reset(
    State(state): State<AppState>,
    _session: AdminSession,
    Path(id): Path<i64>,
) -> Result<Json<Reservation>, AppError> {
    Ok(Json(state.store.clear_guest_data(id).await?))
}

/// `GET /api/reservations/export-csv`
///
/// All reservations as a CSV download for spreadsheet workflows.
///
/// # Errors
///
/// Returns 500 on a store or serialization failure.
pub async fn export_csv(
    State(state): State<AppState>,
    _session: AdminSession,
) -> Result<impl IntoResponse, AppError> {
    let reservations = state.store.list_reservations().await?;

    let mut writer = csv::Writer::from_writer(Vec::new());
    writer
        .write_record([
            "reservation_number",
            "room_number",
            "apartment_code",
            "checkin_date",
            "checkout_date",
            "invoice_type",
            "guest_name",
            "tax_id",
            "vat_eu",
            "address",
            "email",
            "special_requests",
            "guest_submitted_at",
            "service_name",
            "amount_paid",
            "vat_rate",
            "vat_amount",
            "invoice_number",
            "invoice_generated_at",
            "created_at",
        ])
        .map_err(|e| AppError::internal("CSV export failed").with_source(e.into()))?;

    for r in &reservations {
        writer
            .write_record([
                r.reservation_number.clone(),
                r.room_number.to_string(),
                r.apartment_code.clone(),
                r.checkin_date.to_string(),
                r.checkout_date.to_string(),
                r.invoice_type
                    .map(|t| t.as_str().to_string())
                    .unwrap_or_default(),
                r.display_name().unwrap_or_default(),
                r.tax_id.clone().unwrap_or_default(),
                r.vat_eu.clone().unwrap_or_default(),
                r.address.clone().unwrap_or_default(),
                r.email.clone().unwrap_or_default(),
                r.special_requests.clone().unwrap_or_default(),
                r.guest_submitted_at.map(|t| t.to_rfc3339()).unwrap_or_default(),
                r.service_name.clone().unwrap_or_default(),
                r.amount_paid.map(|a| format!("{a:.2}")).unwrap_or_default(),
                r.vat_rate.map(|a| format!("{a:.1}")).unwrap_or_default(),
                r.vat_amount.map(|a| format!("{a:.2}")).unwrap_or_default(),
                r.invoice_number.clone().unwrap_or_default(),
                r.invoice_generated_at
                    .map(|t| t.to_rfc3339())
                    .unwrap_or_default(),
                r.created_at.to_rfc3339(),
            ])
            .map_err(|e| AppError::internal("CSV export failed").with_source(e.into()))?;
    }

    let body = writer
        .into_inner()
        .map_err(|e| AppError::internal(format!("CSV export failed: {e}")))?;

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"reservations.csv\"",
            ),
        ],
        body,
    ))
}
