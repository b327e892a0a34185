//! Invoice issuance, corrections, settings, and the printable document.

use crate::auth::AdminSession;
use crate::error::{AppError, CheckinError};
use crate::invoice::{correction_number, parse_pattern, render_document, render_number, vat_amount};
use crate::state::AppState;
use crate::store::invoices::{IssuedInvoice, UpdateInvoiceSettings};
use crate::types::{InvoiceSettings, InvoiceVersion, Reservation};
use axum::extract::{Path, State};
use axum::http::header;
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::info;

/// Attempts at skipping already-used invoice numbers.
const NUMBER_ATTEMPTS: i64 = 1000;

/// Body for issuing or correcting an invoice. All fields are optional;
/// absent ones fall back to the values already on the reservation.
#[derive(Debug, Default, Deserialize)]
pub struct InvoiceRequest {
    /// Invoiced service name
    pub service_name: Option<String>,
    /// Gross amount paid
    pub amount_paid: Option<f64>,
    /// VAT rate in percent
    pub vat_rate: Option<f64>,
}

/// Preview of the next invoice number.
#[derive(Debug, Serialize)]
pub struct NextNumberResponse {
    /// The number the next issued invoice would get
    pub next_invoice_number: String,
}

fn snapshot(reservation: &Reservation, issued: &IssuedInvoice) -> String {
    serde_json::json!({
        "invoice_number": issued.invoice_number,
        "service_name": issued.service_name,
        "amount_paid": issued.amount_paid,
        "vat_rate": issued.vat_rate,
        "vat_amount": issued.vat_amount,
        "invoice_generated_at": issued.invoice_generated_at,
        "buyer_name": reservation.display_name(),
        "address": reservation.address,
        "tax_id": reservation.tax_id,
        "vat_eu": reservation.vat_eu,
    })
    .to_string()
}

/// `POST /api/reservations/{id}/generate-invoice`
///
/// Issues the invoice: assigns the next pattern number, computes the VAT
/// contained in the gross amount, advances the rolling counter, and
/// records version 1.
///
/// # Errors
///
/// Returns 404 if the guest has not submitted details, and 422 if the
/// invoice was already issued or no amount is available.
pub async fn generate(
    State(state): State<AppState>,
    _session: AdminSession,
    Path(id): Path<i64>,
    Json(request): Json<InvoiceRequest>,
) -> Result<Json<Reservation>, AppError> {
    let reservation = state.store.get_reservation(id).await?;
    if !reservation.guest_submitted() {
        return Err(CheckinError::not_found("Guest submission").into());
    }
    if reservation.invoice_number.is_some() {
        return Err(CheckinError::validation(
            "Invoice already generated; issue a correction instead",
        )
        .into());
    }

    let amount = request
        .amount_paid
        .or(reservation.amount_paid)
        .ok_or_else(|| CheckinError::validation("Amount paid is required"))?;
    let rate = request.vat_rate.or(reservation.vat_rate).unwrap_or(8.0);
    let service_name = request
        .service_name
        .clone()
        .or_else(|| reservation.service_name.clone())
        .unwrap_or_else(|| "Apartment Rental".to_string());

    let settings = state.store.get_settings().await?;
    let pattern = parse_pattern(&settings.numbering_pattern)?;
    let now = Utc::now();

    // Skip numbers that are already taken, e.g. after a pattern change.
    let mut rolling = settings.rolling_number_current + 1;
    let mut number = render_number(&pattern, rolling, now);
    let mut attempts = 0;
    while state.store.invoice_number_exists(&number, None).await? {
        rolling += 1;
        attempts += 1;
        if attempts > NUMBER_ATTEMPTS {
            return Err(
                CheckinError::validation("Could not find an unused invoice number").into(),
            );
        }
        number = render_number(&pattern, rolling, now);
    }

    let issued = IssuedInvoice {
        service_name,
        amount_paid: amount,
        vat_rate: rate,
        vat_amount: vat_amount(amount, rate),
        invoice_number: number,
        invoice_generated_at: now,
    };

    state.store.set_rolling_number(rolling).await?;
    let updated = state.store.set_invoice(id, &issued).await?;
    state
        .store
        .insert_invoice_version(id, 1, &issued.invoice_number, &snapshot(&updated, &issued))
        .await?;

    info!(reservation_id = id, invoice_number = %issued.invoice_number, "Invoice issued");
    Ok(Json(updated))
}

/// `POST /api/reservations/{id}/correction`
///
/// Issues a correction: the current invoice fields are replaced and a new
/// version with a `_CORRECTED` suffix is recorded. Earlier versions stay
/// untouched.
///
/// # Errors
///
/// Returns 404 if no invoice has been issued yet.
pub async fn correct(
    State(state): State<AppState>,
    _session: AdminSession,
    Path(id): Path<i64>,
    Json(request): Json<InvoiceRequest>,
) -> Result<Json<Reservation>, AppError> {
    let reservation = state.store.get_reservation(id).await?;
    let base_number = reservation
        .invoice_number
        .clone()
        .ok_or_else(|| CheckinError::not_found("Invoice"))?;

    let amount = request
        .amount_paid
        .or(reservation.amount_paid)
        .ok_or_else(|| CheckinError::validation("Amount paid is required"))?;
    let rate = request.vat_rate.or(reservation.vat_rate).unwrap_or(8.0);
    let service_name = request
        .service_name
        .clone()
        .or_else(|| reservation.service_name.clone())
        .unwrap_or_else(|| "Apartment Rental".to_string());

    // Invoices issued before version tracking get a backfilled version 1.
    let mut count = state.store.count_invoice_versions(id).await?;
    if count == 0 {
        let original = IssuedInvoice {
            service_name: reservation
                .service_name
                .clone()
                .unwrap_or_else(|| "Apartment Rental".to_string()),
            amount_paid: reservation.amount_paid.unwrap_or_default(),
            vat_rate: reservation.vat_rate.unwrap_or_default(),
            vat_amount: reservation.vat_amount.unwrap_or_default(),
            invoice_number: base_number.clone(),
            invoice_generated_at: reservation.invoice_generated_at.unwrap_or_else(Utc::now),
        };
        state
            .store
            .insert_invoice_version(id, 1, &base_number, &snapshot(&reservation, &original))
            .await?;
        count = 1;
    }

    let version = count + 1;
    let issued = IssuedInvoice {
        service_name,
        amount_paid: amount,
        vat_rate: rate,
        vat_amount: vat_amount(amount, rate),
        invoice_number: correction_number(&base_number, version),
        invoice_generated_at: Utc::now(),
    };

    let updated = state.store.set_invoice(id, &issued).await?;
    state
        .store
        .insert_invoice_version(
            id,
            version,
            &issued.invoice_number,
            &snapshot(&updated, &issued),
        )
        .await?;

    info!(
        reservation_id = id,
        invoice_number = %issued.invoice_number,
        version,
        "Invoice corrected"
    );
    Ok(Json(updated))
}

/// `GET /api/next-invoice-number`
///
/// Renders the number the next invoice would get without consuming it.
///
/// # Errors
///
/// Returns 422 if the stored pattern is malformed.
pub async fn next_number(
    State(state): State<AppState>,
    _session: AdminSession,
) -> Result<Json<NextNumberResponse>, AppError> {
    let settings = state.store.get_settings().await?;
    let pattern = parse_pattern(&settings.numbering_pattern)?;
    Ok(Json(NextNumberResponse {
        next_invoice_number: render_number(
            &pattern,
            settings.rolling_number_current + 1,
            Utc::now(),
        ),
    }))
}

/// `GET /api/reservations/{id}/versions`
///
/// # Errors
///
/// Returns 404 for unknown reservation ids.
pub async fn versions(
    State(state): State<AppState>,
    _session: AdminSession,
    Path(id): Path<i64>,
) -> Result<Json<Vec<InvoiceVersion>>, AppError> {
    state.store.get_reservation(id).await?;
    Ok(Json(state.store.list_invoice_versions(id).await?))
}

/// `GET /api/reservations/{id}/invoice`
///
/// The printable HTML invoice document as a download.
///
/// # Errors
///
/// Returns 404 if no invoice has been issued.
pub async fn document(
    State(state): State<AppState>,
    _session: AdminSession,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let reservation = state.store.get_reservation(id).await?;
    let settings = state.store.get_settings().await?;
    let html = render_document(&settings, &reservation)?;

    let filename = reservation
        .invoice_number
        .as_deref()
        .unwrap_or("invoice")
        .replace(['/', '\\'], "_");
    Ok((
        [
            (header::CONTENT_TYPE, "text/html; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"invoice_{filename}.html\""),
            ),
        ],
        html,
    ))
}

/// `GET /api/invoice-settings`
///
/// # Errors
///
/// Returns 500 if the settings row is missing.
pub async fn get_settings(
    State(state): State<AppState>,
    _session: AdminSession,
) -> Result<Json<InvoiceSettings>, AppError> {
    Ok(Json(state.store.get_settings().await?))
}

/// `PUT /api/invoice-settings`
///
/// # Errors
///
/// Returns 422 for an empty update or a malformed numbering pattern.
pub async fn update_settings(
    State(state): State<AppState>,
    _session: AdminSession,
    Json(update): Json<UpdateInvoiceSettings>,
) -> Result<Json<InvoiceSettings>, AppError> {
    Ok(Json(state.store.update_settings(&update).await?))
}
