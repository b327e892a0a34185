//! Public guest intake: view a reservation and submit billing details.

use crate::error::{AppError, CheckinError};
use crate::state::AppState;
use crate::store::reservations::GuestDetails;
use crate::types::{BuildingCode, InvoiceType, Reservation};
use axum::extract::{Path, State};
use axum::{Form, Json};
use chrono::{Local, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// What a guest sees when opening their link.
#[derive(Debug, Serialize)]
pub struct GuestView {
    /// Reservation number
    pub reservation_number: String,
    /// Room number
    pub room_number: i64,
    /// Check-in date
    pub checkin_date: NaiveDate,
    /// Checkout date
    pub checkout_date: NaiveDate,
    /// Apartment door code
    pub apartment_code: String,
    /// Building access codes, in display order
    pub building_codes: Vec<GuestBuildingCode>,
    /// Billing display name (person or company), once submitted
    pub display_name: Option<String>,
    /// Whether details have been submitted
    pub submitted: bool,
    /// Whether the guest may still edit their details
    pub can_edit: bool,
    /// Previously submitted details, for pre-filling the form
    pub details: Option<SubmittedDetails>,
}

/// Building code as shown to guests.
#[derive(Debug, Serialize)]
pub struct GuestBuildingCode {
    /// Display name
    pub name: String,
    /// Keypad code
    pub code: String,
}

/// Echo of the guest's previous submission.
#[derive(Debug, Serialize)]
pub struct SubmittedDetails {
    pub invoice_type: InvoiceType,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub company_name: Option<String>,
    pub tax_id: Option<String>,
    pub vat_eu: Option<String>,
    pub address: Option<String>,
    pub email: Option<String>,
    pub special_requests: Option<String>,
}

/// Guest form submission. Empty strings are treated as absent.
#[derive(Debug, Deserialize)]
pub struct GuestForm {
    /// The reservation being checked in
    pub reservation_number: String,
    /// `individual` or `business`
    pub invoice_type: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub company_name: String,
    #[serde(default)]
    pub tax_id: String,
    #[serde(default)]
    pub vat_eu: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub special_requests: String,
}

fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Validate a guest form against the billing-type rules.
///
/// All problems are reported at once, joined into a single message.
///
/// # Errors
///
/// Returns [`CheckinError::Validation`] listing every missing field.
pub fn validate_form(form: &GuestForm) -> Result<GuestDetails, CheckinError> {
    let invoice_type = match form.invoice_type.as_str() {
        "individual" => InvoiceType::Individual,
        "business" => InvoiceType::Business,
        other => {
            return Err(CheckinError::validation(format!(
                "Unknown invoice type: {other}"
            )))
        }
    };

    let mut missing: Vec<&str> = Vec::new();
    match invoice_type {
        InvoiceType::Individual => {
            if non_empty(&form.first_name).is_none() {
                missing.push("First name");
            }
            if non_empty(&form.last_name).is_none() {
                missing.push("Last name");
            }
        }
        InvoiceType::Business => {
            if non_empty(&form.company_name).is_none() {
                missing.push("Company name");
            }
            if non_empty(&form.tax_id).is_none() {
                missing.push("Tax ID");
            }
        }
    }
    if non_empty(&form.address).is_none() {
        missing.push("Address");
    }
    if non_empty(&form.email).is_none() {
        missing.push("Email");
    }
    if !missing.is_empty() {
        return Err(CheckinError::validation(format!(
            "Required: {}",
            missing.join(", ")
        )));
    }

    let (address, email) = match (non_empty(&form.address), non_empty(&form.email)) {
        (Some(address), Some(email)) => (address, email),
        _ => return Err(CheckinError::validation("Required: Address, Email")),
    };
    Ok(GuestDetails {
        invoice_type,
        first_name: non_empty(&form.first_name),
        last_name: non_empty(&form.last_name),
        company_name: non_empty(&form.company_name),
        tax_id: non_empty(&form.tax_id),
        vat_eu: non_empty(&form.vat_eu),
        address,
        email,
        special_requests: non_empty(&form.special_requests),
    })
}

fn guest_view(reservation: &Reservation, codes: Vec<BuildingCode>, now: NaiveDateTime) -> GuestView {
    let submitted = reservation.guest_submitted();
    GuestView {
        reservation_number: reservation.reservation_number.clone(),
        room_number: reservation.room_number,
        checkin_date: reservation.checkin_date,
        checkout_date: reservation.checkout_date,
        apartment_code: reservation.apartment_code.clone(),
        building_codes: codes
            .into_iter()
            .map(|c| GuestBuildingCode {
                name: c.name,
                code: c.code,
            })
            .collect(),
        display_name: reservation.display_name(),
        submitted,
        can_edit: !submitted || reservation.can_edit_at(now),
        details: reservation.invoice_type.map(|invoice_type| SubmittedDetails {
            invoice_type,
            first_name: reservation.first_name.clone(),
            last_name: reservation.last_name.clone(),
            company_name: reservation.company_name.clone(),
            tax_id: reservation.tax_id.clone(),
            vat_eu: reservation.vat_eu.clone(),
            address: reservation.address.clone(),
            email: reservation.email.clone(),
            special_requests: reservation.special_requests.clone(),
        }),
    }
}

/// `GET /api/guest/{reservation_number}`
///
/// # Errors
///
/// Returns 404 for unknown reservation numbers.
pub async fn view(
    State(state): State<AppState>,
    Path(reservation_number): Path<String>,
) -> Result<Json<GuestView>, AppError> {
    let reservation = state
        .store
        .get_reservation_by_number(&reservation_number)
        .await?;
    let codes = state.store.list_building_codes(true).await?;
    Ok(Json(guest_view(
        &reservation,
        codes,
        Local::now().naive_local(),
    )))
}

/// `POST /guest/submit`
///
/// Stores the guest's billing details; the reservation number travels in
/// the form body. The first submission is always accepted; edits are
/// refused from one hour before checkout time on the checkout date.
///
/// # Errors
///
/// Returns 404 for unknown reservation numbers, 422 for missing fields,
/// and 403 once the edit window has closed.
pub async fn submit(
    State(state): State<AppState>,
    Form(form): Form<GuestForm>,
) -> Result<Json<GuestView>, AppError> {
    let reservation = state
        .store
        .get_reservation_by_number(&form.reservation_number)
        .await?;

    let now = Local::now().naive_local();
    if reservation.guest_submitted() && !reservation.can_edit_at(now) {
        return Err(CheckinError::EditWindowClosed.into());
    }

    let details = validate_form(&form)?;
    let updated = state
        .store
        .submit_guest_details(&form.reservation_number, &details)
        .await?;
    let codes = state.store.list_building_codes(true).await?;
    Ok(Json(guest_view(&updated, codes, now)))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn base_form() -> GuestForm {
        GuestForm {
            reservation_number: "RES-2025-001".to_string(),
            invoice_type: "individual".to_string(),
            first_name: "Anna".to_string(),
            last_name: "Kowalska".to_string(),
            company_name: String::new(),
            tax_id: String::new(),
            vat_eu: String::new(),
            address: "ul. Marszalkowska 100".to_string(),
            email: "anna@example.com".to_string(),
            special_requests: String::new(),
        }
    }

    #[test]
    fn individual_form_validates() {
        let details = validate_form(&base_form()).unwrap();
        assert_eq!(details.invoice_type, InvoiceType::Individual);
        assert_eq!(details.first_name.as_deref(), Some("Anna"));
        assert!(details.company_name.is_none());
    }

    #[test]
    fn individual_requires_names() {
        let mut form = base_form();
        form.first_name = String::new();
        form.last_name = "  ".to_string();
        let err = validate_form(&form).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("First name"));
        assert!(message.contains("Last name"));
    }

    #[test]
    fn business_requires_company_and_tax_id() {
        let mut form = base_form();
        form.invoice_type = "business".to_string();
        let err = validate_form(&form).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("Company name"));
        assert!(message.contains("Tax ID"));
    }

    #[test]
    fn business_form_validates() {
        let mut form = base_form();
        form.invoice_type = "business".to_string();
        form.company_name = "Tech Solutions sp. z o.o.".to_string();
        form.tax_id = "1234567890".to_string();
        let details = validate_form(&form).unwrap();
        assert_eq!(details.invoice_type, InvoiceType::Business);
        assert_eq!(
            details.company_name.as_deref(),
            Some("Tech Solutions sp. z o.o.")
        );
    }

    #[test]
    fn unknown_invoice_type_is_rejected() {
        let mut form = base_form();
        form.invoice_type = "charity".to_string();
        assert!(validate_form(&form).is_err());
    }

    #[test]
    fn address_and_email_always_required() {
        let mut form = base_form();
        form.address = String::new();
        form.email = String::new();
        let err = validate_form(&form).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("Address"));
        assert!(message.contains("Email"));
    }
}
