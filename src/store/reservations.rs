//! Reservation CRUD and guest submissions.

use super::{db_err, generate_apartment_code, CheckinStore};
use crate::error::{CheckinError, Result};
use crate::types::{InvoiceType, Reservation};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use sqlx::QueryBuilder;
use tracing::{info, warn};

/// Attempts at finding an unused apartment code before giving up.
const CODE_ATTEMPTS: u32 = 16;

/// Payload for creating a reservation.
#[derive(Debug, Clone, Deserialize)]
pub struct NewReservation {
    /// Human-assigned unique reservation number
    pub reservation_number: String,
    /// Room number
    pub room_number: i64,
    /// Check-in date
    pub checkin_date: NaiveDate,
    /// Checkout date
    pub checkout_date: NaiveDate,
    /// Guest email for the link notification (optional)
    #[serde(default)]
    pub email: Option<String>,
}

/// Partial update of a reservation; absent fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateReservation {
    pub reservation_number: Option<String>,
    pub room_number: Option<i64>,
    pub apartment_code: Option<String>,
    pub checkin_date: Option<NaiveDate>,
    pub checkout_date: Option<NaiveDate>,
    pub invoice_type: Option<InvoiceType>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub company_name: Option<String>,
    pub tax_id: Option<String>,
    pub vat_eu: Option<String>,
    pub address: Option<String>,
    pub email: Option<String>,
    pub special_requests: Option<String>,
}

/// Billing details submitted by the guest.
#[derive(Debug, Clone)]
pub struct GuestDetails {
    pub invoice_type: InvoiceType,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub company_name: Option<String>,
    pub tax_id: Option<String>,
    pub vat_eu: Option<String>,
    pub address: String,
    pub email: String,
    pub special_requests: Option<String>,
}

impl CheckinStore {
    /// Create a reservation with a freshly generated apartment code.
    ///
    /// # Errors
    ///
    /// Returns [`CheckinError::Validation`] if the reservation number is
    /// empty or already taken, or if no unused apartment code could be
    /// found.
    pub async fn create_reservation(&self, new: &NewReservation) -> Result<Reservation> {
        if new.reservation_number.trim().is_empty() {
            return Err(CheckinError::validation("Reservation number is required"));
        }
        if new.checkout_date < new.checkin_date {
            return Err(CheckinError::validation(
                "Checkout date must not be before check-in date",
            ));
        }
        if self.reservation_number_exists(&new.reservation_number).await? {
            return Err(CheckinError::validation(
                "Reservation number already exists",
            ));
        }

        let apartment_code = self.unused_apartment_code().await?;
        let now = Utc::now();
        sqlx::query(
            "INSERT INTO reservations
                (reservation_number, room_number, apartment_code, checkin_date, checkout_date,
                 email, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&new.reservation_number)
        .bind(new.room_number)
        .bind(&apartment_code)
        .bind(new.checkin_date)
        .bind(new.checkout_date)
        .bind(&new.email)
        .bind(now)
        .bind(now)
        .execute(self.pool())
        .await
        .map_err(db_err)?;

        info!(reservation = %new.reservation_number, "Reservation created");
        self.get_reservation_by_number(&new.reservation_number)
            .await
    }

    /// All reservations, newest check-in first.
    ///
    /// # Errors
    ///
    /// Returns [`CheckinError::Database`] on query failure.
    pub async fn list_reservations(&self) -> Result<Vec<Reservation>> {
        sqlx::query_as::<_, Reservation>(
            "SELECT * FROM reservations ORDER BY checkin_date DESC, id DESC",
        )
        .fetch_all(self.pool())
        .await
        .map_err(db_err)
    }

    /// Look up a reservation by row id.
    ///
    /// # Errors
    ///
    /// Returns [`CheckinError::NotFound`] for unknown ids.
    pub async fn get_reservation(&self, id: i64) -> Result<Reservation> {
        sqlx::query_as::<_, Reservation>("SELECT * FROM reservations WHERE id = ?")
            .bind(id)
            .fetch_optional(self.pool())
            .await
            .map_err(db_err)?
            .ok_or_else(|| CheckinError::not_found("Reservation"))
    }

    /// Look up a reservation by its reservation number.
    ///
    /// # Errors
    ///
    /// Returns [`CheckinError::NotFound`] for unknown numbers.
    pub async fn get_reservation_by_number(&self, number: &str) -> Result<Reservation> {
        sqlx::query_as::<_, Reservation>(
            "SELECT * FROM reservations WHERE reservation_number = ?",
        )
        .bind(number)
        .fetch_optional(self.pool())
        .await
        .map_err(db_err)?
        .ok_or_else(|| CheckinError::not_found("Reservation"))
    }

    /// Apply a partial update.
    ///
    /// # Errors
    ///
    /// Returns [`CheckinError::Validation`] if no fields are given or the
    /// new reservation number collides, [`CheckinError::NotFound`] for
    /// unknown ids.
    pub async fn update_reservation(
        &self,
        id: i64,
        update: &UpdateReservation,
    ) -> Result<Reservation> {
        let current = self.get_reservation(id).await?;
        if let Some(number) = &update.reservation_number {
            if number != &current.reservation_number
                && self.reservation_number_exists(number).await?
            {
                return Err(CheckinError::validation(
                    "Reservation number already exists",
                ));
            }
        }

        let mut builder = QueryBuilder::new("UPDATE reservations SET ");
        let mut fields = builder.separated(", ");
        let mut touched = false;

        macro_rules! set_field {
            ($name:literal, $value:expr) => {
                if let Some(value) = $value {
                    fields.push(concat!($name, " = "));
                    fields.push_bind_unseparated(value);
                    touched = true;
                }
            };
        }

        set_field!("reservation_number", &update.reservation_number);
        set_field!("room_number", update.room_number);
        set_field!("apartment_code", &update.apartment_code);
        set_field!("checkin_date", update.checkin_date);
        set_field!("checkout_date", update.checkout_date);
        set_field!("invoice_type", update.invoice_type);
        set_field!("first_name", &update.first_name);
        set_field!("last_name", &update.last_name);
        set_field!("company_name", &update.company_name);
        set_field!("tax_id", &update.tax_id);
        set_field!("vat_eu", &update.vat_eu);
        set_field!("address", &update.address);
        set_field!("email", &update.email);
        set_field!("special_requests", &update.special_requests);

        if !touched {
            return Err(CheckinError::validation("No fields to update"));
        }
        fields.push("updated_at = ");
        fields.push_bind_unseparated(Utc::now());
        builder.push(" WHERE id = ");
        builder.push_bind(id);
        builder.build().execute(self.pool()).await.map_err(db_err)?;

        self.get_reservation(id).await
    }

    /// Delete a reservation and its invoice versions.
    ///
    /// # Errors
    ///
    /// Returns [`CheckinError::NotFound`] for unknown ids.
    pub async fn delete_reservation(&self, id: i64) -> Result<()> {
        sqlx::query("DELETE FROM invoice_versions WHERE reservation_id = ?")
            .bind(id)
            .execute(self.pool())
            .await
            .map_err(db_err)?;
        let result = sqlx::query("DELETE FROM reservations WHERE id = ?")
            .bind(id)
            .execute(self.pool())
            .await
            .map_err(db_err)?;
        if result.rows_affected() == 0 {
            return Err(CheckinError::not_found("Reservation"));
        }
        info!(reservation_id = id, "Reservation deleted");
        Ok(())
    }

    /// Delete by reservation number (used by tests and tooling).
    ///
    /// # Errors
    ///
    /// Returns [`CheckinError::NotFound`] for unknown numbers.
    pub async fn delete_reservation_by_number(&self, number: &str) -> Result<()> {
        let reservation = self.get_reservation_by_number(number).await?;
        self.delete_reservation(reservation.id).await
    }

    /// Clear guest and invoice data, keeping the stay itself.
    ///
    /// # Errors
    ///
    /// Returns [`CheckinError::NotFound`] for unknown ids.
    pub async fn clear_guest_data(&self, id: i64) -> Result<Reservation> {
        let result = sqlx::query(
            "UPDATE reservations SET
                invoice_type = NULL, first_name = NULL, last_name = NULL,
                company_name = NULL, tax_id = NULL, vat_eu = NULL,
                address = NULL, email = NULL, special_requests = NULL,
                service_name = NULL, amount_paid = NULL, vat_rate = NULL,
                vat_amount = NULL, invoice_generated_at = NULL,
                invoice_number = NULL, guest_submitted_at = NULL,
                updated_at = ?
             WHERE id = ?",
        )
        .bind(Utc::now())
        .bind(id)
        .execute(self.pool())
        .await
        .map_err(db_err)?;
        if result.rows_affected() == 0 {
            return Err(CheckinError::not_found("Reservation"));
        }
        sqlx::query("DELETE FROM invoice_versions WHERE reservation_id = ?")
            .bind(id)
            .execute(self.pool())
            .await
            .map_err(db_err)?;
        info!(reservation_id = id, "Guest data cleared");
        self.get_reservation(id).await
    }

    /// Store the guest's billing details.
    ///
    /// The first submission stamps `guest_submitted_at`; later edits keep
    /// the original timestamp.
    ///
    /// # Errors
    ///
    /// Returns [`CheckinError::NotFound`] for unknown reservation numbers.
    pub async fn submit_guest_details(
        &self,
        number: &str,
        details: &GuestDetails,
    ) -> Result<Reservation> {
        let now = Utc::now();
        let result = sqlx::query(
            "UPDATE reservations SET
                invoice_type = ?, first_name = ?, last_name = ?,
                company_name = ?, tax_id = ?, vat_eu = ?,
                address = ?, email = ?, special_requests = ?,
                guest_submitted_at = COALESCE(guest_submitted_at, ?),
                updated_at = ?
             WHERE reservation_number = ?",
        )
        .bind(details.invoice_type)
        .bind(&details.first_name)
        .bind(&details.last_name)
        .bind(&details.company_name)
        .bind(&details.tax_id)
        .bind(&details.vat_eu)
        .bind(&details.address)
        .bind(&details.email)
        .bind(&details.special_requests)
        .bind(now)
        .bind(now)
        .bind(number)
        .execute(self.pool())
        .await
        .map_err(db_err)?;
        if result.rows_affected() == 0 {
            return Err(CheckinError::not_found("Reservation"));
        }
        info!(reservation = %number, "Guest details submitted");
        self.get_reservation_by_number(number).await
    }

    /// Number of reservations on file.
    ///
    /// # Errors
    ///
    /// Returns [`CheckinError::Database`] on query failure.
    pub async fn count_reservations(&self) -> Result<i64> {
        sqlx::query_scalar("SELECT COUNT(*) FROM reservations")
            .fetch_one(self.pool())
            .await
            .map_err(db_err)
    }

    async fn reservation_number_exists(&self, number: &str) -> Result<bool> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM reservations WHERE reservation_number = ?")
                .bind(number)
                .fetch_one(self.pool())
                .await
                .map_err(db_err)?;
        Ok(count > 0)
    }

    async fn apartment_code_exists(&self, code: &str) -> Result<bool> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM reservations WHERE apartment_code = ?")
                .bind(code)
                .fetch_one(self.pool())
                .await
                .map_err(db_err)?;
        Ok(count > 0)
    }

    async fn unused_apartment_code(&self) -> Result<String> {
        for attempt in 0..CODE_ATTEMPTS {
            let code = generate_apartment_code();
            if !self.apartment_code_exists(&code).await? {
                return Ok(code);
            }
            warn!(attempt, "Apartment code collision, retrying");
        }
        Err(CheckinError::validation(
            "Could not generate a unique apartment code",
        ))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    async fn store() -> CheckinStore {
        let store = CheckinStore::connect_in_memory().await.unwrap();
        store.migrate().await.unwrap();
        store
    }

    fn new_reservation(number: &str) -> NewReservation {
        NewReservation {
            reservation_number: number.to_string(),
            room_number: 12,
            checkin_date: NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
            checkout_date: NaiveDate::from_ymd_opt(2025, 6, 4).unwrap(),
            email: None,
        }
    }

    fn guest_details() -> GuestDetails {
        GuestDetails {
            invoice_type: InvoiceType::Individual,
            first_name: Some("Anna".to_string()),
            last_name: Some("Kowalska".to_string()),
            company_name: None,
            tax_id: None,
            vat_eu: None,
            address: "ul. Marszalkowska 100".to_string(),
            email: "anna@example.com".to_string(),
            special_requests: None,
        }
    }

    #[tokio::test]
    async fn create_assigns_apartment_code() {
        let store = store().await;
        let r = store
            .create_reservation(&new_reservation("RES-2025-001"))
            .await
            .unwrap();
        assert_eq!(r.reservation_number, "RES-2025-001");
        assert_eq!(r.apartment_code.len(), 7);
        assert!(r.apartment_code.ends_with('#'));
        assert!(r.guest_submitted_at.is_none());
    }

    #[tokio::test]
    async fn duplicate_number_is_rejected() {
        let store = store().await;
        store
            .create_reservation(&new_reservation("RES-2025-001"))
            .await
            .unwrap();
        let err = store
            .create_reservation(&new_reservation("RES-2025-001"))
            .await
            .unwrap_err();
        assert!(matches!(err, CheckinError::Validation(_)));
    }

    #[tokio::test]
    async fn checkout_before_checkin_is_rejected() {
        let store = store().await;
        let mut new = new_reservation("RES-2025-001");
        new.checkout_date = new.checkin_date - chrono::Duration::days(1);
        let err = store.create_reservation(&new).await.unwrap_err();
        assert!(matches!(err, CheckinError::Validation(_)));
    }

    #[tokio::test]
    async fn partial_update_leaves_other_fields() {
        let store = store().await;
        let r = store
            .create_reservation(&new_reservation("RES-2025-001"))
            .await
            .unwrap();
        let updated = store
            .update_reservation(
                r.id,
                &UpdateReservation {
                    room_number: Some(7),
                    ..UpdateReservation::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.room_number, 7);
        assert_eq!(updated.reservation_number, "RES-2025-001");
        assert_eq!(updated.apartment_code, r.apartment_code);
    }

    #[tokio::test]
    async fn empty_update_is_rejected() {
        let store = store().await;
        let r = store
            .create_reservation(&new_reservation("RES-2025-001"))
            .await
            .unwrap();
        let err = store
            .update_reservation(r.id, &UpdateReservation::default())
            .await
            .unwrap_err();
        assert!(matches!(err, CheckinError::Validation(_)));
    }

    #[tokio::test]
    async fn guest_submission_sets_timestamp_once() {
        let store = store().await;
        store
            .create_reservation(&new_reservation("RES-2025-001"))
            .await
            .unwrap();

        let first = store
            .submit_guest_details("RES-2025-001", &guest_details())
            .await
            .unwrap();
        let submitted_at = first.guest_submitted_at.unwrap();

        let mut edited = guest_details();
        edited.address = "ul. Nowa 1".to_string();
        let second = store
            .submit_guest_details("RES-2025-001", &edited)
            .await
            .unwrap();
        assert_eq!(second.guest_submitted_at.unwrap(), submitted_at);
        assert_eq!(second.address.as_deref(), Some("ul. Nowa 1"));
    }

    #[tokio::test]
    async fn submission_to_unknown_reservation_is_not_found() {
        let store = store().await;
        let err = store
            .submit_guest_details("NOPE", &guest_details())
            .await
            .unwrap_err();
        assert!(matches!(err, CheckinError::NotFound { .. }));
    }

    #[tokio::test]
    async fn clear_guest_data_resets_submission() {
        let store = store().await;
        let r = store
            .create_reservation(&new_reservation("RES-2025-001"))
            .await
            .unwrap();
        store
            .submit_guest_details("RES-2025-001", &guest_details())
            .await
            .unwrap();

        let cleared = store.clear_guest_data(r.id).await.unwrap();
        assert!(cleared.guest_submitted_at.is_none());
        assert!(cleared.first_name.is_none());
        assert_eq!(cleared.reservation_number, "RES-2025-001");
    }

    #[tokio::test]
    async fn delete_unknown_is_not_found() {
        let store = store().await;
        let err = store.delete_reservation(999).await.unwrap_err();
        assert!(matches!(err, CheckinError::NotFound { .. }));
    }

    #[tokio::test]
    async fn list_orders_by_checkin_desc() {
        let store = store().await;
        let mut early = new_reservation("RES-A");
        early.checkin_date = NaiveDate::from_ymd_opt(2025, 5, 1).unwrap();
        early.checkout_date = NaiveDate::from_ymd_opt(2025, 5, 3).unwrap();
        store.create_reservation(&early).await.unwrap();
        store.create_reservation(&new_reservation("RES-B")).await.unwrap();

        let all = store.list_reservations().await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].reservation_number, "RES-B");
        assert_eq!(all[1].reservation_number, "RES-A");
    }
}
