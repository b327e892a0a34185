//! Invoice issuance state, settings, and correction versions.

use super::{db_err, CheckinStore};
use crate::error::{CheckinError, Result};
use crate::types::{InvoiceSettings, InvoiceVersion, Reservation};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use sqlx::QueryBuilder;
use tracing::info;

/// Invoice fields written when an invoice is issued or corrected.
#[derive(Debug, Clone)]
pub struct IssuedInvoice {
    pub service_name: String,
    pub amount_paid: f64,
    pub vat_rate: f64,
    pub vat_amount: f64,
    pub invoice_number: String,
    pub invoice_generated_at: DateTime<Utc>,
}

/// Partial update of the invoice settings; absent fields are unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateInvoiceSettings {
    pub issuer_name: Option<String>,
    pub issuer_address: Option<String>,
    pub issuer_tax_id: Option<String>,
    pub issuer_vat_eu: Option<String>,
    pub issuer_email: Option<String>,
    pub issuer_phone: Option<String>,
    pub issuer_bank_name: Option<String>,
    pub issuer_bank_account: Option<String>,
    pub numbering_pattern: Option<String>,
    pub rolling_number_current: Option<i64>,
    pub payment_days_due: Option<i64>,
    pub payment_instructions: Option<String>,
}

impl CheckinStore {
    /// The single invoice settings row.
    ///
    /// # Errors
    ///
    /// Returns [`CheckinError::NotFound`] if the row is missing (the
    /// database was not initialized).
    pub async fn get_settings(&self) -> Result<InvoiceSettings> {
        sqlx::query_as::<_, InvoiceSettings>(
            "SELECT * FROM invoice_settings ORDER BY id LIMIT 1",
        )
        .fetch_optional(self.pool())
        .await
        .map_err(db_err)?
        .ok_or_else(|| CheckinError::not_found("Invoice settings"))
    }

    /// Apply a partial settings update.
    ///
    /// A new `numbering_pattern` must be valid JSON for the component
    /// format; it is checked before writing.
    ///
    /// # Errors
    ///
    /// Returns [`CheckinError::Validation`] for an empty update or a
    /// malformed pattern.
    pub async fn update_settings(
        &self,
        update: &UpdateInvoiceSettings,
    ) -> Result<InvoiceSettings> {
        if let Some(pattern) = &update.numbering_pattern {
            crate::invoice::parse_pattern(pattern)?;
        }

        let current = self.get_settings().await?;
        let mut builder = QueryBuilder::new("UPDATE invoice_settings SET ");
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

        set_field!("issuer_name", &update.issuer_name);
        set_field!("issuer_address", &update.issuer_address);
        set_field!("issuer_tax_id", &update.issuer_tax_id);
        set_field!("issuer_vat_eu", &update.issuer_vat_eu);
        set_field!("issuer_email", &update.issuer_email);
        set_field!("issuer_phone", &update.issuer_phone);
        set_field!("issuer_bank_name", &update.issuer_bank_name);
        set_field!("issuer_bank_account", &update.issuer_bank_account);
        set_field!("numbering_pattern", &update.numbering_pattern);
        set_field!("rolling_number_current", update.rolling_number_current);
        set_field!("payment_days_due", update.payment_days_due);
        set_field!("payment_instructions", &update.payment_instructions);

        if !touched {
            return Err(CheckinError::validation("No fields to update"));
        }
        fields.push("updated_at = ");
        fields.push_bind_unseparated(Utc::now());
        builder.push(" WHERE id = ");
        builder.push_bind(current.id);
        builder.build().execute(self.pool()).await.map_err(db_err)?;

        info!("Invoice settings updated");
        self.get_settings().await
    }

    /// Advance the rolling counter to `value`.
    ///
    /// # Errors
    ///
    /// Returns [`CheckinError::Database`] on query failure.
    pub async fn set_rolling_number(&self, value: i64) -> Result<()> {
        sqlx::query("UPDATE invoice_settings SET rolling_number_current = ?, updated_at = ?")
            .bind(value)
            .bind(Utc::now())
            .execute(self.pool())
            .await
            .map_err(db_err)?;
        Ok(())
    }

    /// Write the issued invoice fields onto a reservation.
    ///
    /// # Errors
    ///
    /// Returns [`CheckinError::NotFound`] for unknown ids.
    pub async fn set_invoice(&self, id: i64, invoice: &IssuedInvoice) -> Result<Reservation> {
        let result = sqlx::query(
            "UPDATE reservations SET
                service_name = ?, amount_paid = ?, vat_rate = ?, vat_amount = ?,
                invoice_number = ?, invoice_generated_at = ?, updated_at = ?
             WHERE id = ?",
        )
        .bind(&invoice.service_name)
        .bind(invoice.amount_paid)
        .bind(invoice.vat_rate)
        .bind(invoice.vat_amount)
        .bind(&invoice.invoice_number)
        .bind(invoice.invoice_generated_at)
        .bind(Utc::now())
        .bind(id)
        .execute(self.pool())
        .await
        .map_err(db_err)?;
        if result.rows_affected() == 0 {
            return Err(CheckinError::not_found("Reservation"));
        }
        info!(
            reservation_id = id,
            invoice_number = %invoice.invoice_number,
            "Invoice recorded"
        );
        self.get_reservation(id).await
    }

    /// Snapshot an issued invoice as an immutable version.
    ///
    /// # Errors
    ///
    /// Returns [`CheckinError::Database`] on query failure.
    pub async fn insert_invoice_version(
        &self,
        reservation_id: i64,
        version_number: i64,
        invoice_number: &str,
        invoice_data: &str,
    ) -> Result<InvoiceVersion> {
        sqlx::query(
            "INSERT INTO invoice_versions
                (reservation_id, version_number, invoice_number, invoice_data, created_at)
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(reservation_id)
        .bind(version_number)
        .bind(invoice_number)
        .bind(invoice_data)
        .bind(Utc::now())
        .execute(self.pool())
        .await
        .map_err(db_err)?;

        sqlx::query_as::<_, InvoiceVersion>(
            "SELECT * FROM invoice_versions
             WHERE reservation_id = ? AND version_number = ?",
        )
        .bind(reservation_id)
        .bind(version_number)
        .fetch_one(self.pool())
        .await
        .map_err(db_err)
    }

    /// All versions for a reservation, oldest first.
    ///
    /// # Errors
    ///
    /// Returns [`CheckinError::Database`] on query failure.
    pub async fn list_invoice_versions(
        &self,
        reservation_id: i64,
    ) -> Result<Vec<InvoiceVersion>> {
        sqlx::query_as::<_, InvoiceVersion>(
            "SELECT * FROM invoice_versions
             WHERE reservation_id = ? ORDER BY version_number",
        )
        .bind(reservation_id)
        .fetch_all(self.pool())
        .await
        .map_err(db_err)
    }

    /// Number of versions recorded for a reservation.
    ///
    /// # Errors
    ///
    /// Returns [`CheckinError::Database`] on query failure.
    pub async fn count_invoice_versions(&self, reservation_id: i64) -> Result<i64> {
        sqlx::query_scalar(
            "SELECT COUNT(*) FROM invoice_versions WHERE reservation_id = ?",
        )
        .bind(reservation_id)
        .fetch_one(self.pool())
        .await
        .map_err(db_err)
    }

    /// Whether an invoice number is already used by another reservation.
    ///
    /// # Errors
    ///
    /// Returns [`CheckinError::Database`] on query failure.
    pub async fn invoice_number_exists(
        &self,
        number: &str,
        exclude_reservation: Option<i64>,
    ) -> Result<bool> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM reservations
             WHERE invoice_number = ? AND id != ?",
        )
        .bind(number)
        .bind(exclude_reservation.unwrap_or(-1))
        .fetch_one(self.pool())
        .await
        .map_err(db_err)?;
        Ok(count > 0)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::store::reservations::NewReservation;
    use chrono::NaiveDate;

    async fn store() -> CheckinStore {
        let store = CheckinStore::connect_in_memory().await.unwrap();
        store.migrate().await.unwrap();
        store.ensure_settings_row().await.unwrap();
        store
    }

    async fn seeded(store: &CheckinStore) -> Reservation {
        store
            .create_reservation(&NewReservation {
                reservation_number: "RES-2025-001".to_string(),
                room_number: 1,
                checkin_date: NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
                checkout_date: NaiveDate::from_ymd_opt(2025, 6, 4).unwrap(),
                email: None,
            })
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn default_settings_have_inv_pattern() {
        let store = store().await;
        let settings = store.get_settings().await.unwrap();
        assert_eq!(settings.rolling_number_current, 0);
        let pattern = crate::invoice::parse_pattern(&settings.numbering_pattern).unwrap();
        assert_eq!(pattern.len(), 5);
    }

    #[tokio::test]
    async fn settings_update_rejects_bad_pattern() {
        let store = store().await;
        let err = store
            .update_settings(&UpdateInvoiceSettings {
                numbering_pattern: Some("{broken".to_string()),
                ..UpdateInvoiceSettings::default()
            })
            .await
            .unwrap_err();
        assert!(matches!(err, CheckinError::Validation(_)));
    }

    #[tokio::test]
    async fn settings_partial_update() {
        let store = store().await;
        let updated = store
            .update_settings(&UpdateInvoiceSettings {
                issuer_name: Some("Apartamenty Centrum".to_string()),
                payment_days_due: Some(30),
                ..UpdateInvoiceSettings::default()
            })
            .await
            .unwrap();
        assert_eq!(updated.issuer_name.as_deref(), Some("Apartamenty Centrum"));
        assert_eq!(updated.payment_days_due, 30);
    }

    #[tokio::test]
    async fn set_invoice_and_versions() {
        let store = store().await;
        let r = seeded(&store).await;

        let issued = IssuedInvoice {
            service_name: "Apartment Rental".to_string(),
            amount_paid: 1200.0,
            vat_rate: 8.0,
            vat_amount: 88.89,
            invoice_number: "INV/2025/001".to_string(),
            invoice_generated_at: Utc::now(),
        };
        let updated = store.set_invoice(r.id, &issued).await.unwrap();
        assert_eq!(updated.invoice_number.as_deref(), Some("INV/2025/001"));

        store
            .insert_invoice_version(r.id, 1, "INV/2025/001", "{}")
            .await
            .unwrap();
        assert_eq!(store.count_invoice_versions(r.id).await.unwrap(), 1);
        let versions = store.list_invoice_versions(r.id).await.unwrap();
        assert_eq!(versions[0].version_number, 1);

        assert!(store
            .invoice_number_exists("INV/2025/001", None)
            .await
            .unwrap());
        assert!(!store
            .invoice_number_exists("INV/2025/001", Some(r.id))
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn rolling_number_advances() {
        let store = store().await;
        store.set_rolling_number(5).await.unwrap();
        assert_eq!(store.get_settings().await.unwrap().rolling_number_current, 5);
    }
}
