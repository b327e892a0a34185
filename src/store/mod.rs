//! SQLite persistence for reservations, invoices, and related records.
//!
//! [`CheckinStore`] wraps a connection pool; the operation groups live in
//! sibling modules as separate impl blocks:
//! - [`reservations`]: reservation CRUD and guest submissions
//! - [`invoices`]: invoice fields, settings, and correction versions
//! - [`building_codes`]: building access codes

pub mod building_codes;
pub mod invoices;
pub mod reservations;

use crate::error::{CheckinError, Result};
use crate::invoice::vat_amount;
use chrono::{Duration, Utc};
use rand::Rng;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;
use tracing::info;

/// SQLite-backed store for the check-in service.
#[derive(Clone)]
pub struct CheckinStore {
    /// Connection pool.
    pool: SqlitePool,
}

impl CheckinStore {
    /// Wrap an existing pool.
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Open (and create if missing) the database at `url`.
    ///
    /// # Errors
    ///
    /// Returns [`CheckinError::Database`] if the URL is invalid or the
    /// connection fails.
    pub async fn connect(url: &str, max_connections: u32) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(url)
            .map_err(|e| CheckinError::Database(format!("Invalid database URL: {e}")))?
            .create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await
            .map_err(|e| CheckinError::Database(format!("Connection failed: {e}")))?;
        Ok(Self::new(pool))
    }

    /// In-memory database for tests.
    ///
    /// # Errors
    ///
    /// Returns [`CheckinError::Database`] if the connection fails.
    pub async fn connect_in_memory() -> Result<Self> {
        // A single connection keeps the in-memory schema alive.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .map_err(|e| CheckinError::Database(format!("Connection failed: {e}")))?;
        Ok(Self::new(pool))
    }

    /// Access the underlying pool.
    #[must_use]
    pub const fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Run database migrations.
    ///
    /// # Errors
    ///
    /// Returns [`CheckinError::Database`] if a migration fails.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| CheckinError::Database(format!("Migration failed: {e}")))?;
        Ok(())
    }

    /// Initialize the database: migrate, ensure the settings row, and seed
    /// demo data into an empty database.
    ///
    /// # Errors
    ///
    /// Returns [`CheckinError::Database`] on any store failure.
    pub async fn init(&self) -> Result<()> {
        self.migrate().await?;
        self.ensure_settings_row().await?;

        let existing = self.count_reservations().await?;
        if existing == 0 {
            self.seed_demo_data().await?;
            info!("Database seeded with demo data");
        } else {
            info!(reservations = existing, "Database already initialized");
        }
        Ok(())
    }

    /// Drop all rows and reseed.
    ///
    /// # Errors
    ///
    /// Returns [`CheckinError::Database`] on any store failure.
    pub async fn reset(&self) -> Result<()> {
        self.migrate().await?;
        for table in [
            "invoice_versions",
            "reservations",
            "building_codes",
            "invoice_settings",
        ] {
            sqlx::query(&format!("DELETE FROM {table}"))
                .execute(&self.pool)
                .await
                .map_err(db_err)?;
        }
        self.ensure_settings_row().await?;
        self.seed_demo_data().await?;
        info!("Database reset and reseeded");
        Ok(())
    }

    async fn ensure_settings_row(&self) -> Result<()> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM invoice_settings")
            .fetch_one(&self.pool)
            .await
            .map_err(db_err)?;
        if count == 0 {
            sqlx::query(
                "INSERT INTO invoice_settings (issuer_name, issuer_address, updated_at)
                 VALUES ('Your Company Name', 'Your Address', ?)",
            )
            .bind(Utc::now())
            .execute(&self.pool)
            .await
            .map_err(db_err)?;
        }
        Ok(())
    }

    async fn seed_demo_data(&self) -> Result<()> {
        let now = Utc::now();
        let today = now.date_naive();

        for (name, code, order) in [("Main Entrance", "292929#", 1_i64), ("Parking Gate", "1234#", 2)] {
            sqlx::query(
                "INSERT INTO building_codes (name, code, display_order, is_active, created_at)
                 VALUES (?, ?, ?, 1, ?)",
            )
            .bind(name)
            .bind(code)
            .bind(order)
            .bind(now)
            .execute(&self.pool)
            .await
            .map_err(db_err)?;
        }

        // Pending stay, nothing submitted yet.
        sqlx::query(
            "INSERT INTO reservations
                (reservation_number, room_number, apartment_code, checkin_date, checkout_date,
                 created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind("DEMO-001")
        .bind(1_i64)
        .bind(generate_apartment_code())
        .bind(today + Duration::days(5))
        .bind(today + Duration::days(8))
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;

        // Individual details submitted, upcoming stay.
        sqlx::query(
            "INSERT INTO reservations
                (reservation_number, room_number, apartment_code, checkin_date, checkout_date,
                 invoice_type, first_name, last_name, address, email, guest_submitted_at,
                 created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind("DEMO-002")
        .bind(2_i64)
        .bind(generate_apartment_code())
        .bind(today + Duration::days(2))
        .bind(today + Duration::days(5))
        .bind("individual")
        .bind("Anna")
        .bind("Kowalska")
        .bind("ul. Marszalkowska 100, 00-001 Warszawa")
        .bind("anna.kowalska@example.com")
        .bind(now - Duration::days(1))
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;

        // Business stay with a generated invoice.
        sqlx::query(
            "INSERT INTO reservations
                (reservation_number, room_number, apartment_code, checkin_date, checkout_date,
                 invoice_type, company_name, tax_id, vat_eu, address, email, special_requests,
                 service_name, amount_paid, vat_rate, vat_amount, invoice_generated_at,
                 invoice_number, guest_submitted_at, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind("DEMO-003")
        .bind(3_i64)
        .bind(generate_apartment_code())
        .bind(today - Duration::days(5))
        .bind(today - Duration::days(2))
        .bind("business")
        .bind("Tech Solutions sp. z o.o.")
        .bind("1234567890")
        .bind("PL1234567890")
        .bind("ul. Nowy Swiat 50, 00-002 Warszawa")
        .bind("invoices@techsolutions.pl")
        .bind("Please include project reference: PRJ-2025-001")
        .bind("Apartment Rental")
        .bind(1200.0)
        .bind(8.0)
        .bind(vat_amount(1200.0, 8.0))
        .bind(now - Duration::days(1))
        .bind("INV/2025/001")
        .bind(now - Duration::days(6))
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;

        // Old stay, checkout 14+ days ago, invoice on file.
        sqlx::query(
            "INSERT INTO reservations
                (reservation_number, room_number, apartment_code, checkin_date, checkout_date,
                 invoice_type, first_name, last_name, address, email,
                 service_name, amount_paid, vat_rate, vat_amount, invoice_generated_at,
                 invoice_number, guest_submitted_at, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind("DEMO-004")
        .bind(4_i64)
        .bind(generate_apartment_code())
        .bind(today - Duration::days(20))
        .bind(today - Duration::days(17))
        .bind("individual")
        .bind("Jan")
        .bind("Nowak")
        .bind("ul. Dluga 15, 00-003 Krakow")
        .bind("jan.nowak@example.com")
        .bind("Apartment Rental")
        .bind(800.0)
        .bind(8.0)
        .bind(vat_amount(800.0, 8.0))
        .bind(now - Duration::days(16))
        .bind("INV/2025/002")
        .bind(now - Duration::days(21))
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;

        // Two seeded invoices already consumed rolling numbers 1 and 2.
        sqlx::query("UPDATE invoice_settings SET rolling_number_current = 2")
            .execute(&self.pool)
            .await
            .map_err(db_err)?;

        Ok(())
    }
}

/// Generate a random 6-digit apartment access code with a trailing `#`.
#[must_use]
pub fn generate_apartment_code() -> String {
    format!("{}#", rand::thread_rng().gen_range(100_000..=999_999))
}

pub(crate) fn db_err(e: sqlx::Error) -> CheckinError {
    CheckinError::Database(e.to_string())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn apartment_code_shape() {
        for _ in 0..32 {
            let code = generate_apartment_code();
            assert_eq!(code.len(), 7);
            assert!(code.ends_with('#'));
            assert!(code[..6].chars().all(|c| c.is_ascii_digit()));
        }
    }

    #[tokio::test]
    async fn init_seeds_once() {
        let store = CheckinStore::connect_in_memory().await.unwrap();
        store.init().await.unwrap();
        assert_eq!(store.count_reservations().await.unwrap(), 4);

        // Second init leaves the data alone.
        store.init().await.unwrap();
        assert_eq!(store.count_reservations().await.unwrap(), 4);
    }

    #[tokio::test]
    async fn reset_reseeds() {
        let store = CheckinStore::connect_in_memory().await.unwrap();
        store.init().await.unwrap();
        store.delete_reservation_by_number("DEMO-001").await.unwrap();
        assert_eq!(store.count_reservations().await.unwrap(), 3);

        store.reset().await.unwrap();
        assert_eq!(store.count_reservations().await.unwrap(), 4);
        let settings = store.get_settings().await.unwrap();
        assert_eq!(settings.rolling_number_current, 2);
    }
}
