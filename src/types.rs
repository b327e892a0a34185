//! Domain types for reservations, guest submissions, and invoices.

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

/// Checkout time of day; guests must leave by 11:00.
pub const CHECKOUT_HOUR: u32 = 11;

/// Billing type chosen by the guest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum InvoiceType {
    /// Private person: first/last name required.
    Individual,
    /// Company: name and tax id required.
    Business,
}

impl InvoiceType {
    /// Wire/storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Individual => "individual",
            Self::Business => "business",
        }
    }
}

/// A booked stay, including the 1:1 guest submission and current invoice.
///
/// Guest and invoice fields are `None` until the guest submits details and
/// the admin issues an invoice, respectively.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Reservation {
    /// Row id
    pub id: i64,
    /// Unique, human-assigned reservation number (e.g. `RES-2025-001`)
    pub reservation_number: String,
    /// Room number
    pub room_number: i64,
    /// Generated apartment access code, unique across reservations
    pub apartment_code: String,
    /// Check-in date
    pub checkin_date: NaiveDate,
    /// Checkout date (departure by 11:00)
    pub checkout_date: NaiveDate,

    /// Billing type submitted by the guest
    pub invoice_type: Option<InvoiceType>,
    /// Guest first name (individual billing)
    pub first_name: Option<String>,
    /// Guest last name (individual billing)
    pub last_name: Option<String>,
    /// Company name (business billing)
    pub company_name: Option<String>,
    /// Tax identification number (business billing)
    pub tax_id: Option<String>,
    /// EU VAT number (business billing, optional)
    pub vat_eu: Option<String>,
    /// Billing address
    pub address: Option<String>,
    /// Guest contact email
    pub email: Option<String>,
    /// Free-form requests from the guest
    pub special_requests: Option<String>,

    /// Invoiced service name
    pub service_name: Option<String>,
    /// Gross amount paid
    pub amount_paid: Option<f64>,
    /// VAT rate in percent
    pub vat_rate: Option<f64>,
    /// VAT amount contained in the gross total
    pub vat_amount: Option<f64>,
    /// When the invoice was issued
    pub invoice_generated_at: Option<DateTime<Utc>>,
    /// Assigned invoice number
    pub invoice_number: Option<String>,

    /// When the guest first submitted details
    pub guest_submitted_at: Option<DateTime<Utc>>,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp
    pub updated_at: DateTime<Utc>,
}

impl Reservation {
    /// Billing display name: person name or company name.
    #[must_use]
    pub fn display_name(&self) -> Option<String> {
        match self.invoice_type? {
            InvoiceType::Individual => Some(format!(
                "{} {}",
                self.first_name.as_deref().unwrap_or_default(),
                self.last_name.as_deref().unwrap_or_default()
            )),
            InvoiceType::Business => self.company_name.clone(),
        }
    }

    /// Whether the guest may still edit their submission at `now`.
    ///
    /// Editing closes one hour before checkout time (11:00) on the checkout
    /// date. A reservation with no submission yet is always editable.
    #[must_use]
    pub fn can_edit_at(&self, now: NaiveDateTime) -> bool {
        let Some(checkout) = self.checkout_date.and_hms_opt(CHECKOUT_HOUR, 0, 0) else {
            return false;
        };
        now < checkout - Duration::hours(1)
    }

    /// Whether the guest has submitted billing details.
    #[must_use]
    pub const fn guest_submitted(&self) -> bool {
        self.guest_submitted_at.is_some()
    }
}

/// A building access code shown to guests alongside the apartment code.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct BuildingCode {
    /// Row id
    pub id: i64,
    /// Display name, e.g. "Main Entrance"
    pub name: String,
    /// Keypad code
    pub code: String,
    /// Sort order on guest-facing pages
    pub display_order: i64,
    /// Inactive codes are hidden from guests
    pub is_active: bool,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

/// Issuer details and invoice numbering configuration (single row).
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct InvoiceSettings {
    /// Row id (always 1)
    pub id: i64,
    /// Issuer legal name
    pub issuer_name: Option<String>,
    /// Issuer address
    pub issuer_address: Option<String>,
    /// Issuer tax identification number
    pub issuer_tax_id: Option<String>,
    /// Issuer EU VAT number
    pub issuer_vat_eu: Option<String>,
    /// Issuer contact email
    pub issuer_email: Option<String>,
    /// Issuer phone number
    pub issuer_phone: Option<String>,
    /// Issuer bank name
    pub issuer_bank_name: Option<String>,
    /// Issuer bank account number
    pub issuer_bank_account: Option<String>,
    /// Numbering pattern as a JSON component list
    pub numbering_pattern: String,
    /// Last assigned rolling number
    pub rolling_number_current: i64,
    /// Payment due period in days
    pub payment_days_due: i64,
    /// Payment instructions printed on invoices
    pub payment_instructions: Option<String>,
    /// Last modification timestamp
    pub updated_at: DateTime<Utc>,
}

/// Immutable snapshot of an issued invoice (original or correction).
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct InvoiceVersion {
    /// Row id
    pub id: i64,
    /// Owning reservation
    pub reservation_id: i64,
    /// 1 is the original, corrections count up
    pub version_number: i64,
    /// Invoice number of this version
    pub invoice_number: String,
    /// JSON snapshot of the invoice fields at issuance
    pub invoice_data: String,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}
