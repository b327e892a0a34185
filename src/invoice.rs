//! Invoice numbering, VAT computation, and the printable document.
//!
//! Invoice numbers are produced from a configurable component pattern
//! stored with the invoice settings, e.g. `INV/2025/001` from
//! `[fixed "INV", delimiter "/", year, delimiter "/", rolling "000"]`.
//! The rolling counter increments once per issued invoice; previews render
//! the next number without consuming it.

use crate::error::{CheckinError, Result};
use crate::types::{InvoiceSettings, Reservation};
use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};

/// One component of the invoice numbering pattern.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum NumberComponent {
    /// Fixed text, e.g. `INV`
    Fixed {
        /// Literal value
        value: String,
    },
    /// Separator between components
    Delimiter {
        /// Literal value
        value: String,
    },
    /// Four-digit year at issuance
    Year,
    /// Two-digit month at issuance
    Month,
    /// Incrementing counter, zero-padded to the format width
    Rolling {
        /// Zero-padding template, e.g. `000`
        #[serde(default = "default_rolling_format")]
        format: String,
    },
}

fn default_rolling_format() -> String {
    "000".to_string()
}

/// Parse the stored JSON pattern.
///
/// # Errors
///
/// Returns [`CheckinError::Validation`] if the pattern is not valid JSON.
pub fn parse_pattern(json: &str) -> Result<Vec<NumberComponent>> {
    serde_json::from_str(json)
        .map_err(|e| CheckinError::validation(format!("Invalid numbering pattern: {e}")))
}

/// Render an invoice number from a pattern.
///
/// `rolling` is the value to print for the rolling component, typically
/// `rolling_number_current + 1`.
#[must_use]
pub fn render_number(pattern: &[NumberComponent], rolling: i64, at: DateTime<Utc>) -> String {
    let mut out = String::new();
    for component in pattern {
        match component {
            NumberComponent::Fixed { value } | NumberComponent::Delimiter { value } => {
                out.push_str(value);
            }
            NumberComponent::Year => out.push_str(&at.year().to_string()),
            NumberComponent::Month => out.push_str(&format!("{:02}", at.month())),
            NumberComponent::Rolling { format } => {
                out.push_str(&format!("{rolling:0width$}", width = format.len()));
            }
        }
    }
    out
}

/// VAT amount contained in a gross total, rounded to two decimals.
///
/// Uses the "VAT included" formula: `gross * rate / (100 + rate)`.
#[must_use]
pub fn vat_amount(gross: f64, rate: f64) -> f64 {
    (gross * rate / (100.0 + rate) * 100.0).round() / 100.0
}

/// Invoice number for a correction of `base_number`.
///
/// Version 2 (the first correction) gets `_CORRECTED`, later ones
/// `_CORRECTED_{n}`.
#[must_use]
pub fn correction_number(base_number: &str, version: i64) -> String {
    let base = base_number
        .split("_CORRECTED")
        .next()
        .unwrap_or(base_number);
    if version == 2 {
        format!("{base}_CORRECTED")
    } else {
        format!("{base}_CORRECTED_{}", version - 1)
    }
}

fn field(label: &str, value: Option<&str>) -> String {
    value.map_or_else(String::new, |v| {
        format!("<p><strong>{label}:</strong> {v}</p>\n")
    })
}

/// Render the printable HTML invoice document.
///
/// Composed from issuer settings plus the reservation's submission and
/// invoice fields. Intended for download and printing from the dashboard.
///
/// # Errors
///
/// Returns [`CheckinError::NotFound`] if no invoice has been generated for
/// the reservation yet.
pub fn render_document(settings: &InvoiceSettings, reservation: &Reservation) -> Result<String> {
    let number = reservation
        .invoice_number
        .as_deref()
        .ok_or_else(|| CheckinError::not_found("Invoice"))?;
    let issued = reservation
        .invoice_generated_at
        .map(|t| t.format("%Y-%m-%d").to_string())
        .unwrap_or_default();

    let amount = reservation.amount_paid.unwrap_or_default();
    let vat_rate = reservation.vat_rate.unwrap_or_default();
    let vat = reservation.vat_amount.unwrap_or_default();
    let net = ((amount - vat) * 100.0).round() / 100.0;
    let service = reservation
        .service_name
        .as_deref()
        .unwrap_or("Apartment Rental");
    let buyer = reservation.display_name().unwrap_or_default();

    let mut doc = String::new();
    doc.push_str("<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n");
    doc.push_str(&format!("<title>Invoice {number}</title>\n"));
    doc.push_str(
        "<style>body{font-family:sans-serif;max-width:42rem;margin:2rem auto}\n\
         table{width:100%;border-collapse:collapse}td,th{border:1px solid #ccc;\n\
         padding:0.4rem;text-align:left}</style>\n</head>\n<body>\n",
    );
    doc.push_str(&format!("<h1>Invoice {number}</h1>\n"));
    doc.push_str(&format!("<p>Issue date: {issued}</p>\n"));

    doc.push_str("<h2>Seller</h2>\n");
    doc.push_str(&field("Name", settings.issuer_name.as_deref()));
    doc.push_str(&field("Address", settings.issuer_address.as_deref()));
    doc.push_str(&field("Tax ID", settings.issuer_tax_id.as_deref()));
    doc.push_str(&field("VAT EU", settings.issuer_vat_eu.as_deref()));
    doc.push_str(&field("Bank", settings.issuer_bank_name.as_deref()));
    doc.push_str(&field("Account", settings.issuer_bank_account.as_deref()));

    doc.push_str("<h2>Buyer</h2>\n");
    doc.push_str(&field("Name", Some(buyer.as_str())));
    doc.push_str(&field("Address", reservation.address.as_deref()));
    doc.push_str(&field("Tax ID", reservation.tax_id.as_deref()));
    doc.push_str(&field("VAT EU", reservation.vat_eu.as_deref()));

    doc.push_str("<h2>Items</h2>\n<table>\n");
    doc.push_str("<tr><th>Service</th><th>Period</th><th>Net</th><th>VAT rate</th><th>VAT</th><th>Gross</th></tr>\n");
    doc.push_str(&format!(
        "<tr><td>{service}</td><td>{} to {}</td><td>{net:.2}</td><td>{vat_rate:.1}%</td><td>{vat:.2}</td><td>{amount:.2}</td></tr>\n",
        reservation.checkin_date, reservation.checkout_date
    ));
    doc.push_str("</table>\n");

    if let Some(instructions) = settings.payment_instructions.as_deref() {
        doc.push_str(&format!("<p>{instructions}</p>\n"));
    }
    if settings.payment_days_due > 0 {
        doc.push_str(&format!(
            "<p>Payment due within {} days.</p>\n",
            settings.payment_days_due
        ));
    }
    doc.push_str("</body>\n</html>\n");
    Ok(doc)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    const DEFAULT_PATTERN: &str = r#"[{"type":"fixed","value":"INV"},{"type":"delimiter","value":"/"},{"type":"year"},{"type":"delimiter","value":"/"},{"type":"rolling","format":"000"}]"#;

    #[test]
    fn renders_default_pattern() {
        let pattern = parse_pattern(DEFAULT_PATTERN).unwrap();
        let at = Utc.with_ymd_and_hms(2025, 3, 14, 12, 0, 0).unwrap();
        assert_eq!(render_number(&pattern, 1, at), "INV/2025/001");
        assert_eq!(render_number(&pattern, 42, at), "INV/2025/042");
    }

    #[test]
    fn renders_month_and_wide_rolling() {
        let json = r#"[{"type":"fixed","value":"FAK"},{"type":"delimiter","value":"-"},{"type":"year"},{"type":"delimiter","value":"-"},{"type":"month"},{"type":"delimiter","value":"/"},{"type":"rolling","format":"0000"}]"#;
        let pattern = parse_pattern(json).unwrap();
        let at = Utc.with_ymd_and_hms(2025, 3, 14, 12, 0, 0).unwrap();
        assert_eq!(render_number(&pattern, 7, at), "FAK-2025-03/0007");
    }

    #[test]
    fn rolling_overflows_padding_gracefully() {
        let pattern = parse_pattern(DEFAULT_PATTERN).unwrap();
        let at = Utc.with_ymd_and_hms(2025, 3, 14, 12, 0, 0).unwrap();
        assert_eq!(render_number(&pattern, 1234, at), "INV/2025/1234");
    }

    #[test]
    fn invalid_pattern_is_rejected() {
        assert!(parse_pattern("not json").is_err());
    }

    #[test]
    fn vat_included_in_gross() {
        // 1200 gross at 8% -> 88.89 VAT
        assert!((vat_amount(1200.0, 8.0) - 88.89).abs() < f64::EPSILON);
        assert!((vat_amount(0.0, 8.0)).abs() < f64::EPSILON);
    }

    #[test]
    fn correction_numbers() {
        assert_eq!(correction_number("INV/2025/001", 2), "INV/2025/001_CORRECTED");
        assert_eq!(
            correction_number("INV/2025/001_CORRECTED", 3),
            "INV/2025/001_CORRECTED_2"
        );
    }
}
