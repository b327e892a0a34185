//! Outbound email for guest link notifications.
//!
//! Two providers behind a single trait: a console provider that logs the
//! message (development default) and an SMTP provider using Lettre.
//! Delivery is best-effort; callers log failures and move on.

use crate::config::EmailConfig;
use crate::error::{CheckinError, Result};
use async_trait::async_trait;
use chrono::NaiveDate;
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use std::sync::Arc;
use tracing::info;

/// Sends guest-facing notification emails.
#[async_trait]
pub trait Mailer: Send + Sync {
    /// Send the guest link for a newly created reservation.
    ///
    /// # Errors
    ///
    /// Returns [`CheckinError::EmailDelivery`] if the message cannot be
    /// built or handed to the transport.
    async fn send_guest_link(
        &self,
        to: &str,
        reservation_number: &str,
        link: &str,
        checkin: NaiveDate,
        checkout: NaiveDate,
    ) -> Result<()>;
}

/// Build the configured mailer.
#[must_use]
pub fn from_config(config: &EmailConfig) -> Arc<dyn Mailer> {
    if config.mode == "smtp" {
        Arc::new(SmtpMailer::new(config))
    } else {
        Arc::new(ConsoleMailer::new())
    }
}

fn guest_link_body(reservation_number: &str, link: &str, checkin: NaiveDate, checkout: NaiveDate) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="UTF-8">
    <title>Your stay details</title>
</head>
<body style="font-family: Arial, sans-serif; line-height: 1.6; color: #333;">
    <div style="max-width: 600px; margin: 0 auto; padding: 20px;">
        <h2 style="color: #2563eb;">Reservation {reservation_number}</h2>
        <p>Your stay is booked from {checkin} to {checkout}.</p>
        <p>Please fill in your billing details before checkout:</p>
        <p style="margin: 30px 0;">
            <a href="{link}"
               style="display: inline-block; background-color: #2563eb; color: white; padding: 12px 24px; text-decoration: none; border-radius: 4px;">
                Complete Check-in
            </a>
        </p>
        <p style="color: #666; font-size: 12px; margin-top: 40px;">
            Or copy and paste this link into your browser:<br>
            {link}
        </p>
    </div>
</body>
</html>
"#
    )
}

/// Console mailer for development and testing.
///
/// Logs the message instead of sending it.
#[derive(Clone, Debug, Default)]
pub struct ConsoleMailer;

impl ConsoleMailer {
    /// Create a new console mailer.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Mailer for ConsoleMailer {
    async fn send_guest_link(
        &self,
        to: &str,
        reservation_number: &str,
        link: &str,
        checkin: NaiveDate,
        checkout: NaiveDate,
    ) -> Result<()> {
        info!(
            to = %to,
            reservation = %reservation_number,
            link = %link,
            checkin = %checkin,
            checkout = %checkout,
            "Guest link email (console mode)"
        );
        Ok(())
    }
}

/// SMTP mailer using Lettre, for production use.
#[derive(Clone)]
pub struct SmtpMailer {
    host: String,
    port: u16,
    credentials: Option<Credentials>,
    from_header: String,
}

impl SmtpMailer {
    /// Create an SMTP mailer from the email configuration.
    #[must_use]
    pub fn new(config: &EmailConfig) -> Self {
        let credentials = match (&config.smtp_username, &config.smtp_password) {
            (Some(user), Some(pass)) => Some(Credentials::new(user.clone(), pass.clone())),
            _ => None,
        };
        Self {
            host: config.smtp_host.clone(),
            port: config.smtp_port,
            credentials,
            from_header: format!("{} <{}>", config.sender_name, config.sender_email),
        }
    }

    fn build_transport(&self) -> Result<AsyncSmtpTransport<Tokio1Executor>> {
        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::relay(&self.host)
            .map_err(|e| {
                tracing::error!(error = %e, "SMTP relay error");
                CheckinError::EmailDelivery
            })?
            .port(self.port);
        if let Some(credentials) = &self.credentials {
            builder = builder.credentials(credentials.clone());
        }
        Ok(builder.build())
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send_guest_link(
        &self,
        to: &str,
        reservation_number: &str,
        link: &str,
        checkin: NaiveDate,
        checkout: NaiveDate,
    ) -> Result<()> {
        let email = Message::builder()
            .from(self.from_header.parse().map_err(|e| {
                tracing::error!(error = %e, "Invalid from address");
                CheckinError::EmailDelivery
            })?)
            .to(to.parse().map_err(|e| {
                tracing::error!(error = %e, "Invalid to address");
                CheckinError::EmailDelivery
            })?)
            .subject(format!("Complete your check-in for {reservation_number}"))
            .header(ContentType::TEXT_HTML)
            .body(guest_link_body(reservation_number, link, checkin, checkout))
            .map_err(|e| {
                tracing::error!(error = %e, "Failed to build email");
                CheckinError::EmailDelivery
            })?;

        self.build_transport()?.send(email).await.map_err(|e| {
            tracing::error!(error = %e, "Failed to send email");
            CheckinError::EmailDelivery
        })?;

        info!(to = %to, reservation = %reservation_number, "Guest link email sent");
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn console_mailer_always_succeeds() {
        let mailer = ConsoleMailer::new();
        let checkin = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        let checkout = NaiveDate::from_ymd_opt(2025, 6, 4).unwrap();
        mailer
            .send_guest_link(
                "guest@example.com",
                "DEMO-001",
                "http://localhost:5000/guest?reservation=DEMO-001",
                checkin,
                checkout,
            )
            .await
            .unwrap();
    }

    #[test]
    fn body_embeds_link_and_dates() {
        let checkin = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        let checkout = NaiveDate::from_ymd_opt(2025, 6, 4).unwrap();
        let body = guest_link_body("DEMO-001", "https://x/guest?reservation=DEMO-001", checkin, checkout);
        assert!(body.contains("DEMO-001"));
        assert!(body.contains("https://x/guest?reservation=DEMO-001"));
        assert!(body.contains("2025-06-01"));
    }

    #[test]
    fn from_config_selects_console_by_default() {
        let config = EmailConfig {
            mode: "console".to_string(),
            smtp_host: "localhost".to_string(),
            smtp_port: 587,
            smtp_username: None,
            smtp_password: None,
            sender_email: "noreply@example.com".to_string(),
            sender_name: "Guest Check-in System".to_string(),
        };
        let _mailer = from_config(&config);
    }
}
