//! Configuration management for the check-in service.
//!
//! Loads configuration from environment variables with sensible defaults.
//! The admin credential pair lives here and is passed explicitly into the
//! session-auth component; there is no mutable global.

use serde::{Deserialize, Serialize};
use std::env;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// HTTP server configuration
    pub server: ServerConfig,
    /// `SQLite` configuration
    pub database: DatabaseConfig,
    /// Admin credentials and session configuration
    pub admin: AdminConfig,
    /// Outbound email configuration
    pub email: EmailConfig,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to
    pub host: String,
    /// Port to bind to
    pub port: u16,
    /// Base URL embedded in guest links (no trailing slash)
    pub base_url: String,
    /// Log level filter (trace, debug, info, warn, error)
    pub log_level: String,
}

/// `SQLite` configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Database connection URL, e.g. `sqlite:reservations.db`
    pub url: String,
    /// Maximum number of connections in the pool
    pub max_connections: u32,
}

/// Admin credentials and session configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminConfig {
    /// Admin login email
    pub email: String,
    /// Admin login password
    pub password: String,
    /// Secret key for the process (cookie hardening, future signing needs)
    pub secret_key: String,
    /// Session TTL in seconds (default: 8 hours)
    pub session_ttl: u64,
}

/// Email configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailConfig {
    /// Delivery mode: `console` logs emails, `smtp` sends them
    pub mode: String,
    /// SMTP relay host
    pub smtp_host: String,
    /// SMTP relay port
    pub smtp_port: u16,
    /// SMTP username
    pub smtp_username: Option<String>,
    /// SMTP password
    pub smtp_password: Option<String>,
    /// Sender address for guest link emails
    pub sender_email: String,
    /// Sender display name
    pub sender_name: String,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Missing or unparseable variables fall back to demo defaults, matching
    /// the behavior of a fresh development install.
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            server: ServerConfig {
                host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: env::var("PORT")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(5000),
                base_url: env::var("BASE_URL")
                    .unwrap_or_else(|_| "http://localhost:5000".to_string())
                    .trim_end_matches('/')
                    .to_string(),
                log_level: env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            },
            database: DatabaseConfig {
                url: env::var("DATABASE_URL")
                    .unwrap_or_else(|_| "sqlite:reservations.db".to_string()),
                max_connections: env::var("DATABASE_MAX_CONNECTIONS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(5),
            },
            admin: AdminConfig {
                email: env::var("ADMIN_EMAIL")
                    .unwrap_or_else(|_| "admin@example.com".to_string()),
                password: env::var("ADMIN_PASSWORD")
                    .unwrap_or_else(|_| "change-me".to_string()),
                secret_key: env::var("SECRET_KEY")
                    .unwrap_or_else(|_| "demo-secret-key-2025".to_string()),
                session_ttl: env::var("SESSION_TTL")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(28_800), // 8 hours
            },
            email: EmailConfig {
                mode: env::var("EMAIL_MODE").unwrap_or_else(|_| "console".to_string()),
                smtp_host: env::var("SMTP_HOST").unwrap_or_else(|_| "localhost".to_string()),
                smtp_port: env::var("SMTP_PORT")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(587),
                smtp_username: env::var("SMTP_USERNAME").ok(),
                smtp_password: env::var("SMTP_PASSWORD").ok(),
                sender_email: env::var("SENDER_EMAIL")
                    .unwrap_or_else(|_| "noreply@example.com".to_string()),
                sender_name: env::var("SENDER_NAME")
                    .unwrap_or_else(|_| "Guest Check-in System".to_string()),
            },
        }
    }

    /// Guest-facing link for a reservation number.
    #[must_use]
    pub fn guest_link(&self, reservation_number: &str) -> String {
        format!(
            "{}/guest?reservation={}",
            self.server.base_url,
            urlencoding::encode(reservation_number)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn guest_link_encodes_reservation_number() {
        let mut config = Config::from_env();
        config.server.base_url = "https://stay.example.com".to_string();
        assert_eq!(
            config.guest_link("RES 2025/001"),
            "https://stay.example.com/guest?reservation=RES%202025%2F001"
        );
    }
}
