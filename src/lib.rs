//! Guest check-in and invoice collection service.
//!
//! A small web application for short-stay apartment hosts. The admin
//! creates reservations and shares a guest link; the guest opens the link,
//! submits billing details, and receives the door codes. The admin then
//! issues (and, when needed, corrects) the invoice.
//!
//! # Architecture
//!
//! - [`store`]: `SQLite` persistence via `sqlx`
//! - [`api`]: JSON/form HTTP handlers
//! - [`auth`] / [`session`]: single-admin session authentication
//! - [`invoice`]: numbering patterns, VAT math, the printable document
//! - [`email`]: guest link notifications (console or SMTP)
//! - [`server`]: router assembly and serving
//!
//! # Example
//!
//! ```no_run
//! use guest_checkin::config::Config;
//! use guest_checkin::session::InMemorySessionStore;
//! use guest_checkin::state::AppState;
//! use guest_checkin::store::CheckinStore;
//! use guest_checkin::{email, server};
//! use std::sync::Arc;
//!
//! # async fn run() -> anyhow::Result<()> {
//! let config = Config::from_env();
//! let store = CheckinStore::connect(&config.database.url, 5).await?;
//! store.init().await?;
//!
//! let state = AppState::new(
//!     store,
//!     Arc::new(InMemorySessionStore::new()),
//!     email::from_config(&config.email),
//!     config,
//! );
//! server::serve(state, "0.0.0.0:5000").await
//! # }
//! ```

pub mod api;
pub mod auth;
pub mod config;
pub mod email;
pub mod error;
pub mod invoice;
pub mod pages;
pub mod server;
pub mod session;
pub mod state;
pub mod store;
pub mod types;

pub use error::{AppError, CheckinError, Result};
pub use state::AppState;
pub use store::CheckinStore;
