//! HTTP API handlers.
//!
//! Grouped by surface: admin [`auth`], admin [`reservations`] and
//! [`invoices`] management, public [`guest`] intake, and
//! [`building_codes`].

pub mod auth;
pub mod building_codes;
pub mod guest;
pub mod invoices;
pub mod reservations;
