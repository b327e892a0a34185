//! Route table.

use super::health;
use crate::api::{auth, building_codes, guest, invoices, reservations};
use crate::pages;
use crate::state::AppState;
use axum::routing::{get, post, put};
use axum::Router;
use tower_http::trace::TraceLayer;

/// Build the application router.
///
/// Public surface: the HTML pages, the guest view and submit endpoints,
/// the active building code list, login, and the health check. Everything
/// else requires an admin session.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        // Pages
        .route("/", get(pages::index))
        .route("/admin", get(pages::login_page))
        .route("/admin/dashboard", get(pages::dashboard_page))
        .route("/guest", get(pages::guest_page))
        .route("/guest/:reservation_number", get(pages::guest_page))
        // Health
        .route("/health", get(health::health))
        // Auth
        .route("/admin/login", post(auth::login))
        .route("/admin/logout", post(auth::logout))
        .route("/admin/session", get(auth::current_session))
        // Guest intake (public)
        .route("/api/guest/:reservation_number", get(guest::view))
        .route("/guest/submit", post(guest::submit))
        // Reservations (admin)
        .route(
            "/api/reservations",
            get(reservations::list).post(reservations::create),
        )
        .route("/api/reservations/export-csv", get(reservations::export_csv))
        .route(
            "/api/reservations/:id",
            get(reservations::get)
                .put(reservations::update)
                .delete(reservations::delete),
        )
        .route("/api/reservations/:id/reset", post(reservations::reset))
        // Invoices (admin)
        .route(
            "/api/reservations/:id/generate-invoice",
            post(invoices::generate),
        )
        .route("/api/reservations/:id/correction", post(invoices::correct))
        .route("/api/reservations/:id/versions", get(invoices::versions))
        .route("/api/reservations/:id/invoice", get(invoices::document))
        .route("/api/next-invoice-number", get(invoices::next_number))
        .route(
            "/api/invoice-settings",
            get(invoices::get_settings).put(invoices::update_settings),
        )
        // Building codes
        .route("/api/building-codes", get(building_codes::list_active))
        .route(
            "/api/admin/building-codes",
            get(building_codes::list_all).post(building_codes::create),
        )
        .route(
            "/api/admin/building-codes/:id",
            put(building_codes::update).delete(building_codes::delete),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
