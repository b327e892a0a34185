//! Shared application state.

use crate::config::Config;
use crate::email::Mailer;
use crate::session::SessionStore;
use crate::store::CheckinStore;
use std::sync::Arc;

/// State shared by all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Reservation, invoice, and building code persistence
    pub store: CheckinStore,
    /// Admin session store
    pub sessions: Arc<dyn SessionStore>,
    /// Outbound email provider
    pub mailer: Arc<dyn Mailer>,
    /// Application configuration
    pub config: Arc<Config>,
}

impl AppState {
    /// Assemble the application state.
    #[must_use]
    pub fn new(
        store: CheckinStore,
        sessions: Arc<dyn SessionStore>,
        mailer: Arc<dyn Mailer>,
        config: Config,
    ) -> Self {
        Self {
            store,
            sessions,
            mailer,
            config: Arc::new(config),
        }
    }
}
