//! Service entry point.
//!
//! `guest-checkin [--reset]` starts the HTTP server; `--reset` drops and
//! reseeds the database first.

use guest_checkin::config::Config;
use guest_checkin::email;
use guest_checkin::session::InMemorySessionStore;
use guest_checkin::state::AppState;
use guest_checkin::store::CheckinStore;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = Config::from_env();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(format!("{},sqlx=warn", config.server.log_level))),
        )
        .init();

    let store = CheckinStore::connect(&config.database.url, config.database.max_connections).await?;
    if std::env::args().any(|arg| arg == "--reset") {
        store.reset().await?;
    } else {
        store.init().await?;
    }

    let addr = format!("{}:{}", config.server.host, config.server.port);
    info!(
        version = env!("CARGO_PKG_VERSION"),
        admin = %config.admin.email,
        email_mode = %config.email.mode,
        "Starting guest check-in service"
    );

    let mailer = email::from_config(&config.email);
    let state = AppState::new(store, Arc::new(InMemorySessionStore::new()), mailer, config);
    guest_checkin::server::serve(state, &addr).await
}
