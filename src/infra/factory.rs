use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::{ConnectOptions, SqlitePool};
use tracing::info;
use tracing::log::LevelFilter;
use tera::Tera;

use crate::config::Config;
use crate::domain::services::notification::CONFIRMATION_TEMPLATE;
use crate::state::{AppState, Ports};
use crate::infra::email::http_email_service::HttpEmailService;
use crate::infra::payment::http_payment_gateway::{GatewayCredentials, HttpPaymentGateway};
use crate::infra::repositories::{
    sqlite_availability_override_repo::SqliteAvailabilityOverrideRepo,
    sqlite_booking_repo::SqliteBookingRepo,
    sqlite_pending_booking_repo::SqlitePendingBookingRepo,
    sqlite_recurring_block_repo::SqliteRecurringBlockRepo,
    sqlite_resource_repo::SqliteResourceRepo,
};

pub fn load_templates() -> Arc<Tera> {
    let mut tera = Tera::default();
    tera.add_raw_template(CONFIRMATION_TEMPLATE, include_str!("../templates/confirmation.html"))
        .expect("Failed to load confirmation template");
    Arc::new(tera)
}

pub fn sqlite_ports(pool: &SqlitePool, config: &Config) -> Ports {
    Ports {
        resource_repo: Arc::new(SqliteResourceRepo::new(pool.clone())),
        booking_repo: Arc::new(SqliteBookingRepo::new(pool.clone())),
        pending_repo: Arc::new(SqlitePendingBookingRepo::new(pool.clone())),
        block_repo: Arc::new(SqliteRecurringBlockRepo::new(pool.clone())),
        override_repo: Arc::new(SqliteAvailabilityOverrideRepo::new(pool.clone())),
        payment_gateway: Arc::new(HttpPaymentGateway::new(
            config.payment_gateway_url.clone(),
            GatewayCredentials {
                terminal: config.payment_terminal.clone(),
                user: config.payment_user.clone(),
                password: config.payment_password.clone(),
                shop_no: config.payment_shop_no.clone(),
            },
        )),
        email_service: Arc::new(HttpEmailService::new(
            config.mail_service_url.clone(),
            config.mail_service_token.clone(),
        )),
    }
}

pub async fn bootstrap_state(config: &Config) -> AppState {
    info!("Initializing SQLite connection with WAL Mode...");

    let opts = SqliteConnectOptions::from_str(&config.database_url)
        .expect("Invalid SQLite connection string")
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(Duration::from_secs(5))
        .log_statements(LevelFilter::Debug)
        .log_slow_statements(LevelFilter::Warn, Duration::from_millis(500));

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(opts)
        .await
        .expect("Failed to connect to SQLite");

    run_sqlite_migrations(&pool).await;

    AppState::new(config.clone(), sqlite_ports(&pool, config), load_templates())
}

async fn run_sqlite_migrations(pool: &SqlitePool) {
    sqlx::migrate!("./migrations/sqlite")
        .run(pool)
        .await
        .expect("Failed to run SQLite migrations");
}
