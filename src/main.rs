use anyhow::Context;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use bpc_backend::admin_auth::service::AdminAuthService;
use bpc_backend::config::AppConfig;
use bpc_backend::db::Database;
use bpc_backend::gateway::{self, state::AppState};
use bpc_backend::intake::service::IntakeService;
use bpc_backend::logging::init_logging;
use bpc_backend::payment::build_provider_registry;
use bpc_backend::payment::ledger::{AttemptStore, PaymentLedger};
use bpc_backend::payment::orchestrator::PaymentOrchestrator;
use bpc_backend::payment::poller::SettlementPoller;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let env_name = std::env::args().nth(1).unwrap_or_else(|| "dev".to_string());
    let config = AppConfig::load(&env_name);
    let _log_guard = init_logging(&config);

    info!(env = %env_name, "starting bpc_backend");

    let postgres_url = config
        .postgres_url
        .clone()
        .context("postgres_url is required (config file or DATABASE_URL)")?;
    let db = Arc::new(
        Database::connect(&postgres_url)
            .await
            .context("Failed to connect to PostgreSQL")?,
    );

    let providers = build_provider_registry(&config.payments);
    let ledger = Arc::new(PaymentLedger::new(db.pool().clone()));
    let poller = SettlementPoller::new(
        config.payments.poll_attempts,
        Duration::from_secs(config.payments.poll_interval_secs),
    );
    let payments = Arc::new(PaymentOrchestrator::new(
        providers,
        ledger.clone() as Arc<dyn AttemptStore>,
        poller,
        config.payments.default_payer_msisdn.clone(),
    ));

    let intake = Arc::new(IntakeService::new(db.pool().clone()));
    let admin_auth = Arc::new(AdminAuthService::new(
        db.pool().clone(),
        config.jwt_secret.clone(),
    ));

    let state = Arc::new(AppState {
        db,
        payments,
        ledger,
        intake,
        admin_auth,
    });

    gateway::run_server(&config.gateway, state).await;
    Ok(())
}
