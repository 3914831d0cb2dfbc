use std::sync::Arc;

use crate::admin_auth::service::AdminAuthService;
use crate::db::Database;
use crate::intake::service::IntakeService;
use crate::payment::ledger::PaymentLedger;
use crate::payment::orchestrator::PaymentOrchestrator;

/// Shared application state.
///
/// Requests share nothing mutable with each other beyond the database
/// pool; every payment attempt runs its own orchestrator pipeline.
pub struct AppState {
    pub db: Arc<Database>,
    pub payments: Arc<PaymentOrchestrator>,
    pub ledger: Arc<PaymentLedger>,
    pub intake: Arc<IntakeService>,
    pub admin_auth: Arc<AdminAuthService>,
}
