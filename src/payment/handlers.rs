//! HTTP boundary for payment collection: one POST route per payment
//! method, plus the admin-only audit listing. This is the single place
//! where PaymentError maps to a response code.

use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, warn};

use super::error::PaymentError;
use super::types::{PaymentAttempt, PaymentMethod, PaymentStatus};
use crate::gateway::state::AppState;
use crate::gateway::types::{ErrorBody, error_reply};

#[derive(Debug, Deserialize)]
pub struct MobilePayRequest {
    pub purpose: Option<String>,
    pub phone: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CardPayRequest {
    pub purpose: Option<String>,
    #[serde(rename = "cardToken")]
    pub card_token: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct PayResponse {
    #[serde(rename = "ledgerId")]
    pub ledger_id: i64,
    pub status: PaymentStatus,
}

/// Storage failures are the one 500-class outcome: the provider may have
/// charged the payer without a local record, which is an operational
/// alert, not a client mistake.
fn map_error(err: PaymentError) -> (StatusCode, Json<ErrorBody>) {
    let status = if err.is_storage() {
        error!(error = %err, "payment recorded at provider may be unreconciled");
        StatusCode::INTERNAL_SERVER_ERROR
    } else {
        warn!(error = %err, "payment request rejected");
        StatusCode::BAD_REQUEST
    };
    error_reply(status, err.to_string())
}

async fn collect(
    state: &AppState,
    method: PaymentMethod,
    purpose: Option<String>,
    payer: Option<String>,
) -> Result<Json<PayResponse>, (StatusCode, Json<ErrorBody>)> {
    let purpose = purpose.unwrap_or_default();
    let outcome = state
        .payments
        .collect(&purpose, method, payer.as_deref())
        .await
        .map_err(map_error)?;

    Ok(Json(PayResponse {
        ledger_id: outcome.ledger_id,
        status: outcome.status,
    }))
}

/// POST /api/payments/mtn
pub async fn pay_mtn(
    State(state): State<Arc<AppState>>,
    Json(req): Json<MobilePayRequest>,
) -> Result<Json<PayResponse>, (StatusCode, Json<ErrorBody>)> {
    collect(&state, PaymentMethod::Mtn, req.purpose, req.phone).await
}

/// POST /api/payments/airtel
pub async fn pay_airtel(
    State(state): State<Arc<AppState>>,
    Json(req): Json<MobilePayRequest>,
) -> Result<Json<PayResponse>, (StatusCode, Json<ErrorBody>)> {
    collect(&state, PaymentMethod::Airtel, req.purpose, req.phone).await
}

/// POST /api/payments/card
pub async fn pay_card(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CardPayRequest>,
) -> Result<Json<PayResponse>, (StatusCode, Json<ErrorBody>)> {
    collect(&state, PaymentMethod::Card, req.purpose, req.card_token).await
}

#[derive(Debug, Deserialize)]
pub struct PaymentListQuery {
    pub status: Option<String>,
    pub limit: Option<i64>,
}

/// GET /api/admin/payments
pub async fn list_payments(
    State(state): State<Arc<AppState>>,
    Query(query): Query<PaymentListQuery>,
) -> Result<Json<Vec<PaymentAttempt>>, (StatusCode, Json<ErrorBody>)> {
    let status = match query.status.as_deref() {
        Some(s) => Some(
            s.parse::<PaymentStatus>()
                .map_err(|e| error_reply(StatusCode::BAD_REQUEST, e))?,
        ),
        None => None,
    };
    let limit = query.limit.unwrap_or(100).clamp(1, 500);

    let attempts = state.ledger.list(status, limit).await.map_err(map_error)?;
    Ok(Json(attempts))
}
