pub mod state;
pub mod types;

use axum::{
    Json,
    Router,
    extract::State,
    middleware::from_fn_with_state,
    routing::{delete, get, post},
};
use serde::Serialize;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info};

use crate::admin_auth;
use crate::config::GatewayConfig;
use crate::intake;
use crate::payment;
use state::AppState;

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    database: &'static str,
}

/// GET /api/health
async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let database = match state.db.health_check().await {
        Ok(()) => "up",
        Err(_) => "down",
    };
    Json(HealthResponse {
        status: "ok",
        database,
    })
}

/// Assemble the full route tree.
pub fn build_router(state: Arc<AppState>) -> Router {
    // Admin surface: everything added before the layer requires a valid
    // admin JWT; login is added after and stays open.
    let admin_routes = Router::new()
        .route("/payments", get(payment::handlers::list_payments))
        .route("/forms/{purpose}", get(intake::handlers::list_submissions))
        .route(
            "/forms/{purpose}/{id}",
            delete(intake::handlers::delete_submission),
        )
        .route(
            "/forms/{purpose}/{id}/restore",
            post(intake::handlers::restore_submission),
        )
        .layer(from_fn_with_state(
            state.clone(),
            admin_auth::middleware::require_admin,
        ))
        .route("/login", post(admin_auth::handlers::login));

    Router::new()
        .route("/api/health", get(health_check))
        // Payment collection, one route per method
        .route("/api/payments/mtn", post(payment::handlers::pay_mtn))
        .route("/api/payments/airtel", post(payment::handlers::pay_airtel))
        .route("/api/payments/card", post(payment::handlers::pay_card))
        // Public form intake
        .route(
            "/api/forms/{purpose}",
            post(intake::handlers::create_submission),
        )
        .nest("/api/admin", admin_routes)
        .with_state(state)
}

/// Start the HTTP gateway.
pub async fn run_server(config: &GatewayConfig, state: Arc<AppState>) {
    let app = build_router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = match TcpListener::bind(&addr).await {
        Ok(l) => l,
        Err(e) => {
            error!("Failed to bind to {}: {}", addr, e);
            std::process::exit(1);
        }
    };

    info!("Gateway listening on http://{}", addr);

    if let Err(e) = axum::serve(listener, app).await {
        error!("Server error: {}", e);
        std::process::exit(1);
    }
}
