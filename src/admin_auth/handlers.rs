use axum::{Json, extract::State, http::StatusCode};
use std::sync::Arc;
use tracing::warn;

use super::service::{AdminAuthError, LoginRequest, LoginResponse};
use crate::gateway::{
    state::AppState,
    types::{ErrorBody, error_reply},
};

/// POST /api/admin/login
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, (StatusCode, Json<ErrorBody>)> {
    match state.admin_auth.login(&req).await {
        Ok(resp) => Ok(Json(resp)),
        Err(AdminAuthError::InvalidCredentials) => {
            warn!(email = %req.email, "rejected admin login");
            Err(error_reply(
                StatusCode::UNAUTHORIZED,
                "Invalid email or password",
            ))
        }
        Err(e) => Err(error_reply(
            StatusCode::INTERNAL_SERVER_ERROR,
            e.to_string(),
        )),
    }
}
