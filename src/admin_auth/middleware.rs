use axum::{
    Json,
    body::Body,
    extract::State,
    http::{Request, StatusCode, header},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

use crate::gateway::{
    state::AppState,
    types::{ErrorBody, error_reply},
};

/// Require a valid admin Bearer JWT; injects the verified claims for
/// downstream handlers.
pub async fn require_admin(
    State(state): State<Arc<AppState>>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, (StatusCode, Json<ErrorBody>)> {
    let auth_header = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| {
            error_reply(StatusCode::UNAUTHORIZED, "Missing Authorization header")
        })?;

    let token = auth_header.strip_prefix("Bearer ").ok_or_else(|| {
        error_reply(StatusCode::UNAUTHORIZED, "Invalid token format")
    })?;

    match state.admin_auth.verify_token(token) {
        Ok(claims) => {
            request.extensions_mut().insert(claims);
            Ok(next.run(request).await)
        }
        Err(_) => Err(error_reply(
            StatusCode::UNAUTHORIZED,
            "Invalid or expired token",
        )),
    }
}
