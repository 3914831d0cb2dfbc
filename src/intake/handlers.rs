use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::service::IntakeError;
use super::types::{FormSubmission, NewSubmission};
use crate::gateway::{
    state::AppState,
    types::{ErrorBody, error_reply},
};
use crate::payment::types::PaymentPurpose;

#[derive(Debug, Serialize)]
pub struct CreatedResponse {
    pub id: i64,
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    #[serde(default)]
    pub include_deleted: bool,
}

fn parse_purpose(raw: &str) -> Result<PaymentPurpose, (StatusCode, Json<ErrorBody>)> {
    raw.parse()
        .map_err(|e: String| error_reply(StatusCode::BAD_REQUEST, e))
}

fn map_error(err: IntakeError) -> (StatusCode, Json<ErrorBody>) {
    match err {
        IntakeError::NotFound => error_reply(StatusCode::NOT_FOUND, err.to_string()),
        IntakeError::Database(_) => {
            error_reply(StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
        }
    }
}

/// POST /api/forms/{purpose} (public)
pub async fn create_submission(
    State(state): State<Arc<AppState>>,
    Path(purpose): Path<String>,
    Json(req): Json<NewSubmission>,
) -> Result<(StatusCode, Json<CreatedResponse>), (StatusCode, Json<ErrorBody>)> {
    let purpose = parse_purpose(&purpose)?;
    let id = state.intake.create(purpose, &req).await.map_err(map_error)?;
    Ok((StatusCode::CREATED, Json(CreatedResponse { id })))
}

/// GET /api/admin/forms/{purpose}
pub async fn list_submissions(
    State(state): State<Arc<AppState>>,
    Path(purpose): Path<String>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<FormSubmission>>, (StatusCode, Json<ErrorBody>)> {
    let purpose = parse_purpose(&purpose)?;
    let submissions = state
        .intake
        .list(purpose, query.include_deleted)
        .await
        .map_err(map_error)?;
    Ok(Json(submissions))
}

/// DELETE /api/admin/forms/{purpose}/{id} (soft)
pub async fn delete_submission(
    State(state): State<Arc<AppState>>,
    Path((purpose, id)): Path<(String, i64)>,
) -> Result<StatusCode, (StatusCode, Json<ErrorBody>)> {
    let purpose = parse_purpose(&purpose)?;
    state
        .intake
        .soft_delete(purpose, id)
        .await
        .map_err(map_error)?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/admin/forms/{purpose}/{id}/restore
pub async fn restore_submission(
    State(state): State<Arc<AppState>>,
    Path((purpose, id)): Path<(String, i64)>,
) -> Result<StatusCode, (StatusCode, Json<ErrorBody>)> {
    let purpose = parse_purpose(&purpose)?;
    state
        .intake
        .restore(purpose, id)
        .await
        .map_err(map_error)?;
    Ok(StatusCode::NO_CONTENT)
}
