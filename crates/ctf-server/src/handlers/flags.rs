//! Flag submission handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use tracing::info;

use super::{required_param, ApiResponse};
use crate::config::AppState;
use crate::error::{ApiError, Result};
use crate::extract::ApiJson;
use crate::models::{CreateFlagInput, FlagSubmission, UpdateFlagInput};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlagQuery {
    pub challenge_id: Option<String>,
}

/// GET /flags?challengeId=
pub async fn list_flags(
    State(state): State<AppState>,
    Query(query): Query<FlagQuery>,
) -> Result<Json<ApiResponse<Vec<FlagSubmission>>>> {
    let challenge_id = required_param(query.challenge_id)
        .ok_or_else(|| ApiError::Validation("Challenge ID is required".into()))?;
    info!("GET /flags?challengeId={}", challenge_id);

    let flags = state.documents.list_flags(&challenge_id).await?;
    Ok(Json(ApiResponse::ok(flags)))
}

/// POST /flags
pub async fn create_flag(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<CreateFlagInput>,
) -> Result<(StatusCode, Json<ApiResponse<FlagSubmission>>)> {
    info!("POST /flags");
    let new = input.validate()?;
    let flag = state.documents.create_flag(new).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(flag))))
}

/// GET /flags/:id
pub async fn get_flag(
    Path(id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<FlagSubmission>>> {
    info!("GET /flags/{}", id);
    let flag = state
        .documents
        .get_flag(&id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Flag submission not found".into()))?;
    Ok(Json(ApiResponse::ok(flag)))
}

/// PUT /flags/:id
///
/// Only `isCorrect` can change.
pub async fn update_flag(
    Path(id): Path<String>,
    State(state): State<AppState>,
    ApiJson(input): ApiJson<UpdateFlagInput>,
) -> Result<Json<ApiResponse<FlagSubmission>>> {
    info!("PUT /flags/{}", id);
    let is_correct = input.validate()?;
    let flag = state
        .documents
        .set_flag_correct(&id, is_correct)
        .await?
        .ok_or_else(|| ApiError::NotFound("Flag submission not found".into()))?;
    Ok(Json(ApiResponse::ok(flag)))
}

/// DELETE /flags/:id
pub async fn delete_flag(
    Path(id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<()>>> {
    info!("DELETE /flags/{}", id);
    if !state.documents.delete_flag(&id).await? {
        return Err(ApiError::NotFound("Flag submission not found".into()));
    }
    Ok(Json(ApiResponse::message("Flag submission deleted successfully")))
}
