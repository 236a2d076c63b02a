//! Challenge handlers

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
use crate::models::{Challenge, CreateChallengeInput};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChallengeQuery {
    pub ctf_id: Option<String>,
}

/// GET /challenges?ctfId=
pub async fn list_challenges(
    State(state): State<AppState>,
    Query(query): Query<ChallengeQuery>,
) -> Result<Json<ApiResponse<Vec<Challenge>>>> {
    let ctf_id = required_param(query.ctf_id)
        .ok_or_else(|| ApiError::Validation("CTF ID is required".into()))?;
    info!("GET /challenges?ctfId={}", ctf_id);

    let challenges = state.documents.list_challenges(&ctf_id).await?;
    Ok(Json(ApiResponse::ok(challenges)))
}

/// POST /challenges
pub async fn create_challenge(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<CreateChallengeInput>,
) -> Result<(StatusCode, Json<ApiResponse<Challenge>>)> {
    info!("POST /challenges");
    let new = input.validate()?;
    let challenge = state.documents.create_challenge(new).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(challenge))))
}

/// GET /challenges/:id
pub async fn get_challenge(
    Path(id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Challenge>>> {
    info!("GET /challenges/{}", id);
    let challenge = state
        .documents
        .get_challenge(&id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Challenge not found".into()))?;
    Ok(Json(ApiResponse::ok(challenge)))
}

/// DELETE /challenges/:id
pub async fn delete_challenge(
    Path(id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<()>>> {
    info!("DELETE /challenges/{}", id);
    if !state.documents.delete_challenge(&id).await? {
        return Err(ApiError::NotFound("Challenge not found".into()));
    }
    Ok(Json(ApiResponse::message("Challenge deleted successfully")))
}
