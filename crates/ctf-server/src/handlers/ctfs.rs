//! CTF handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use tracing::info;

use super::ApiResponse;
use crate::config::AppState;
use crate::error::{ApiError, Result};
use crate::extract::ApiJson;
use crate::models::{CreateCtfInput, Ctf};

/// GET /ctfs
pub async fn list_ctfs(State(state): State<AppState>) -> Result<Json<ApiResponse<Vec<Ctf>>>> {
    info!("GET /ctfs");
    let ctfs = state.documents.list_ctfs().await?;
    Ok(Json(ApiResponse::ok(ctfs)))
}

/// POST /ctfs
pub async fn create_ctf(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<CreateCtfInput>,
) -> Result<(StatusCode, Json<ApiResponse<Ctf>>)> {
    info!("POST /ctfs");
    let new = input.validate()?;
    let ctf = state.documents.create_ctf(new).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(ctf))))
}

/// GET /ctfs/:id
pub async fn get_ctf(
    Path(id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Ctf>>> {
    info!("GET /ctfs/{}", id);
    let ctf = state
        .documents
        .get_ctf(&id)
        .await?
        .ok_or_else(|| ApiError::NotFound("CTF not found".into()))?;
    Ok(Json(ApiResponse::ok(ctf)))
}

/// DELETE /ctfs/:id
pub async fn delete_ctf(
    Path(id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<()>>> {
    info!("DELETE /ctfs/{}", id);
    if !state.documents.delete_ctf(&id).await? {
        return Err(ApiError::NotFound("CTF not found".into()));
    }
    Ok(Json(ApiResponse::message("CTF deleted successfully")))
}
