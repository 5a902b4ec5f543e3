//! Slider Image API Handlers

use axum::{
    Json,
    extract::{Multipart, Path, State},
};
use serde::Deserialize;

use crate::api::{ok, read_image_field};
use crate::auth::CurrentUser;
use crate::core::ServerState;
use shared::models::{ImageRecord, MoveDirection, ReorderRequest, SelectionState};
use shared::{ApiResponse, AppResult};

#[derive(Debug, Deserialize)]
pub struct MoveRequest {
    pub direction: MoveDirection,
}

pub async fn list(State(state): State<ServerState>) -> AppResult<Json<ApiResponse<Vec<ImageRecord>>>> {
    Ok(ok(state.images.list().await?))
}

pub async fn list_selected(
    State(state): State<ServerState>,
) -> AppResult<Json<ApiResponse<Vec<ImageRecord>>>> {
    Ok(ok(state.images.list_selected().await?))
}

pub async fn upload(
    State(state): State<ServerState>,
    user: CurrentUser,
    multipart: Multipart,
) -> AppResult<Json<ApiResponse<ImageRecord>>> {
    let upload = read_image_field(multipart).await?;
    tracing::debug!(
        admin = %user.email,
        file_name = %upload.file_name,
        size = upload.bytes.len(),
        "Slider image upload received"
    );
    Ok(ok(state.images.add(upload).await?))
}

pub async fn delete(
    State(state): State<ServerState>,
    _user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Json<ApiResponse<()>>> {
    state.images.delete(&id).await?;
    Ok(Json(ApiResponse::ok()))
}

pub async fn reorder(
    State(state): State<ServerState>,
    _user: CurrentUser,
    Json(payload): Json<ReorderRequest>,
) -> AppResult<Json<ApiResponse<Vec<ImageRecord>>>> {
    Ok(ok(state.images.reorder(&payload.ids).await?))
}

pub async fn move_image(
    State(state): State<ServerState>,
    _user: CurrentUser,
    Path(id): Path<String>,
    Json(payload): Json<MoveRequest>,
) -> AppResult<Json<ApiResponse<Vec<ImageRecord>>>> {
    Ok(ok(state.images.move_image(&id, payload.direction).await?))
}

pub async fn toggle(
    State(state): State<ServerState>,
    _user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Json<ApiResponse<SelectionState>>> {
    Ok(ok(state.images.toggle(&id).await?))
}
