//! Product API Handlers

use axum::{
    Json,
    extract::{Multipart, Path, State},
};

use crate::api::{ok, read_image_field};
use crate::auth::CurrentUser;
use crate::core::ServerState;
use shared::models::{ProductImageUpload, ProductInput, ProductRecord};
use shared::{ApiResponse, AppError, AppResult, ErrorCode};

/// Storefront listing: active products only
pub async fn list(State(state): State<ServerState>) -> AppResult<Json<ApiResponse<Vec<ProductRecord>>>> {
    Ok(ok(state.products.list(true).await?))
}

/// Admin listing: every product
pub async fn list_all(
    State(state): State<ServerState>,
    _user: CurrentUser,
) -> AppResult<Json<ApiResponse<Vec<ProductRecord>>>> {
    Ok(ok(state.products.list(false).await?))
}

pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<ApiResponse<ProductRecord>>> {
    let product = state.products.get(&id).await?.ok_or_else(|| {
        AppError::with_message(ErrorCode::ProductNotFound, format!("Product {} not found", id))
    })?;
    Ok(ok(product))
}

pub async fn create(
    State(state): State<ServerState>,
    _user: CurrentUser,
    Json(mut payload): Json<ProductInput>,
) -> AppResult<Json<ApiResponse<ProductRecord>>> {
    payload.id = None;
    Ok(ok(state.products.save(payload).await?))
}

pub async fn update(
    State(state): State<ServerState>,
    _user: CurrentUser,
    Path(id): Path<String>,
    Json(mut payload): Json<ProductInput>,
) -> AppResult<Json<ApiResponse<ProductRecord>>> {
    payload.id = Some(id);
    Ok(ok(state.products.save(payload).await?))
}

pub async fn delete(
    State(state): State<ServerState>,
    _user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Json<ApiResponse<()>>> {
    state.products.delete(&id).await?;
    Ok(Json(ApiResponse::ok()))
}

pub async fn upload_image(
    State(state): State<ServerState>,
    _user: CurrentUser,
    multipart: Multipart,
) -> AppResult<Json<ApiResponse<ProductImageUpload>>> {
    let upload = read_image_field(multipart).await?;
    Ok(ok(state.products.upload_image(upload).await?))
}
