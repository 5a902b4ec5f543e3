//! Blob serving
//!
//! `GET /api/blob/{*path}` returns stored image bytes. Public; paths are
//! validated before they reach the store.

use axum::{
    Router,
    body::Bytes,
    extract::{Path, State},
    response::IntoResponse,
    routing::get,
};
use http::header;

use crate::blob::validate_blob_path;
use crate::core::ServerState;
use shared::{AppError, AppResult};

pub fn router() -> Router<ServerState> {
    Router::new().route("/api/blob/{*path}", get(serve))
}

async fn serve(State(state): State<ServerState>, Path(path): Path<String>) -> AppResult<impl IntoResponse> {
    validate_blob_path(&path)?;
    let bytes = state
        .blobs
        .read(&path)
        .await?
        .ok_or_else(|| AppError::not_found("File"))?;

    let content_type = mime_guess::from_path(&path)
        .first_or_octet_stream()
        .to_string();
    Ok((
        [
            (header::CONTENT_TYPE, content_type),
            (header::CACHE_CONTROL, "public, max-age=31536000, immutable".to_string()),
        ],
        Bytes::from(bytes),
    ))
}
