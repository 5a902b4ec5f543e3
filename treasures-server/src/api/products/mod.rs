//! Product API
//!
//! | Path | Method | Auth |
//! |------|--------|------|
//! | /api/products | GET | none (active only) |
//! | /api/products | POST | admin |
//! | /api/products/images | POST (multipart `file`) | admin |
//! | /api/products/{id} | GET | none |
//! | /api/products/{id} | PUT, DELETE | admin |
//! | /api/admin/products | GET | admin (includes inactive) |

mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/api/products", get(handler::list).post(handler::create))
        .route("/api/products/images", post(handler::upload_image))
        .route(
            "/api/products/{id}",
            get(handler::get_by_id)
                .put(handler::update)
                .delete(handler::delete),
        )
        .route("/api/admin/products", get(handler::list_all))
}
