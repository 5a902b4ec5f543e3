//! Slider Image API
//!
//! | Path | Method | Auth |
//! |------|--------|------|
//! | /api/images | GET | none |
//! | /api/images | POST (multipart `file`) | admin |
//! | /api/images/selected | GET | none |
//! | /api/images/order | PUT | admin |
//! | /api/images/{id} | DELETE | admin |
//! | /api/images/{id}/move | POST | admin |
//! | /api/images/{id}/toggle | POST | admin |

mod handler;

use axum::{
    Router,
    routing::{delete, get, post, put},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/images", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::list).post(handler::upload))
        .route("/selected", get(handler::list_selected))
        .route("/order", put(handler::reorder))
        .route("/{id}", delete(handler::delete))
        .route("/{id}/move", post(handler::move_image))
        .route("/{id}/toggle", post(handler::toggle))
}
