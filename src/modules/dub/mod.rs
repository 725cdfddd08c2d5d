use axum::Router;
use axum::routing::post;
use crate::state::AppState;

pub mod dto;
pub mod handler;
pub mod model;
pub mod service;

pub use service::DubPipeline;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/translate", post(handler::translate_video))
        .route("/upload", post(handler::upload_video))
}
