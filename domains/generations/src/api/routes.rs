//! Route definitions for Generations domain API

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers::generations;
use super::middleware::GenerationsState;

/// Create all Generations domain API routes
pub fn routes() -> Router<GenerationsState> {
    Router::new()
        .route("/v1/generations", post(generations::create_generation))
        .route(
            "/v1/generations/{session_id}/events",
            get(generations::get_delivery_events),
        )
        .route(
            "/v1/generations/{session_id}/cancel",
            post(generations::cancel_delivery),
        )
}
