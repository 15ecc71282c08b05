pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::evaluation::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let body_limit = state.config.max_upload_bytes;

    Router::new()
        .route("/health", get(health::health_handler))
        // Interactive form
        .route(
            "/",
            get(handlers::handle_index).post(handlers::handle_submit_form),
        )
        // JSON API
        .route(
            "/api/v1/evaluations",
            post(handlers::handle_create_evaluation),
        )
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}
