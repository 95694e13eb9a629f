//! HTTP API module
//!
//! Exposes the timer state and its actions to any presentation layer.

pub mod handlers;
pub mod responses;

use std::sync::Arc;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::state::AppState;
use handlers::*;

/// Create the HTTP router with all endpoints
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/pomodoro", get(timer_handler))
        .route("/pomodoro/start", post(start_handler))
        .route("/pomodoro/pause", post(pause_handler))
        .route("/pomodoro/reset", post(reset_handler))
        .route("/pomodoro/skip", post(skip_handler))
        .route("/pomodoro/notification/dismiss", post(dismiss_handler))
        .route("/status", get(status_handler))
        .route("/health", get(health_handler))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
