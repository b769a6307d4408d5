//! HTTP API module
//!
//! This module contains all HTTP endpoint handlers and response structures.

pub mod handlers;
pub mod responses;
pub mod theme;

use std::sync::Arc;
use axum::{
    routing::{get, post, put},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::state::AppState;
use handlers::*;

/// Create the HTTP router with all endpoints
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/timer", get(timer_handler))
        .route("/timer/start", post(start_handler))
        .route("/timer/pause", post(pause_handler))
        .route("/timer/resume", post(resume_handler))
        .route("/timer/toggle", post(toggle_handler))
        .route("/timer/stop", post(stop_handler))
        .route("/timer/duration", put(duration_handler))
        .route("/tasks", get(tasks_handler).post(add_task_handler))
        .route("/tasks/skip", post(skip_handler))
        .route("/completions", get(completions_handler).post(add_completion_handler))
        .route(
            "/completions/:id",
            put(update_completion_handler).delete(delete_completion_handler),
        )
        .route("/status", get(status_handler))
        .route("/health", get(health_handler))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}
