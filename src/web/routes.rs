use super::handlers::{healthz_handler, landing_handler, readyz_handler, session_handler};
use crate::AppState;
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::services::ServeDir;

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(landing_handler))
        .route("/healthz", get(healthz_handler))
        .route("/readyz", get(readyz_handler))
        // Session tokens forwarded from the URL fragment by the landing page
        .route("/session", post(session_handler))
        .nest_service("/static", ServeDir::new("static"))
        .with_state(state)
}
