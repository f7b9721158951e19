use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;

use crate::handlers;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/api/languages", get(handlers::list_languages))
        .route("/api/run", post(handlers::run_code))
        .route("/api/submit", post(handlers::submit_code))
}
