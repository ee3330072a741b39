pub mod health;
pub mod settings;

use axum::{routing::get, Router};
use std::sync::Arc;

use crate::app::AppState;

/// Build the API router with all routes
pub fn api_router() -> Router<Arc<AppState>> {
    Router::new()
        // Public routes
        .route("/health", get(health::health_check))
        // Caller-scoped routes (bearer token or session cookie)
        .route(
            "/settings",
            get(settings::get_settings).post(settings::update_settings),
        )
}
