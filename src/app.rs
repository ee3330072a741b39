use axum::{extract::DefaultBodyLimit, http::HeaderValue, Router};
use std::sync::Arc;
use tower_http::{
    cors::{AllowHeaders, AllowMethods, CorsLayer},
    limit::RequestBodyLimitLayer,
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use crate::auth::JwksCache;
use crate::config::Settings;
use crate::domain::SettingsEditable;
use crate::middleware::request_id_layer;
use crate::repository::SettingsRepository;
use crate::routes;

/// Shared application state
pub struct AppState {
    pub settings: Settings,
    /// Fallback values for omitted settings fields, fixed at startup
    pub default_settings: SettingsEditable,
    pub repository: Arc<dyn SettingsRepository>,
    pub jwks_cache: JwksCache,
}

impl AppState {
    pub fn new(
        settings: Settings,
        repository: Arc<dyn SettingsRepository>,
        jwks_cache: JwksCache,
    ) -> Arc<Self> {
        let default_settings = SettingsEditable::defaults(settings.default_model.clone());

        Arc::new(Self {
            settings,
            default_settings,
            repository,
            jwks_cache,
        })
    }
}

/// Build the complete application with all middleware
pub fn create_app(state: Arc<AppState>) -> Router {
    let cors = build_cors_layer(&state.settings);

    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().level(Level::DEBUG))
        .on_request(DefaultOnRequest::new().level(Level::DEBUG))
        .on_response(DefaultOnResponse::new().level(Level::DEBUG));

    let (set_request_id, propagate_request_id) = request_id_layer();

    Router::new()
        .merge(routes::api_router())
        // Middleware stack (applied bottom-up)
        // Both limits follow MAX_BODY_BYTES; axum's extractor cap is 2 MiB otherwise
        .layer(DefaultBodyLimit::max(state.settings.max_body_bytes))
        .layer(RequestBodyLimitLayer::new(state.settings.max_body_bytes))
        .layer(propagate_request_id)
        .layer(trace_layer)
        .layer(set_request_id)
        .layer(cors)
        .with_state(state)
}

fn build_cors_layer(settings: &Settings) -> CorsLayer {
    let origins: Vec<HeaderValue> = settings
        .cors_allow_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    let max_age = if settings.env.is_dev() {
        std::time::Duration::from_secs(86400)
    } else {
        std::time::Duration::from_secs(3600)
    };

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(AllowMethods::list([
            axum::http::Method::GET,
            axum::http::Method::POST,
            axum::http::Method::OPTIONS,
        ]))
        .allow_headers(AllowHeaders::list([
            axum::http::header::AUTHORIZATION,
            axum::http::header::CONTENT_TYPE,
            axum::http::header::ACCEPT,
            axum::http::HeaderName::from_static("x-request-id"),
        ]))
        .allow_credentials(true)
        .max_age(max_age)
}
