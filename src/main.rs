mod app;
mod auth;
mod config;
mod db;
mod domain;
mod error;
mod logging;
mod middleware;
mod repository;
mod routes;

use anyhow::Result;
use std::sync::Arc;

use repository::PgSettingsRepository;

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let settings = config::Settings::from_env()?;

    logging::init_logging(&settings.env);

    tracing::info!(
        env = ?settings.env,
        server_addr = %settings.server_addr,
        default_model = %settings.default_model,
        "Starting chat settings service"
    );

    let pool = db::create_pool(&settings).await?;
    db::migrate(&pool).await?;

    let jwks_cache = auth::JwksCache::from_settings(&settings);

    // Missing keys are fetched again on first request
    if let Err(e) = jwks_cache.warm_cache().await {
        tracing::warn!(error = %e, "Failed to warm JWKS cache - will fetch on first request");
    }

    let repository = Arc::new(PgSettingsRepository::new(pool));
    let state = app::AppState::new(settings.clone(), repository, jwks_cache);

    let app = app::create_app(state);

    let listener = tokio::net::TcpListener::bind(&settings.server_addr).await?;
    tracing::info!("Listening on {}", settings.server_addr);

    axum::serve(listener, app).await?;

    Ok(())
}
