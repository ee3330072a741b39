use anyhow::{Context, Result};
use std::env;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Dev,
    Staging,
    Prod,
}

impl Environment {
    pub fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "prod" | "production" => Self::Prod,
            "staging" => Self::Staging,
            _ => Self::Dev,
        }
    }

    pub fn is_dev(&self) -> bool {
        matches!(self, Self::Dev)
    }
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub env: Environment,
    pub server_addr: String,

    // Database
    pub database_url: String,
    pub database_max_connections: u32,

    // CORS
    pub cors_allow_origins: Vec<String>,

    // JWT auth
    pub jwt_jwks_url: String,
    pub jwt_issuer: String,
    pub jwt_audience: String,
    pub jwks_cache_ttl_seconds: u64,

    // Chat settings
    pub default_model: String,
    pub session_cookie_name: String,
    pub max_body_bytes: usize,
}

impl Settings {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build settings from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = Environment::from_str(&lookup("ENV").unwrap_or_else(|| "dev".to_string()));
        let server_addr = lookup("SERVER_ADDR").unwrap_or_else(|| "0.0.0.0:8080".to_string());

        // Database
        let database_url = lookup("DATABASE_URL").context("DATABASE_URL must be set")?;
        let database_max_connections = lookup("DATABASE_MAX_CONNECTIONS")
            .and_then(|s| s.parse().ok())
            .unwrap_or(10);

        // CORS
        let cors_allow_origins = lookup("CORS_ALLOW_ORIGINS")
            .unwrap_or_else(|| "http://localhost:5173".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        // JWT auth
        let jwt_jwks_url = lookup("JWT_JWKS_URL").context("JWT_JWKS_URL must be set")?;
        let jwt_issuer = lookup("JWT_ISSUER").context("JWT_ISSUER must be set")?;
        let jwt_audience =
            lookup("JWT_AUDIENCE").unwrap_or_else(|| "authenticated".to_string());
        let jwks_cache_ttl_seconds = lookup("JWKS_CACHE_TTL_SECONDS")
            .and_then(|s| s.parse().ok())
            .unwrap_or(1800); // 30 minutes default

        // Chat settings
        let default_model = lookup("DEFAULT_MODEL")
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .context("DEFAULT_MODEL must be set")?;
        let session_cookie_name =
            lookup("SESSION_COOKIE_NAME").unwrap_or_else(|| "hf-chat".to_string());
        let max_body_bytes = lookup("MAX_BODY_BYTES")
            .and_then(|s| s.parse().ok())
            .unwrap_or(1024 * 1024);

        Ok(Settings {
            env,
            server_addr,
            database_url,
            database_max_connections,
            cors_allow_origins,
            jwt_jwks_url,
            jwt_issuer,
            jwt_audience,
            jwks_cache_ttl_seconds,
            default_model,
            session_cookie_name,
            max_body_bytes,
        })
    }
}
