use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
    response::{IntoResponse, Response},
};
use axum_extra::headers::{Cookie, HeaderMapExt};
use std::sync::Arc;

use super::{AuthContext, Owner};
use crate::app::AppState;
use crate::error::ApiError;

/// Extractor resolving the owner of the caller's settings document.
///
/// A bearer token wins when present and must verify; otherwise the
/// session cookie identifies an anonymous caller.
///
/// Example:
/// ```ignore
/// async fn handler(AuthCondition(owner): AuthCondition) -> String {
///     owner.key()
/// }
/// ```
#[derive(Debug, Clone)]
pub struct AuthCondition(pub Owner);

impl std::ops::Deref for AuthCondition {
    type Target = Owner;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// Rejection for requests whose owner cannot be resolved.
///
/// Always rendered as 401; the verification detail carried by
/// `InvalidToken` is logged, never returned to the caller.
#[derive(Debug)]
pub enum AuthError {
    MissingCredentials,
    InvalidFormat,
    InvalidToken(String),
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let message = match &self {
            AuthError::MissingCredentials => "Missing authorization token or session",
            AuthError::InvalidFormat => "Invalid authorization format",
            AuthError::InvalidToken(detail) => {
                tracing::debug!(detail = %detail, "Rejected bearer token");
                "Invalid or expired token"
            }
        };

        ApiError::Unauthorized(message.to_string()).into_response()
    }
}

#[async_trait]
impl FromRequestParts<Arc<AppState>> for AuthCondition {
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        if let Some(header) = parts.headers.get(AUTHORIZATION) {
            let token = header
                .to_str()
                .map_err(|_| AuthError::InvalidFormat)?
                .strip_prefix("Bearer ")
                .ok_or(AuthError::InvalidFormat)?
                .trim();

            if token.is_empty() {
                return Err(AuthError::MissingCredentials);
            }

            let claims = state.jwks_cache.verify_token(token).await.map_err(|e| {
                tracing::warn!(error = %e, "JWT verification failed");
                AuthError::InvalidToken(e.to_string())
            })?;

            let context = AuthContext::from_claims(&claims).map_err(|e| {
                tracing::warn!(error = %e, "Failed to build auth context");
                AuthError::InvalidToken(e.to_string())
            })?;

            tracing::debug!(user_id = %context.user_id, email = ?context.email, "Authenticated request");
            return Ok(AuthCondition(Owner::User(context.user_id)));
        }

        let cookies = parts.headers.typed_get::<Cookie>();
        let session = cookies
            .as_ref()
            .and_then(|c| c.get(&state.settings.session_cookie_name))
            .filter(|value| !value.is_empty())
            .ok_or(AuthError::MissingCredentials)?;

        Ok(AuthCondition(Owner::from_session_secret(session)))
    }
}
