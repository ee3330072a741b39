//! User settings routes

use axum::{body::Bytes, extract::State, http::StatusCode, Json};
use chrono::Utc;
use std::sync::Arc;

use crate::app::AppState;
use crate::auth::AuthCondition;
use crate::domain::{UpdateSettingsRequest, UserSettingsResponse};
use crate::error::{ApiError, ApiResult};

/// GET /settings
///
/// Stored settings for the caller, or the defaults when none exist yet.
pub async fn get_settings(
    State(state): State<Arc<AppState>>,
    AuthCondition(owner): AuthCondition,
) -> ApiResult<Json<UserSettingsResponse>> {
    let stored = state
        .repository
        .find(&owner)
        .await
        .map_err(ApiError::Storage)?;

    let response = match stored {
        Some(doc) => doc.into(),
        None => UserSettingsResponse::from_defaults(&state.default_settings),
    };

    Ok(Json(response))
}

/// POST /settings
///
/// Validate the body, fill omitted fields from the defaults and upsert the
/// caller's document. Responds with an empty 200.
pub async fn update_settings(
    State(state): State<Arc<AppState>>,
    AuthCondition(owner): AuthCondition,
    body: Bytes,
) -> ApiResult<StatusCode> {
    let request = UpdateSettingsRequest::from_slice(&body)
        .map_err(|e| ApiError::BadRequest(format!("Invalid settings payload: {e}")))?;

    let update = request.into_update(&state.default_settings, Utc::now());

    state
        .repository
        .upsert(&owner, &update)
        .await
        .map_err(ApiError::Storage)?;

    tracing::debug!(
        owner = %owner,
        active_model = %update.settings.active_model,
        welcome_modal_seen = update.welcome_modal_seen_at.is_some(),
        "Settings saved"
    );

    Ok(StatusCode::OK)
}
