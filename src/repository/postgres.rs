use anyhow::{Context, Result};
use axum::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{types::Json, PgPool};
use std::collections::HashMap;
use uuid::Uuid;

use super::SettingsRepository;
use crate::auth::Owner;
use crate::domain::{SettingsEditable, SettingsUpdate, UserSettings};

/// Settings stored in the `settings` table, one row per owner key
#[derive(Clone)]
pub struct PgSettingsRepository {
    pool: PgPool,
}

impl PgSettingsRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Database row for user settings
#[derive(Debug, sqlx::FromRow)]
struct SettingsRow {
    user_id: Option<Uuid>,
    session_id: Option<String>,
    share_conversations_with_model_authors: bool,
    active_model: String,
    custom_prompts: Json<HashMap<String, String>>,
    multimodal_overrides: Json<HashMap<String, bool>>,
    tools_overrides: Json<HashMap<String, bool>>,
    provider_overrides: Json<HashMap<String, String>>,
    hide_prompt_examples: Json<HashMap<String, bool>>,
    disable_stream: bool,
    direct_paste: bool,
    billing_organization: Option<String>,
    welcome_modal_seen_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<SettingsRow> for UserSettings {
    type Error = anyhow::Error;

    fn try_from(row: SettingsRow) -> Result<Self> {
        let owner = match (row.user_id, row.session_id) {
            (Some(id), _) => Owner::User(id),
            (None, Some(session)) => Owner::Session(session),
            (None, None) => anyhow::bail!("settings row has no owner"),
        };

        Ok(Self {
            owner,
            settings: SettingsEditable {
                share_conversations_with_model_authors: row.share_conversations_with_model_authors,
                active_model: row.active_model,
                custom_prompts: row.custom_prompts.0,
                multimodal_overrides: row.multimodal_overrides.0,
                tools_overrides: row.tools_overrides.0,
                provider_overrides: row.provider_overrides.0,
                hide_prompt_examples: row.hide_prompt_examples.0,
                disable_stream: row.disable_stream,
                direct_paste: row.direct_paste,
            },
            billing_organization: row.billing_organization,
            welcome_modal_seen_at: row.welcome_modal_seen_at,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[async_trait]
impl SettingsRepository for PgSettingsRepository {
    async fn find(&self, owner: &Owner) -> Result<Option<UserSettings>> {
        let row = sqlx::query_as::<_, SettingsRow>(
            r#"
            SELECT user_id, session_id,
                   share_conversations_with_model_authors, active_model,
                   custom_prompts, multimodal_overrides, tools_overrides,
                   provider_overrides, hide_prompt_examples,
                   disable_stream, direct_paste,
                   billing_organization, welcome_modal_seen_at,
                   created_at, updated_at
            FROM settings
            WHERE owner_key = $1
            "#,
        )
        .bind(owner.key())
        .fetch_optional(&self.pool)
        .await
        .context("Failed to load settings")?;

        row.map(UserSettings::try_from).transpose()
    }

    async fn upsert(&self, owner: &Owner, update: &SettingsUpdate) -> Result<()> {
        let s = &update.settings;

        // created_at is only written by the INSERT branch; updated_at never
        // moves backwards, even at microsecond precision or under clock skew
        sqlx::query(
            r#"
            INSERT INTO settings (
                owner_key, user_id, session_id,
                share_conversations_with_model_authors, active_model,
                custom_prompts, multimodal_overrides, tools_overrides,
                provider_overrides, hide_prompt_examples,
                disable_stream, direct_paste,
                billing_organization, welcome_modal_seen_at,
                created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $15)
            ON CONFLICT (owner_key) DO UPDATE SET
                share_conversations_with_model_authors = EXCLUDED.share_conversations_with_model_authors,
                active_model = EXCLUDED.active_model,
                custom_prompts = EXCLUDED.custom_prompts,
                multimodal_overrides = EXCLUDED.multimodal_overrides,
                tools_overrides = EXCLUDED.tools_overrides,
                provider_overrides = EXCLUDED.provider_overrides,
                hide_prompt_examples = EXCLUDED.hide_prompt_examples,
                disable_stream = EXCLUDED.disable_stream,
                direct_paste = EXCLUDED.direct_paste,
                billing_organization = COALESCE(EXCLUDED.billing_organization, settings.billing_organization),
                welcome_modal_seen_at = COALESCE(EXCLUDED.welcome_modal_seen_at, settings.welcome_modal_seen_at),
                updated_at = GREATEST(settings.updated_at + interval '1 microsecond', EXCLUDED.updated_at)
            "#,
        )
        .bind(owner.key())
        .bind(owner.user_id())
        .bind(owner.session_id())
        .bind(s.share_conversations_with_model_authors)
        .bind(&s.active_model)
        .bind(Json(&s.custom_prompts))
        .bind(Json(&s.multimodal_overrides))
        .bind(Json(&s.tools_overrides))
        .bind(Json(&s.provider_overrides))
        .bind(Json(&s.hide_prompt_examples))
        .bind(s.disable_stream)
        .bind(s.direct_paste)
        .bind(update.billing_organization.as_deref())
        .bind(update.welcome_modal_seen_at)
        .bind(update.now)
        .execute(&self.pool)
        .await
        .context("Failed to upsert settings")?;

        Ok(())
    }

    async fn health_check(&self) -> bool {
        sqlx::query("SELECT 1").fetch_one(&self.pool).await.is_ok()
    }
}
