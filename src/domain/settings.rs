//! User settings domain types
//!
//! The editable settings record, the update request accepted over HTTP and
//! the persisted per-owner document.

use chrono::{DateTime, Utc};
use serde::de::{self, Unexpected};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::HashMap;

use crate::auth::Owner;

/// User-configurable subset of a settings document.
///
/// Built once from the configured default model as the fallback record;
/// every accepted update is resolved against it into a fully populated
/// value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsEditable {
    pub share_conversations_with_model_authors: bool,
    pub active_model: String,
    pub custom_prompts: HashMap<String, String>,
    pub multimodal_overrides: HashMap<String, bool>,
    pub tools_overrides: HashMap<String, bool>,
    pub provider_overrides: HashMap<String, String>,
    pub hide_prompt_examples: HashMap<String, bool>,
    pub disable_stream: bool,
    pub direct_paste: bool,
}

impl SettingsEditable {
    /// Default settings record for the given default model.
    pub fn defaults(default_model: impl Into<String>) -> Self {
        Self {
            share_conversations_with_model_authors: true,
            active_model: default_model.into(),
            custom_prompts: HashMap::new(),
            multimodal_overrides: HashMap::new(),
            tools_overrides: HashMap::new(),
            provider_overrides: HashMap::new(),
            hide_prompt_examples: HashMap::new(),
            disable_stream: false,
            direct_paste: false,
        }
    }
}

/// Request body for `POST /settings`.
///
/// Every field is optional. A field that is present must carry a value of
/// the declared type; `null` is rejected like any other type mismatch.
/// Unknown fields are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSettingsRequest {
    #[serde(default, deserialize_with = "present")]
    pub share_conversations_with_model_authors: Option<bool>,
    #[serde(default, deserialize_with = "present")]
    pub welcome_modal_seen: Option<bool>,
    #[serde(default, deserialize_with = "present")]
    pub active_model: Option<String>,
    #[serde(default, deserialize_with = "present")]
    pub custom_prompts: Option<HashMap<String, String>>,
    #[serde(default, deserialize_with = "present")]
    pub multimodal_overrides: Option<HashMap<String, bool>>,
    #[serde(default, deserialize_with = "present")]
    pub tools_overrides: Option<HashMap<String, bool>>,
    #[serde(default, deserialize_with = "present")]
    pub provider_overrides: Option<HashMap<String, String>>,
    #[serde(default, deserialize_with = "present")]
    pub disable_stream: Option<bool>,
    #[serde(default, deserialize_with = "present")]
    pub direct_paste: Option<bool>,
    #[serde(default, deserialize_with = "present")]
    pub hide_prompt_examples: Option<HashMap<String, bool>>,
    #[serde(default, deserialize_with = "present")]
    pub billing_organization: Option<String>,
}

/// Absent fields become `None` through `#[serde(default)]`; present fields
/// must deserialize as `T`, so an explicit `null` is an error.
fn present<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

impl UpdateSettingsRequest {
    /// Parse a raw request body. Anything but a JSON object is rejected,
    /// including arrays that would fill fields positionally.
    pub fn from_slice(body: &[u8]) -> Result<Self, serde_json::Error> {
        let value: Value = serde_json::from_slice(body)?;
        let unexpected = match &value {
            Value::Object(_) => return serde_json::from_value(value),
            Value::Array(_) => Unexpected::Seq,
            Value::String(s) => Unexpected::Str(s),
            Value::Bool(b) => Unexpected::Bool(*b),
            Value::Number(_) => Unexpected::Other("number"),
            Value::Null => Unexpected::Unit,
        };
        Err(de::Error::invalid_type(unexpected, &"a JSON object"))
    }

    /// Resolve the request against the defaults into a complete write.
    ///
    /// `now` stamps `updatedAt`, `createdAt` on insert and, when the
    /// request saw the welcome modal, `welcomeModalSeenAt`.
    pub fn into_update(self, defaults: &SettingsEditable, now: DateTime<Utc>) -> SettingsUpdate {
        let settings = SettingsEditable {
            share_conversations_with_model_authors: self
                .share_conversations_with_model_authors
                .unwrap_or(defaults.share_conversations_with_model_authors),
            active_model: self
                .active_model
                .unwrap_or_else(|| defaults.active_model.clone()),
            custom_prompts: self
                .custom_prompts
                .unwrap_or_else(|| defaults.custom_prompts.clone()),
            multimodal_overrides: self
                .multimodal_overrides
                .unwrap_or_else(|| defaults.multimodal_overrides.clone()),
            tools_overrides: self
                .tools_overrides
                .unwrap_or_else(|| defaults.tools_overrides.clone()),
            provider_overrides: self
                .provider_overrides
                .unwrap_or_else(|| defaults.provider_overrides.clone()),
            hide_prompt_examples: self
                .hide_prompt_examples
                .unwrap_or_else(|| defaults.hide_prompt_examples.clone()),
            disable_stream: self.disable_stream.unwrap_or(defaults.disable_stream),
            direct_paste: self.direct_paste.unwrap_or(defaults.direct_paste),
        };

        SettingsUpdate {
            settings,
            billing_organization: self.billing_organization,
            welcome_modal_seen_at: self.welcome_modal_seen.unwrap_or(false).then_some(now),
            now,
        }
    }
}

/// A validated write for a single owner.
///
/// `settings` is always applied in full. `billing_organization` and
/// `welcome_modal_seen_at` are applied only when `Some`; `None` leaves the
/// stored value untouched.
#[derive(Debug, Clone, PartialEq)]
pub struct SettingsUpdate {
    pub settings: SettingsEditable,
    pub billing_organization: Option<String>,
    pub welcome_modal_seen_at: Option<DateTime<Utc>>,
    pub now: DateTime<Utc>,
}

/// Persisted settings document
#[derive(Debug, Clone, PartialEq)]
pub struct UserSettings {
    pub owner: Owner,
    pub settings: SettingsEditable,
    pub billing_organization: Option<String>,
    pub welcome_modal_seen_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserSettings {
    /// Document produced by applying `update` to `existing`, or a fresh
    /// document when nothing is stored yet.
    pub fn apply(existing: Option<Self>, owner: &Owner, update: &SettingsUpdate) -> Self {
        match existing {
            Some(doc) => Self {
                owner: doc.owner,
                settings: update.settings.clone(),
                billing_organization: update
                    .billing_organization
                    .clone()
                    .or(doc.billing_organization),
                welcome_modal_seen_at: update.welcome_modal_seen_at.or(doc.welcome_modal_seen_at),
                created_at: doc.created_at,
                updated_at: update
                    .now
                    .max(doc.updated_at + chrono::Duration::microseconds(1)),
            },
            None => Self {
                owner: owner.clone(),
                settings: update.settings.clone(),
                billing_organization: update.billing_organization.clone(),
                welcome_modal_seen_at: update.welcome_modal_seen_at,
                created_at: update.now,
                updated_at: update.now,
            },
        }
    }
}

/// Response DTO for `GET /settings`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSettingsResponse {
    #[serde(flatten)]
    pub settings: SettingsEditable,
    pub billing_organization: Option<String>,
    pub welcome_modal_seen_at: Option<DateTime<Utc>>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl UserSettingsResponse {
    /// What a caller with nothing stored yet sees.
    pub fn from_defaults(defaults: &SettingsEditable) -> Self {
        Self {
            settings: defaults.clone(),
            billing_organization: None,
            welcome_modal_seen_at: None,
            created_at: None,
            updated_at: None,
        }
    }
}

impl From<UserSettings> for UserSettingsResponse {
    fn from(s: UserSettings) -> Self {
        Self {
            settings: s.settings,
            billing_organization: s.billing_organization,
            welcome_modal_seen_at: s.welcome_modal_seen_at,
            created_at: Some(s.created_at),
            updated_at: Some(s.updated_at),
        }
    }
}
