use anyhow::Result;
use axum::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;

use super::SettingsRepository;
use crate::auth::Owner;
use crate::domain::{SettingsUpdate, UserSettings};

/// In-process repository keyed by owner key
#[derive(Default)]
pub struct MemorySettingsRepository {
    docs: Mutex<HashMap<String, UserSettings>>,
}

impl MemorySettingsRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.docs.lock().len()
    }
}

#[async_trait]
impl SettingsRepository for MemorySettingsRepository {
    async fn find(&self, owner: &Owner) -> Result<Option<UserSettings>> {
        Ok(self.docs.lock().get(&owner.key()).cloned())
    }

    async fn upsert(&self, owner: &Owner, update: &SettingsUpdate) -> Result<()> {
        let mut docs = self.docs.lock();
        let key = owner.key();
        let doc = UserSettings::apply(docs.remove(&key), owner, update);
        docs.insert(key, doc);
        Ok(())
    }

    async fn health_check(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{SettingsEditable, UpdateSettingsRequest};
    use chrono::{Duration, Utc};
    use uuid::Uuid;

    fn update(body: &str, at: chrono::DateTime<Utc>) -> SettingsUpdate {
        UpdateSettingsRequest::from_slice(body.as_bytes())
            .unwrap()
            .into_update(&SettingsEditable::defaults("default-model"), at)
    }

    #[tokio::test]
    async fn one_document_per_owner() {
        let repo = MemorySettingsRepository::new();
        let alice = Owner::User(Uuid::new_v4());
        let anon = Owner::from_session_secret("s3cret");
        let now = Utc::now();

        repo.upsert(&alice, &update("{}", now)).await.unwrap();
        repo.upsert(&alice, &update("{}", now + Duration::seconds(1)))
            .await
            .unwrap();
        repo.upsert(&anon, &update("{}", now)).await.unwrap();

        assert_eq!(repo.len(), 2);
    }

    #[tokio::test]
    async fn repeated_writes_keep_values_and_advance_updated_at() {
        let repo = MemorySettingsRepository::new();
        let owner = Owner::User(Uuid::new_v4());
        let t0 = Utc::now();
        let t1 = t0 + Duration::milliseconds(10);
        let body = r#"{"activeModel":"gpt-x","hidePromptExamples":{"gpt-x":true}}"#;

        repo.upsert(&owner, &update(body, t0)).await.unwrap();
        let first = repo.find(&owner).await.unwrap().unwrap();
        repo.upsert(&owner, &update(body, t1)).await.unwrap();
        let second = repo.find(&owner).await.unwrap().unwrap();

        assert_eq!(first.settings, second.settings);
        assert_eq!(second.created_at, t0);
        assert!(second.updated_at > first.updated_at);
    }

    #[tokio::test]
    async fn find_unknown_owner_is_none() {
        let repo = MemorySettingsRepository::new();
        let found = repo.find(&Owner::Session("nobody".into())).await.unwrap();
        assert!(found.is_none());
    }
}
