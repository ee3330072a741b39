//! Settings persistence
//!
//! Handlers talk to storage only through [`SettingsRepository`]. The
//! PostgreSQL implementation backs the running service; the in-memory one
//! backs tests.

#[cfg(test)]
pub mod memory;
pub mod postgres;

use anyhow::Result;
use axum::async_trait;

use crate::auth::Owner;
use crate::domain::{SettingsUpdate, UserSettings};

#[cfg(test)]
pub use memory::MemorySettingsRepository;
pub use postgres::PgSettingsRepository;

#[async_trait]
pub trait SettingsRepository: Send + Sync {
    /// Stored document for `owner`, if any.
    async fn find(&self, owner: &Owner) -> Result<Option<UserSettings>>;

    /// Atomically create or update the document for `owner`.
    ///
    /// On insert `created_at` is set to `update.now`; on update it is left
    /// as stored. `updated_at` is always set to `update.now`.
    async fn upsert(&self, owner: &Owner, update: &SettingsUpdate) -> Result<()>;

    /// Lightweight connectivity probe
    async fn health_check(&self) -> bool;
}
