//! Storage seam for guidelines, content and interaction history.
//!
//! Handlers and the context pipeline only see `dyn Storage`. Ids are allocated by the
//! store (auto-increment, shared across entity kinds). Listings come back in id order,
//! which is insertion order, so callers can rely on it for stable tie-breaking.

use async_trait::async_trait;
use thiserror::Error;

use crate::models::content::{ContentItem, ContentUpdate, NewContent};
use crate::models::context::{InteractionRecord, NewInteraction};
use crate::models::guideline::{BrandGuideline, NewGuideline};

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: i64 },

    #[error("{entity} {id} belongs to another user")]
    Forbidden { entity: &'static str, id: i64 },

    #[error("write rejected: {0}")]
    Rejected(String),

    #[error("stored record is malformed: {0}")]
    Corrupt(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("migration error: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

#[async_trait]
pub trait Storage: Send + Sync {
    async fn guidelines_for_user(&self, user_id: i64) -> Result<Vec<BrandGuideline>, StorageError>;

    async fn guideline(&self, id: i64) -> Result<Option<BrandGuideline>, StorageError>;

    async fn create_guideline(
        &self,
        user_id: i64,
        guideline: NewGuideline,
    ) -> Result<BrandGuideline, StorageError>;

    /// Replaces a guideline's fields. Only the owning user may do this.
    async fn update_guideline(
        &self,
        id: i64,
        user_id: i64,
        guideline: NewGuideline,
    ) -> Result<BrandGuideline, StorageError>;

    async fn content_for_user(&self, user_id: i64) -> Result<Vec<ContentItem>, StorageError>;

    /// New content always starts with empty engagement.
    async fn create_content(
        &self,
        user_id: i64,
        content: NewContent,
    ) -> Result<ContentItem, StorageError>;

    async fn update_content(
        &self,
        id: i64,
        user_id: i64,
        update: ContentUpdate,
    ) -> Result<ContentItem, StorageError>;

    async fn context_history(&self, content_id: i64)
        -> Result<Vec<InteractionRecord>, StorageError>;

    async fn user_context_history(
        &self,
        user_id: i64,
    ) -> Result<Vec<InteractionRecord>, StorageError>;

    /// Appends an interaction. Rejects a content id that is neither `NO_CONTENT_ID`
    /// nor an existing content item.
    async fn create_interaction(
        &self,
        interaction: NewInteraction,
    ) -> Result<InteractionRecord, StorageError>;
}
