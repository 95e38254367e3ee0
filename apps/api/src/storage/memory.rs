use std::collections::BTreeMap;
use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::models::content::{ContentItem, ContentUpdate, Engagement, NewContent};
use crate::models::context::{InteractionRecord, NewInteraction, NO_CONTENT_ID};
use crate::models::guideline::{BrandGuideline, NewGuideline};
use crate::storage::{Storage, StorageError};

/// In-process store. One id counter is shared by every entity kind.
pub struct MemoryStore {
    next_id: AtomicI64,
    guidelines: RwLock<BTreeMap<i64, BrandGuideline>>,
    content: RwLock<BTreeMap<i64, ContentItem>>,
    interactions: RwLock<BTreeMap<i64, InteractionRecord>>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            next_id: AtomicI64::new(1),
            guidelines: RwLock::new(BTreeMap::new()),
            content: RwLock::new(BTreeMap::new()),
            interactions: RwLock::new(BTreeMap::new()),
        }
    }

    fn allocate_id(&self) -> i64 {
        self.next_id.fetch_add(1, Ordering::SeqCst)
    }
}

#[async_trait]
impl Storage for MemoryStore {
    async fn guidelines_for_user(&self, user_id: i64) -> Result<Vec<BrandGuideline>, StorageError> {
        let guidelines = self.guidelines.read().await;
        Ok(guidelines
            .values()
            .filter(|g| g.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn guideline(&self, id: i64) -> Result<Option<BrandGuideline>, StorageError> {
        Ok(self.guidelines.read().await.get(&id).cloned())
    }

    async fn create_guideline(
        &self,
        user_id: i64,
        guideline: NewGuideline,
    ) -> Result<BrandGuideline, StorageError> {
        let record = BrandGuideline {
            id: self.allocate_id(),
            user_id,
            fields: guideline,
            created: Utc::now(),
        };
        self.guidelines
            .write()
            .await
            .insert(record.id, record.clone());
        Ok(record)
    }

    async fn update_guideline(
        &self,
        id: i64,
        user_id: i64,
        guideline: NewGuideline,
    ) -> Result<BrandGuideline, StorageError> {
        let mut guidelines = self.guidelines.write().await;
        let existing = guidelines.get_mut(&id).ok_or(StorageError::NotFound {
            entity: "guideline",
            id,
        })?;
        if existing.user_id != user_id {
            return Err(StorageError::Forbidden {
                entity: "guideline",
                id,
            });
        }
        existing.fields = guideline;
        Ok(existing.clone())
    }

    async fn content_for_user(&self, user_id: i64) -> Result<Vec<ContentItem>, StorageError> {
        let content = self.content.read().await;
        Ok(content
            .values()
            .filter(|c| c.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn create_content(
        &self,
        user_id: i64,
        content: NewContent,
    ) -> Result<ContentItem, StorageError> {
        let item = ContentItem {
            id: self.allocate_id(),
            user_id,
            guideline_id: content.guideline_id,
            content: content.content,
            platform: content.platform,
            status: content.status,
            scheduled_for: content.scheduled_for,
            engagement: Engagement::new(),
            created: Utc::now(),
        };
        self.content.write().await.insert(item.id, item.clone());
        Ok(item)
    }

    async fn update_content(
        &self,
        id: i64,
        user_id: i64,
        update: ContentUpdate,
    ) -> Result<ContentItem, StorageError> {
        let mut content = self.content.write().await;
        let item = content.get_mut(&id).ok_or(StorageError::NotFound {
            entity: "content",
            id,
        })?;
        if item.user_id != user_id {
            return Err(StorageError::Forbidden {
                entity: "content",
                id,
            });
        }
        if let Some(status) = update.status {
            item.status = status;
        }
        if let Some(engagement) = update.engagement {
            item.engagement = engagement;
        }
        Ok(item.clone())
    }

    async fn context_history(
        &self,
        content_id: i64,
    ) -> Result<Vec<InteractionRecord>, StorageError> {
        let interactions = self.interactions.read().await;
        Ok(interactions
            .values()
            .filter(|r| r.content_id == content_id)
            .cloned()
            .collect())
    }

    async fn user_context_history(
        &self,
        user_id: i64,
    ) -> Result<Vec<InteractionRecord>, StorageError> {
        let interactions = self.interactions.read().await;
        Ok(interactions
            .values()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn create_interaction(
        &self,
        interaction: NewInteraction,
    ) -> Result<InteractionRecord, StorageError> {
        if interaction.content_id != NO_CONTENT_ID
            && !self
                .content
                .read()
                .await
                .contains_key(&interaction.content_id)
        {
            return Err(StorageError::Rejected(format!(
                "content {} does not exist",
                interaction.content_id
            )));
        }

        let record = InteractionRecord {
            id: self.allocate_id(),
            user_id: interaction.user_id,
            content_id: interaction.content_id,
            interaction_type: interaction.interaction_type,
            context: interaction.context,
            ai_feedback: interaction.ai_feedback,
            performance: BTreeMap::new(),
            created: Utc::now(),
        };
        self.interactions
            .write()
            .await
            .insert(record.id, record.clone());
        Ok(record)
    }
}

/// Creates a posted content item for `guideline_id` carrying `likes` likes.
#[cfg(test)]
pub(crate) async fn seed_posted(
    store: &MemoryStore,
    user_id: i64,
    guideline_id: i64,
    likes: u64,
) -> ContentItem {
    use crate::models::content::ContentStatus;
    use crate::models::guideline::Platform;

    let item = store
        .create_content(
            user_id,
            NewContent {
                guideline_id,
                content: format!("post with {likes} likes"),
                platform: Platform::Instagram,
                status: ContentStatus::Posted,
                scheduled_for: None,
            },
        )
        .await
        .unwrap();
    store
        .update_content(
            item.id,
            user_id,
            ContentUpdate {
                status: None,
                engagement: Some([("likes".to_string(), likes)].into_iter().collect()),
            },
        )
        .await
        .unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::content::ContentStatus;
    use crate::models::guideline::{sample_guideline, Platform};

    fn new_content(guideline_id: i64) -> NewContent {
        NewContent {
            guideline_id,
            content: "Fresh roast drops Friday".to_string(),
            platform: Platform::Twitter,
            status: ContentStatus::Draft,
            scheduled_for: None,
        }
    }

    #[tokio::test]
    async fn test_ids_are_shared_and_increasing() {
        let store = MemoryStore::new();
        let g = store.create_guideline(1, sample_guideline()).await.unwrap();
        let c = store.create_content(1, new_content(g.id)).await.unwrap();
        assert_eq!(g.id, 1);
        assert_eq!(c.id, 2);
    }

    #[tokio::test]
    async fn test_guidelines_scoped_to_user() {
        let store = MemoryStore::new();
        store.create_guideline(1, sample_guideline()).await.unwrap();
        store.create_guideline(2, sample_guideline()).await.unwrap();
        let mine = store.guidelines_for_user(1).await.unwrap();
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].user_id, 1);
    }

    #[tokio::test]
    async fn test_update_guideline_requires_owner() {
        let store = MemoryStore::new();
        let g = store.create_guideline(1, sample_guideline()).await.unwrap();
        let err = store
            .update_guideline(g.id, 2, sample_guideline())
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::Forbidden { .. }));

        let mut changed = sample_guideline();
        changed.tone = "bold".to_string();
        let updated = store.update_guideline(g.id, 1, changed).await.unwrap();
        assert_eq!(updated.fields.tone, "bold");
        assert_eq!(updated.created, g.created);
    }

    #[tokio::test]
    async fn test_update_missing_guideline_is_not_found() {
        let store = MemoryStore::new();
        let err = store
            .update_guideline(42, 1, sample_guideline())
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::NotFound { id: 42, .. }));
    }

    #[tokio::test]
    async fn test_new_content_has_empty_engagement_and_can_be_updated() {
        let store = MemoryStore::new();
        let c = store.create_content(1, new_content(1)).await.unwrap();
        assert!(c.engagement.is_empty());

        let update = ContentUpdate {
            status: Some(ContentStatus::Posted),
            engagement: Some([("likes".to_string(), 12)].into_iter().collect()),
        };
        let updated = store.update_content(c.id, 1, update).await.unwrap();
        assert!(updated.is_posted());
        assert_eq!(updated.total_engagement(), 12);
    }

    #[tokio::test]
    async fn test_content_listing_is_insertion_ordered() {
        let store = MemoryStore::new();
        for _ in 0..4 {
            store.create_content(1, new_content(1)).await.unwrap();
        }
        let ids: Vec<i64> = store
            .content_for_user(1)
            .await
            .unwrap()
            .iter()
            .map(|c| c.id)
            .collect();
        assert_eq!(ids, vec![1, 2, 3, 4]);
    }
}
