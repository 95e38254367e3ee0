use std::cmp::Reverse;

use tracing::debug;

use crate::context::aggregator::{aggregate, MAX_HISTORY_ITEMS};
use crate::errors::AppError;
use crate::models::content::ContentItem;
use crate::models::context::ContentContext;
use crate::storage::Storage;

/// Builds the generation context for one of `user_id`'s guidelines: the guideline itself,
/// its best-performing posted content, and the aggregate performance of that window.
///
/// A guideline owned by someone else is reported as not found.
pub async fn get_content_context(
    store: &dyn Storage,
    user_id: i64,
    guideline_id: i64,
) -> Result<ContentContext, AppError> {
    let guidelines = store
        .guideline(guideline_id)
        .await?
        .filter(|g| g.user_id == user_id)
        .ok_or_else(|| AppError::NotFound(format!("Guideline {guideline_id} not found")))?;

    let previous_content = top_posted(store.content_for_user(user_id).await?, guideline_id);
    let performance = aggregate(&previous_content);

    debug!(
        "Context for guideline {}: {} item(s), sentiment {}",
        guideline_id,
        previous_content.len(),
        performance.sentiment.as_str()
    );

    Ok(ContentContext {
        previous_content,
        guidelines,
        performance,
    })
}

/// Posted items of `guideline_id`, highest total engagement first, capped at
/// `MAX_HISTORY_ITEMS`. Ties keep their storage order.
fn top_posted(items: Vec<ContentItem>, guideline_id: i64) -> Vec<ContentItem> {
    let mut window: Vec<ContentItem> = items
        .into_iter()
        .filter(|item| item.guideline_id == guideline_id && item.is_posted())
        .collect();
    window.sort_by_key(|item| Reverse(item.total_engagement()));
    window.truncate(MAX_HISTORY_ITEMS);
    window
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::content::{content_item, ContentStatus, NewContent};
    use crate::models::context::Sentiment;
    use crate::models::guideline::{sample_guideline, Platform};
    use crate::storage::memory::seed_posted;
    use crate::storage::MemoryStore;

    #[test]
    fn test_top_posted_filters_and_sorts_stably() {
        let items = vec![
            content_item(1, 7, ContentStatus::Posted, &[("likes", 5)]),
            content_item(2, 7, ContentStatus::Draft, &[("likes", 999)]),
            content_item(3, 8, ContentStatus::Posted, &[("likes", 999)]),
            content_item(4, 7, ContentStatus::Posted, &[("likes", 50)]),
            content_item(5, 7, ContentStatus::Posted, &[("likes", 5)]),
        ];
        let ids: Vec<i64> = top_posted(items, 7).iter().map(|i| i.id).collect();
        assert_eq!(ids, vec![4, 1, 5]);
    }

    #[tokio::test]
    async fn test_window_takes_five_highest() {
        let store = MemoryStore::new();
        let g = store.create_guideline(1, sample_guideline()).await.unwrap();

        let mut ids = Vec::new();
        for likes in [100, 100, 600, 100, 100, 100] {
            ids.push(seed_posted(&store, 1, g.id, likes).await.id);
        }

        let context = get_content_context(&store, 1, g.id).await.unwrap();
        let selected: Vec<i64> = context.previous_content.iter().map(|i| i.id).collect();

        // The 600 first, then the first four 100s in insertion order.
        assert_eq!(selected, vec![ids[2], ids[0], ids[1], ids[3], ids[4]]);
        assert_eq!(context.performance.engagement["likes"], 1000);
        assert_eq!(context.performance.effectiveness, 1.0);
        assert_eq!(context.performance.sentiment, Sentiment::High);
        assert_eq!(context.guidelines.id, g.id);
    }

    #[tokio::test]
    async fn test_window_ignores_unposted_and_other_guidelines() {
        let store = MemoryStore::new();
        let g = store.create_guideline(1, sample_guideline()).await.unwrap();
        let other = store.create_guideline(1, sample_guideline()).await.unwrap();

        let kept = seed_posted(&store, 1, g.id, 10).await;
        seed_posted(&store, 1, other.id, 500).await;
        store
            .create_content(
                1,
                NewContent {
                    guideline_id: g.id,
                    content: "still a draft".to_string(),
                    platform: Platform::Twitter,
                    status: ContentStatus::Draft,
                    scheduled_for: None,
                },
            )
            .await
            .unwrap();

        let context = get_content_context(&store, 1, g.id).await.unwrap();
        assert_eq!(context.previous_content.len(), 1);
        assert_eq!(context.previous_content[0].id, kept.id);
        assert_eq!(context.performance.sentiment, Sentiment::Low);
    }

    #[tokio::test]
    async fn test_empty_history() {
        let store = MemoryStore::new();
        let g = store.create_guideline(1, sample_guideline()).await.unwrap();
        let context = get_content_context(&store, 1, g.id).await.unwrap();
        assert!(context.previous_content.is_empty());
        assert_eq!(context.performance.effectiveness, 0.0);
        assert_eq!(context.performance.sentiment, Sentiment::Low);
    }

    #[tokio::test]
    async fn test_missing_guideline_is_not_found() {
        let store = MemoryStore::new();
        let err = get_content_context(&store, 1, 99).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_foreign_guideline_is_not_found() {
        let store = MemoryStore::new();
        let g = store.create_guideline(2, sample_guideline()).await.unwrap();
        let err = get_content_context(&store, 1, g.id).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }
}
