use tracing::info;

use crate::errors::AppError;
use crate::models::context::{
    AiFeedback, ContentContext, InteractionKind, InteractionRecord, NewInteraction,
};
use crate::storage::Storage;

/// Persists one AI round trip. `content_id` is a stored content item or `NO_CONTENT_ID`;
/// anything else is rejected by the store and surfaced here.
pub async fn track_interaction(
    store: &dyn Storage,
    user_id: i64,
    content_id: i64,
    kind: InteractionKind,
    context: ContentContext,
    ai_feedback: AiFeedback,
) -> Result<InteractionRecord, AppError> {
    let record = store
        .create_interaction(NewInteraction {
            user_id,
            content_id,
            interaction_type: kind,
            context,
            ai_feedback,
        })
        .await?;

    info!(
        "Tracked {} interaction {} for user {} (content {})",
        record.interaction_type.as_str(),
        record.id,
        user_id,
        content_id
    );
    Ok(record)
}
