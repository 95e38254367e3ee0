use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;

use crate::context::assembler::get_content_context;
use crate::errors::AppError;
use crate::models::context::{ContentContext, InteractionRecord};
use crate::state::AppState;

#[derive(Deserialize)]
pub struct UserIdQuery {
    pub user_id: i64,
}

/// GET /api/guidelines/:id/context
pub async fn handle_guideline_context(
    State(state): State<AppState>,
    Path(guideline_id): Path<i64>,
    Query(params): Query<UserIdQuery>,
) -> Result<Json<ContentContext>, AppError> {
    let context = get_content_context(state.store.as_ref(), params.user_id, guideline_id).await?;
    Ok(Json(context))
}

/// GET /api/content/:id/context
///
/// Interaction history recorded against a content item, oldest first.
pub async fn handle_content_history(
    State(state): State<AppState>,
    Path(content_id): Path<i64>,
    Query(params): Query<UserIdQuery>,
) -> Result<Json<Vec<InteractionRecord>>, AppError> {
    let history = state
        .store
        .context_history(content_id)
        .await?
        .into_iter()
        .filter(|record| record.user_id == params.user_id)
        .collect();
    Ok(Json(history))
}

/// GET /api/context/history
///
/// Every interaction recorded for a user, including generations not yet tied to content.
pub async fn handle_user_history(
    State(state): State<AppState>,
    Query(params): Query<UserIdQuery>,
) -> Result<Json<Vec<InteractionRecord>>, AppError> {
    Ok(Json(state.store.user_context_history(params.user_id).await?))
}
