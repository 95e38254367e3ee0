//! Axum route handlers for content and generation.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};

use crate::context::handlers::UserIdQuery;
use crate::errors::AppError;
use crate::generation::generator::{
    analyze_or_skip, generate_social_content, AnalysisOutcome, GenerateRequest, GeneratedContent,
};
use crate::models::content::{ContentItem, ContentUpdate, NewContent};
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct CreateContentRequest {
    pub user_id: i64,
    #[serde(flatten)]
    pub content: NewContent,
}

#[derive(Debug, Deserialize)]
pub struct UpdateContentRequest {
    pub user_id: i64,
    #[serde(flatten)]
    pub update: ContentUpdate,
}

#[derive(Debug, Serialize)]
pub struct CreateContentResponse {
    #[serde(flatten)]
    pub content: ContentItem,
    pub analysis: AnalysisOutcome,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/content
pub async fn handle_list_content(
    State(state): State<AppState>,
    Query(params): Query<UserIdQuery>,
) -> Result<Json<Vec<ContentItem>>, AppError> {
    Ok(Json(state.store.content_for_user(params.user_id).await?))
}

/// POST /api/content
///
/// Stores the item, then scores it against its guideline. The item is returned even
/// when scoring fails.
pub async fn handle_create_content(
    State(state): State<AppState>,
    Json(request): Json<CreateContentRequest>,
) -> Result<(StatusCode, Json<CreateContentResponse>), AppError> {
    if request.content.content.trim().is_empty() {
        return Err(AppError::Validation("content cannot be empty".to_string()));
    }

    let guideline_id = request.content.guideline_id;
    state
        .store
        .guideline(guideline_id)
        .await?
        .filter(|g| g.user_id == request.user_id)
        .ok_or_else(|| AppError::NotFound(format!("Guideline {guideline_id} not found")))?;

    let content = state
        .store
        .create_content(request.user_id, request.content)
        .await?;
    let analysis = analyze_or_skip(state.store.as_ref(), state.llm.as_ref(), &content).await;

    Ok((
        StatusCode::CREATED,
        Json(CreateContentResponse { content, analysis }),
    ))
}

/// PATCH /api/content/:id
pub async fn handle_update_content(
    State(state): State<AppState>,
    Path(content_id): Path<i64>,
    Json(request): Json<UpdateContentRequest>,
) -> Result<Json<ContentItem>, AppError> {
    if request.update.status.is_none() && request.update.engagement.is_none() {
        return Err(AppError::Validation(
            "provide status and/or engagement".to_string(),
        ));
    }

    let item = state
        .store
        .update_content(content_id, request.user_id, request.update)
        .await?;
    Ok(Json(item))
}

/// POST /api/content/generate
pub async fn handle_generate(
    State(state): State<AppState>,
    Json(request): Json<GenerateRequest>,
) -> Result<Json<GeneratedContent>, AppError> {
    request.validate().map_err(AppError::Validation)?;

    let generated =
        generate_social_content(state.store.as_ref(), state.llm.as_ref(), &request).await?;
    Ok(Json(generated))
}
