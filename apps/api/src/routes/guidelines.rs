use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;

use crate::context::handlers::UserIdQuery;
use crate::errors::AppError;
use crate::models::guideline::{BrandGuideline, NewGuideline};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct GuidelineRequest {
    pub user_id: i64,
    #[serde(flatten)]
    pub guideline: NewGuideline,
}

/// GET /api/guidelines
pub async fn handle_list_guidelines(
    State(state): State<AppState>,
    Query(params): Query<UserIdQuery>,
) -> Result<Json<Vec<BrandGuideline>>, AppError> {
    Ok(Json(state.store.guidelines_for_user(params.user_id).await?))
}

/// POST /api/guidelines
pub async fn handle_create_guideline(
    State(state): State<AppState>,
    Json(request): Json<GuidelineRequest>,
) -> Result<(StatusCode, Json<BrandGuideline>), AppError> {
    request.guideline.validate().map_err(AppError::Validation)?;
    let guideline = state
        .store
        .create_guideline(request.user_id, request.guideline)
        .await?;
    Ok((StatusCode::CREATED, Json(guideline)))
}

/// PATCH /api/guidelines/:id
///
/// Replaces the guideline's fields. Only its owner may do this.
pub async fn handle_update_guideline(
    State(state): State<AppState>,
    Path(guideline_id): Path<i64>,
    Json(request): Json<GuidelineRequest>,
) -> Result<Json<BrandGuideline>, AppError> {
    request.guideline.validate().map_err(AppError::Validation)?;
    let guideline = state
        .store
        .update_guideline(guideline_id, request.user_id, request.guideline)
        .await?;
    Ok(Json(guideline))
}
