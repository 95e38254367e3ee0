//! Axum route handlers for guideline document uploads.

use std::collections::HashMap;

use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use tracing::{info, warn};

use crate::errors::AppError;
use crate::extraction::document::{
    content_type_from_file_name, is_supported_content_type, UploadedDocument,
    SUPPORTED_CONTENT_TYPES,
};
use crate::extraction::parser::{
    analyze_document_with_retry, extract_draft, run_blocking, AnalyzedDocument,
    DocumentAnalysis, GuidelineDraft,
};
use crate::models::guideline::BrandGuideline;
use crate::state::AppState;

const DEFAULT_DOCUMENT_TYPE: &str = "brand-guidelines";

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub guideline: BrandGuideline,
    pub analysis: DocumentAnalysis,
    pub draft: GuidelineDraft,
}

/// Parts of a multipart upload: the `file` part plus any plain text fields.
struct UploadForm {
    document: UploadedDocument,
    fields: HashMap<String, String>,
}

fn invalid_multipart(e: axum::extract::multipart::MultipartError) -> AppError {
    AppError::Validation(format!("Invalid multipart body: {e}"))
}

async fn read_upload(mut multipart: Multipart) -> Result<UploadForm, AppError> {
    let mut document = None;
    let mut fields = HashMap::new();

    while let Some(field) = multipart.next_field().await.map_err(invalid_multipart)? {
        let name = field.name().unwrap_or_default().to_string();
        if name == "file" {
            let file_name = field.file_name().unwrap_or("document").to_string();
            let content_type = field
                .content_type()
                .map(str::to_string)
                .or_else(|| content_type_from_file_name(&file_name).map(str::to_string))
                .unwrap_or_default();
            let bytes = field.bytes().await.map_err(invalid_multipart)?;
            document = Some(UploadedDocument {
                file_name,
                content_type,
                bytes,
            });
        } else {
            let value = field.text().await.map_err(invalid_multipart)?;
            fields.insert(name, value);
        }
    }

    let document =
        document.ok_or_else(|| AppError::Validation("a `file` part is required".to_string()))?;

    if !is_supported_content_type(&document.content_type) {
        return Err(AppError::Validation(format!(
            "unsupported file type '{}'; expected one of {}",
            document.content_type,
            SUPPORTED_CONTENT_TYPES.join(", ")
        )));
    }

    Ok(UploadForm { document, fields })
}

/// POST /api/guidelines/extract
///
/// Heuristic-only preview of what a document contains. Never calls the model.
pub async fn handle_extract(multipart: Multipart) -> Result<Json<GuidelineDraft>, AppError> {
    let UploadForm { document, .. } = read_upload(multipart).await?;
    let file_name = document.file_name.clone();
    let draft =
        run_blocking(move || extract_draft(&document.bytes, &document.content_type)).await?;
    if draft.fields.is_empty() {
        warn!("No brand fields recognised in {file_name}");
    }
    info!("Extracted draft from {file_name} (confidence {})", draft.confidence);
    Ok(Json(draft))
}

/// POST /api/guidelines/upload
///
/// Model analysis of a guideline document, persisted as a new guideline for `user_id`.
pub async fn handle_upload(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<UploadResponse>), AppError> {
    let form = read_upload(multipart).await?;

    let user_id: i64 = form
        .fields
        .get("user_id")
        .ok_or_else(|| AppError::Validation("user_id is required".to_string()))?
        .trim()
        .parse()
        .map_err(|_| AppError::Validation("user_id must be an integer".to_string()))?;
    let document_type = form
        .fields
        .get("document_type")
        .map(|t| t.trim())
        .filter(|t| !t.is_empty())
        .unwrap_or(DEFAULT_DOCUMENT_TYPE)
        .to_string();

    let analyzed =
        analyze_document_with_retry(state.llm.as_ref(), &form.document, state.parse_retry_delay)
            .await?;

    let AnalyzedDocument { analysis, draft } = analyzed;
    let new_guideline = analysis
        .clone()
        .into_new_guideline(&document_type, &draft.fields);
    new_guideline.validate().map_err(AppError::Validation)?;

    let guideline = state.store.create_guideline(user_id, new_guideline).await?;
    info!(
        "Created guideline {} for user {} from {}",
        guideline.id, user_id, form.document.file_name
    );

    Ok((
        StatusCode::CREATED,
        Json(UploadResponse {
            guideline,
            analysis,
            draft,
        }),
    ))
}
