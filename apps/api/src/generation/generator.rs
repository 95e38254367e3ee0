//! Social content generation and tone analysis.
//!
//! Flow: get_content_context (when a guideline is given) → prompt → model →
//!       validate reply → track interaction (best-effort) → return.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::context::assembler::get_content_context;
use crate::context::tracker::track_interaction;
use crate::errors::AppError;
use crate::generation::prompts::{
    generation_system, generation_user_prompt, tone_analysis_system, tone_analysis_user_prompt,
};
use crate::llm_client::{complete_json, TextGenerator};
use crate::models::content::ContentItem;
use crate::models::context::{AiFeedback, ContentContext, InteractionKind, NO_CONTENT_ID};
use crate::models::guideline::Platform;
use crate::storage::Storage;

// ────────────────────────────────────────────────────────────────────────────
// Data models
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GenerationTask {
    #[default]
    Caption,
    Hashtags,
    Optimize,
}

/// Request body for content generation.
#[derive(Debug, Clone, Deserialize)]
pub struct GenerateRequest {
    pub user_id: i64,
    #[serde(default)]
    pub guideline_id: Option<i64>,
    /// Objective for a new caption.
    #[serde(default)]
    pub prompt: String,
    pub platform: Platform,
    #[serde(default, alias = "type")]
    pub task: GenerationTask,
    /// Existing text to optimize or tag.
    #[serde(default)]
    pub content: String,
}

impl GenerateRequest {
    pub fn validate(&self) -> Result<(), String> {
        match self.task {
            GenerationTask::Caption if self.prompt.trim().is_empty() => {
                Err("prompt cannot be empty for a caption".to_string())
            }
            GenerationTask::Hashtags | GenerationTask::Optimize
                if self.content.trim().is_empty() =>
            {
                Err("content cannot be empty for hashtags or optimize".to_string())
            }
            _ => Ok(()),
        }
    }
}

/// The model's reply. `content` is set for captions and optimizations, `hashtags` for
/// hashtag suggestions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedContent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hashtags: Option<Vec<String>>,
    pub understanding: String,
    pub reasoning: String,
    pub improvements: Vec<String>,
}

impl GeneratedContent {
    fn check(&self, task: GenerationTask) -> Result<(), AppError> {
        let missing = match task {
            GenerationTask::Hashtags => self.hashtags.as_ref().map_or(true, Vec::is_empty),
            GenerationTask::Caption | GenerationTask::Optimize => self
                .content
                .as_deref()
                .map_or(true, |c| c.trim().is_empty()),
        };
        if missing {
            let field = match task {
                GenerationTask::Hashtags => "hashtags",
                _ => "content",
            };
            return Err(AppError::Generation(format!(
                "model reply is missing `{field}`"
            )));
        }
        Ok(())
    }

    fn feedback(&self) -> AiFeedback {
        AiFeedback {
            understanding: self.understanding.clone(),
            reasoning: self.reasoning.clone(),
            improvements: self.improvements.clone(),
        }
    }
}

/// Model scores for a stored content item. Scores are in [0, 1].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentAnalysis {
    pub brand_alignment: f64,
    pub engagement: f64,
    pub sentiment: String,
}

/// Result of the analysis that follows content creation. Skipping is not an error:
/// the content is already stored either way.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum AnalysisOutcome {
    Analyzed(ContentAnalysis),
    Skipped { reason: String },
}

// ────────────────────────────────────────────────────────────────────────────
// Pipeline
// ────────────────────────────────────────────────────────────────────────────

async fn track_best_effort(
    store: &dyn Storage,
    user_id: i64,
    content_id: i64,
    kind: InteractionKind,
    context: ContentContext,
    feedback: AiFeedback,
) {
    if let Err(e) = track_interaction(store, user_id, content_id, kind, context, feedback).await {
        warn!(
            "Failed to track {} interaction for user {}: {}",
            kind.as_str(),
            user_id,
            e
        );
    }
}

/// Generates a caption, hashtags or an optimized post. With a guideline, the brand
/// context shapes the prompt and the round trip is recorded as a `generation`
/// interaction.
pub async fn generate_social_content(
    store: &dyn Storage,
    llm: &dyn TextGenerator,
    request: &GenerateRequest,
) -> Result<GeneratedContent, AppError> {
    let context = match request.guideline_id {
        Some(guideline_id) => {
            Some(get_content_context(store, request.user_id, guideline_id).await?)
        }
        None => None,
    };

    let system = generation_system(request.task, request.platform, context.as_ref());
    let prompt = generation_user_prompt(
        request.task,
        request.platform,
        &request.prompt,
        &request.content,
    );

    let generated: GeneratedContent = complete_json(llm, &prompt, &system)
        .await
        .map_err(|e| AppError::Generation(format!("Failed to generate content: {e}")))?;
    generated.check(request.task)?;

    info!(
        "Generated {:?} for user {} on {}",
        request.task,
        request.user_id,
        request.platform.as_str()
    );

    if let Some(context) = context {
        track_best_effort(
            store,
            request.user_id,
            NO_CONTENT_ID,
            InteractionKind::Generation,
            context,
            generated.feedback(),
        )
        .await;
    }

    Ok(generated)
}

/// Scores a stored item against its guideline and records a `feedback` interaction.
pub async fn analyze_content_tone(
    store: &dyn Storage,
    llm: &dyn TextGenerator,
    item: &ContentItem,
) -> Result<ContentAnalysis, AppError> {
    let context = get_content_context(store, item.user_id, item.guideline_id).await?;

    let mut analysis: ContentAnalysis = complete_json(
        llm,
        &tone_analysis_user_prompt(&item.content),
        &tone_analysis_system(&context),
    )
    .await
    .map_err(|e| AppError::Generation(format!("Failed to analyze content: {e}")))?;
    analysis.brand_alignment = analysis.brand_alignment.clamp(0.0, 1.0);
    analysis.engagement = analysis.engagement.clamp(0.0, 1.0);

    let feedback = AiFeedback {
        understanding: "Content analysis performed".to_string(),
        reasoning: format!(
            "Alignment: {}, Engagement: {}",
            analysis.brand_alignment, analysis.engagement
        ),
        improvements: Vec::new(),
    };
    track_best_effort(
        store,
        item.user_id,
        item.id,
        InteractionKind::Feedback,
        context,
        feedback,
    )
    .await;

    Ok(analysis)
}

pub async fn analyze_or_skip(
    store: &dyn Storage,
    llm: &dyn TextGenerator,
    item: &ContentItem,
) -> AnalysisOutcome {
    match analyze_content_tone(store, llm, item).await {
        Ok(analysis) => AnalysisOutcome::Analyzed(analysis),
        Err(e) => {
            warn!("Analysis of content {} skipped: {}", item.id, e);
            AnalysisOutcome::Skipped {
                reason: e.to_string(),
            }
        }
    }
}
