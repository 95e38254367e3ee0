//! Guideline document parsing.
//!
//! Two paths share the same text pipeline:
//! - `extract_draft` is heuristic only and never fails.
//! - `analyze_document_with_retry` sends the document to the model, using the
//!   heuristic confidence as a floor for the model's own estimate.

use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::errors::AppError;
use crate::extraction::confidence::{score_confidence, MIN_CONFIDENCE};
use crate::extraction::document::{extract_text, DocumentText, UploadedDocument};
use crate::extraction::fields::{extract_fields, ExtractedFields};
use crate::extraction::prompts::{analysis_system, ANALYSIS_PROMPT_TEMPLATE};
use crate::extraction::sections::{find_all_sections, section_counts, SectionCategory};
use crate::llm_client::{complete_json, TextGenerator};
use crate::models::guideline::{
    DetectedTone, NewGuideline, Platform, SourceType, TargetAudience,
};

pub const MAX_ANALYSIS_ATTEMPTS: u32 = 3;

const DEFAULT_INDUSTRY: &str = "General";
const DEFAULT_FORMALITY: i32 = 3;
const DEFAULT_VOICE: &str = "professional";
const DEFAULT_TONE: &str = "neutral";
const DEFAULT_STYLE: &str = "professional";
const DEFAULT_PLATFORMS: [Platform; 2] = [Platform::Twitter, Platform::Instagram];

/// Heuristic view of a document: extracted fields plus how much brand signal it carried.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GuidelineDraft {
    pub fields: ExtractedFields,
    pub sections: BTreeMap<SectionCategory, usize>,
    pub confidence: u8,
}

impl GuidelineDraft {
    fn empty() -> Self {
        Self {
            fields: ExtractedFields::default(),
            sections: SectionCategory::ALL.iter().map(|c| (*c, 0)).collect(),
            confidence: MIN_CONFIDENCE,
        }
    }
}

fn scored_sections(text: &str) -> (BTreeMap<SectionCategory, usize>, u8) {
    let counts = section_counts(&find_all_sections(text));
    let confidence = score_confidence(&counts);
    (counts, confidence)
}

pub fn draft_from_text(raw: &str) -> GuidelineDraft {
    let text = DocumentText::for_fields(raw);
    let (sections, confidence) = scored_sections(text.as_str());
    GuidelineDraft {
        fields: extract_fields(text.as_str()),
        sections,
        confidence,
    }
}

/// Best-effort draft straight from upload bytes. Unreadable input degrades to an empty
/// draft at the confidence floor.
pub fn extract_draft(bytes: &[u8], content_type: &str) -> GuidelineDraft {
    match extract_text(bytes, content_type) {
        Ok(text) => draft_from_text(&text),
        Err(e) => {
            warn!("Document extraction failed, returning empty draft: {e}");
            GuidelineDraft::empty()
        }
    }
}

// ── Model analysis ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BrandIdentity {
    pub mission: String,
    pub vision: String,
    pub values: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VoiceProfile {
    pub primary: String,
    pub secondary: Vec<String>,
    pub formality_level: Option<i32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ToneReading {
    pub primary: String,
    pub attributes: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AnalysisConfidence {
    pub mission_clarity: f64,
    pub values_identification: f64,
    pub voice_consistency: f64,
    pub overall: f64,
}

/// The model's reading of a guideline document. The four core blocks are required;
/// everything else is optional.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentAnalysis {
    pub brand_identity: BrandIdentity,
    pub voice: VoiceProfile,
    pub detected_tone: ToneReading,
    pub confidence: AnalysisConfidence,
    #[serde(default)]
    pub industry: Option<String>,
    #[serde(default)]
    pub target_audience: Option<TargetAudience>,
    #[serde(default)]
    pub preferred_platforms: Vec<String>,
    #[serde(default)]
    pub competitors: Vec<String>,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub style: Option<String>,
    #[serde(default)]
    pub sample_captions: Vec<String>,
    #[serde(default)]
    pub use_emojis: Option<bool>,
}

fn non_empty(value: &str, fallback: &str) -> String {
    let value = value.trim();
    if value.is_empty() {
        fallback.to_string()
    } else {
        value.to_string()
    }
}

/// "brand-guidelines" → "Brand Guidelines".
fn title_case(document_type: &str) -> String {
    document_type
        .split(|c: char| c == '-' || c == '_' || c.is_whitespace())
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

impl DocumentAnalysis {
    pub fn into_new_guideline(self, document_type: &str, fields: &ExtractedFields) -> NewGuideline {
        let mut platforms: Vec<Platform> = self
            .preferred_platforms
            .iter()
            .filter_map(|p| Platform::parse(&p.trim().to_lowercase()))
            .collect();
        platforms.dedup();
        if platforms.is_empty() {
            platforms = DEFAULT_PLATFORMS.to_vec();
        }

        let core_values = if self.brand_identity.values.is_empty() {
            fields.brand_values.clone()
        } else {
            self.brand_identity.values
        };

        let tone = non_empty(&self.detected_tone.primary, DEFAULT_TONE);

        NewGuideline {
            name: title_case(document_type),
            industry: non_empty(self.industry.as_deref().unwrap_or_default(), DEFAULT_INDUSTRY),
            target_audience: self.target_audience.unwrap_or_default(),
            preferred_platforms: platforms,
            core_values,
            competitors: self.competitors,
            use_emojis: self.use_emojis.unwrap_or(false),
            formality_scale: self
                .voice
                .formality_level
                .map(|level| level.clamp(1, 5))
                .unwrap_or(DEFAULT_FORMALITY),
            voice: non_empty(&self.voice.primary, DEFAULT_VOICE),
            tone: tone.clone(),
            detected_tone: Some(DetectedTone {
                primary: tone,
                secondary: self.voice.secondary.into_iter().next(),
                attributes: self.detected_tone.attributes,
            }),
            style: non_empty(self.style.as_deref().unwrap_or_default(), DEFAULT_STYLE),
            keywords: self.keywords,
            sample_captions: self.sample_captions,
            hashtag_recommendations: Vec::new(),
            source_type: SourceType::Document,
            source_url: None,
        }
    }
}

/// Model analysis together with the heuristic draft of the same document.
#[derive(Debug, Clone)]
pub struct AnalyzedDocument {
    pub analysis: DocumentAnalysis,
    pub draft: GuidelineDraft,
}

/// Runs CPU-bound text work off the async executor.
pub(crate) async fn run_blocking<T, F>(task: F) -> Result<T, AppError>
where
    T: Send + 'static,
    F: FnOnce() -> T + Send + 'static,
{
    tokio::task::spawn_blocking(task)
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("spawn_blocking failed in extraction: {e}")))
}

/// Document text plus its heuristic draft. Unreadable or empty documents are rejected.
async fn read_document(document: &UploadedDocument) -> Result<(String, GuidelineDraft), AppError> {
    let file_name = document.file_name.clone();
    let bytes = document.bytes.clone();
    let content_type = document.content_type.clone();

    run_blocking(move || {
        let text = extract_text(&bytes, &content_type)
            .map_err(|e| AppError::Validation(e.to_string()))?;
        if text.trim().is_empty() {
            return Err(AppError::Validation(format!(
                "{file_name} contains no readable text"
            )));
        }
        let draft = draft_from_text(&text);
        Ok((text, draft))
    })
    .await?
}

fn describe_counts(counts: &BTreeMap<SectionCategory, usize>) -> String {
    counts
        .iter()
        .map(|(category, count)| format!("- {}: {count}", category.as_str()))
        .collect::<Vec<_>>()
        .join("\n")
}

async fn analyze_text(llm: &dyn TextGenerator, raw: &str) -> Result<DocumentAnalysis, AppError> {
    let text = DocumentText::for_analysis(raw);
    let (counts, floor) = scored_sections(text.as_str());

    // Document text last: it may contain anything, including placeholder names.
    let prompt = ANALYSIS_PROMPT_TEMPLATE
        .replace("{section_counts}", &describe_counts(&counts))
        .replace("{confidence_floor}", &floor.to_string())
        .replace("{document_text}", text.as_str());

    let mut analysis: DocumentAnalysis = complete_json(llm, &prompt, &analysis_system())
        .await
        .map_err(|e| AppError::Generation(format!("Failed to analyze document: {e}")))?;

    analysis.confidence.overall = analysis.confidence.overall.max(f64::from(floor));
    Ok(analysis)
}

/// Model analysis of an uploaded document with up to `MAX_ANALYSIS_ATTEMPTS` model
/// calls, `delay` apart. The document is read once; unreadable documents fail
/// immediately without a model call.
pub async fn analyze_document_with_retry(
    llm: &dyn TextGenerator,
    document: &UploadedDocument,
    delay: Duration,
) -> Result<AnalyzedDocument, AppError> {
    let (raw, draft) = read_document(document).await?;

    let mut attempt = 1;
    let analysis = loop {
        match analyze_text(llm, &raw).await {
            Ok(analysis) => break analysis,
            Err(e) if attempt < MAX_ANALYSIS_ATTEMPTS => {
                warn!(
                    "Analysis of {} failed on attempt {}: {}; retrying after {}ms",
                    document.file_name,
                    attempt,
                    e,
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    };

    info!(
        "Analyzed {} in {} attempt(s), confidence {}",
        document.file_name, attempt, analysis.confidence.overall
    );

    Ok(AnalyzedDocument { analysis, draft })
}
