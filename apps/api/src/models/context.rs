use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::content::{ContentItem, Engagement};
use crate::models::guideline::BrandGuideline;

/// Engagement volume bucket. Describes reach, not textual tone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Viral,
    High,
    Moderate,
    Low,
}

impl Sentiment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sentiment::Viral => "viral",
            Sentiment::High => "high",
            Sentiment::Moderate => "moderate",
            Sentiment::Low => "low",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceSnapshot {
    pub engagement: Engagement,
    pub sentiment: Sentiment,
    /// Always within [0, 1].
    pub effectiveness: f64,
}

/// Everything the generation prompt needs to know about a guideline's track record.
/// Built per request and only persisted inside an `InteractionRecord`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentContext {
    pub previous_content: Vec<ContentItem>,
    pub guidelines: BrandGuideline,
    pub performance: PerformanceSnapshot,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InteractionKind {
    Generation,
    Edit,
    Approval,
    Feedback,
}

impl InteractionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            InteractionKind::Generation => "generation",
            InteractionKind::Edit => "edit",
            InteractionKind::Approval => "approval",
            InteractionKind::Feedback => "feedback",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "generation" => Some(InteractionKind::Generation),
            "edit" => Some(InteractionKind::Edit),
            "approval" => Some(InteractionKind::Approval),
            "feedback" => Some(InteractionKind::Feedback),
            _ => None,
        }
    }
}

/// The model's own account of a round trip.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AiFeedback {
    pub understanding: String,
    pub reasoning: String,
    pub improvements: Vec<String>,
}

/// Content id recorded when the interaction happened before any content existed.
pub const NO_CONTENT_ID: i64 = -1;

#[derive(Debug, Clone, PartialEq)]
pub struct NewInteraction {
    pub user_id: i64,
    pub content_id: i64,
    pub interaction_type: InteractionKind,
    pub context: ContentContext,
    pub ai_feedback: AiFeedback,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InteractionRecord {
    pub id: i64,
    pub user_id: i64,
    pub content_id: i64,
    pub interaction_type: InteractionKind,
    pub context: ContentContext,
    pub ai_feedback: AiFeedback,
    /// Empty on creation; reserved for later backfill.
    pub performance: BTreeMap<String, f64>,
    pub created: DateTime<Utc>,
}
