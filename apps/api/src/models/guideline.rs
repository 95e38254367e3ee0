use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Twitter,
    Instagram,
    Linkedin,
    Pinterest,
}

impl Platform {
    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Twitter => "twitter",
            Platform::Instagram => "instagram",
            Platform::Linkedin => "linkedin",
            Platform::Pinterest => "pinterest",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "twitter" => Some(Platform::Twitter),
            "instagram" => Some(Platform::Instagram),
            "linkedin" => Some(Platform::Linkedin),
            "pinterest" => Some(Platform::Pinterest),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceType {
    Manual,
    Document,
    Website,
}

impl SourceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceType::Manual => "manual",
            SourceType::Document => "document",
            SourceType::Website => "website",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "manual" => Some(SourceType::Manual),
            "document" => Some(SourceType::Document),
            "website" => Some(SourceType::Website),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TargetAudience {
    #[serde(default)]
    pub demographics: Vec<String>,
    #[serde(default)]
    pub interests: Vec<String>,
}

/// Tone attributes detected by the model, either from a questionnaire or a document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DetectedTone {
    #[serde(default)]
    pub primary: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secondary: Option<String>,
    #[serde(default)]
    pub attributes: Vec<String>,
}

/// Fields a client supplies when creating or replacing a guideline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewGuideline {
    pub name: String,
    pub industry: String,
    #[serde(default)]
    pub target_audience: TargetAudience,
    pub preferred_platforms: Vec<Platform>,
    #[serde(default)]
    pub core_values: Vec<String>,
    #[serde(default)]
    pub competitors: Vec<String>,
    #[serde(default = "default_use_emojis")]
    pub use_emojis: bool,
    /// 1 = casual, 5 = corporate.
    pub formality_scale: i32,
    pub voice: String,
    pub tone: String,
    #[serde(default)]
    pub detected_tone: Option<DetectedTone>,
    pub style: String,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub sample_captions: Vec<String>,
    #[serde(default)]
    pub hashtag_recommendations: Vec<String>,
    pub source_type: SourceType,
    #[serde(default)]
    pub source_url: Option<String>,
}

fn default_use_emojis() -> bool {
    true
}

impl NewGuideline {
    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("name cannot be empty".to_string());
        }
        if !(1..=5).contains(&self.formality_scale) {
            return Err(format!(
                "formality_scale must be between 1 and 5, got {}",
                self.formality_scale
            ));
        }
        if self.preferred_platforms.is_empty() {
            return Err("at least one preferred platform is required".to_string());
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BrandGuideline {
    pub id: i64,
    pub user_id: i64,
    #[serde(flatten)]
    pub fields: NewGuideline,
    pub created: DateTime<Utc>,
}

#[cfg(test)]
pub(crate) fn sample_guideline() -> NewGuideline {
    NewGuideline {
        name: "Acme Coffee".to_string(),
        industry: "Food & Beverage".to_string(),
        target_audience: TargetAudience::default(),
        preferred_platforms: vec![Platform::Instagram, Platform::Twitter],
        core_values: vec!["Craft".to_string()],
        competitors: vec![],
        use_emojis: true,
        formality_scale: 2,
        voice: "warm".to_string(),
        tone: "playful".to_string(),
        detected_tone: None,
        style: "conversational".to_string(),
        keywords: vec!["coffee".to_string(), "roast".to_string()],
        sample_captions: vec![],
        hashtag_recommendations: vec![],
        source_type: SourceType::Manual,
        source_url: None,
    }
}
