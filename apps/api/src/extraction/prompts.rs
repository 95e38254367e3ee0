// Document analysis prompt templates.

use crate::llm_client::prompts::JSON_ONLY_INSTRUCTION;

pub fn analysis_system() -> String {
    format!(
        "You are a brand strategist who reads brand guideline documents and extracts a \
         structured brand profile. Only report what the document supports; leave fields \
         empty rather than inventing them. {JSON_ONLY_INSTRUCTION}"
    )
}

/// Replace `{confidence_floor}`, `{section_counts}` and `{document_text}` before sending.
pub const ANALYSIS_PROMPT_TEMPLATE: &str = r#"Analyze the following brand guideline document.

A keyword scan already found these passages per category:
{section_counts}

The scan puts the document's confidence at {confidence_floor} out of 100. Your overall
confidence must not be lower than that.

DOCUMENT:
{document_text}

Return a JSON object with this EXACT schema:
{
  "brandIdentity": {
    "mission": "string",
    "vision": "string",
    "values": ["string"]
  },
  "voice": {
    "primary": "string",
    "secondary": ["string"],
    "formalityLevel": 1
  },
  "detectedTone": {
    "primary": "string",
    "attributes": ["string"]
  },
  "confidence": {
    "missionClarity": 0,
    "valuesIdentification": 0,
    "voiceConsistency": 0,
    "overall": 0
  },
  "industry": "string",
  "targetAudience": {"demographics": ["string"], "interests": ["string"]},
  "preferredPlatforms": ["twitter" | "instagram" | "linkedin" | "pinterest"],
  "competitors": ["string"],
  "keywords": ["string"],
  "style": "string",
  "sampleCaptions": ["string"],
  "useEmojis": true
}

formalityLevel is 1 (casual) to 5 (corporate). Confidence values are 0 to 100."#;
