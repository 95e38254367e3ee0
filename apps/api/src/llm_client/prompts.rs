// Shared prompt constants. Each service that calls the model keeps its own prompts.rs
// alongside it; this file holds the cross-cutting fragments.

/// Appended to every system prompt so JSON mode never sees prose.
pub const JSON_ONLY_INSTRUCTION: &str = "\
    You MUST respond with a single valid JSON object only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences.";

/// Per-platform conventions the generator should respect.
pub const PLATFORM_BEST_PRACTICES: &str = "\
Follow platform best practices:
Twitter: Max 280 chars, engaging, concise
Instagram: Visual focus, emoji-friendly, hashtag-optimized
LinkedIn: Professional tone, industry insights, longer-form
Pinterest: Visual-first, descriptive, keyword-rich";
