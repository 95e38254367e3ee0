//! Keyword-anchored passage finder.
//!
//! A passage runs from a keyword through the next two sentence terminators, which is
//! roughly "the sentence or two about X" without any real parsing.

use std::collections::{BTreeMap, HashSet};

use regex::RegexBuilder;
use serde::{Deserialize, Serialize};

/// Passages shorter than this are keyword fragments, not content.
pub const MIN_SECTION_CHARS: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SectionCategory {
    Mission,
    Vision,
    Values,
    Voice,
}

impl SectionCategory {
    pub const ALL: [SectionCategory; 4] = [
        SectionCategory::Mission,
        SectionCategory::Vision,
        SectionCategory::Values,
        SectionCategory::Voice,
    ];

    pub fn keywords(&self) -> &'static [&'static str] {
        match self {
            SectionCategory::Mission => &["mission", "purpose", "about us"],
            SectionCategory::Vision => &["vision", "future", "aspiration"],
            SectionCategory::Values => &["values", "principles", "beliefs"],
            SectionCategory::Voice => &["voice", "tone", "personality"],
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SectionCategory::Mission => "mission",
            SectionCategory::Vision => "vision",
            SectionCategory::Values => "values",
            SectionCategory::Voice => "voice",
        }
    }
}

/// Passages found per category. Consumed by the scorer and the analysis prompt.
pub type SectionMatches = BTreeMap<SectionCategory, Vec<String>>;

/// Finds every passage starting at one of `keywords` and ending at the second
/// following `.`, `!` or `?`. Matching is case-insensitive; results are trimmed,
/// deduplicated in first-seen order, and shorter than `MIN_SECTION_CHARS` dropped.
pub fn find_sections(text: &str, keywords: &[&str]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut sections = Vec::new();

    for keyword in keywords {
        let pattern = format!(
            r"(?:{})[^.!?]*[.!?][^.!?]*[.!?]",
            regex::escape(keyword)
        );
        let Ok(re) = RegexBuilder::new(&pattern).case_insensitive(true).build() else {
            continue;
        };
        for m in re.find_iter(text) {
            let passage = m.as_str().trim();
            if seen.insert(passage.to_string()) {
                sections.push(passage.to_string());
            }
        }
    }

    sections
        .into_iter()
        .filter(|s| s.chars().count() >= MIN_SECTION_CHARS)
        .collect()
}

/// Runs `find_sections` for every category.
pub fn find_all_sections(text: &str) -> SectionMatches {
    SectionCategory::ALL
        .iter()
        .map(|category| (*category, find_sections(text, category.keywords())))
        .collect()
}

/// Per-category passage counts, the only thing the scorer needs.
pub fn section_counts(sections: &SectionMatches) -> BTreeMap<SectionCategory, usize> {
    sections.iter().map(|(k, v)| (*k, v.len())).collect()
}
