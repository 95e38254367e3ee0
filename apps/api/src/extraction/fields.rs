//! Heuristic brand-field extractors.
//!
//! Each extractor is an independent pure function over the same raw text. None of them
//! can fail; no signal means an empty field.

use std::collections::{BTreeMap, HashSet};
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Maximum entries kept per extracted list or map.
pub const MAX_SECTIONS: usize = 20;

const MAX_COLOR_NAME_CHARS: usize = 30;
const MAX_FONT_NAME_CHARS: usize = 50;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtractedFields {
    pub brand_values: Vec<String>,
    pub brand_voice: Vec<String>,
    pub color_palette: BTreeMap<String, String>,
    pub typography: BTreeMap<String, String>,
    pub logo_usage: Vec<String>,
}

impl ExtractedFields {
    pub fn is_empty(&self) -> bool {
        self.brand_values.is_empty()
            && self.brand_voice.is_empty()
            && self.color_palette.is_empty()
            && self.typography.is_empty()
            && self.logo_usage.is_empty()
    }
}

pub fn extract_fields(text: &str) -> ExtractedFields {
    ExtractedFields {
        brand_values: extract_brand_values(text),
        brand_voice: extract_brand_voice(text),
        color_palette: extract_color_palette(text),
        typography: extract_typography(text),
        logo_usage: extract_logo_usage(text),
    }
}

// ── Labelled blocks ────────────────────────────────────────────────────────
//
// A block starts at a label, then `:` / `-` / newlines, and runs until a blank line, a
// line starting with a capital letter, or the end of the text. Only the label is
// case-insensitive.

macro_rules! block_regex {
    ($labels:expr) => {
        LazyLock::new(|| {
            Regex::new(&format!(
                r"(?i:\b(?:{}))(?:\s*:\s*|\s*-\s*|\n+)([\s\S]*?)(?:\n\s*\n|\n[A-Z]|$)",
                $labels
            ))
            .expect("valid block regex")
        })
    };
}

static RE_VALUES_BLOCK: LazyLock<Regex> =
    block_regex!(r"brand\s+values?|core\s+values?|values?|principles");
static RE_VOICE_BLOCK: LazyLock<Regex> = block_regex!(
    r"brand\s+voice|tone\s+of\s+voice|tone|voice|communication\s+style|messaging"
);
static RE_LOGO_BLOCK: LazyLock<Regex> = block_regex!(r"logo\s+usage|logo\s+guidelines|logo");

/// Bullets, dashes, numbered and checkbox markers, line breaks.
static RE_LIST_SPLIT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\r?\n|\s*[•*]\s*|\s*-\s*|\s*\d+\.\s*|\s*\[\s*\]\s*").expect("valid split regex")
});
/// Same as `RE_LIST_SPLIT`, plus inline `,` and `;` separators.
static RE_TERM_SPLIT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\r?\n|\s*[•*]\s*|\s*-\s*|\s*\d+\.\s*|\s*\[\s*\]\s*|\s*[,;]\s*")
        .expect("valid split regex")
});

struct ListRule {
    block: &'static LazyLock<Regex>,
    splitter: &'static LazyLock<Regex>,
    /// Exclusive length bounds, in chars.
    min_len: usize,
    max_len: usize,
    trim_punctuation: bool,
}

static VALUES_RULE: ListRule = ListRule {
    block: &RE_VALUES_BLOCK,
    splitter: &RE_TERM_SPLIT,
    min_len: 3,
    max_len: 100,
    trim_punctuation: true,
};

static VOICE_RULE: ListRule = ListRule {
    block: &RE_VOICE_BLOCK,
    splitter: &RE_TERM_SPLIT,
    min_len: 3,
    max_len: 100,
    trim_punctuation: true,
};

static LOGO_RULE: ListRule = ListRule {
    block: &RE_LOGO_BLOCK,
    splitter: &RE_LIST_SPLIT,
    min_len: 10,
    max_len: 200,
    trim_punctuation: false,
};

fn extract_list(text: &str, rule: &ListRule) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut entries = Vec::new();

    for caps in rule.block.captures_iter(text) {
        let Some(block) = caps.get(1) else { continue };
        for piece in rule.splitter.split(block.as_str()) {
            let entry = if rule.trim_punctuation {
                piece.trim_matches(|c: char| c.is_whitespace() || matches!(c, '.' | '!' | ':'))
            } else {
                piece.trim()
            };
            let len = entry.chars().count();
            if len <= rule.min_len || len >= rule.max_len {
                continue;
            }
            if seen.insert(entry.to_string()) {
                entries.push(entry.to_string());
                if entries.len() >= MAX_SECTIONS {
                    return entries;
                }
            }
        }
    }

    entries
}

pub fn extract_brand_values(text: &str) -> Vec<String> {
    extract_list(text, &VALUES_RULE)
}

pub fn extract_brand_voice(text: &str) -> Vec<String> {
    extract_list(text, &VOICE_RULE)
}

pub fn extract_logo_usage(text: &str) -> Vec<String> {
    extract_list(text, &LOGO_RULE)
}

// ── Colors ─────────────────────────────────────────────────────────────────

const COLOR_TOKEN: &str = r"#[0-9A-Fa-f]{6}\b|#[0-9A-Fa-f]{3}\b|rgba\(\s*\d+\s*,\s*\d+\s*,\s*\d+\s*,\s*[0-9.]+\s*\)|rgb\(\s*\d+\s*,\s*\d+\s*,\s*\d+\s*\)";

static RE_COLOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(COLOR_TOKEN).expect("valid color regex"));
static RE_NAMED_COLOR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"([A-Za-z][A-Za-z ]*?)\s*[-:]\s*({COLOR_TOKEN})"))
        .expect("valid named color regex")
});

/// Named colors ("Ocean Blue: #0055FF") first, then every remaining token under
/// `color1`, `color2`, ... until the palette holds `MAX_SECTIONS` entries.
pub fn extract_color_palette(text: &str) -> BTreeMap<String, String> {
    let mut palette = BTreeMap::new();

    for caps in RE_NAMED_COLOR.captures_iter(text) {
        let (Some(name), Some(code)) = (caps.get(1), caps.get(2)) else {
            continue;
        };
        let name = name.as_str().trim().to_lowercase();
        if name.is_empty() || name.chars().count() >= MAX_COLOR_NAME_CHARS {
            continue;
        }
        if palette.len() >= MAX_SECTIONS && !palette.contains_key(&name) {
            break;
        }
        palette.insert(name, code.as_str().to_string());
    }

    let mut count = palette.len();
    for token in RE_COLOR.find_iter(text) {
        if count >= MAX_SECTIONS {
            break;
        }
        let code = token.as_str();
        if palette.values().any(|v| v == code) {
            continue;
        }
        count += 1;
        palette.insert(format!("color{count}"), code.to_string());
    }

    palette
}

// ── Typography ─────────────────────────────────────────────────────────────

static RE_FONT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i:\b(?:font|typeface|typography))(?:\s*:\s*|\s*-\s*|\n+)([^.,;:\n]+)")
        .expect("valid font regex")
});
static RE_HEADING_FONT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i:\b(?:heading|header|title|h1|h2|h3)(?:\s+(?:font|typeface))?)(?:\s*:\s*|\s*-\s*|\n+)([^.,;:\n]+)",
    )
    .expect("valid heading regex")
});
static RE_BODY_FONT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i:\b(?:body|paragraph|text|content)(?:\s+(?:font|typeface))?)(?:\s*:\s*|\s*-\s*|\n+)([^.,;:\n]+)",
    )
    .expect("valid body regex")
});

fn font_names<'t>(re: &'t Regex, text: &'t str) -> impl Iterator<Item = &'t str> + 't {
    re.captures_iter(text)
        .filter_map(|caps| caps.get(1).map(|m| m.as_str().trim()))
        .filter(|name| !name.is_empty() && name.chars().count() < MAX_FONT_NAME_CHARS)
}

/// Font roles: `primary` / `secondary` from generic font mentions, `heading` and `body`
/// from their own anchors (first valid match each).
pub fn extract_typography(text: &str) -> BTreeMap<String, String> {
    let mut typography = BTreeMap::new();

    let mut generic = Vec::new();
    for name in font_names(&RE_FONT, text) {
        if !generic.contains(&name) {
            generic.push(name);
        }
        if generic.len() == 2 {
            break;
        }
    }
    for (role, name) in ["primary", "secondary"].iter().zip(generic) {
        typography.insert(role.to_string(), name.to_string());
    }

    if let Some(name) = font_names(&RE_HEADING_FONT, text).next() {
        typography.insert("heading".to_string(), name.to_string());
    }
    if let Some(name) = font_names(&RE_BODY_FONT, text).next() {
        typography.insert("body".to_string(), name.to_string());
    }

    typography
}
