//! Document bytes → bounded plain text.
//!
//! Extraction is best-effort: callers either degrade on `ExtractError` or feed an empty
//! string forward. Nothing here panics on malformed input it can detect.

use std::sync::LazyLock;

use bytes::Bytes;
use quick_xml::escape::{resolve_html5_entity, unescape_with};
use regex::{Captures, Regex};
use thiserror::Error;

/// Cap for heuristic field extraction.
pub const MAX_FIELD_TEXT_CHARS: usize = 50_000;
/// Cap for text sent to the model.
pub const MAX_ANALYSIS_TEXT_CHARS: usize = 12_000;

pub const MIME_PDF: &str = "application/pdf";
pub const MIME_HTML: &str = "text/html";
pub const MIME_PLAIN: &str = "text/plain";
pub const MIME_MARKDOWN: &str = "text/markdown";

pub const SUPPORTED_CONTENT_TYPES: &[&str] = &[MIME_PDF, MIME_HTML, MIME_PLAIN, MIME_MARKDOWN];

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("unsupported content-type: {0}")]
    UnsupportedContentType(String),

    #[error("PDF extraction failed: {0}")]
    Pdf(String),
}

/// A document as received from the upload layer.
#[derive(Debug, Clone)]
pub struct UploadedDocument {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Bytes,
}

/// Raw document text, capped at construction and immutable afterwards.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocumentText(String);

impl DocumentText {
    /// Keeps line structure; capped at `MAX_FIELD_TEXT_CHARS`.
    pub fn for_fields(raw: &str) -> Self {
        Self(truncate_chars(raw, MAX_FIELD_TEXT_CHARS))
    }

    /// Collapses whitespace runs to single spaces; capped at `MAX_ANALYSIS_TEXT_CHARS`.
    pub fn for_analysis(raw: &str) -> Self {
        Self(truncate_chars(&normalize_whitespace(raw), MAX_ANALYSIS_TEXT_CHARS))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// `"Text/HTML; charset=utf-8"` → `"text/html"`.
fn base_content_type(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}

pub fn is_supported_content_type(content_type: &str) -> bool {
    SUPPORTED_CONTENT_TYPES.contains(&base_content_type(content_type).as_str())
}

/// Fallback when an upload part carries no content-type header.
pub fn content_type_from_file_name(file_name: &str) -> Option<&'static str> {
    let extension = file_name.rsplit_once('.')?.1.to_ascii_lowercase();
    match extension.as_str() {
        "pdf" => Some(MIME_PDF),
        "html" | "htm" => Some(MIME_HTML),
        "txt" => Some(MIME_PLAIN),
        "md" | "markdown" => Some(MIME_MARKDOWN),
        _ => None,
    }
}

/// Extracts plain UTF-8 text from document bytes based on the declared MIME type.
pub fn extract_text(bytes: &[u8], content_type: &str) -> Result<String, ExtractError> {
    let content_type = base_content_type(content_type);

    if content_type.contains("pdf") {
        pdf_extract::extract_text_from_mem(bytes).map_err(|e| ExtractError::Pdf(e.to_string()))
    } else if content_type.contains("html") {
        Ok(html_to_text(&String::from_utf8_lossy(bytes)))
    } else if content_type.starts_with("text/") {
        Ok(String::from_utf8_lossy(bytes).into_owned())
    } else {
        Err(ExtractError::UnsupportedContentType(content_type))
    }
}

static RE_BODY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<body[^>]*>(.*)</body>").expect("valid body regex"));
static RE_NON_TEXT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<(script|style|noscript)[^>]*>.*?</(script|style|noscript)>")
        .expect("valid script regex")
});
static RE_BLOCK_END: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)<br\s*/?>|</(p|div|li|h[1-6]|tr|section|article|ul|ol)>")
        .expect("valid block regex")
});
static RE_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]+>").expect("valid tag regex"));

/// Visible text of an HTML page's body, with block elements turned into line breaks.
pub fn html_to_text(html: &str) -> String {
    let body = RE_BODY
        .captures(html)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
        .unwrap_or(html);
    let text = RE_NON_TEXT.replace_all(body, "");
    let text = RE_BLOCK_END.replace_all(&text, "\n");
    let text = RE_TAG.replace_all(&text, "");
    decode_entities(&text)
        .lines()
        .map(str::trim)
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}

static RE_ENTITY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"&#?[A-Za-z0-9]+;").expect("valid entity regex"));

/// Named (HTML5) and numeric character references. Unknown references stay verbatim.
fn decode_entities(text: &str) -> String {
    RE_ENTITY
        .replace_all(text, |caps: &Captures<'_>| {
            let raw = &caps[0];
            match unescape_with(raw, resolve_html5_entity) {
                Ok(decoded) => decoded.into_owned(),
                Err(_) => raw.to_string(),
            }
        })
        .into_owned()
}

pub fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text.to_string(),
    }
}

pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
