//! Text and HTML extractors.

use crate::error::ExtractionFailure;
use crate::render::to_plain_text;

use super::TextExtractor;

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

fn decode_utf8(bytes: &[u8]) -> Result<&str, ExtractionFailure> {
    let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
    std::str::from_utf8(bytes).map_err(|e| {
        ExtractionFailure::Corrupted(format!("not valid UTF-8 at byte {}", e.valid_up_to()))
    })
}

/// Extractor for UTF-8 plain text.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainTextExtractor;

impl PlainTextExtractor {
    /// Create a new plain-text extractor.
    pub fn new() -> Self {
        Self
    }
}

impl TextExtractor for PlainTextExtractor {
    fn name(&self) -> &str {
        "text"
    }

    fn supported_extensions(&self) -> &[&str] {
        &["txt", "text", "md"]
    }

    fn extract(&self, bytes: &[u8]) -> Result<String, ExtractionFailure> {
        decode_utf8(bytes).map(str::to_string)
    }
}

/// Extractor for HTML, projected through [`to_plain_text`].
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlExtractor;

impl HtmlExtractor {
    /// Create a new HTML extractor.
    pub fn new() -> Self {
        Self
    }
}

impl TextExtractor for HtmlExtractor {
    fn name(&self) -> &str {
        "html"
    }

    fn supported_extensions(&self) -> &[&str] {
        &["html", "htm"]
    }

    fn extract(&self, bytes: &[u8]) -> Result<String, ExtractionFailure> {
        decode_utf8(bytes).map(to_plain_text)
    }
}
