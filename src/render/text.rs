//! Plain text projections.

use regex::Regex;
use std::sync::LazyLock;

use crate::error::Result;
use crate::model::DocumentModel;
use crate::parser::{decode_entities, strip_non_content, strip_tags};

use super::{CleanupPipeline, RenderOptions};

static SINGLE_BREAK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)</li\s*>|<br\s*/?\s*>").unwrap());

static DOUBLE_BREAK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)</(?:p|div|h[1-6])\s*>").unwrap());

static EXCESS_NEWLINES_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n{3,}").unwrap());

/// Project raw markup to plain text without building a model.
///
/// List-item ends and `<br>` become one newline; paragraph, div and
/// heading ends become two. Remaining tags are stripped, entities decoded,
/// three or more newlines collapsed to two, and the result trimmed.
/// Script and style content never survives.
pub fn to_plain_text(markup: &str) -> String {
    let text = strip_non_content(markup);
    let text = SINGLE_BREAK_RE.replace_all(&text, "\n");
    let text = DOUBLE_BREAK_RE.replace_all(&text, "\n\n");
    let text = strip_tags(&text);
    let text = decode_entities(&text);
    EXCESS_NEWLINES_RE
        .replace_all(&text, "\n\n")
        .trim()
        .to_string()
}

/// Convert a document model to plain text.
pub fn to_text(model: &DocumentModel, options: &RenderOptions) -> Result<String> {
    let mut output = model.plain_text_with_heading(&options.signature_heading);

    if let Some(ref cleanup_options) = options.cleanup {
        let pipeline = CleanupPipeline::new(cleanup_options.clone());
        output = pipeline.process(&output);
    }

    Ok(output.trim().to_string())
}
