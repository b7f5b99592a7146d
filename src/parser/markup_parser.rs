//! Markup to document model.

use std::time::Instant;

use crate::convert::CancellationToken;
use crate::error::{Error, Result, Stage};
use crate::model::{Block, DocumentMetadata, DocumentModel, ImageSource, ModelBuilder, SignatureEntry};

use super::inline::extract_runs;
use super::options::ParseOptions;
use super::sanitize::strip_non_content;
use super::segment::{segment, RawBlock, SpanKind};

/// Parser for rich-text editor markup.
///
/// Stateless apart from its options; one parser can serve any number of
/// documents, including from several threads at once.
#[derive(Debug, Clone, Default)]
pub struct MarkupParser {
    options: ParseOptions,
}

impl MarkupParser {
    /// Create a parser with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a parser with custom options.
    pub fn with_options(options: ParseOptions) -> Self {
        Self { options }
    }

    /// Get the parse options.
    pub fn options(&self) -> &ParseOptions {
        &self.options
    }

    /// Parse markup into body blocks.
    pub fn parse_blocks(&self, markup: &str) -> Result<Vec<Block>> {
        self.parse_blocks_with_cancel(markup, &CancellationToken::new())
    }

    /// Parse markup into body blocks, observing a cancellation token.
    pub fn parse_blocks_with_cancel(
        &self,
        markup: &str,
        cancel: &CancellationToken,
    ) -> Result<Vec<Block>> {
        let limit = self.options.max_input_bytes;
        if limit > 0 && markup.len() > limit {
            return Err(Error::InputTooLarge {
                size: markup.len(),
                limit,
            });
        }

        cancel.check(Stage::Sanitize)?;
        let start = Instant::now();
        let clean = strip_non_content(markup);
        log::debug!(
            "Sanitized {} -> {} bytes in {:?}",
            markup.len(),
            clean.len(),
            start.elapsed()
        );

        cancel.check(Stage::Segment)?;
        let start = Instant::now();
        let spans = segment(&clean);
        log::debug!("Segmented {} spans in {:?}", spans.len(), start.elapsed());

        let start = Instant::now();
        let mut blocks = Vec::with_capacity(spans.len());
        for span in spans {
            cancel.check(Stage::Extract)?;
            if let Some(block) = self.to_block(span) {
                blocks.push(block);
            }
        }
        log::debug!("Extracted {} blocks in {:?}", blocks.len(), start.elapsed());

        Ok(blocks)
    }

    /// Parse markup into a complete document model.
    pub fn parse(
        &self,
        markup: &str,
        metadata: DocumentMetadata,
        signatures: Vec<SignatureEntry>,
    ) -> Result<DocumentModel> {
        self.parse_with_cancel(markup, metadata, signatures, &CancellationToken::new())
    }

    /// Parse markup into a complete document model, observing a cancellation token.
    pub fn parse_with_cancel(
        &self,
        markup: &str,
        metadata: DocumentMetadata,
        signatures: Vec<SignatureEntry>,
        cancel: &CancellationToken,
    ) -> Result<DocumentModel> {
        let blocks = self.parse_blocks_with_cancel(markup, cancel)?;
        cancel.check(Stage::Build)?;
        ModelBuilder::new(metadata)
            .with_blocks(blocks)
            .with_signatures(signatures)
            .build()
    }

    fn to_block(&self, span: RawBlock<'_>) -> Option<Block> {
        let (kind, markup) = match span {
            RawBlock::Image { src, alt } => {
                return Some(Block::Image {
                    src: ImageSource::Uri(src),
                    alt_text: alt,
                });
            }
            RawBlock::Break => return Some(Block::Break),
            RawBlock::Text { kind, markup } => (kind, markup),
        };

        let runs = extract_runs(markup);
        if runs.is_empty() {
            return None;
        }

        let block = match kind {
            SpanKind::Heading(level) => Block::heading(level, runs),
            SpanKind::ListItem { ordered } => Block::list_item(ordered, runs),
            SpanKind::Paragraph | SpanKind::Text => {
                let text: String = runs.iter().map(|r| r.text.as_str()).collect();
                match self.options.heading_detection.classify(&text) {
                    Some(guess) if guess.confidence >= self.options.min_heading_confidence => {
                        log::debug!(
                            "Inferred level {} heading ({:.2}): {:?}",
                            guess.level,
                            guess.confidence,
                            text
                        );
                        Block::heading(guess.level.clamp(1, 6), runs)
                    }
                    _ => Block::paragraph(runs),
                }
            }
        };
        Some(block)
    }
}
