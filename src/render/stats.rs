//! Conversion statistics.

use crate::model::{Block, DocumentModel};
use serde::{Deserialize, Serialize};

/// Counters collected while rendering one document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionStats {
    /// Number of headings rendered
    pub heading_count: u32,

    /// Number of paragraphs rendered
    pub paragraph_count: u32,

    /// Number of list items rendered
    pub list_item_count: u32,

    /// Number of images embedded
    pub images_embedded: u32,

    /// Number of images replaced by a placeholder
    pub images_dropped: u32,

    /// Number of page breaks
    pub break_count: u32,

    /// Number of signature entries rendered
    pub signature_count: u32,

    /// Approximate word count (whitespace-separated tokens)
    pub word_count: u32,

    /// Character count (excluding whitespace)
    pub char_count: u32,
}

impl ConversionStats {
    /// Create new empty statistics.
    pub fn new() -> Self {
        Self::default()
    }

    /// Count the blocks and text of a model. Image counters are left for
    /// the renderer, which is the only one that knows whether they decoded.
    pub fn from_model(model: &DocumentModel) -> Self {
        let mut stats = Self::new();
        for block in model.blocks() {
            stats.add_block(block);
        }
        stats.signature_count = model.signatures().len() as u32;
        stats
    }

    /// Count one block.
    pub fn add_block(&mut self, block: &Block) {
        match block {
            Block::Heading { .. } => self.heading_count += 1,
            Block::Paragraph { .. } => self.paragraph_count += 1,
            Block::ListItem { .. } => self.list_item_count += 1,
            Block::Break => self.break_count += 1,
            Block::Image { .. } => {}
        }
        self.count_text(&block.plain_text());
    }

    /// Record an embedded image.
    pub fn add_embedded_image(&mut self) {
        self.images_embedded += 1;
    }

    /// Record an image that could not be embedded.
    pub fn add_dropped_image(&mut self) {
        self.images_dropped += 1;
    }

    /// Add word and character counts from text.
    pub fn count_text(&mut self, text: &str) {
        self.word_count += text.split_whitespace().count() as u32;
        self.char_count += text.chars().filter(|c| !c.is_whitespace()).count() as u32;
    }

    /// Merge another stats instance into this one.
    pub fn merge(&mut self, other: &ConversionStats) {
        self.heading_count += other.heading_count;
        self.paragraph_count += other.paragraph_count;
        self.list_item_count += other.list_item_count;
        self.images_embedded += other.images_embedded;
        self.images_dropped += other.images_dropped;
        self.break_count += other.break_count;
        self.signature_count += other.signature_count;
        self.word_count += other.word_count;
        self.char_count += other.char_count;
    }
}
