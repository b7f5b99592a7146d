//! Document-level types.

use super::{Block, SignatureEntry};
use crate::error::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Document metadata, fixed for the lifetime of one conversion.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentMetadata {
    /// Document title
    pub title: String,

    /// Document author
    #[serde(default)]
    pub author: Option<String>,

    /// Creation date
    #[serde(default)]
    pub created_at: DateTime<Utc>,

    /// Last modification date
    #[serde(default)]
    pub updated_at: DateTime<Utc>,
}

impl DocumentMetadata {
    /// Create metadata with a title; timestamps default to the Unix epoch.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }

    /// Set the author.
    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = Some(author.into());
        self
    }

    /// Set creation and modification time to the same instant.
    pub fn with_timestamps(mut self, created_at: DateTime<Utc>, updated_at: DateTime<Utc>) -> Self {
        self.created_at = created_at;
        self.updated_at = updated_at;
        self
    }

    /// Title with surrounding whitespace removed; "Untitled" when blank.
    pub fn display_title(&self) -> &str {
        let title = self.title.trim();
        if title.is_empty() {
            "Untitled"
        } else {
            title
        }
    }
}

/// A fully assembled document, built once and consumed by one renderer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DocumentModel {
    metadata: DocumentMetadata,
    blocks: Vec<Block>,
    signatures: Vec<SignatureEntry>,
}

impl DocumentModel {
    /// Document metadata.
    pub fn metadata(&self) -> &DocumentMetadata {
        &self.metadata
    }

    /// Body blocks in document order.
    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    /// Signature entries in input order.
    pub fn signatures(&self) -> &[SignatureEntry] {
        &self.signatures
    }

    /// Check if the body has no blocks.
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Get the number of body blocks.
    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    /// Plain text of the whole document, title and signatures included.
    ///
    /// List items are separated by single newlines and prefixed with a
    /// bullet or their number; everything else by blank lines.
    pub fn plain_text(&self) -> String {
        self.plain_text_with_heading(DEFAULT_SIGNATURE_HEADING)
    }

    /// [`plain_text`](Self::plain_text) with a custom signature section heading.
    ///
    /// An image between list items stays inside the list, so numbering
    /// continues after it.
    pub fn plain_text_with_heading(&self, signature_heading: &str) -> String {
        let mut out = String::new();
        out.push_str(self.metadata.display_title());

        let mut ordinal = 0u32;
        let mut prev_list = false;
        let mut prev_ordered = false;
        for block in &self.blocks {
            let text = match block {
                Block::ListItem { ordered, .. } => {
                    ordinal = if *ordered && prev_ordered { ordinal + 1 } else { 1 };
                    if *ordered {
                        format!("{}. {}", ordinal, block.plain_text())
                    } else {
                        format!("• {}", block.plain_text())
                    }
                }
                Block::Image { alt_text, .. } => {
                    out.push_str(if prev_list { "\n" } else { "\n\n" });
                    out.push_str(&format!("[Image: {}]", alt_text));
                    continue;
                }
                Block::Break => {
                    prev_list = false;
                    prev_ordered = false;
                    continue;
                }
                _ => block.plain_text(),
            };
            let is_list = block.is_list_item();
            out.push_str(if is_list && prev_list { "\n" } else { "\n\n" });
            out.push_str(&text);
            prev_list = is_list;
            prev_ordered = matches!(block, Block::ListItem { ordered: true, .. });
        }

        if !self.signatures.is_empty() {
            out.push_str("\n\n");
            out.push_str(signature_heading);
            for entry in &self.signatures {
                out.push_str("\n\n____________________\n");
                out.push_str(entry.signer_name.trim());
                if let Some(role) = entry.role() {
                    out.push('\n');
                    out.push_str(role);
                }
                if let Some(date) = entry.signed_date_label() {
                    out.push('\n');
                    out.push_str(&date);
                }
            }
        }

        out
    }
}

/// Heading above the signature entries unless configured otherwise.
pub const DEFAULT_SIGNATURE_HEADING: &str = "Signatures";

/// Assembles a [`DocumentModel`], enforcing the model invariants.
///
/// Blank runs are dropped, and blocks left with no content are dropped with
/// them. Signature entries keep their order.
#[derive(Debug, Clone, Default)]
pub struct ModelBuilder {
    metadata: DocumentMetadata,
    blocks: Vec<Block>,
    signatures: Vec<SignatureEntry>,
}

impl ModelBuilder {
    /// Start a model with the given metadata.
    pub fn new(metadata: DocumentMetadata) -> Self {
        Self {
            metadata,
            blocks: Vec::new(),
            signatures: Vec::new(),
        }
    }

    /// Add a block, dropping it if it carries no content.
    pub fn push_block(&mut self, mut block: Block) {
        block.retain_content();
        if block.is_empty() {
            log::debug!("Dropping empty block: {:?}", block);
            return;
        }
        self.blocks.push(block);
    }

    /// Add several blocks in order.
    pub fn with_blocks(mut self, blocks: impl IntoIterator<Item = Block>) -> Self {
        for block in blocks {
            self.push_block(block);
        }
        self
    }

    /// Add a signature entry.
    pub fn push_signature(&mut self, entry: SignatureEntry) {
        self.signatures.push(entry);
    }

    /// Add several signature entries in order.
    pub fn with_signatures(mut self, entries: impl IntoIterator<Item = SignatureEntry>) -> Self {
        self.signatures.extend(entries);
        self
    }

    /// Finish the model.
    pub fn build(self) -> Result<DocumentModel> {
        for entry in &self.signatures {
            entry.validate()?;
        }
        Ok(DocumentModel {
            metadata: self.metadata,
            blocks: self.blocks,
            signatures: self.signatures,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ImageSource, TextRun};
    use chrono::TimeZone;

    #[test]
    fn test_builder_drops_empty_blocks() {
        let model = ModelBuilder::new(DocumentMetadata::new("Doc"))
            .with_blocks(vec![
                Block::text("Kept"),
                Block::paragraph(vec![TextRun::new("   ")]),
                Block::heading(1, vec![]),
            ])
            .build()
            .unwrap();
        assert_eq!(model.block_count(), 1);
        assert_eq!(model.blocks()[0].plain_text(), "Kept");
    }

    #[test]
    fn test_builder_rejects_unnamed_signer() {
        let entry = SignatureEntry {
            signer_name: String::new(),
            signer_role: None,
            signed_at: None,
            signature_image: None,
        };
        let result = ModelBuilder::new(DocumentMetadata::new("Doc"))
            .with_signatures(vec![entry])
            .build();
        assert!(result.is_err());
    }

    #[test]
    fn test_plain_text_lists_and_signatures() {
        let signed = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let model = ModelBuilder::new(DocumentMetadata::new("Lease"))
            .with_blocks(vec![
                Block::heading(1, vec![TextRun::new("Terms")]),
                Block::list_item(true, vec![TextRun::new("Rent")]),
                Block::list_item(true, vec![TextRun::new("Deposit")]),
                Block::list_item(false, vec![TextRun::new("Pets")]),
            ])
            .with_signatures(vec![SignatureEntry::new("Jane Doe")
                .unwrap()
                .with_role("Landlord")
                .signed_at(signed)])
            .build()
            .unwrap();

        let text = model.plain_text();
        assert!(text.starts_with("Lease\n\nTerms\n\n1. Rent\n2. Deposit\n• Pets"));
        assert!(text.ends_with("Jane Doe\nLandlord\nJanuary 1, 2024"));
    }

    #[test]
    fn test_plain_text_image_keeps_list_numbering() {
        let model = ModelBuilder::new(DocumentMetadata::new("T"))
            .with_blocks(vec![
                Block::list_item(true, vec![TextRun::new("One")]),
                Block::list_item(true, vec![TextRun::new("Two")]),
                Block::Image {
                    src: ImageSource::from("https://example.com/seal.png"),
                    alt_text: "Seal".to_string(),
                },
                Block::list_item(true, vec![TextRun::new("Three")]),
            ])
            .build()
            .unwrap();
        assert_eq!(model.plain_text(), "T\n\n1. One\n2. Two\n[Image: Seal]\n3. Three");
    }

    #[test]
    fn test_plain_text_custom_signature_heading() {
        let model = ModelBuilder::new(DocumentMetadata::new("Deed"))
            .with_signatures(vec![SignatureEntry::new("Jane Doe").unwrap()])
            .build()
            .unwrap();
        assert_eq!(
            model.plain_text_with_heading("Executed by"),
            "Deed\n\nExecuted by\n\n____________________\nJane Doe"
        );
    }

    #[test]
    fn test_display_title_fallback() {
        assert_eq!(DocumentMetadata::new("  ").display_title(), "Untitled");
        assert_eq!(DocumentMetadata::new(" NDA ").display_title(), "NDA");
    }
}
