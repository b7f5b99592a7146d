//! # lexdoc
//!
//! Rich-text markup to DOCX conversion engine for legal documents.
//!
//! Editor markup is sanitized, split into blocks, reduced to formatted
//! runs and assembled into an immutable [`DocumentModel`], which is then
//! packaged as a DOCX file with a title, header, footer and signature
//! section. Plain-text, HTML and JSON projections and a reverse
//! upload → text path are provided alongside.
//!
//! ## Quick Start
//!
//! ```no_run
//! use lexdoc::{html_to_docx, DocumentMetadata, SignatureEntry};
//!
//! fn main() -> lexdoc::Result<()> {
//!     let signatures = vec![SignatureEntry::new("Jane Doe")?.with_role("CEO")];
//!     let docx = html_to_docx(
//!         "<h1>Agreement</h1><p>This is <strong>binding</strong>.</p>",
//!         DocumentMetadata::new("Services Agreement"),
//!         signatures,
//!     )?;
//!     std::fs::write("agreement.docx", docx)?;
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Graceful parsing**: malformed or unterminated markup never fails a conversion
//! - **Deterministic output**: identical input yields byte-identical packages
//! - **Signature blocks**: image, rule, name, role and date per signer
//! - **Bounded execution**: size limits, cancellation, timeouts and a worker pool
//! - **Classified extraction**: encrypted, corrupted, unsupported and too-short uploads
//! - **Async**: `convert_async` behind the `async` feature

pub mod convert;
pub mod detect;
pub mod error;
pub mod extract;
pub mod model;
pub mod parser;
pub mod render;

// Re-export commonly used types
pub use convert::{
    convert, Artifact, ArtifactKind, CancellationToken, ConversionPool, ConversionRequest,
    ConvertOptions, FallbackPolicy,
};
pub use detect::{detect_format_from_bytes, detect_format_from_path, SourceFormat};
pub use error::{Error, ExtractionFailure, Result, Stage};
pub use extract::{
    extract_bytes, extract_file, ExtractOptions, ExtractedText, ExtractorRegistry, TextExtractor,
};
pub use model::{
    Block, DocumentMetadata, DocumentModel, ImageSource, ModelBuilder, SignatureEntry, TextRun,
    TextStyle,
};
pub use parser::{HeadingClassifier, HeadingDetection, MarkupParser, ParseOptions};
pub use render::{
    to_html, to_plain_text, CleanupOptions, CleanupPipeline, CleanupPreset, Compression,
    ConversionStats, JsonFormat, RenderOptions,
};

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

/// Parse markup into a document model with default options.
///
/// # Example
///
/// ```
/// use lexdoc::{parse_markup, Block, DocumentMetadata};
///
/// let model = parse_markup("<h1>Agreement</h1><p>Hello</p>", DocumentMetadata::new("Doc")).unwrap();
/// assert!(matches!(model.blocks()[0], Block::Heading { level: 1, .. }));
/// ```
pub fn parse_markup(markup: &str, metadata: DocumentMetadata) -> Result<DocumentModel> {
    MarkupParser::new().parse(markup, metadata, Vec::new())
}

/// Convert markup straight to DOCX bytes with default options.
pub fn html_to_docx(
    markup: &str,
    metadata: DocumentMetadata,
    signatures: Vec<SignatureEntry>,
) -> Result<Vec<u8>> {
    let model = MarkupParser::new().parse(markup, metadata, signatures)?;
    render::to_docx(&model, &RenderOptions::default())
}

/// Convert markup to the model's plain text, title and signatures included.
///
/// Unlike [`to_plain_text`], this goes through the full model, so list
/// numbering and the signature section appear in the output.
pub fn markup_to_text(markup: &str, metadata: DocumentMetadata) -> Result<String> {
    let model = parse_markup(markup, metadata)?;
    render::to_text(&model, &RenderOptions::default())
}

/// Extract normalized text from an uploaded file.
///
/// # Example
///
/// ```no_run
/// let text = lexdoc::extract_text("contract.docx").unwrap();
/// println!("{}", text);
/// ```
pub fn extract_text<P: AsRef<Path>>(path: P) -> Result<String> {
    extract_file(path, &ExtractOptions::default()).map(|extracted| extracted.text)
}

/// Builder for parsing and converting markup.
///
/// # Example
///
/// ```no_run
/// use lexdoc::{DocumentMetadata, FallbackPolicy, Lexdoc};
///
/// let artifact = Lexdoc::new()
///     .heuristic_headings()
///     .with_signature_heading("Executed by")
///     .with_fallback(FallbackPolicy::PlainText)
///     .parse("<p>Recitals</p><p>The parties agree as follows.</p>", DocumentMetadata::new("Deed"))?
///     .to_artifact()?;
/// # Ok::<(), lexdoc::Error>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct Lexdoc {
    options: ConvertOptions,
    signatures: Vec<SignatureEntry>,
}

impl Lexdoc {
    /// Create a new builder with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Infer headings from short untagged lines.
    pub fn heuristic_headings(mut self) -> Self {
        self.options.parse = self.options.parse.heuristic_headings();
        self
    }

    /// Use a custom heading classifier.
    pub fn with_classifier(mut self, classifier: Arc<dyn HeadingClassifier>) -> Self {
        self.options.parse = self.options.parse.with_classifier(classifier);
        self
    }

    /// Set the input size limit in bytes (0 = unlimited).
    pub fn with_max_input_bytes(mut self, bytes: usize) -> Self {
        self.options.parse = self.options.parse.with_max_input_bytes(bytes);
        self
    }

    /// Set the heading above the signature section.
    pub fn with_signature_heading(mut self, heading: impl Into<String>) -> Self {
        self.options.render = self.options.render.with_signature_heading(heading);
        self
    }

    /// Enable or disable image embedding.
    pub fn with_images(mut self, embed: bool) -> Self {
        self.options.render = self.options.render.with_images(embed);
        self
    }

    /// Set cleanup preset for plain-text output.
    pub fn with_cleanup(mut self, preset: CleanupPreset) -> Self {
        self.options.render = self.options.render.with_cleanup_preset(preset);
        self
    }

    /// Set the JSON output format.
    pub fn with_json_format(mut self, format: JsonFormat) -> Self {
        self.options.render = self.options.render.with_json_format(format);
        self
    }

    /// Set the fallback policy.
    pub fn with_fallback(mut self, policy: FallbackPolicy) -> Self {
        self.options.fallback = policy;
        self
    }

    /// Set the timeout used by [`Lexdoc::into_pool`].
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.options.timeout = Some(timeout);
        self
    }

    /// Add a signature entry.
    pub fn with_signature(mut self, entry: SignatureEntry) -> Self {
        self.signatures.push(entry);
        self
    }

    /// Get the conversion options.
    pub fn options(&self) -> &ConvertOptions {
        &self.options
    }

    /// Parse markup and return a result wrapper.
    pub fn parse(self, markup: &str, metadata: DocumentMetadata) -> Result<LexdocResult> {
        let document = MarkupParser::with_options(self.options.parse.clone()).parse(
            markup,
            metadata,
            self.signatures,
        )?;
        Ok(LexdocResult {
            document,
            options: self.options,
        })
    }

    /// Build a worker pool with these options.
    pub fn into_pool(self, threads: usize) -> Result<ConversionPool> {
        ConversionPool::new(threads, self.options)
    }
}

/// Result of parsing markup.
pub struct LexdocResult {
    /// The parsed document
    pub document: DocumentModel,
    options: ConvertOptions,
}

impl LexdocResult {
    /// Convert to DOCX bytes.
    pub fn to_docx(&self) -> Result<Vec<u8>> {
        render::to_docx(&self.document, &self.options.render)
    }

    /// Convert to a downloadable artifact, applying the fallback policy.
    pub fn to_artifact(&self) -> Result<Artifact> {
        convert::render_model(&self.document, &self.options, &CancellationToken::new())
    }

    /// Convert to plain text, with cleanup if configured.
    pub fn to_text(&self) -> Result<String> {
        render::to_text(&self.document, &self.options.render)
    }

    /// Convert to JSON in the configured format.
    pub fn to_json(&self) -> Result<String> {
        render::to_json(&self.document, self.options.render.json_format)
    }

    /// Get plain text without cleanup.
    pub fn plain_text(&self) -> String {
        self.document.plain_text()
    }

    /// Get the document.
    pub fn document(&self) -> &DocumentModel {
        &self.document
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lexdoc_builder() {
        let builder = Lexdoc::new()
            .heuristic_headings()
            .with_max_input_bytes(1024)
            .with_signature_heading("Executed by")
            .with_fallback(FallbackPolicy::PlainText)
            .with_timeout(Duration::from_secs(2));

        assert!(matches!(
            builder.options().parse.heading_detection,
            HeadingDetection::Heuristic { .. }
        ));
        assert_eq!(builder.options().parse.max_input_bytes, 1024);
        assert_eq!(builder.options().render.signature_heading, "Executed by");
        assert_eq!(builder.options().fallback, FallbackPolicy::PlainText);
        assert_eq!(builder.options().timeout, Some(Duration::from_secs(2)));
    }

    #[test]
    fn test_lexdoc_builder_default() {
        let builder = Lexdoc::default();
        assert!(matches!(
            builder.options().parse.heading_detection,
            HeadingDetection::TagsOnly
        ));
        assert!(builder.options().render.embed_images);
    }

    #[test]
    fn test_parse_and_project() {
        let result = Lexdoc::new()
            .with_signature(SignatureEntry::new("Jane Doe").unwrap().with_role("CEO"))
            .parse("<p>Hello</p>", DocumentMetadata::new("Memo"))
            .unwrap();

        assert_eq!(result.document().block_count(), 1);
        assert_eq!(
            result.plain_text(),
            "Memo\n\nHello\n\nSignatures\n\n____________________\nJane Doe\nCEO"
        );
        let artifact = result.to_artifact().unwrap();
        assert_eq!(artifact.kind, ArtifactKind::Docx);
        assert_eq!(artifact.stats.signature_count, 1);
    }

    #[test]
    fn test_json_format_through_builder() {
        let result = Lexdoc::new()
            .with_json_format(JsonFormat::Compact)
            .parse("<p>Hello</p>", DocumentMetadata::new("Memo"))
            .unwrap();
        let json = result.to_json().unwrap();
        assert!(!json.contains('\n'));
        assert!(json.contains("\"Hello\""));
    }

    #[test]
    fn test_heuristic_headings_through_builder() {
        let result = Lexdoc::new()
            .heuristic_headings()
            .parse(
                "<p>Recitals</p><p>The parties agree as follows.</p>",
                DocumentMetadata::new("Deed"),
            )
            .unwrap();
        let blocks = result.document().blocks();
        assert!(matches!(blocks[0], Block::Heading { level: 2, .. }));
        assert!(matches!(blocks[1], Block::Paragraph { .. }));
    }

    #[test]
    fn test_input_limit_through_builder() {
        let result = Lexdoc::new()
            .with_max_input_bytes(8)
            .parse("<p>Too long for the limit</p>", DocumentMetadata::new("Doc"));
        assert!(matches!(result, Err(Error::InputTooLarge { limit: 8, .. })));
    }

    #[test]
    fn test_html_to_docx_is_zip() {
        let bytes = html_to_docx("<p>Hi</p>", DocumentMetadata::new("Doc"), Vec::new()).unwrap();
        assert!(bytes.starts_with(b"PK"));
    }

    #[test]
    fn test_markup_to_text_numbers_lists() {
        let text = markup_to_text(
            "<ol><li>First</li><li>Second</li></ol>",
            DocumentMetadata::new("List"),
        )
        .unwrap();
        assert_eq!(text, "List\n\n1. First\n2. Second");
    }

    #[test]
    fn test_detect_format_empty_data() {
        assert!(matches!(detect_format_from_bytes(&[]), Err(Error::UnknownFormat)));
    }
}
