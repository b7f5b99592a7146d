//! Conversion orchestration.
//!
//! Runs the full markup → model → DOCX pipeline for one request and wraps
//! the result in an [`Artifact`]. The pipeline itself is synchronous and
//! CPU-bound; [`ConversionPool`] and (with the `async` feature)
//! [`convert_async`] move it off the caller's thread and enforce a timeout.
//!
//! # Example
//!
//! ```no_run
//! use lexdoc::convert::{convert, ConvertOptions, FallbackPolicy};
//! use lexdoc::DocumentMetadata;
//!
//! fn main() -> lexdoc::Result<()> {
//!     let options = ConvertOptions::new().with_fallback(FallbackPolicy::PlainText);
//!     let artifact = convert(
//!         "<h1>Agreement</h1><p>This is <strong>binding</strong>.</p>",
//!         DocumentMetadata::new("Agreement"),
//!         Vec::new(),
//!         &options,
//!     )?;
//!     std::fs::write(artifact.file_name("agreement"), &artifact.bytes)?;
//!     Ok(())
//! }
//! ```

mod cancel;
mod pool;

pub use cancel::CancellationToken;
pub use pool::{ConversionPool, ConversionRequest};

use std::time::{Duration, Instant};

use crate::error::{Error, Result};
use crate::model::{DocumentMetadata, DocumentModel, SignatureEntry};
use crate::parser::{MarkupParser, ParseOptions};
use crate::render::{ConversionStats, DocxRenderer, RenderOptions, DOCX_EXTENSION, DOCX_MIME_TYPE};

/// MIME type of a fallback artifact.
pub const FALLBACK_MIME_TYPE: &str = "text/plain; charset=utf-8";

/// File extension of a fallback artifact.
pub const FALLBACK_EXTENSION: &str = "txt";

/// What to do when DOCX packaging fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FallbackPolicy {
    /// Return the serialization error
    #[default]
    Fail,

    /// Return the model's plain text instead, marked as a fallback
    PlainText,
}

/// Options for a conversion request.
#[derive(Debug, Clone, Default)]
pub struct ConvertOptions {
    /// Parsing options
    pub parse: ParseOptions,

    /// Rendering options
    pub render: RenderOptions,

    /// Wall-clock limit, enforced by [`ConversionPool`] and [`convert_async`]
    pub timeout: Option<Duration>,

    /// Behavior on serialization failure
    pub fallback: FallbackPolicy,
}

impl ConvertOptions {
    /// Create new conversion options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set parsing options.
    pub fn with_parse_options(mut self, options: ParseOptions) -> Self {
        self.parse = options;
        self
    }

    /// Set rendering options.
    pub fn with_render_options(mut self, options: RenderOptions) -> Self {
        self.render = options;
        self
    }

    /// Set the timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set the fallback policy.
    pub fn with_fallback(mut self, policy: FallbackPolicy) -> Self {
        self.fallback = policy;
        self
    }
}

/// Kind of artifact produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    /// Full-fidelity DOCX package
    Docx,

    /// Lower-fidelity plain-text substitute
    Fallback,
}

/// Result of a conversion, ready for download.
#[derive(Debug, Clone)]
pub struct Artifact {
    /// Artifact content
    pub bytes: Vec<u8>,

    /// Whether this is the primary artifact or a fallback
    pub kind: ArtifactKind,

    /// MIME type of the content
    pub mime_type: &'static str,

    /// File extension without the leading dot
    pub extension: &'static str,

    /// Rendering statistics
    pub stats: ConversionStats,
}

impl Artifact {
    fn docx(bytes: Vec<u8>, stats: ConversionStats) -> Self {
        Self {
            bytes,
            kind: ArtifactKind::Docx,
            mime_type: DOCX_MIME_TYPE,
            extension: DOCX_EXTENSION,
            stats,
        }
    }

    fn fallback(model: &DocumentModel, signature_heading: &str) -> Self {
        Self {
            bytes: model.plain_text_with_heading(signature_heading).into_bytes(),
            kind: ArtifactKind::Fallback,
            mime_type: FALLBACK_MIME_TYPE,
            extension: FALLBACK_EXTENSION,
            stats: ConversionStats::from_model(model),
        }
    }

    /// Check if this is a fallback artifact.
    pub fn is_fallback(&self) -> bool {
        self.kind == ArtifactKind::Fallback
    }

    /// Build a download file name from a stem.
    pub fn file_name(&self, stem: &str) -> String {
        format!("{}.{}", stem, self.extension)
    }

    /// Get content length in bytes.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Check if the artifact has no content.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Convert markup to a DOCX artifact on the current thread.
///
/// `options.timeout` is not enforced here; use [`ConversionPool`] or
/// [`convert_async`] for that.
pub fn convert(
    markup: &str,
    metadata: DocumentMetadata,
    signatures: Vec<SignatureEntry>,
    options: &ConvertOptions,
) -> Result<Artifact> {
    convert_with_cancel(markup, metadata, signatures, options, &CancellationToken::new())
}

/// Convert markup to a DOCX artifact, observing a cancellation token.
pub fn convert_with_cancel(
    markup: &str,
    metadata: DocumentMetadata,
    signatures: Vec<SignatureEntry>,
    options: &ConvertOptions,
    cancel: &CancellationToken,
) -> Result<Artifact> {
    let start = Instant::now();
    let model = MarkupParser::with_options(options.parse.clone()).parse_with_cancel(
        markup,
        metadata,
        signatures,
        cancel,
    )?;
    let artifact = render_model(&model, options, cancel)?;
    log::debug!(
        "Converted {} bytes of markup to {} bytes of {} in {:?}",
        markup.len(),
        artifact.len(),
        artifact.extension,
        start.elapsed()
    );
    Ok(artifact)
}

/// Serialize an already-built model, applying the fallback policy.
pub fn render_model(
    model: &DocumentModel,
    options: &ConvertOptions,
    cancel: &CancellationToken,
) -> Result<Artifact> {
    let rendered = DocxRenderer::new(options.render.clone()).render_with_stats(model, cancel);
    apply_fallback(model, options, rendered)
}

fn apply_fallback(
    model: &DocumentModel,
    options: &ConvertOptions,
    rendered: Result<(Vec<u8>, ConversionStats)>,
) -> Result<Artifact> {
    match rendered {
        Ok((bytes, stats)) => Ok(Artifact::docx(bytes, stats)),
        Err(Error::Serialization(reason)) if options.fallback == FallbackPolicy::PlainText => {
            log::warn!(
                "DOCX serialization failed ({}), returning plain-text fallback",
                reason
            );
            Ok(Artifact::fallback(model, &options.render.signature_heading))
        }
        Err(e) => Err(e),
    }
}

/// Convert markup on tokio's blocking pool, honoring `options.timeout`.
///
/// On timeout the conversion is cancelled at its next stage or block
/// boundary and [`Error::Timeout`] is returned; no partial output exists.
#[cfg(feature = "async")]
pub async fn convert_async(
    markup: String,
    metadata: DocumentMetadata,
    signatures: Vec<SignatureEntry>,
    options: ConvertOptions,
) -> Result<Artifact> {
    let cancel = CancellationToken::new();
    let worker_cancel = cancel.clone();
    let timeout = options.timeout;

    let task = tokio::task::spawn_blocking(move || {
        convert_with_cancel(&markup, metadata, signatures, &options, &worker_cancel)
    });

    let joined = match timeout {
        Some(limit) => match tokio::time::timeout(limit, task).await {
            Ok(joined) => joined,
            Err(_) => {
                cancel.cancel();
                log::warn!("Conversion exceeded {:?}, cancelled", limit);
                return Err(Error::Timeout(limit.as_millis()));
            }
        },
        None => task.await,
    };

    joined.map_err(|e| Error::Other(format!("Conversion task panicked: {}", e)))?
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Stage;
    use crate::model::{Block, ModelBuilder};

    #[test]
    fn test_convert_options_builder() {
        let options = ConvertOptions::new()
            .with_timeout(Duration::from_secs(5))
            .with_fallback(FallbackPolicy::PlainText)
            .with_parse_options(ParseOptions::new().heuristic_headings());

        assert_eq!(options.timeout, Some(Duration::from_secs(5)));
        assert_eq!(options.fallback, FallbackPolicy::PlainText);
        assert_eq!(ConvertOptions::default().fallback, FallbackPolicy::Fail);
    }

    #[test]
    fn test_convert_produces_docx() {
        let artifact = convert(
            "<h1>Agreement</h1><p>This is <strong>binding</strong>.</p>",
            DocumentMetadata::new("Agreement"),
            Vec::new(),
            &ConvertOptions::default(),
        )
        .unwrap();

        assert_eq!(artifact.kind, ArtifactKind::Docx);
        assert_eq!(artifact.mime_type, DOCX_MIME_TYPE);
        assert_eq!(artifact.file_name("agreement"), "agreement.docx");
        assert!(artifact.bytes.starts_with(b"PK\x03\x04"));
        assert_eq!(artifact.stats.heading_count, 1);
        assert_eq!(artifact.stats.paragraph_count, 1);
    }

    #[test]
    fn test_cancelled_before_start() {
        let cancel = CancellationToken::new();
        cancel.cancel();
        let result = convert_with_cancel(
            "<p>Hello</p>",
            DocumentMetadata::new("Doc"),
            Vec::new(),
            &ConvertOptions::default(),
            &cancel,
        );
        assert!(matches!(result, Err(Error::Cancelled(Stage::Sanitize))));
    }

    #[test]
    fn test_serialization_failure_without_fallback() {
        let model = ModelBuilder::new(DocumentMetadata::new("Doc")).build().unwrap();
        let result = apply_fallback(
            &model,
            &ConvertOptions::default(),
            Err(Error::Serialization("disk full".into())),
        );
        assert!(matches!(result, Err(Error::Serialization(_))));
    }

    #[test]
    fn test_serialization_failure_with_fallback() {
        let model = ModelBuilder::new(DocumentMetadata::new("Lease"))
            .with_blocks(vec![Block::text("Rent is due monthly.")])
            .build()
            .unwrap();
        let artifact = apply_fallback(
            &model,
            &ConvertOptions::new().with_fallback(FallbackPolicy::PlainText),
            Err(Error::Serialization("disk full".into())),
        )
        .unwrap();

        assert!(artifact.is_fallback());
        assert_eq!(artifact.mime_type, FALLBACK_MIME_TYPE);
        assert_eq!(artifact.file_name("lease"), "lease.txt");
        assert_eq!(
            String::from_utf8(artifact.bytes).unwrap(),
            "Lease\n\nRent is due monthly."
        );
        assert_eq!(artifact.stats.paragraph_count, 1);
    }

    #[test]
    fn test_fallback_uses_configured_signature_heading() {
        let model = ModelBuilder::new(DocumentMetadata::new("Deed"))
            .with_signatures(vec![SignatureEntry::new("Jane Doe").unwrap()])
            .build()
            .unwrap();
        let options = ConvertOptions::new()
            .with_fallback(FallbackPolicy::PlainText)
            .with_render_options(RenderOptions::new().with_signature_heading("Executed by"));
        let artifact = apply_fallback(
            &model,
            &options,
            Err(Error::Serialization("disk full".into())),
        )
        .unwrap();

        let text = String::from_utf8(artifact.bytes).unwrap();
        assert!(text.contains("\n\nExecuted by\n\n"));
        assert!(!text.contains("Signatures"));
    }

    #[test]
    fn test_fallback_does_not_mask_cancellation() {
        let model = ModelBuilder::new(DocumentMetadata::new("Doc")).build().unwrap();
        let result = apply_fallback(
            &model,
            &ConvertOptions::new().with_fallback(FallbackPolicy::PlainText),
            Err(Error::Cancelled(Stage::Serialize)),
        );
        assert!(matches!(result, Err(Error::Cancelled(Stage::Serialize))));
    }

    #[cfg(feature = "async")]
    #[tokio::test]
    async fn test_convert_async() {
        let options = ConvertOptions::new().with_timeout(Duration::from_secs(30));
        let artifact = convert_async(
            "<p>Hello</p>".to_string(),
            DocumentMetadata::new("Doc"),
            Vec::new(),
            options,
        )
        .await
        .unwrap();
        assert_eq!(artifact.kind, ArtifactKind::Docx);
    }
}
