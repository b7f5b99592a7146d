//! Reverse path: uploaded document → plain text.
//!
//! Extractors turn a byte buffer into raw text; [`normalize_extracted`]
//! cleans it and rejects results too short to be useful. Every failure is
//! classified as an [`ExtractionFailure`] so callers can tell an encrypted
//! upload from a damaged one.
//!
//! # Example
//!
//! ```no_run
//! use lexdoc::extract::{extract_bytes, ExtractOptions};
//!
//! let bytes = std::fs::read("contract.docx").unwrap();
//! match extract_bytes(&bytes, Some("docx"), &ExtractOptions::default()) {
//!     Ok(extracted) => println!("{}", extracted.text),
//!     Err(lexdoc::Error::Extraction(failure)) => eprintln!("{}", failure.user_message()),
//!     Err(e) => eprintln!("{}", e),
//! }
//! ```

mod docx;
mod text;

pub use docx::DocxExtractor;
pub use text::{HtmlExtractor, PlainTextExtractor};

use std::collections::HashMap;
use std::sync::Arc;

use crate::detect::{detect_format_from_bytes, SourceFormat};
use crate::error::{ExtractionFailure, Result};
use crate::render::{CleanupOptions, CleanupPipeline};

/// Default minimum of non-whitespace characters for a usable extraction.
pub const DEFAULT_MIN_CONTENT_CHARS: usize = 50;

/// Trait for text extractors.
///
/// Implement this trait to add support for another upload format.
pub trait TextExtractor: Send + Sync {
    /// Get the name of this extractor.
    fn name(&self) -> &str;

    /// Get the supported file extensions for this extractor.
    ///
    /// Extensions should be lowercase without the leading dot (e.g., `["docx"]`).
    fn supported_extensions(&self) -> &[&str];

    /// Extract raw text from a document.
    fn extract(&self, bytes: &[u8]) -> std::result::Result<String, ExtractionFailure>;

    /// Check if this extractor supports the given extension.
    fn supports_extension(&self, ext: &str) -> bool {
        let ext_lower = ext.to_lowercase();
        self.supported_extensions().iter().any(|e| *e == ext_lower)
    }
}

/// Options for extraction.
#[derive(Debug, Clone)]
pub struct ExtractOptions {
    /// Minimum non-whitespace characters (0 = accept anything)
    pub min_content_chars: usize,

    /// Cleanup applied to the raw text
    pub cleanup: CleanupOptions,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            min_content_chars: DEFAULT_MIN_CONTENT_CHARS,
            cleanup: CleanupOptions::standard(),
        }
    }
}

impl ExtractOptions {
    /// Create new extraction options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the minimum content length.
    pub fn with_min_content_chars(mut self, chars: usize) -> Self {
        self.min_content_chars = chars;
        self
    }

    /// Set cleanup options.
    pub fn with_cleanup(mut self, cleanup: CleanupOptions) -> Self {
        self.cleanup = cleanup;
        self
    }
}

/// Successfully extracted text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedText {
    /// Normalized text
    pub text: String,

    /// Name of the extractor that produced it
    pub extractor: String,

    /// Non-whitespace character count
    pub char_count: usize,
}

/// Clean raw extracted text and check it is long enough.
pub fn normalize_extracted(
    raw: &str,
    options: &ExtractOptions,
) -> std::result::Result<String, ExtractionFailure> {
    let text = CleanupPipeline::new(options.cleanup.clone()).process(raw);
    let found = content_chars(&text);
    if found < options.min_content_chars {
        return Err(ExtractionFailure::InsufficientContent {
            found,
            minimum: options.min_content_chars,
        });
    }
    Ok(text)
}

fn content_chars(text: &str) -> usize {
    text.chars().filter(|c| !c.is_whitespace()).count()
}

/// Registry for text extractors.
///
/// The registry maps file extensions to extractors and picks one for an
/// upload from its magic bytes, falling back to the caller's extension hint.
pub struct ExtractorRegistry {
    extractors: HashMap<String, Arc<dyn TextExtractor>>,
    by_name: HashMap<String, Arc<dyn TextExtractor>>,
}

impl ExtractorRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            extractors: HashMap::new(),
            by_name: HashMap::new(),
        }
    }

    /// Create a registry with the built-in extractors (DOCX, text, HTML).
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(DocxExtractor::new()));
        registry.register(Arc::new(PlainTextExtractor::new()));
        registry.register(Arc::new(HtmlExtractor::new()));
        registry
    }

    /// Register an extractor for all its supported extensions.
    pub fn register(&mut self, extractor: Arc<dyn TextExtractor>) {
        for ext in extractor.supported_extensions() {
            self.extractors
                .insert(ext.to_lowercase(), extractor.clone());
        }
        self.by_name
            .insert(extractor.name().to_lowercase(), extractor);
    }

    /// Get an extractor by file extension.
    pub fn get_by_extension(&self, ext: &str) -> Option<Arc<dyn TextExtractor>> {
        self.extractors.get(&normalize_ext(ext)).cloned()
    }

    /// Get an extractor by name.
    pub fn get_by_name(&self, name: &str) -> Option<Arc<dyn TextExtractor>> {
        self.by_name.get(&name.to_lowercase()).cloned()
    }

    /// Check if an extension is supported.
    pub fn supports(&self, ext: &str) -> bool {
        self.extractors.contains_key(&normalize_ext(ext))
    }

    /// Get all supported extensions.
    pub fn supported_extensions(&self) -> Vec<&str> {
        self.extractors.keys().map(|s| s.as_str()).collect()
    }

    /// Extract and normalize text from an upload.
    ///
    /// `ext_hint` is the upload's file extension, if known. Magic bytes win
    /// over the hint; the hint decides only where the bytes are ambiguous.
    pub fn extract(
        &self,
        bytes: &[u8],
        ext_hint: Option<&str>,
        options: &ExtractOptions,
    ) -> Result<ExtractedText> {
        if bytes.is_empty() {
            let text = normalize_extracted("", options)?;
            return Ok(ExtractedText {
                text,
                extractor: String::new(),
                char_count: 0,
            });
        }

        let hint = ext_hint.map(normalize_ext);
        let key = self.pick_extension(bytes, hint.as_deref())?;
        let extractor = self.get_by_extension(&key).ok_or_else(|| {
            ExtractionFailure::UnsupportedStructure(format!("no extractor for .{} files", key))
        })?;

        log::debug!("Extracting {} bytes with the {} extractor", bytes.len(), extractor.name());
        let raw = extractor.extract(bytes)?;
        let text = normalize_extracted(&raw, options)?;
        Ok(ExtractedText {
            char_count: content_chars(&text),
            text,
            extractor: extractor.name().to_string(),
        })
    }

    fn pick_extension(
        &self,
        bytes: &[u8],
        hint: Option<&str>,
    ) -> std::result::Result<String, ExtractionFailure> {
        let key = match (detect_format_from_bytes(bytes), hint) {
            (Ok(SourceFormat::Docx), _) => "docx",
            (Ok(SourceFormat::OleCompound), Some("doc")) => {
                return Err(ExtractionFailure::UnsupportedStructure(
                    "legacy .doc files are not supported".into(),
                ));
            }
            // Password-protected OOXML is wrapped in an OLE container.
            (Ok(SourceFormat::OleCompound), _) => "docx",
            (Ok(SourceFormat::Zip), Some(h)) => h,
            (Ok(format), _) => format.extension(),
            (Err(_), Some(h)) if self.supports(h) => h,
            (Err(_), _) => {
                return Err(ExtractionFailure::Corrupted(
                    "unrecognized binary data".into(),
                ));
            }
        };
        Ok(key.to_string())
    }
}

impl Default for ExtractorRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

fn normalize_ext(ext: &str) -> String {
    ext.trim_start_matches('.').to_lowercase()
}

/// Extract text from an upload with the built-in extractors.
pub fn extract_bytes(
    bytes: &[u8],
    ext_hint: Option<&str>,
    options: &ExtractOptions,
) -> Result<ExtractedText> {
    ExtractorRegistry::with_defaults().extract(bytes, ext_hint, options)
}

/// Extract text from a file with the built-in extractors.
pub fn extract_file<P: AsRef<std::path::Path>>(
    path: P,
    options: &ExtractOptions,
) -> Result<ExtractedText> {
    let path = path.as_ref();
    let bytes = std::fs::read(path)?;
    let ext = path.extension().and_then(|e| e.to_str());
    extract_bytes(&bytes, ext, options)
}
