//! Rendering options and configuration.

use super::{CleanupOptions, CleanupPreset, JsonFormat};
use crate::model::DEFAULT_SIGNATURE_HEADING;

/// Options for rendering a document model.
///
/// Page geometry, header and footer are fixed (US Letter, 1in margins).
#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// Heading text above the signature entries
    pub signature_heading: String,

    /// Embed decodable images; when false every image becomes a placeholder
    pub embed_images: bool,

    /// Compression used for package parts
    pub compression: Compression,

    /// JSON output format
    pub json_format: JsonFormat,

    /// Text cleanup applied to plain-text output
    pub cleanup: Option<CleanupOptions>,
}

impl RenderOptions {
    /// Create new render options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the signature section heading.
    pub fn with_signature_heading(mut self, heading: impl Into<String>) -> Self {
        self.signature_heading = heading.into();
        self
    }

    /// Enable or disable image embedding.
    pub fn with_images(mut self, embed: bool) -> Self {
        self.embed_images = embed;
        self
    }

    /// Set package compression.
    pub fn with_compression(mut self, compression: Compression) -> Self {
        self.compression = compression;
        self
    }

    /// Set JSON output format.
    pub fn with_json_format(mut self, format: JsonFormat) -> Self {
        self.json_format = format;
        self
    }

    /// Set cleanup options.
    pub fn with_cleanup(mut self, cleanup: CleanupOptions) -> Self {
        self.cleanup = Some(cleanup);
        self
    }

    /// Set cleanup preset.
    pub fn with_cleanup_preset(mut self, preset: CleanupPreset) -> Self {
        self.cleanup = Some(CleanupOptions::from_preset(preset));
        self
    }
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            signature_heading: DEFAULT_SIGNATURE_HEADING.to_string(),
            embed_images: true,
            compression: Compression::Deflate,
            json_format: JsonFormat::Pretty,
            cleanup: None,
        }
    }
}

/// Compression method for package parts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Compression {
    /// Deflate (smaller output)
    #[default]
    Deflate,
    /// No compression (faster, easier to inspect)
    Store,
}

impl Compression {
    pub(crate) fn method(self) -> zip::CompressionMethod {
        match self {
            Compression::Deflate => zip::CompressionMethod::Deflated,
            Compression::Store => zip::CompressionMethod::Stored,
        }
    }
}
