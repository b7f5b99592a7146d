//! Image payloads: references, data URIs, and decoded rasters.

use base64::Engine;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Where an image comes from.
///
/// A string is either a `data:` URI (decodable) or an external reference
/// (never fetched; the serializer renders a placeholder instead).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ImageSource {
    /// Data URI or external URI
    Uri(String),
    /// Raw image bytes
    Bytes(Vec<u8>),
}

impl ImageSource {
    /// Check if there is nothing to decode or reference.
    pub fn is_empty(&self) -> bool {
        match self {
            ImageSource::Uri(uri) => uri.trim().is_empty(),
            ImageSource::Bytes(bytes) => bytes.is_empty(),
        }
    }

    /// Check if this is an inline `data:` URI.
    pub fn is_data_uri(&self) -> bool {
        matches!(self, ImageSource::Uri(uri) if uri.trim_start().starts_with("data:"))
    }

    /// Resolve the payload bytes without fetching anything.
    fn payload(&self) -> Result<Vec<u8>, ImageDecodeError> {
        match self {
            ImageSource::Bytes(bytes) => Ok(bytes.clone()),
            ImageSource::Uri(uri) => {
                let uri = uri.trim();
                let Some(rest) = uri.strip_prefix("data:") else {
                    return Err(ImageDecodeError::External(uri.to_string()));
                };
                let Some((header, data)) = rest.split_once(',') else {
                    return Err(ImageDecodeError::MalformedUri);
                };
                if !header.contains("base64") {
                    return Err(ImageDecodeError::MalformedUri);
                }
                let data: String = data.chars().filter(|c| !c.is_whitespace()).collect();
                base64::engine::general_purpose::STANDARD
                    .decode(data.as_bytes())
                    .map_err(|e| ImageDecodeError::Base64(e.to_string()))
            }
        }
    }
}

impl From<Vec<u8>> for ImageSource {
    fn from(bytes: Vec<u8>) -> Self {
        ImageSource::Bytes(bytes)
    }
}

impl From<&str> for ImageSource {
    fn from(uri: &str) -> Self {
        ImageSource::Uri(uri.to_string())
    }
}

impl From<String> for ImageSource {
    fn from(uri: String) -> Self {
        ImageSource::Uri(uri)
    }
}

/// Raster formats that can be embedded in the output package.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RasterFormat {
    /// PNG
    Png,
    /// JPEG
    Jpeg,
}

impl RasterFormat {
    /// File extension used for the package part.
    pub fn extension(&self) -> &'static str {
        match self {
            RasterFormat::Png => "png",
            RasterFormat::Jpeg => "jpeg",
        }
    }

    /// MIME type for the content-types manifest.
    pub fn mime_type(&self) -> &'static str {
        match self {
            RasterFormat::Png => "image/png",
            RasterFormat::Jpeg => "image/jpeg",
        }
    }

    /// Detect the format from magic bytes.
    pub fn detect(data: &[u8]) -> Option<RasterFormat> {
        // JPEG: FF D8 FF
        if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
            return Some(RasterFormat::Jpeg);
        }

        // PNG: 89 50 4E 47 0D 0A 1A 0A
        if data.starts_with(&[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A]) {
            return Some(RasterFormat::Png);
        }

        None
    }
}

/// Why an image could not be decoded. Never propagated past the serializer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageDecodeError {
    /// Source is an external reference, not inline data
    External(String),
    /// `data:` URI without a base64 payload
    MalformedUri,
    /// Invalid base64
    Base64(String),
    /// Not PNG or JPEG
    UnsupportedFormat,
    /// Header matched but the raster failed to decode
    Raster(String),
    /// Decoded to a zero-sized image
    Empty,
}

impl fmt::Display for ImageDecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImageDecodeError::External(uri) => write!(f, "external image reference not fetched: {}", uri),
            ImageDecodeError::MalformedUri => write!(f, "malformed data URI"),
            ImageDecodeError::Base64(e) => write!(f, "invalid base64 payload: {}", e),
            ImageDecodeError::UnsupportedFormat => write!(f, "unsupported raster format"),
            ImageDecodeError::Raster(e) => write!(f, "raster decode failed: {}", e),
            ImageDecodeError::Empty => write!(f, "image has zero width or height"),
        }
    }
}

/// A verified raster image ready for embedding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterImage {
    /// Original encoded bytes
    pub data: Vec<u8>,

    /// Encoded format
    pub format: RasterFormat,

    /// Width in pixels
    pub width: u32,

    /// Height in pixels
    pub height: u32,
}

impl RasterImage {
    /// Decode and verify an image source.
    ///
    /// The payload is fully decoded so that a truncated or corrupt file is
    /// rejected here rather than by the consuming word processor.
    pub fn decode(source: &ImageSource) -> Result<RasterImage, ImageDecodeError> {
        let data = source.payload()?;
        let format = RasterFormat::detect(&data).ok_or(ImageDecodeError::UnsupportedFormat)?;
        let image_format = match format {
            RasterFormat::Png => image::ImageFormat::Png,
            RasterFormat::Jpeg => image::ImageFormat::Jpeg,
        };
        let decoded = image::load_from_memory_with_format(&data, image_format)
            .map_err(|e| ImageDecodeError::Raster(e.to_string()))?;
        let (width, height) = (decoded.width(), decoded.height());
        if width == 0 || height == 0 {
            return Err(ImageDecodeError::Empty);
        }
        Ok(RasterImage {
            data,
            format,
            width,
            height,
        })
    }

    /// Get the size of the encoded data in bytes.
    pub fn size(&self) -> usize {
        self.data.len()
    }
}
