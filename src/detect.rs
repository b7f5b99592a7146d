//! Magic-byte detection of uploaded documents.

use crate::error::{Error, Result};
use std::path::Path;

/// Detected container or text format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceFormat {
    /// ZIP package holding `word/document.xml`
    Docx,
    /// Any other ZIP archive
    Zip,
    /// PDF with its header version (e.g., "1.7")
    Pdf {
        /// Header version string
        version: String,
    },
    /// OLE compound file: legacy `.doc`, or an encrypted OOXML package
    OleCompound,
    /// UTF-8 text that looks like HTML markup
    Html,
    /// Other UTF-8 text
    Text,
}

impl SourceFormat {
    /// Canonical file extension, used to pick an extractor.
    pub fn extension(&self) -> &'static str {
        match self {
            SourceFormat::Docx => "docx",
            SourceFormat::Zip => "zip",
            SourceFormat::Pdf { .. } => "pdf",
            SourceFormat::OleCompound => "doc",
            SourceFormat::Html => "html",
            SourceFormat::Text => "txt",
        }
    }
}

impl std::fmt::Display for SourceFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceFormat::Docx => write!(f, "DOCX"),
            SourceFormat::Zip => write!(f, "ZIP archive"),
            SourceFormat::Pdf { version } => write!(f, "PDF {}", version),
            SourceFormat::OleCompound => write!(f, "OLE compound document"),
            SourceFormat::Html => write!(f, "HTML"),
            SourceFormat::Text => write!(f, "plain text"),
        }
    }
}

const ZIP_MAGIC: &[u8] = b"PK\x03\x04";
const ZIP_EMPTY_MAGIC: &[u8] = b"PK\x05\x06";
const PDF_MAGIC: &[u8] = b"%PDF-";
const OLE_MAGIC: &[u8] = &[0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1];
const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];
const DOCX_MAIN_PART: &[u8] = b"word/document.xml";

/// Bytes inspected when deciding between text and binary.
const TEXT_SNIFF_LEN: usize = 8192;

/// Detect the format of a file.
///
/// # Example
/// ```no_run
/// use lexdoc::detect::detect_format_from_path;
///
/// let format = detect_format_from_path("contract.docx").unwrap();
/// println!("{}", format);
/// ```
pub fn detect_format_from_path<P: AsRef<Path>>(path: P) -> Result<SourceFormat> {
    let data = std::fs::read(path)?;
    detect_format_from_bytes(&data)
}

/// Detect the format of a byte buffer.
///
/// Returns [`Error::UnknownFormat`] for empty input and for binary data
/// that matches no known signature.
pub fn detect_format_from_bytes(data: &[u8]) -> Result<SourceFormat> {
    if data.is_empty() {
        return Err(Error::UnknownFormat);
    }

    if data.starts_with(ZIP_MAGIC) || data.starts_with(ZIP_EMPTY_MAGIC) {
        return Ok(if contains(data, DOCX_MAIN_PART) {
            SourceFormat::Docx
        } else {
            SourceFormat::Zip
        });
    }

    if data.starts_with(OLE_MAGIC) {
        return Ok(SourceFormat::OleCompound);
    }

    if let Some(rest) = data.strip_prefix(PDF_MAGIC) {
        let version: String = rest
            .iter()
            .take_while(|b| b.is_ascii_digit() || **b == b'.')
            .map(|b| *b as char)
            .collect();
        return Ok(SourceFormat::Pdf { version });
    }

    let sample = &data[..data.len().min(TEXT_SNIFF_LEN)];
    let sample = sample.strip_prefix(UTF8_BOM).unwrap_or(sample);
    if is_text(sample) {
        return Ok(if looks_like_html(sample) {
            SourceFormat::Html
        } else {
            SourceFormat::Text
        });
    }

    Err(Error::UnknownFormat)
}

/// Check if bytes are an OLE compound file.
pub fn is_ole_compound(data: &[u8]) -> bool {
    data.starts_with(OLE_MAGIC)
}

fn is_text(sample: &[u8]) -> bool {
    if sample.contains(&0) {
        return false;
    }
    match std::str::from_utf8(sample) {
        Ok(_) => true,
        // A multi-byte character cut off by the sample window is fine.
        Err(e) => e.error_len().is_none(),
    }
}

fn looks_like_html(sample: &[u8]) -> bool {
    let head: Vec<u8> = sample
        .iter()
        .skip_while(|b| b.is_ascii_whitespace())
        .take(512)
        .map(|b| b.to_ascii_lowercase())
        .collect();

    head.starts_with(b"<!doctype html")
        || head.starts_with(b"<html")
        || (head.starts_with(b"<") && (contains(&head, b"<body") || contains(&head, b"</p>")))
}

fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    haystack.windows(needle.len()).any(|w| w == needle)
}
