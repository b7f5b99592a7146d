//! Error types for the lexdoc library.

use std::fmt;
use std::io;
use thiserror::Error;

/// Result type alias for lexdoc operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Pipeline stage, used for cancellation reporting and timing logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Script/style/comment removal
    Sanitize,
    /// Block boundary detection
    Segment,
    /// Inline run extraction
    Extract,
    /// Document model assembly
    Build,
    /// Binary packaging
    Serialize,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Sanitize => "sanitize",
            Stage::Segment => "segment",
            Stage::Extract => "extract",
            Stage::Build => "build",
            Stage::Serialize => "serialize",
        };
        f.write_str(name)
    }
}

/// Classified failure of the reverse (upload → text) path.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtractionFailure {
    /// The document is password protected.
    #[error("Document is encrypted")]
    Encrypted,

    /// The byte stream is damaged or truncated.
    #[error("Corrupted document: {0}")]
    Corrupted(String),

    /// The container is valid but its layout is not one we can read.
    #[error("Unsupported document structure: {0}")]
    UnsupportedStructure(String),

    /// Extraction succeeded but produced too little text to be useful.
    #[error("Insufficient content: {found} characters extracted, {minimum} required")]
    InsufficientContent {
        /// Non-whitespace characters found
        found: usize,
        /// Required minimum
        minimum: usize,
    },
}

impl ExtractionFailure {
    /// Message suitable for showing to the person who uploaded the file.
    pub fn user_message(&self) -> &'static str {
        match self {
            ExtractionFailure::Encrypted => {
                "This document is password protected. Remove the password and upload it again."
            }
            ExtractionFailure::Corrupted(_) => {
                "This file appears to be damaged. Re-export it from the original application and try again."
            }
            ExtractionFailure::UnsupportedStructure(_) => {
                "This file type or layout is not supported. Save it as .docx or plain text and try again."
            }
            ExtractionFailure::InsufficientContent { .. } => {
                "Not enough readable text was found. Scanned documents need to be run through OCR first."
            }
        }
    }
}

/// Error types that can occur during conversion.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Caller-supplied input violates a model invariant.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Markup exceeds the configured size limit.
    #[error("Input of {size} bytes exceeds the {limit} byte limit")]
    InputTooLarge {
        /// Input size in bytes
        size: usize,
        /// Configured limit in bytes
        limit: usize,
    },

    /// The packaging step could not produce a complete artifact.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Error during a text projection (plain text, HTML, JSON).
    #[error("Rendering error: {0}")]
    Render(String),

    /// Reverse-path failure, classified.
    #[error("Extraction failed: {0}")]
    Extraction(#[from] ExtractionFailure),

    /// The file format is not recognized.
    #[error("Unknown file format")]
    UnknownFormat,

    /// The conversion was cancelled before the given stage.
    #[error("Conversion cancelled before {0} stage")]
    Cancelled(Stage),

    /// The conversion did not finish within the configured time.
    #[error("Conversion timed out after {0} ms")]
    Timeout(u128),

    /// Generic error with message.
    #[error("{0}")]
    Other(String),
}

impl From<zip::result::ZipError> for Error {
    fn from(err: zip::result::ZipError) -> Self {
        match err {
            zip::result::ZipError::Io(e) => Error::Serialization(e.to_string()),
            _ => Error::Serialization(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::InputTooLarge {
            size: 2048,
            limit: 1024,
        };
        assert_eq!(
            err.to_string(),
            "Input of 2048 bytes exceeds the 1024 byte limit"
        );

        let err = Error::Cancelled(Stage::Serialize);
        assert_eq!(err.to_string(), "Conversion cancelled before serialize stage");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn test_extraction_failures_are_distinct() {
        let failures = [
            ExtractionFailure::Encrypted,
            ExtractionFailure::Corrupted("bad zip".into()),
            ExtractionFailure::UnsupportedStructure("no body".into()),
            ExtractionFailure::InsufficientContent {
                found: 3,
                minimum: 50,
            },
        ];
        let messages: std::collections::HashSet<_> =
            failures.iter().map(|f| f.user_message()).collect();
        assert_eq!(messages.len(), failures.len());
    }

    #[test]
    fn test_extraction_failure_into_error() {
        let err: Error = ExtractionFailure::Encrypted.into();
        assert!(matches!(err, Error::Extraction(ExtractionFailure::Encrypted)));
        assert_eq!(err.to_string(), "Extraction failed: Document is encrypted");
    }
}
