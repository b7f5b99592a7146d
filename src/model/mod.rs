//! Document model types.
//!
//! This module defines the intermediate representation that bridges markup
//! parsing and output rendering. A [`DocumentModel`] is assembled once per
//! conversion through [`ModelBuilder`] and is read-only afterwards.

mod block;
mod document;
mod resource;
mod signature;

pub use block::{Block, TextRun, TextStyle};
pub use document::{DocumentMetadata, DocumentModel, ModelBuilder, DEFAULT_SIGNATURE_HEADING};
pub use resource::{ImageDecodeError, ImageSource, RasterFormat, RasterImage};
pub use signature::{format_long_date, SignatureEntry};
