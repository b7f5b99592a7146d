//! Rendering module: DOCX serialization and the lossy projections.

mod cleanup;
pub mod docx;
mod html;
mod json;
mod options;
mod stats;
mod text;

pub use cleanup::{CleanupOptions, CleanupPipeline, CleanupPreset};
pub use docx::{to_docx, to_docx_with_stats, DocxRenderer, DOCX_EXTENSION, DOCX_MIME_TYPE};
pub use html::{escape_html, to_html};
pub use json::{to_json, JsonFormat};
pub use options::{Compression, RenderOptions};
pub use stats::ConversionStats;
pub use text::{to_plain_text, to_text};
