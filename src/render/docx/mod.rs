//! DOCX (OOXML WordprocessingML) serialization.
//!
//! The package is assembled in memory and returned only once the archive
//! has been finalized, so callers get either a complete document or an
//! error, never a truncated buffer. Output is byte-for-byte deterministic:
//! part order is fixed, entry timestamps are pinned to 1980-01-01 and the
//! only dates written are those carried by the metadata.

mod body;
mod parts;
mod xml;

pub use body::{EMU_PER_PX, SIGNATURE_BOX_PX};

use std::io::{Cursor, Write};
use std::time::Instant;

use zip::write::SimpleFileOptions;
use zip::ZipWriter;

use crate::convert::CancellationToken;
use crate::error::{Error, Result, Stage};
use crate::model::DocumentModel;

use super::{ConversionStats, RenderOptions};
use body::BodyWriter;

/// MIME type of a DOCX package.
pub const DOCX_MIME_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

/// File extension of a DOCX package.
pub const DOCX_EXTENSION: &str = "docx";

/// Serialize a model to DOCX bytes.
pub fn to_docx(model: &DocumentModel, options: &RenderOptions) -> Result<Vec<u8>> {
    DocxRenderer::new(options.clone()).render(model)
}

/// Serialize a model to DOCX bytes with statistics.
pub fn to_docx_with_stats(
    model: &DocumentModel,
    options: &RenderOptions,
) -> Result<(Vec<u8>, ConversionStats)> {
    DocxRenderer::new(options.clone()).render_with_stats(model, &CancellationToken::new())
}

/// DOCX renderer.
#[derive(Debug, Clone, Default)]
pub struct DocxRenderer {
    options: RenderOptions,
}

impl DocxRenderer {
    /// Create a new DOCX renderer.
    pub fn new(options: RenderOptions) -> Self {
        Self { options }
    }

    /// Render a model to DOCX bytes.
    pub fn render(&self, model: &DocumentModel) -> Result<Vec<u8>> {
        self.render_with_stats(model, &CancellationToken::new())
            .map(|(bytes, _)| bytes)
    }

    /// Render a model, observing a cancellation token between blocks.
    pub fn render_with_stats(
        &self,
        model: &DocumentModel,
        cancel: &CancellationToken,
    ) -> Result<(Vec<u8>, ConversionStats)> {
        cancel.check(Stage::Serialize)?;
        let start = Instant::now();

        let mut writer = BodyWriter::new(&self.options);
        writer.write_model(model, cancel)?;
        let (document, media, ordered_lists, mut stats) = writer.finish();
        stats.signature_count = model.signatures().len() as u32;

        let title = model.metadata().display_title();
        let media_rels: Vec<(String, String)> = media
            .iter()
            .map(|m| {
                let target = m.path.trim_start_matches("word/").to_string();
                (m.rid.clone(), target)
            })
            .collect();

        let mut package = Package::new(&self.options);
        package.add("[Content_Types].xml", parts::content_types().as_bytes())?;
        package.add("_rels/.rels", parts::package_rels().as_bytes())?;
        package.add("docProps/core.xml", parts::core_properties(model.metadata()).as_bytes())?;
        package.add("docProps/app.xml", parts::app_properties().as_bytes())?;
        package.add("word/document.xml", document.as_bytes())?;
        package.add("word/styles.xml", parts::styles().as_bytes())?;
        package.add("word/numbering.xml", parts::numbering(ordered_lists).as_bytes())?;
        package.add("word/settings.xml", parts::settings().as_bytes())?;
        package.add("word/header1.xml", parts::header(title).as_bytes())?;
        package.add("word/footer1.xml", parts::footer().as_bytes())?;
        package.add(
            "word/_rels/document.xml.rels",
            parts::document_rels(&media_rels).as_bytes(),
        )?;
        for part in &media {
            package.add(&part.path, &part.data)?;
        }
        let bytes = package.finish()?;

        log::debug!(
            "Serialized {} blocks, {} media parts into {} bytes in {:?}",
            model.block_count(),
            media.len(),
            bytes.len(),
            start.elapsed()
        );
        Ok((bytes, stats))
    }
}

/// In-memory ZIP package with fixed entry options.
struct Package {
    zip: ZipWriter<Cursor<Vec<u8>>>,
    options: SimpleFileOptions,
}

impl Package {
    fn new(render: &RenderOptions) -> Self {
        let options = SimpleFileOptions::default()
            .compression_method(render.compression.method())
            .last_modified_time(zip::DateTime::default());
        Self {
            zip: ZipWriter::new(Cursor::new(Vec::new())),
            options,
        }
    }

    fn add(&mut self, name: &str, data: &[u8]) -> Result<()> {
        self.zip.start_file(name, self.options)?;
        self.zip
            .write_all(data)
            .map_err(|e| Error::Serialization(format!("writing {}: {}", name, e)))
    }

    fn finish(self) -> Result<Vec<u8>> {
        Ok(self.zip.finish()?.into_inner())
    }
}
