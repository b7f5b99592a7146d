//! `word/document.xml` body construction.

use super::parts::{BULLET_NUM_ID, FIRST_MEDIA_RID, RID_FOOTER, RID_HEADER};
use super::xml::{self, escape, ParagraphProps, RunExtras, REL_NS, WML_NS, XML_DECL};
use crate::convert::CancellationToken;
use crate::error::{Result, Stage};
use crate::model::{Block, DocumentModel, ImageSource, RasterImage, SignatureEntry, TextStyle};
use crate::render::{ConversionStats, RenderOptions};

/// EMU per pixel at 96 DPI.
pub const EMU_PER_PX: u64 = 9525;

/// Fixed signature image box, in pixels.
pub const SIGNATURE_BOX_PX: (u64, u64) = (200, 60);

/// Letter page width minus both margins, in EMU (6.5 inches).
const TEXT_WIDTH_EMU: u64 = 5_943_600;

/// Signature rule stops this far from the right margin (3.5 inches).
const RULE_INDENT_RIGHT: u32 = 5040;

/// One embedded media part.
#[derive(Debug, Clone)]
pub struct MediaPart {
    pub rid: String,
    pub path: String,
    pub data: Vec<u8>,
}

/// Accumulates body XML, media parts and list numbering state.
pub struct BodyWriter<'a> {
    options: &'a RenderOptions,
    body: String,
    media: Vec<MediaPart>,
    ordered_lists: u32,
    in_ordered_list: bool,
    next_drawing_id: u32,
    stats: ConversionStats,
}

impl<'a> BodyWriter<'a> {
    pub fn new(options: &'a RenderOptions) -> Self {
        Self {
            options,
            body: String::new(),
            media: Vec::new(),
            ordered_lists: 0,
            in_ordered_list: false,
            next_drawing_id: 1,
            stats: ConversionStats::new(),
        }
    }

    /// Write the whole model, checking for cancellation between blocks.
    pub fn write_model(&mut self, model: &DocumentModel, cancel: &CancellationToken) -> Result<()> {
        self.write_title(model.metadata().display_title());

        for block in model.blocks() {
            cancel.check(Stage::Serialize)?;
            self.write_block(block);
        }

        if !model.signatures().is_empty() {
            self.in_ordered_list = false;
            let heading = ParagraphProps {
                style: Some("Heading2"),
                ..Default::default()
            };
            let text = xml::run(&self.options.signature_heading, TextStyle::default(), RunExtras::default());
            self.body.push_str(&xml::paragraph(&heading, &text));
            for entry in model.signatures() {
                cancel.check(Stage::Serialize)?;
                self.write_signature(entry);
            }
        }
        Ok(())
    }

    fn write_title(&mut self, title: &str) {
        let props = ParagraphProps {
            style: Some("Title"),
            align: Some("center"),
            ..Default::default()
        };
        let text = xml::run(title, TextStyle::default(), RunExtras::default());
        self.body.push_str(&xml::paragraph(&props, &text));
    }

    fn write_block(&mut self, block: &Block) {
        self.stats.add_block(block);
        let ordered_item = matches!(block, Block::ListItem { ordered: true, .. });
        if ordered_item && !self.in_ordered_list {
            self.ordered_lists += 1;
        }
        // An image between items belongs to the list it sits in.
        if !matches!(block, Block::Image { .. }) {
            self.in_ordered_list = ordered_item;
        }

        match block {
            Block::Heading { level, runs } => {
                let style = format!("Heading{}", (*level).clamp(1, 6));
                let props = ParagraphProps {
                    style: Some(&style),
                    ..Default::default()
                };
                self.body.push_str(&xml::paragraph(&props, &xml::runs(runs)));
            }
            Block::Paragraph { runs } => {
                self.body
                    .push_str(&xml::paragraph(&ParagraphProps::default(), &xml::runs(runs)));
            }
            Block::ListItem { ordered, runs } => {
                let num_id = if *ordered {
                    BULLET_NUM_ID + self.ordered_lists
                } else {
                    BULLET_NUM_ID
                };
                let props = ParagraphProps {
                    style: Some("ListParagraph"),
                    numbering: Some(num_id),
                    ..Default::default()
                };
                self.body.push_str(&xml::paragraph(&props, &xml::runs(runs)));
            }
            Block::Image { src, alt_text } => self.write_image(src, alt_text),
            Block::Break => {
                self.body.push_str("<w:p><w:r><w:br w:type=\"page\"/></w:r></w:p>");
            }
        }
    }

    fn write_image(&mut self, src: &ImageSource, alt: &str) {
        let decoded = if self.options.embed_images {
            RasterImage::decode(src).map_err(|e| e.to_string())
        } else {
            Err("image embedding disabled".to_string())
        };

        match decoded {
            Ok(image) => {
                let (cx, cy) = fit_width(image.width, image.height);
                let drawing = self.embed(image, cx, cy, alt);
                self.body
                    .push_str(&xml::paragraph(&ParagraphProps::default(), &drawing));
                self.stats.add_embedded_image();
            }
            Err(reason) => {
                log::warn!("Image {:?} not embedded: {}", alt, reason);
                let label = if alt.trim().is_empty() { "image" } else { alt.trim() };
                let italic = TextStyle {
                    italic: true,
                    ..Default::default()
                };
                let text = xml::run(&format!("[Image: {}]", label), italic, RunExtras::default());
                self.body
                    .push_str(&xml::paragraph(&ParagraphProps::default(), &text));
                self.stats.add_dropped_image();
            }
        }
    }

    fn write_signature(&mut self, entry: &SignatureEntry) {
        if let Some(src) = &entry.signature_image {
            match RasterImage::decode(src) {
                Ok(image) => {
                    let (w, h) = SIGNATURE_BOX_PX;
                    let drawing = self.embed(image, w * EMU_PER_PX, h * EMU_PER_PX, &entry.signer_name);
                    let props = ParagraphProps {
                        keep_next: true,
                        space_after: Some(0),
                        ..Default::default()
                    };
                    self.body.push_str(&xml::paragraph(&props, &drawing));
                    self.stats.add_embedded_image();
                }
                Err(e) => {
                    log::warn!(
                        "Signature image for {:?} not embedded: {}",
                        entry.signer_name,
                        e
                    );
                    self.stats.add_dropped_image();
                }
            }
        }

        let rule = ParagraphProps {
            keep_next: true,
            bottom_border: true,
            space_after: Some(60),
            indent_right: Some(RULE_INDENT_RIGHT),
            ..Default::default()
        };
        self.body.push_str(&xml::paragraph(&rule, ""));

        let line = |keep_next: bool| ParagraphProps {
            keep_next,
            space_after: Some(0),
            ..Default::default()
        };
        let bold = TextStyle {
            bold: true,
            ..Default::default()
        };
        let italic = TextStyle {
            italic: true,
            ..Default::default()
        };

        let role = entry.role();
        let date = entry.signed_date_label();

        let name = xml::run(entry.signer_name.trim(), bold, RunExtras::default());
        self.body
            .push_str(&xml::paragraph(&line(role.is_some() || date.is_some()), &name));

        if let Some(role) = role {
            let text = xml::run(role, italic, RunExtras::default());
            self.body.push_str(&xml::paragraph(&line(date.is_some()), &text));
        }
        if let Some(date) = date {
            let text = xml::run(&date, TextStyle::default(), RunExtras::muted());
            self.body.push_str(&xml::paragraph(&line(false), &text));
        }

        // Space before the next signer.
        self.body.push_str("<w:p/>");
    }

    /// Register a media part and return the inline drawing run.
    fn embed(&mut self, image: RasterImage, cx: u64, cy: u64, descr: &str) -> String {
        let index = self.media.len() as u32 + 1;
        let rid = format!("rId{}", FIRST_MEDIA_RID + index - 1);
        let name = format!("image{}.{}", index, image.format.extension());
        let id = self.next_drawing_id;
        self.next_drawing_id += 1;

        let drawing = format!(
            concat!(
                "<w:r><w:drawing>",
                "<wp:inline distT=\"0\" distB=\"0\" distL=\"0\" distR=\"0\">",
                "<wp:extent cx=\"{cx}\" cy=\"{cy}\"/>",
                "<wp:docPr id=\"{id}\" name=\"Picture {id}\" descr=\"{descr}\"/>",
                "<wp:cNvGraphicFramePr><a:graphicFrameLocks noChangeAspect=\"1\"/></wp:cNvGraphicFramePr>",
                "<a:graphic><a:graphicData uri=\"http://schemas.openxmlformats.org/drawingml/2006/picture\">",
                "<pic:pic><pic:nvPicPr><pic:cNvPr id=\"{id}\" name=\"{name}\"/><pic:cNvPicPr/></pic:nvPicPr>",
                "<pic:blipFill><a:blip r:embed=\"{rid}\"/><a:stretch><a:fillRect/></a:stretch></pic:blipFill>",
                "<pic:spPr><a:xfrm><a:off x=\"0\" y=\"0\"/><a:ext cx=\"{cx}\" cy=\"{cy}\"/></a:xfrm>",
                "<a:prstGeom prst=\"rect\"><a:avLst/></a:prstGeom></pic:spPr>",
                "</pic:pic></a:graphicData></a:graphic>",
                "</wp:inline></w:drawing></w:r>"
            ),
            cx = cx,
            cy = cy,
            id = id,
            descr = escape(descr),
            name = name,
            rid = rid
        );

        self.media.push(MediaPart {
            rid,
            path: format!("word/media/{}", name),
            data: image.data,
        });
        drawing
    }

    /// Finish into (document.xml, media parts, ordered list count, stats).
    pub fn finish(self) -> (String, Vec<MediaPart>, u32, ConversionStats) {
        let document = format!(
            concat!(
                "{decl}<w:document xmlns:w=\"{w}\" xmlns:r=\"{r}\" ",
                "xmlns:wp=\"http://schemas.openxmlformats.org/drawingml/2006/wordprocessingDrawing\" ",
                "xmlns:a=\"http://schemas.openxmlformats.org/drawingml/2006/main\" ",
                "xmlns:pic=\"http://schemas.openxmlformats.org/drawingml/2006/picture\">",
                "<w:body>{body}",
                "<w:sectPr>",
                "<w:headerReference w:type=\"default\" r:id=\"{hdr}\"/>",
                "<w:footerReference w:type=\"default\" r:id=\"{ftr}\"/>",
                "<w:pgSz w:w=\"12240\" w:h=\"15840\"/>",
                "<w:pgMar w:top=\"1440\" w:right=\"1440\" w:bottom=\"1440\" w:left=\"1440\" ",
                "w:header=\"720\" w:footer=\"720\" w:gutter=\"0\"/>",
                "<w:cols w:space=\"720\"/>",
                "<w:docGrid w:linePitch=\"360\"/>",
                "</w:sectPr></w:body></w:document>"
            ),
            decl = XML_DECL,
            w = WML_NS,
            r = REL_NS,
            body = self.body,
            hdr = RID_HEADER,
            ftr = RID_FOOTER
        );
        (document, self.media, self.ordered_lists, self.stats)
    }
}

/// Pixel size to EMU, scaled down to the text width if wider.
fn fit_width(width: u32, height: u32) -> (u64, u64) {
    let cx = width as u64 * EMU_PER_PX;
    let cy = height as u64 * EMU_PER_PX;
    if cx <= TEXT_WIDTH_EMU {
        return (cx, cy);
    }
    (TEXT_WIDTH_EMU, (cy * TEXT_WIDTH_EMU / cx).max(1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{DocumentMetadata, ModelBuilder, TextRun};

    fn body_of(model: &DocumentModel) -> (String, u32) {
        let options = RenderOptions::default();
        let mut writer = BodyWriter::new(&options);
        writer.write_model(model, &CancellationToken::new()).unwrap();
        let (document, _, lists, _) = writer.finish();
        (document, lists)
    }

    #[test]
    fn test_fit_width() {
        assert_eq!(fit_width(200, 60), (1_905_000, 571_500));
        let (cx, cy) = fit_width(1248, 100);
        assert_eq!(cx, TEXT_WIDTH_EMU);
        assert_eq!(cy, 100 * EMU_PER_PX / 2);
    }

    #[test]
    fn test_heading_levels_clamped() {
        let model = ModelBuilder::new(DocumentMetadata::new("T"))
            .with_blocks(vec![
                Block::heading(0, vec![TextRun::new("low")]),
                Block::heading(9, vec![TextRun::new("high")]),
            ])
            .build()
            .unwrap();
        let (document, _) = body_of(&model);
        assert!(document.contains("<w:pStyle w:val=\"Heading1\"/>"));
        assert!(document.contains("<w:pStyle w:val=\"Heading6\"/>"));
    }

    #[test]
    fn test_ordered_lists_restart() {
        let item = |ordered| Block::list_item(ordered, vec![TextRun::new("x")]);
        let model = ModelBuilder::new(DocumentMetadata::new("T"))
            .with_blocks(vec![
                item(true),
                item(true),
                Block::text("between"),
                item(true),
                item(false),
            ])
            .build()
            .unwrap();
        let (document, lists) = body_of(&model);
        assert_eq!(lists, 2);
        assert_eq!(document.matches("<w:numId w:val=\"2\"/>").count(), 2);
        assert_eq!(document.matches("<w:numId w:val=\"3\"/>").count(), 1);
        assert_eq!(document.matches("<w:numId w:val=\"1\"/>").count(), 1);
    }

    #[test]
    fn test_remote_image_placeholder() {
        let model = ModelBuilder::new(DocumentMetadata::new("T"))
            .with_blocks(vec![Block::Image {
                src: ImageSource::from("https://example.com/logo.png"),
                alt_text: "Logo".to_string(),
            }])
            .build()
            .unwrap();
        let options = RenderOptions::default();
        let mut writer = BodyWriter::new(&options);
        writer.write_model(&model, &CancellationToken::new()).unwrap();
        let (document, media, _, stats) = writer.finish();
        assert!(document.contains("[Image: Logo]"));
        assert!(media.is_empty());
        assert_eq!(stats.images_dropped, 1);
    }

    #[test]
    fn test_cancel_between_blocks() {
        let model = ModelBuilder::new(DocumentMetadata::new("T"))
            .with_blocks(vec![Block::text("a")])
            .build()
            .unwrap();
        let options = RenderOptions::default();
        let mut writer = BodyWriter::new(&options);
        let cancel = CancellationToken::new();
        cancel.cancel();
        assert!(writer.write_model(&model, &cancel).is_err());
    }
}
