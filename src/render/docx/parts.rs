//! Fixed package parts: manifests, relationships, styles, numbering,
//! settings, header, footer and document properties.

use super::xml::{self, escape, ParagraphProps, RunExtras, REL_NS, WML_NS, XML_DECL};
use crate::model::{DocumentMetadata, RasterFormat, TextStyle};

/// Relationship ids of the fixed document parts. Media ids follow.
pub const RID_STYLES: &str = "rId1";
pub const RID_NUMBERING: &str = "rId2";
pub const RID_SETTINGS: &str = "rId3";
pub const RID_HEADER: &str = "rId4";
pub const RID_FOOTER: &str = "rId5";
pub const FIRST_MEDIA_RID: u32 = 6;

const CT_MAIN: &str = "application/vnd.openxmlformats-officedocument.wordprocessingml";

pub fn content_types() -> String {
    let overrides = [
        ("/word/document.xml", "document.main+xml"),
        ("/word/styles.xml", "styles+xml"),
        ("/word/numbering.xml", "numbering+xml"),
        ("/word/settings.xml", "settings+xml"),
        ("/word/header1.xml", "header+xml"),
        ("/word/footer1.xml", "footer+xml"),
    ];

    let mut out = String::from(XML_DECL);
    out.push_str(r#"<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">"#);
    out.push_str(r#"<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>"#);
    out.push_str(r#"<Default Extension="xml" ContentType="application/xml"/>"#);
    for format in [RasterFormat::Png, RasterFormat::Jpeg] {
        out.push_str(&format!(
            r#"<Default Extension="{}" ContentType="{}"/>"#,
            format.extension(),
            format.mime_type()
        ));
    }
    for (part, kind) in overrides {
        out.push_str(&format!(
            r#"<Override PartName="{}" ContentType="{}.{}"/>"#,
            part, CT_MAIN, kind
        ));
    }
    out.push_str(r#"<Override PartName="/docProps/core.xml" ContentType="application/vnd.openxmlformats-package.core-properties+xml"/>"#);
    out.push_str(r#"<Override PartName="/docProps/app.xml" ContentType="application/vnd.openxmlformats-officedocument.extended-properties+xml"/>"#);
    out.push_str("</Types>");
    out
}

pub fn package_rels() -> String {
    format!(
        concat!(
            "{decl}<Relationships xmlns=\"http://schemas.openxmlformats.org/package/2006/relationships\">",
            "<Relationship Id=\"rId1\" Type=\"{ns}/officeDocument\" Target=\"word/document.xml\"/>",
            "<Relationship Id=\"rId2\" Type=\"http://schemas.openxmlformats.org/package/2006/relationships/metadata/core-properties\" Target=\"docProps/core.xml\"/>",
            "<Relationship Id=\"rId3\" Type=\"{ns}/extended-properties\" Target=\"docProps/app.xml\"/>",
            "</Relationships>"
        ),
        decl = XML_DECL,
        ns = REL_NS
    )
}

/// Relationships of `word/document.xml`; `media` holds (rId, target) pairs.
pub fn document_rels(media: &[(String, String)]) -> String {
    let fixed = [
        (RID_STYLES, "styles", "styles.xml"),
        (RID_NUMBERING, "numbering", "numbering.xml"),
        (RID_SETTINGS, "settings", "settings.xml"),
        (RID_HEADER, "header", "header1.xml"),
        (RID_FOOTER, "footer", "footer1.xml"),
    ];

    let mut out = String::from(XML_DECL);
    out.push_str(r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#);
    for (id, kind, target) in fixed {
        out.push_str(&format!(
            r#"<Relationship Id="{}" Type="{}/{}" Target="{}"/>"#,
            id, REL_NS, kind, target
        ));
    }
    for (id, target) in media {
        out.push_str(&format!(
            r#"<Relationship Id="{}" Type="{}/image" Target="{}"/>"#,
            id, REL_NS, target
        ));
    }
    out.push_str("</Relationships>");
    out
}

fn heading_style(level: u8, size: u32, before: u32) -> String {
    format!(
        concat!(
            "<w:style w:type=\"paragraph\" w:styleId=\"Heading{l}\">",
            "<w:name w:val=\"heading {l}\"/><w:basedOn w:val=\"Normal\"/><w:next w:val=\"Normal\"/>",
            "<w:uiPriority w:val=\"9\"/><w:qFormat/>",
            "<w:pPr><w:keepNext/><w:keepLines/><w:spacing w:before=\"{b}\" w:after=\"120\"/>",
            "<w:outlineLvl w:val=\"{o}\"/></w:pPr>",
            "<w:rPr><w:b/><w:bCs/><w:sz w:val=\"{s}\"/><w:szCs w:val=\"{s}\"/></w:rPr>",
            "</w:style>"
        ),
        l = level,
        o = level - 1,
        b = before,
        s = size
    )
}

pub fn styles() -> String {
    let mut out = String::from(XML_DECL);
    out.push_str(&format!("<w:styles xmlns:w=\"{}\">", WML_NS));
    out.push_str(concat!(
        "<w:docDefaults>",
        "<w:rPrDefault><w:rPr>",
        "<w:rFonts w:ascii=\"Calibri\" w:hAnsi=\"Calibri\" w:eastAsia=\"Calibri\" w:cs=\"Calibri\"/>",
        "<w:sz w:val=\"22\"/><w:szCs w:val=\"22\"/><w:lang w:val=\"en-US\"/>",
        "</w:rPr></w:rPrDefault>",
        "<w:pPrDefault><w:pPr><w:spacing w:after=\"160\" w:line=\"259\" w:lineRule=\"auto\"/></w:pPr></w:pPrDefault>",
        "</w:docDefaults>",
        "<w:style w:type=\"paragraph\" w:default=\"1\" w:styleId=\"Normal\">",
        "<w:name w:val=\"Normal\"/><w:qFormat/>",
        "</w:style>",
        "<w:style w:type=\"paragraph\" w:styleId=\"Title\">",
        "<w:name w:val=\"Title\"/><w:basedOn w:val=\"Normal\"/><w:next w:val=\"Normal\"/>",
        "<w:uiPriority w:val=\"10\"/><w:qFormat/>",
        "<w:pPr><w:spacing w:after=\"240\"/><w:jc w:val=\"center\"/></w:pPr>",
        "<w:rPr><w:b/><w:bCs/><w:sz w:val=\"48\"/><w:szCs w:val=\"48\"/></w:rPr>",
        "</w:style>"
    ));
    for (level, size, before) in [
        (1, 32, 360),
        (2, 28, 240),
        (3, 26, 240),
        (4, 24, 200),
        (5, 22, 200),
        (6, 22, 160),
    ] {
        out.push_str(&heading_style(level, size, before));
    }
    out.push_str(concat!(
        "<w:style w:type=\"paragraph\" w:styleId=\"ListParagraph\">",
        "<w:name w:val=\"List Paragraph\"/><w:basedOn w:val=\"Normal\"/>",
        "<w:uiPriority w:val=\"34\"/><w:qFormat/>",
        "<w:pPr><w:spacing w:after=\"60\"/><w:ind w:left=\"720\"/></w:pPr>",
        "</w:style>",
        "<w:style w:type=\"paragraph\" w:styleId=\"Header\">",
        "<w:name w:val=\"header\"/><w:basedOn w:val=\"Normal\"/>",
        "<w:pPr><w:spacing w:after=\"0\"/></w:pPr>",
        "</w:style>",
        "<w:style w:type=\"paragraph\" w:styleId=\"Footer\">",
        "<w:name w:val=\"footer\"/><w:basedOn w:val=\"Normal\"/>",
        "<w:pPr><w:spacing w:after=\"0\"/></w:pPr>",
        "</w:style>",
        "</w:styles>"
    ));
    out
}

/// Bullet list instance shared by every unordered item.
pub const BULLET_NUM_ID: u32 = 1;

/// Numbering definitions. `ordered_lists` is the number of separate
/// ordered lists; each gets its own instance restarting at 1, with ids
/// `BULLET_NUM_ID + 1 ..= BULLET_NUM_ID + ordered_lists`.
pub fn numbering(ordered_lists: u32) -> String {
    let mut out = String::from(XML_DECL);
    out.push_str(&format!("<w:numbering xmlns:w=\"{}\">", WML_NS));
    out.push_str(concat!(
        "<w:abstractNum w:abstractNumId=\"0\"><w:multiLevelType w:val=\"singleLevel\"/>",
        "<w:lvl w:ilvl=\"0\"><w:start w:val=\"1\"/><w:numFmt w:val=\"bullet\"/>",
        "<w:lvlText w:val=\"\u{2022}\"/><w:lvlJc w:val=\"left\"/>",
        "<w:pPr><w:ind w:left=\"720\" w:hanging=\"360\"/></w:pPr></w:lvl>",
        "</w:abstractNum>",
        "<w:abstractNum w:abstractNumId=\"1\"><w:multiLevelType w:val=\"singleLevel\"/>",
        "<w:lvl w:ilvl=\"0\"><w:start w:val=\"1\"/><w:numFmt w:val=\"decimal\"/>",
        "<w:lvlText w:val=\"%1.\"/><w:lvlJc w:val=\"left\"/>",
        "<w:pPr><w:ind w:left=\"720\" w:hanging=\"360\"/></w:pPr></w:lvl>",
        "</w:abstractNum>"
    ));
    out.push_str(&format!(
        "<w:num w:numId=\"{}\"><w:abstractNumId w:val=\"0\"/></w:num>",
        BULLET_NUM_ID
    ));
    for n in 1..=ordered_lists {
        out.push_str(&format!(
            concat!(
                "<w:num w:numId=\"{}\"><w:abstractNumId w:val=\"1\"/>",
                "<w:lvlOverride w:ilvl=\"0\"><w:startOverride w:val=\"1\"/></w:lvlOverride>",
                "</w:num>"
            ),
            BULLET_NUM_ID + n
        ));
    }
    out.push_str("</w:numbering>");
    out
}

pub fn settings() -> String {
    format!(
        concat!(
            "{}<w:settings xmlns:w=\"{}\">",
            "<w:defaultTabStop w:val=\"720\"/>",
            "<w:characterSpacingControl w:val=\"doNotCompress\"/>",
            "<w:compat><w:compatSetting w:name=\"compatibilityMode\" ",
            "w:uri=\"http://schemas.microsoft.com/office/word\" w:val=\"15\"/></w:compat>",
            "</w:settings>"
        ),
        XML_DECL, WML_NS
    )
}

/// Running header: the title, small and muted, right-aligned.
pub fn header(title: &str) -> String {
    let props = ParagraphProps {
        style: Some("Header"),
        align: Some("right"),
        ..Default::default()
    };
    let content = xml::run(title, TextStyle::default(), RunExtras::muted());
    format!(
        "{}<w:hdr xmlns:w=\"{}\" xmlns:r=\"{}\">{}</w:hdr>",
        XML_DECL,
        WML_NS,
        REL_NS,
        xml::paragraph(&props, &content)
    )
}

/// Footer with live "Page X of Y" fields.
pub fn footer() -> String {
    let props = ParagraphProps {
        style: Some("Footer"),
        align: Some("center"),
        ..Default::default()
    };
    let muted = RunExtras::muted();
    let plain = TextStyle::default();
    let mut content = xml::run("Page ", plain, muted);
    content.push_str(&xml::field("PAGE", "1", muted));
    content.push_str(&xml::run(" of ", plain, muted));
    content.push_str(&xml::field("NUMPAGES", "1", muted));
    format!(
        "{}<w:ftr xmlns:w=\"{}\" xmlns:r=\"{}\">{}</w:ftr>",
        XML_DECL,
        WML_NS,
        REL_NS,
        xml::paragraph(&props, &content)
    )
}

const W3CDTF: &str = "%Y-%m-%dT%H:%M:%SZ";

/// Core properties. Timestamps come from the metadata, never the clock.
pub fn core_properties(metadata: &DocumentMetadata) -> String {
    let author = metadata.author.as_deref().map(escape).unwrap_or_default();
    format!(
        concat!(
            "{decl}<cp:coreProperties ",
            "xmlns:cp=\"http://schemas.openxmlformats.org/package/2006/metadata/core-properties\" ",
            "xmlns:dc=\"http://purl.org/dc/elements/1.1/\" ",
            "xmlns:dcterms=\"http://purl.org/dc/terms/\" ",
            "xmlns:xsi=\"http://www.w3.org/2001/XMLSchema-instance\">",
            "<dc:title>{title}</dc:title>",
            "<dc:creator>{author}</dc:creator>",
            "<cp:lastModifiedBy>{author}</cp:lastModifiedBy>",
            "<dcterms:created xsi:type=\"dcterms:W3CDTF\">{created}</dcterms:created>",
            "<dcterms:modified xsi:type=\"dcterms:W3CDTF\">{modified}</dcterms:modified>",
            "</cp:coreProperties>"
        ),
        decl = XML_DECL,
        title = escape(metadata.display_title()),
        author = author,
        created = metadata.created_at.format(W3CDTF),
        modified = metadata.updated_at.format(W3CDTF)
    )
}

pub fn app_properties() -> String {
    format!(
        concat!(
            "{}<Properties xmlns=\"http://schemas.openxmlformats.org/officeDocument/2006/extended-properties\">",
            "<Application>lexdoc</Application><AppVersion>{}</AppVersion>",
            "</Properties>"
        ),
        XML_DECL,
        app_version()
    )
}

/// `AppVersion` must look like `XX.YYYY`.
fn app_version() -> String {
    let mut parts = env!("CARGO_PKG_VERSION").split('.');
    let major: u32 = parts.next().and_then(|p| p.parse().ok()).unwrap_or(0);
    let minor: u32 = parts.next().and_then(|p| p.parse().ok()).unwrap_or(0);
    format!("{:02}.{:04}", major, minor)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_numbering_restarts() {
        let xml = numbering(2);
        assert!(xml.contains("<w:num w:numId=\"1\"><w:abstractNumId w:val=\"0\"/></w:num>"));
        assert!(xml.contains("<w:num w:numId=\"2\"><w:abstractNumId w:val=\"1\"/>"));
        assert!(xml.contains("<w:num w:numId=\"3\"><w:abstractNumId w:val=\"1\"/>"));
        assert_eq!(xml.matches("startOverride").count(), 2);
        assert!(roxmltree::Document::parse(&xml).is_ok());
    }

    #[test]
    fn test_footer_fields() {
        let xml = footer();
        assert!(xml.contains(" PAGE "));
        assert!(xml.contains(" NUMPAGES "));
        assert!(xml.contains("<w:jc w:val=\"center\"/>"));
        assert!(roxmltree::Document::parse(&xml).is_ok());
    }

    #[test]
    fn test_header_escapes_title() {
        let xml = header("Smith & Sons <Lease>");
        assert!(xml.contains("Smith &amp; Sons &lt;Lease&gt;"));
        assert!(xml.contains(&format!("<w:color w:val=\"{}\"/>", xml::MUTED_COLOR)));
        assert!(roxmltree::Document::parse(&xml).is_ok());
    }

    #[test]
    fn test_core_properties_use_metadata_time() {
        let at = Utc.with_ymd_and_hms(2024, 3, 5, 8, 30, 0).unwrap();
        let metadata = DocumentMetadata::new("Lease")
            .with_author("Jane")
            .with_timestamps(at, at);
        let xml = core_properties(&metadata);
        assert!(xml.contains("<dc:creator>Jane</dc:creator>"));
        assert!(xml.contains("2024-03-05T08:30:00Z"));
        assert!(roxmltree::Document::parse(&xml).is_ok());
    }

    #[test]
    fn test_static_parts_are_well_formed() {
        for part in [
            content_types(),
            package_rels(),
            document_rels(&[("rId6".to_string(), "media/image1.png".to_string())]),
            styles(),
            settings(),
            app_properties(),
        ] {
            assert!(roxmltree::Document::parse(&part).is_ok(), "{}", part);
        }
    }
}
