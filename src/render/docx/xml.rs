//! WordprocessingML fragments.

use crate::model::{TextRun, TextStyle};

/// Main WordprocessingML namespace.
pub const WML_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";

/// Office document relationships namespace.
pub const REL_NS: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";

pub const XML_DECL: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#;

/// Muted grey used by the header, footer and signature dates.
pub const MUTED_COLOR: &str = "808080";

/// Half-points; 9pt.
pub const SMALL_SIZE: u32 = 18;

/// Escape text for element or attribute content and drop characters that
/// XML 1.0 does not allow at all.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            c if is_xml_char(c) => out.push(c),
            _ => {}
        }
    }
    out
}

fn is_xml_char(c: char) -> bool {
    matches!(c, '\t' | '\n' | '\r') || (c >= '\u{20}' && c != '\u{FFFE}' && c != '\u{FFFF}')
}

/// Extra run properties beyond the four style flags.
#[derive(Debug, Clone, Copy, Default)]
pub struct RunExtras<'a> {
    /// Hex RGB color
    pub color: Option<&'a str>,
    /// Size in half-points
    pub size: Option<u32>,
}

impl RunExtras<'_> {
    pub fn muted() -> Self {
        Self {
            color: Some(MUTED_COLOR),
            size: Some(SMALL_SIZE),
        }
    }
}

/// `<w:rPr>` for a style, empty when nothing is set. Children follow the
/// schema order: b, i, strike, color, sz, u.
pub fn run_properties(style: TextStyle, extras: RunExtras<'_>) -> String {
    let mut props = String::new();
    if style.bold {
        props.push_str("<w:b/><w:bCs/>");
    }
    if style.italic {
        props.push_str("<w:i/><w:iCs/>");
    }
    if style.strike {
        props.push_str("<w:strike/>");
    }
    if let Some(color) = extras.color {
        props.push_str(&format!("<w:color w:val=\"{}\"/>", color));
    }
    if let Some(size) = extras.size {
        props.push_str(&format!("<w:sz w:val=\"{0}\"/><w:szCs w:val=\"{0}\"/>", size));
    }
    if style.underline {
        props.push_str("<w:u w:val=\"single\"/>");
    }

    if props.is_empty() {
        props
    } else {
        format!("<w:rPr>{}</w:rPr>", props)
    }
}

/// A text run, or nothing for empty text.
pub fn run(text: &str, style: TextStyle, extras: RunExtras<'_>) -> String {
    let text = escape(text);
    if text.is_empty() {
        return String::new();
    }
    format!(
        "<w:r>{}<w:t xml:space=\"preserve\">{}</w:t></w:r>",
        run_properties(style, extras),
        text
    )
}

/// Runs for a model block.
pub fn runs(runs: &[TextRun]) -> String {
    runs.iter()
        .map(|r| run(&r.text, r.style, RunExtras::default()))
        .collect()
}

/// A complex field such as `PAGE` or `NUMPAGES`, with a placeholder result
/// the word processor replaces on open.
pub fn field(instruction: &str, placeholder: &str, extras: RunExtras<'_>) -> String {
    let props = run_properties(TextStyle::default(), extras);
    format!(
        concat!(
            "<w:r>{p}<w:fldChar w:fldCharType=\"begin\"/></w:r>",
            "<w:r>{p}<w:instrText xml:space=\"preserve\"> {i} </w:instrText></w:r>",
            "<w:r>{p}<w:fldChar w:fldCharType=\"separate\"/></w:r>",
            "<w:r>{p}<w:t>{v}</w:t></w:r>",
            "<w:r>{p}<w:fldChar w:fldCharType=\"end\"/></w:r>"
        ),
        p = props,
        i = instruction,
        v = escape(placeholder)
    )
}

/// Paragraph properties builder, emitting children in schema order.
#[derive(Debug, Clone, Default)]
pub struct ParagraphProps<'a> {
    pub style: Option<&'a str>,
    pub keep_next: bool,
    pub numbering: Option<u32>,
    pub bottom_border: bool,
    pub space_after: Option<u32>,
    pub indent_right: Option<u32>,
    pub align: Option<&'a str>,
}

impl ParagraphProps<'_> {
    fn render(&self) -> String {
        let mut props = String::new();
        if let Some(style) = self.style {
            props.push_str(&format!("<w:pStyle w:val=\"{}\"/>", style));
        }
        if self.keep_next {
            props.push_str("<w:keepNext/>");
        }
        if let Some(num_id) = self.numbering {
            props.push_str(&format!(
                "<w:numPr><w:ilvl w:val=\"0\"/><w:numId w:val=\"{}\"/></w:numPr>",
                num_id
            ));
        }
        if self.bottom_border {
            props.push_str(
                "<w:pBdr><w:bottom w:val=\"single\" w:sz=\"6\" w:space=\"1\" w:color=\"000000\"/></w:pBdr>",
            );
        }
        if let Some(after) = self.space_after {
            props.push_str(&format!("<w:spacing w:after=\"{}\"/>", after));
        }
        if let Some(right) = self.indent_right {
            props.push_str(&format!("<w:ind w:right=\"{}\"/>", right));
        }
        if let Some(align) = self.align {
            props.push_str(&format!("<w:jc w:val=\"{}\"/>", align));
        }

        if props.is_empty() {
            props
        } else {
            format!("<w:pPr>{}</w:pPr>", props)
        }
    }
}

/// A complete `<w:p>` element.
pub fn paragraph(props: &ParagraphProps<'_>, content: &str) -> String {
    format!("<w:p>{}{}</w:p>", props.render(), content)
}
