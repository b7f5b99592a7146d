//! Block segmentation.
//!
//! Every block-level tag, opening or closing, is a split point. No tree is
//! built, so an unterminated `<p>` simply ends at the next boundary and the
//! scan is always a single linear pass.

use super::sanitize::decode_entities;
use super::tag::{self, heading_level, Tag};

/// What a text span was enclosed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpanKind {
    /// Inside `h1`..`h6`
    Heading(u8),
    /// Inside a paragraph-like container
    Paragraph,
    /// Inside `li`
    ListItem {
        /// Parent list is `ol`
        ordered: bool,
    },
    /// Loose text between blocks
    Text,
}

/// One segment of sanitized markup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawBlock<'a> {
    /// A text span with its inline markup still in place
    Text {
        /// Enclosing block kind
        kind: SpanKind,
        /// Markup between the two boundaries
        markup: &'a str,
    },
    /// An `<img>` tag
    Image {
        /// Decoded `src` attribute
        src: String,
        /// Decoded `alt` attribute, empty if absent
        alt: String,
    },
    /// An `<hr>` tag
    Break,
}

fn is_boundary(name: &str) -> bool {
    heading_level(name).is_some()
        || matches!(
            name,
            "p" | "div"
                | "ul"
                | "ol"
                | "li"
                | "table"
                | "thead"
                | "tbody"
                | "tfoot"
                | "tr"
                | "td"
                | "th"
                | "blockquote"
                | "section"
                | "article"
                | "header"
                | "footer"
                | "pre"
                | "br"
                | "hr"
                | "img"
                | "html"
                | "body"
                | "main"
                | "nav"
                | "aside"
                | "figure"
                | "figcaption"
                | "caption"
                | "dl"
                | "dt"
                | "dd"
                | "address"
        )
}

/// Containers whose own text is not a block of its own.
fn is_structural(name: &str) -> bool {
    matches!(
        name,
        "ul" | "ol" | "table" | "thead" | "tbody" | "tfoot" | "tr" | "html" | "body" | "dl"
    )
}

#[derive(Debug, Default)]
struct Segmenter<'a> {
    blocks: Vec<RawBlock<'a>>,
    list_stack: Vec<bool>,
    list_item: Option<bool>,
}

impl<'a> Segmenter<'a> {
    fn push_span(&mut self, kind: SpanKind, markup: &'a str) {
        if has_visible_text(markup) {
            self.blocks.push(RawBlock::Text { kind, markup });
        }
    }

    /// Kind for the span following `tag`.
    fn next_kind(&mut self, tag: &Tag<'_>, current: SpanKind) -> SpanKind {
        let in_item = |item: Option<bool>| match item {
            Some(ordered) => SpanKind::ListItem { ordered },
            None => SpanKind::Text,
        };

        if tag.closing {
            match tag.name.as_str() {
                "li" => self.list_item = None,
                "ul" | "ol" => {
                    self.list_stack.pop();
                    self.list_item = None;
                }
                _ => {}
            }
            return in_item(self.list_item);
        }

        match tag.name.as_str() {
            "br" => current,
            "img" => {
                let src = tag.attr("src").map(decode_entities).unwrap_or_default();
                let alt = tag.attr("alt").map(decode_entities).unwrap_or_default();
                self.blocks.push(RawBlock::Image {
                    src: src.trim().to_string(),
                    alt: alt.trim().to_string(),
                });
                current
            }
            "hr" => {
                self.blocks.push(RawBlock::Break);
                in_item(self.list_item)
            }
            "ul" | "ol" => {
                self.list_stack.push(tag.name == "ol");
                self.list_item = None;
                SpanKind::Text
            }
            "li" => {
                let ordered = self.list_stack.last().copied().unwrap_or(false);
                self.list_item = Some(ordered);
                SpanKind::ListItem { ordered }
            }
            name => {
                if let Some(level) = heading_level(name) {
                    SpanKind::Heading(level)
                } else if is_structural(name) {
                    SpanKind::Text
                } else if self.list_item.is_some() {
                    in_item(self.list_item)
                } else {
                    SpanKind::Paragraph
                }
            }
        }
    }
}

/// Split sanitized markup into raw block spans in document order.
///
/// Spans without visible text are discarded.
pub fn segment(markup: &str) -> Vec<RawBlock<'_>> {
    let mut seg = Segmenter::default();
    let mut kind = SpanKind::Text;
    let mut start = 0;

    for tag in tag::scan(markup) {
        if !is_boundary(&tag.name) {
            continue;
        }
        seg.push_span(kind, &markup[start..tag.range.start]);
        start = tag.range.end;
        kind = seg.next_kind(&tag, kind);
    }
    seg.push_span(kind, &markup[start..]);

    seg.blocks
}

fn has_visible_text(markup: &str) -> bool {
    !decode_entities(&tag::strip_tags(markup)).trim().is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(blocks: &[RawBlock<'_>]) -> Vec<SpanKind> {
        blocks
            .iter()
            .filter_map(|b| match b {
                RawBlock::Text { kind, .. } => Some(*kind),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_heading_and_paragraph() {
        let blocks = segment("<h1>Agreement</h1><p>This is <strong>binding</strong>.</p>");
        assert_eq!(
            blocks,
            vec![
                RawBlock::Text {
                    kind: SpanKind::Heading(1),
                    markup: "Agreement"
                },
                RawBlock::Text {
                    kind: SpanKind::Paragraph,
                    markup: "This is <strong>binding</strong>."
                },
            ]
        );
    }

    #[test]
    fn test_unterminated_tags() {
        let blocks = segment("<p><b>Bold<p>Next");
        assert_eq!(
            blocks,
            vec![
                RawBlock::Text {
                    kind: SpanKind::Paragraph,
                    markup: "<b>Bold"
                },
                RawBlock::Text {
                    kind: SpanKind::Paragraph,
                    markup: "Next"
                },
            ]
        );
    }

    #[test]
    fn test_whitespace_spans_discarded() {
        let blocks = segment("<div>\n  <p> </p>&nbsp;<p>Body</p>\n</div>");
        assert_eq!(kinds(&blocks), vec![SpanKind::Paragraph]);
    }

    #[test]
    fn test_lists() {
        let blocks = segment("<ol><li>One</li><li><p>Two</p></li></ol><ul><li>Dot</li></ul>After");
        assert_eq!(
            kinds(&blocks),
            vec![
                SpanKind::ListItem { ordered: true },
                SpanKind::ListItem { ordered: true },
                SpanKind::ListItem { ordered: false },
                SpanKind::Text,
            ]
        );
    }

    #[test]
    fn test_br_keeps_kind() {
        let blocks = segment("<h2>Line one<br>Line two</h2>");
        assert_eq!(kinds(&blocks), vec![SpanKind::Heading(2), SpanKind::Heading(2)]);
    }

    #[test]
    fn test_image_and_break() {
        let blocks = segment(r#"<p>Before<img src="data:image/png;base64,AA&amp;" alt="Seal">after</p><hr/>"#);
        assert_eq!(blocks.len(), 4);
        assert_eq!(
            blocks[1],
            RawBlock::Image {
                src: "data:image/png;base64,AA&".to_string(),
                alt: "Seal".to_string()
            }
        );
        assert_eq!(
            blocks[2],
            RawBlock::Text {
                kind: SpanKind::Paragraph,
                markup: "after"
            }
        );
        assert_eq!(blocks[3], RawBlock::Break);
    }

    #[test]
    fn test_table_cells_are_paragraphs() {
        let blocks = segment("<table><tr><td>Party</td><td>Role</td></tr></table>");
        assert_eq!(kinds(&blocks), vec![SpanKind::Paragraph, SpanKind::Paragraph]);
    }

    #[test]
    fn test_inline_tags_are_not_boundaries() {
        let blocks = segment("<p>A <span>b</span> <a href=\"#\">c</a></p>");
        assert_eq!(blocks.len(), 1);
    }
}
