//! Tag scanning shared by the segmenter and the run extractor.
//!
//! This is not an HTML tokenizer: it finds `<name ...>` and `</name>` in one
//! linear regex pass and ignores everything else, so malformed nesting can
//! never stall it.

use regex::Regex;
use std::ops::Range;
use std::sync::LazyLock;

/// The name must follow `<` or `</` directly, so prose like `a < b` is text.
static TAG_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"<(/)?([A-Za-z][A-Za-z0-9]*)((?:\s|/)[^<>]*)?>").unwrap()
});

/// Element tags plus `<!...>` and `<?...>` declarations.
static STRIP_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<(?:/?[A-Za-z]|[!?])[^<>]*>").unwrap());

static ATTR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)([a-z][a-z0-9_:-]*)\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'>]+))"#).unwrap()
});

/// One opening or closing tag found in markup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag<'a> {
    /// Lowercased element name
    pub name: String,

    /// `</name>` form
    pub closing: bool,

    /// Raw attribute text after the name
    pub attrs: &'a str,

    /// Byte range of the whole tag in the source
    pub range: Range<usize>,
}

impl<'a> Tag<'a> {
    /// Look up an attribute value (case-insensitive name, raw value).
    pub fn attr(&self, name: &str) -> Option<&'a str> {
        ATTR_RE.captures_iter(self.attrs).find_map(|caps| {
            if !caps[1].eq_ignore_ascii_case(name) {
                return None;
            }
            caps.get(2)
                .or_else(|| caps.get(3))
                .or_else(|| caps.get(4))
                .map(|m| m.as_str())
        })
    }
}

/// Iterate over all tags in document order.
pub fn scan(markup: &str) -> impl Iterator<Item = Tag<'_>> {
    TAG_RE.captures_iter(markup).filter_map(|caps| {
        let whole = caps.get(0)?;
        Some(Tag {
            name: caps[2].to_ascii_lowercase(),
            closing: caps.get(1).is_some(),
            attrs: caps.get(3).map_or("", |m| m.as_str()),
            range: whole.range(),
        })
    })
}

/// Remove every tag, leaving the text between them. Stray angle brackets
/// in prose are kept.
pub fn strip_tags(markup: &str) -> String {
    STRIP_RE.replace_all(markup, "").into_owned()
}

/// Heading level for `h1`..`h6`.
pub fn heading_level(name: &str) -> Option<u8> {
    match name {
        "h1" => Some(1),
        "h2" => Some(2),
        "h3" => Some(3),
        "h4" => Some(4),
        "h5" => Some(5),
        "h6" => Some(6),
        _ => None,
    }
}
