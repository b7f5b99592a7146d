//! Markup sanitizing: non-content removal and character entity decoding.
//!
//! Sanitizing never fails. Anything the patterns cannot match is left in
//! place, with one exception: an unterminated `<script` or `<style` drops
//! everything after it, so their content can never reach an output.

use regex::Regex;
use std::borrow::Cow;
use std::sync::LazyLock;

// Leftmost-first alternation: a comment opener inside a script body is
// consumed by the script match, and a script tag inside a comment by the
// comment match.
static NON_CONTENT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?is)<!--.*?-->|<script\b[^>]*>.*?</script\s*>|<style\b[^>]*>.*?</style\s*>|<head\b[^>]*>.*?</head\s*>",
    )
    .unwrap()
});

static UNTERMINATED_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<(?:script|style)\b").unwrap());

/// Remove scripts, styles, comments and the document head.
pub fn strip_non_content(markup: &str) -> String {
    let stripped = NON_CONTENT_RE.replace_all(markup, "");
    match UNTERMINATED_RE.find(&stripped) {
        Some(m) => {
            log::warn!(
                "Unterminated script/style at byte {}; dropping {} trailing bytes",
                m.start(),
                stripped.len() - m.start()
            );
            stripped[..m.start()].to_string()
        }
        None => stripped.into_owned(),
    }
}

/// Strip non-content markup and decode entities.
///
/// The result still contains tags. The conversion pipeline decodes entities
/// per text segment instead, after tags have been located, so that an encoded
/// `&lt;b&gt;` stays literal text.
pub fn sanitize(markup: &str) -> String {
    decode_entities(&strip_non_content(markup)).into_owned()
}

/// Decode named and numeric character references.
///
/// `&nbsp;` becomes a plain space. Unknown or malformed references are kept
/// verbatim.
pub fn decode_entities(text: &str) -> Cow<'_, str> {
    if !text.contains('&') {
        return Cow::Borrowed(text);
    }

    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let tail = &rest[amp..];
        // Longest reference we recognise is well under 12 bytes.
        let semi = tail
            .char_indices()
            .take(12)
            .find(|&(_, c)| c == ';')
            .map(|(i, _)| i);
        match semi.and_then(|end| decode_reference(&tail[1..end]).map(|c| (c, end))) {
            Some((decoded, end)) => {
                out.push(decoded);
                rest = &tail[end + 1..];
            }
            None => {
                out.push('&');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    Cow::Owned(out)
}

fn decode_reference(name: &str) -> Option<char> {
    if let Some(num) = name.strip_prefix('#') {
        let code = match num.strip_prefix(['x', 'X']) {
            Some(hex) => u32::from_str_radix(hex, 16).ok()?,
            None => num.parse::<u32>().ok()?,
        };
        return match code {
            0 => None,
            _ => char::from_u32(code),
        };
    }

    let c = match name {
        "nbsp" => ' ',
        "amp" => '&',
        "lt" => '<',
        "gt" => '>',
        "quot" => '"',
        "apos" => '\'',
        "sect" => '§',
        "para" => '¶',
        "copy" => '©',
        "reg" => '®',
        "trade" => '™',
        "mdash" => '—',
        "ndash" => '–',
        "hellip" => '…',
        "lsquo" => '‘',
        "rsquo" => '’',
        "ldquo" => '“',
        "rdquo" => '”',
        "bull" => '•',
        "middot" => '·',
        "deg" => '°',
        "euro" => '€',
        "pound" => '£',
        "yen" => '¥',
        "cent" => '¢',
        _ => return None,
    };
    Some(c)
}
