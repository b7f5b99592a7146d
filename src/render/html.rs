//! Simplified HTML projection of plain or markdown-like text.

use regex::Regex;
use std::sync::LazyLock;

static BLANK_LINE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n[ \t]*\n").unwrap());
static STRONG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\*\*(.+?)\*\*").unwrap());
static EM_STAR_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\*([^*\n]+?)\*").unwrap());
static EM_UNDERSCORE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b_([^_\n]+?)_\b").unwrap());

/// Convert plain or markdown-like text to simple HTML.
///
/// HTML-special characters are escaped first, so the input can never inject
/// markup. Supported syntax: `# `, `## ` and `### ` headings at line start,
/// `**bold**`, `*em*` and `_em_`. Blank lines separate paragraphs; single
/// newlines inside a paragraph become `<br>`. This does not invert
/// [`to_plain_text`](super::to_plain_text).
pub fn to_html(text: &str) -> String {
    let text = escape_html(&text.replace("\r\n", "\n"));
    let mut out: Vec<String> = Vec::new();

    for chunk in BLANK_LINE_RE.split(&text) {
        let mut lines: Vec<&str> = Vec::new();
        for line in chunk.lines() {
            match heading(line) {
                Some((level, content)) => {
                    flush_paragraph(&mut out, &mut lines);
                    out.push(format!("<h{0}>{1}</h{0}>", level, inline(content.trim())));
                }
                None if line.trim().is_empty() => {}
                None => lines.push(line.trim()),
            }
        }
        flush_paragraph(&mut out, &mut lines);
    }

    out.join("\n")
}

fn heading(line: &str) -> Option<(usize, &str)> {
    let line = line.trim_start();
    ["### ", "## ", "# "].iter().find_map(|prefix| {
        line.strip_prefix(prefix)
            .map(|content| (prefix.len() - 1, content))
    })
}

fn flush_paragraph(out: &mut Vec<String>, lines: &mut Vec<&str>) {
    if lines.is_empty() {
        return;
    }
    let body: Vec<String> = lines.iter().map(|l| inline(l)).collect();
    out.push(format!("<p>{}</p>", body.join("<br>")));
    lines.clear();
}

fn inline(text: &str) -> String {
    let text = STRONG_RE.replace_all(text, "<strong>$1</strong>");
    let text = EM_STAR_RE.replace_all(&text, "<em>$1</em>");
    EM_UNDERSCORE_RE
        .replace_all(&text, "<em>$1</em>")
        .into_owned()
}

/// Escape the five HTML-special characters.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
