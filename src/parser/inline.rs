//! Inline run extraction.
//!
//! Formatting tags adjust per-flag depth counters and every text segment
//! takes the OR of the active flags. Overlapping tags therefore never nest
//! runs; `<b>a<i>b</b>c</i>` yields bold "a", bold+italic "b", italic "c".

use super::sanitize::decode_entities;
use super::tag;
use crate::model::{TextRun, TextStyle};

const BOLD: usize = 0;
const ITALIC: usize = 1;
const UNDERLINE: usize = 2;
const STRIKE: usize = 3;

/// Punctuation that attaches to the preceding formatted word.
const TRAILING_PUNCT: &[char] = &['.', ',', ';', ':', '!', '?', ')', ']', '\'', '"', '’', '”'];

fn flag_index(name: &str) -> Option<usize> {
    match name {
        "strong" | "b" => Some(BOLD),
        "em" | "i" => Some(ITALIC),
        "u" | "ins" => Some(UNDERLINE),
        "s" | "strike" | "del" => Some(STRIKE),
        _ => None,
    }
}

#[derive(Debug, Default)]
struct RunBuilder {
    runs: Vec<TextRun>,
}

impl RunBuilder {
    fn ends_with_space(&self) -> bool {
        self.runs.last().map_or(true, |run| run.text.ends_with(' '))
    }

    fn push(&mut self, raw: &str, style: TextStyle) {
        let text = decode_entities(&tag::strip_tags(raw)).into_owned();
        let glued = !text.starts_with(|c: char| c.is_ascii_whitespace());
        let mut text = collapse_whitespace(&text);
        if self.ends_with_space() && text.starts_with(' ') {
            text.remove(0);
        }
        if text.is_empty() {
            return;
        }

        if text == " " {
            // Whitespace between runs belongs to the run before it.
            if let Some(last) = self.runs.last_mut() {
                last.text.push(' ');
            }
            return;
        }

        let mut rest = text.as_str();
        if glued && !style.has_styling() {
            if let Some(last) = self.runs.last_mut() {
                if last.style.has_styling() && !last.text.ends_with(' ') {
                    let split = rest
                        .find(|c: char| !TRAILING_PUNCT.contains(&c))
                        .unwrap_or(rest.len());
                    // Only a prefix that ends the word joins; `'s` stays put.
                    let ends_word = rest[split..].chars().next().map_or(true, |c| c == ' ');
                    if ends_word {
                        last.text.push_str(&rest[..split]);
                        rest = &rest[split..];
                    }
                }
            }
        }
        if rest.is_empty() {
            return;
        }

        match self.runs.last_mut() {
            Some(last) if last.style == style => last.text.push_str(rest),
            _ => self.runs.push(TextRun::styled(rest, style)),
        }
    }

    fn finish(mut self) -> Vec<TextRun> {
        while let Some(last) = self.runs.last_mut() {
            let trimmed = last.text.trim_end().len();
            last.text.truncate(trimmed);
            if !last.text.is_empty() {
                break;
            }
            self.runs.pop();
        }
        self.runs
    }
}

/// Collapse ASCII whitespace runs to one space, keeping a single leading or
/// trailing space where there was one.
fn collapse_whitespace(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_space = false;
    for c in text.chars() {
        if c.is_ascii_whitespace() {
            if !in_space {
                out.push(' ');
            }
            in_space = true;
        } else {
            out.push(c);
            in_space = false;
        }
    }
    out
}

/// Extract styled runs from one block span's markup.
///
/// Unknown tags are stripped. An unmatched closing tag is ignored and an
/// unterminated opening tag lasts to the end of the span. Adjacent runs
/// with equal styles are merged and the span's outer whitespace trimmed.
pub fn extract_runs(markup: &str) -> Vec<TextRun> {
    let mut depth = [0u32; 4];
    let mut builder = RunBuilder::default();
    let mut last = 0;

    for tag in tag::scan(markup) {
        let Some(index) = flag_index(&tag.name) else {
            continue;
        };
        builder.push(&markup[last..tag.range.start], style_of(&depth));
        last = tag.range.end;

        if tag.closing {
            depth[index] = depth[index].saturating_sub(1);
        } else if !tag.attrs.trim_end().ends_with('/') {
            depth[index] += 1;
        }
    }
    builder.push(&markup[last..], style_of(&depth));

    builder.finish()
}

fn style_of(depth: &[u32; 4]) -> TextStyle {
    TextStyle {
        bold: depth[BOLD] > 0,
        italic: depth[ITALIC] > 0,
        underline: depth[UNDERLINE] > 0,
        strike: depth[STRIKE] > 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn style(bold: bool, italic: bool) -> TextStyle {
        TextStyle {
            bold,
            italic,
            ..Default::default()
        }
    }

    #[test]
    fn test_plain_text_single_run() {
        assert_eq!(extract_runs("  Just text  "), vec![TextRun::new("Just text")]);
    }

    #[test]
    fn test_punctuation_joins_formatted_run() {
        let runs = extract_runs("This is <strong>binding</strong>.");
        assert_eq!(runs, vec![TextRun::new("This is "), TextRun::bold("binding.")]);
    }

    #[test]
    fn test_punctuation_with_trailing_text() {
        let runs = extract_runs("<em>Tenant</em>, the party");
        assert_eq!(runs, vec![TextRun::italic("Tenant,"), TextRun::new(" the party")]);
    }

    #[test]
    fn test_possessive_stays_with_following_word() {
        let runs = extract_runs("<b>Tenant</b>'s duty");
        assert_eq!(runs, vec![TextRun::bold("Tenant"), TextRun::new("'s duty")]);
    }

    #[test]
    fn test_quote_before_word_stays_plain() {
        let runs = extract_runs("<i>Lease</i>\"s\" end");
        assert_eq!(runs, vec![TextRun::italic("Lease"), TextRun::new("\"s\" end")]);
    }

    #[test]
    fn test_closing_quote_joins_formatted_run() {
        let runs = extract_runs("called \"<b>Premises</b>\", being");
        assert_eq!(
            runs,
            vec![
                TextRun::new("called \""),
                TextRun::bold("Premises\","),
                TextRun::new(" being"),
            ]
        );
    }

    #[test]
    fn test_spaced_punctuation_stays_plain() {
        let runs = extract_runs("<b>Note</b> : see below");
        assert_eq!(runs, vec![TextRun::bold("Note"), TextRun::new(" : see below")]);
    }

    #[test]
    fn test_nested_flags_combine() {
        let runs = extract_runs("<b>a<i>b</i></b>");
        assert_eq!(
            runs,
            vec![TextRun::styled("a", style(true, false)), TextRun::styled("b", style(true, true))]
        );
    }

    #[test]
    fn test_overlapping_tags() {
        let runs = extract_runs("<b>a<i>b</b>c</i>");
        assert_eq!(
            runs,
            vec![
                TextRun::styled("a", style(true, false)),
                TextRun::styled("b", style(true, true)),
                TextRun::styled("c", style(false, true)),
            ]
        );
    }

    #[test]
    fn test_underline_and_strike() {
        let runs = extract_runs("<u>under</u> <del>gone</del>");
        assert!(runs[0].style.underline);
        assert_eq!(runs[0].text, "under ");
        assert!(runs[1].style.strike);
        assert_eq!(runs[1].text, "gone");
    }

    #[test]
    fn test_unmatched_close_ignored() {
        let runs = extract_runs("plain</b> still plain");
        assert_eq!(runs, vec![TextRun::new("plain still plain")]);
    }

    #[test]
    fn test_unterminated_open_runs_to_end() {
        assert_eq!(extract_runs("<b>Bold"), vec![TextRun::bold("Bold")]);
    }

    #[test]
    fn test_adjacent_equal_styles_merge() {
        let runs = extract_runs("<b>one</b><strong> two</strong>");
        assert_eq!(runs, vec![TextRun::bold("one two")]);
    }

    #[test]
    fn test_whitespace_collapses_across_tags() {
        let runs = extract_runs("Hello \n <span> world </span>\t!");
        assert_eq!(runs, vec![TextRun::new("Hello world !")]);
    }

    #[test]
    fn test_entities_decoded_after_tags() {
        let runs = extract_runs("&lt;b&gt;literal&lt;/b&gt; &amp; more");
        assert_eq!(runs, vec![TextRun::new("<b>literal</b> & more")]);
    }

    #[test]
    fn test_empty_markup() {
        assert!(extract_runs("").is_empty());
        assert!(extract_runs("<b> </b>").is_empty());
    }
}
