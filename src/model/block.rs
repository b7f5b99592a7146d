//! Block-level and run-level types.

use serde::{Deserialize, Serialize};

use super::ImageSource;

/// Character formatting carried by a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TextStyle {
    /// Bold text
    pub bold: bool,

    /// Italic text
    pub italic: bool,

    /// Underlined text
    pub underline: bool,

    /// Strikethrough text
    pub strike: bool,
}

impl TextStyle {
    /// Check if any styling is applied.
    pub fn has_styling(&self) -> bool {
        self.bold || self.italic || self.underline || self.strike
    }

    /// OR-combine two flag sets.
    pub fn union(self, other: TextStyle) -> TextStyle {
        TextStyle {
            bold: self.bold || other.bold,
            italic: self.italic || other.italic,
            underline: self.underline || other.underline,
            strike: self.strike || other.strike,
        }
    }
}

/// A run of text with consistent styling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextRun {
    /// The text content
    pub text: String,

    /// Character formatting
    #[serde(flatten)]
    pub style: TextStyle,
}

impl TextRun {
    /// Create a new unformatted run.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            style: TextStyle::default(),
        }
    }

    /// Create a run with the given style.
    pub fn styled(text: impl Into<String>, style: TextStyle) -> Self {
        Self {
            text: text.into(),
            style,
        }
    }

    /// Create a bold run.
    pub fn bold(text: impl Into<String>) -> Self {
        Self::styled(
            text,
            TextStyle {
                bold: true,
                ..Default::default()
            },
        )
    }

    /// Create an italic run.
    pub fn italic(text: impl Into<String>) -> Self {
        Self::styled(
            text,
            TextStyle {
                italic: true,
                ..Default::default()
            },
        )
    }

    /// A run is blank when it has nothing but whitespace.
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// A block-level element of the document body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Block {
    /// A heading, level 1 through 6
    Heading {
        /// Heading level (clamped to 1..=6 on output)
        level: u8,
        /// Text runs
        runs: Vec<TextRun>,
    },

    /// A body paragraph
    Paragraph {
        /// Text runs
        runs: Vec<TextRun>,
    },

    /// A single list item
    ListItem {
        /// Numbered (`<ol>`) or bulleted (`<ul>`)
        ordered: bool,
        /// Text runs
        runs: Vec<TextRun>,
    },

    /// A standalone image
    Image {
        /// Image payload or reference
        src: ImageSource,
        /// Alternative text
        alt_text: String,
    },

    /// A hard break between content (rendered as a page break)
    Break,
}

impl Block {
    /// Create a heading block.
    pub fn heading(level: u8, runs: Vec<TextRun>) -> Self {
        Block::Heading { level, runs }
    }

    /// Create a paragraph block.
    pub fn paragraph(runs: Vec<TextRun>) -> Self {
        Block::Paragraph { runs }
    }

    /// Create a paragraph holding one plain run.
    pub fn text(text: impl Into<String>) -> Self {
        Block::Paragraph {
            runs: vec![TextRun::new(text)],
        }
    }

    /// Create a list item block.
    pub fn list_item(ordered: bool, runs: Vec<TextRun>) -> Self {
        Block::ListItem { ordered, runs }
    }

    /// Text runs of this block, empty for images and breaks.
    pub fn runs(&self) -> &[TextRun] {
        match self {
            Block::Heading { runs, .. }
            | Block::Paragraph { runs }
            | Block::ListItem { runs, .. } => runs,
            Block::Image { .. } | Block::Break => &[],
        }
    }

    fn runs_mut(&mut self) -> Option<&mut Vec<TextRun>> {
        match self {
            Block::Heading { runs, .. }
            | Block::Paragraph { runs }
            | Block::ListItem { runs, .. } => Some(runs),
            Block::Image { .. } | Block::Break => None,
        }
    }

    /// Drop blank runs in place.
    pub(crate) fn retain_content(&mut self) {
        if let Some(runs) = self.runs_mut() {
            runs.retain(|run| !run.is_blank());
        }
    }

    /// Concatenated run text.
    pub fn plain_text(&self) -> String {
        match self {
            Block::Image { alt_text, .. } => alt_text.clone(),
            Block::Break => String::new(),
            _ => self.runs().iter().map(|r| r.text.as_str()).collect(),
        }
    }

    /// A block is empty when it would render nothing.
    pub fn is_empty(&self) -> bool {
        match self {
            Block::Image { src, .. } => src.is_empty(),
            Block::Break => false,
            _ => self.runs().iter().all(TextRun::is_blank),
        }
    }

    /// Check if this is a heading.
    pub fn is_heading(&self) -> bool {
        matches!(self, Block::Heading { .. })
    }

    /// Check if this is a list item.
    pub fn is_list_item(&self) -> bool {
        matches!(self, Block::ListItem { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_plain_text() {
        let block = Block::paragraph(vec![
            TextRun::new("Hello "),
            TextRun::bold("world"),
            TextRun::new("!"),
        ]);
        assert_eq!(block.plain_text(), "Hello world!");
    }

    #[test]
    fn test_block_is_empty() {
        assert!(Block::paragraph(vec![]).is_empty());
        assert!(Block::paragraph(vec![TextRun::new("  \n")]).is_empty());
        assert!(!Block::text("x").is_empty());
        assert!(!Block::Break.is_empty());
        assert!(Block::Image {
            src: ImageSource::Uri(String::new()),
            alt_text: "logo".into(),
        }
        .is_empty());
    }

    #[test]
    fn test_retain_content_drops_blank_runs() {
        let mut block = Block::heading(2, vec![TextRun::new(" "), TextRun::new("Terms")]);
        block.retain_content();
        assert_eq!(block.runs(), &[TextRun::new("Terms")]);
    }

    #[test]
    fn test_text_style_union() {
        let bold = TextStyle {
            bold: true,
            ..Default::default()
        };
        let italic = TextStyle {
            italic: true,
            ..Default::default()
        };
        let both = bold.union(italic);
        assert!(both.bold && both.italic);
        assert!(!both.underline && !both.strike);
        assert!(!TextStyle::default().has_styling());
    }

    #[test]
    fn test_block_serde_tag() {
        let json = serde_json::to_string(&Block::list_item(true, vec![TextRun::new("a")])).unwrap();
        assert!(json.contains("\"type\":\"list_item\""));
        assert!(json.contains("\"ordered\":true"));
    }
}
