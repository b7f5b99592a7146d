//! Heading classification for spans without tag evidence.
//!
//! Tagged headings (`<h1>`..`<h6>`) are always trusted. Everything else goes
//! through a [`HeadingClassifier`], and only if the caller opts in: the
//! length heuristic misreads short declarative sentences as headings.

use std::fmt;
use std::sync::Arc;

/// Confidence assigned to a heading that came from an `h1`..`h6` tag.
pub const TAG_CONFIDENCE: f32 = 1.0;

/// Result of classifying one span.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeadingGuess {
    /// Proposed heading level, 1..=6
    pub level: u8,

    /// How sure the classifier is, 0.0..=1.0
    pub confidence: f32,
}

/// Decides whether untagged text reads like a heading.
///
/// Implementations receive the span's visible text after whitespace
/// collapsing and must be pure: the same text always yields the same guess.
/// A guess below the parser's minimum confidence is ignored.
pub trait HeadingClassifier: Send + Sync {
    /// Classify the text, or return `None` for body text.
    fn classify(&self, text: &str) -> Option<HeadingGuess>;
}

/// Short text without a terminal period is a heading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LengthHeuristic {
    /// Texts of this many characters or more are body text
    pub max_len: usize,

    /// Level assigned to inferred headings
    pub level: u8,
}

impl Default for LengthHeuristic {
    fn default() -> Self {
        Self {
            max_len: 100,
            level: 2,
        }
    }
}

impl HeadingClassifier for LengthHeuristic {
    fn classify(&self, text: &str) -> Option<HeadingGuess> {
        let text = text.trim();
        if text.is_empty() || text.chars().count() >= self.max_len || text.ends_with('.') {
            return None;
        }
        Some(HeadingGuess {
            level: self.level.clamp(1, 6),
            confidence: 0.5,
        })
    }
}

/// How headings are recognised.
#[derive(Clone, Default)]
pub enum HeadingDetection {
    /// Only `h1`..`h6` tags produce headings
    #[default]
    TagsOnly,

    /// Additionally apply [`LengthHeuristic`] to untagged spans
    Heuristic {
        /// See [`LengthHeuristic::max_len`]
        max_len: usize,
        /// See [`LengthHeuristic::level`]
        level: u8,
    },

    /// Additionally apply a caller-supplied classifier
    Custom(Arc<dyn HeadingClassifier>),
}

impl HeadingDetection {
    /// Length heuristic with the usual limits (under 100 characters, level 2).
    pub fn heuristic() -> Self {
        let defaults = LengthHeuristic::default();
        HeadingDetection::Heuristic {
            max_len: defaults.max_len,
            level: defaults.level,
        }
    }

    /// Classify untagged text. Always `None` for [`HeadingDetection::TagsOnly`].
    pub fn classify(&self, text: &str) -> Option<HeadingGuess> {
        match self {
            HeadingDetection::TagsOnly => None,
            HeadingDetection::Heuristic { max_len, level } => LengthHeuristic {
                max_len: *max_len,
                level: *level,
            }
            .classify(text),
            HeadingDetection::Custom(classifier) => classifier.classify(text),
        }
    }
}

impl fmt::Debug for HeadingDetection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HeadingDetection::TagsOnly => write!(f, "TagsOnly"),
            HeadingDetection::Heuristic { max_len, level } => f
                .debug_struct("Heuristic")
                .field("max_len", max_len)
                .field("level", level)
                .finish(),
            HeadingDetection::Custom(_) => write!(f, "Custom(..)"),
        }
    }
}
