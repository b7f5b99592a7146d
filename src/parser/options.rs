//! Parsing options and configuration.

use super::heading::{HeadingClassifier, HeadingDetection};
use std::sync::Arc;

/// Default input limit: 5 MiB of markup.
pub const DEFAULT_MAX_INPUT_BYTES: usize = 5 * 1024 * 1024;

/// Options for parsing editor markup.
#[derive(Debug, Clone)]
pub struct ParseOptions {
    /// How headings are recognised
    pub heading_detection: HeadingDetection,

    /// Guesses below this confidence are treated as body text
    pub min_heading_confidence: f32,

    /// Reject markup larger than this many bytes (0 = unlimited)
    pub max_input_bytes: usize,
}

impl ParseOptions {
    /// Create new parse options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set heading detection mode.
    pub fn with_heading_detection(mut self, detection: HeadingDetection) -> Self {
        self.heading_detection = detection;
        self
    }

    /// Infer headings from short untagged lines.
    pub fn heuristic_headings(mut self) -> Self {
        self.heading_detection = HeadingDetection::heuristic();
        self
    }

    /// Use a custom classifier for untagged spans.
    pub fn with_classifier(mut self, classifier: Arc<dyn HeadingClassifier>) -> Self {
        self.heading_detection = HeadingDetection::Custom(classifier);
        self
    }

    /// Set the minimum heading confidence.
    pub fn with_min_heading_confidence(mut self, confidence: f32) -> Self {
        self.min_heading_confidence = confidence.clamp(0.0, 1.0);
        self
    }

    /// Set the input size limit in bytes.
    pub fn with_max_input_bytes(mut self, bytes: usize) -> Self {
        self.max_input_bytes = bytes;
        self
    }

    /// Remove the input size limit.
    pub fn unlimited(mut self) -> Self {
        self.max_input_bytes = 0;
        self
    }
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            heading_detection: HeadingDetection::TagsOnly,
            min_heading_confidence: 0.5,
            max_input_bytes: DEFAULT_MAX_INPUT_BYTES,
        }
    }
}
