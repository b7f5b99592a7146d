//! Markup parsing module.
//!
//! The pipeline is sanitize → segment → extract runs → build model. Each
//! stage is a pure function over its input; [`MarkupParser`] chains them.

mod heading;
mod inline;
mod markup_parser;
mod options;
mod sanitize;
mod segment;
mod tag;

pub use heading::{HeadingClassifier, HeadingDetection, HeadingGuess, LengthHeuristic, TAG_CONFIDENCE};
pub use inline::extract_runs;
pub use markup_parser::MarkupParser;
pub use options::{ParseOptions, DEFAULT_MAX_INPUT_BYTES};
pub use sanitize::{decode_entities, sanitize, strip_non_content};
pub use segment::{segment, RawBlock, SpanKind};
pub use tag::strip_tags;
