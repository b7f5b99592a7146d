//! Text cleanup pipeline for extracted and projected plain text.

use regex::Regex;
use std::sync::LazyLock;
use unicode_normalization::UnicodeNormalization;

static PAGE_NUMBER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?mi)^[ \t]*(?:[-–—][ \t]*\d+[ \t]*[-–—]|page[ \t]+\d+(?:[ \t]+of[ \t]+\d+)?|\d+)[ \t]*$")
        .unwrap()
});

static HYPHENATION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([A-Za-z])-[ \t]*\n[ \t]*([a-z])").unwrap());

static INLINE_SPACE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[ \t\u{A0}]+").unwrap());

const LIGATURES: &[(char, &str)] = &[
    ('\u{FB00}', "ff"),
    ('\u{FB01}', "fi"),
    ('\u{FB02}', "fl"),
    ('\u{FB03}', "ffi"),
    ('\u{FB04}', "ffl"),
    ('\u{FB05}', "st"),
    ('\u{FB06}', "st"),
];

const BULLETS: &[char] = &['●', '○', '■', '□', '◆', '◇', '▪', '▫', '►', '▻', '‣', '⁃'];

/// Cleanup preset levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CleanupPreset {
    /// NFC normalization and whitespace only
    Minimal,
    /// Character repair plus line cleanup
    #[default]
    Standard,
    /// Standard plus hyphenation joining, page-number and private-use removal
    Aggressive,
}

/// Options for text cleanup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanupOptions {
    /// Normalize Unicode to NFC form
    pub normalize_unicode: bool,

    /// Expand typographic ligatures (ﬁ → fi)
    pub fix_ligatures: bool,

    /// Standardize bullet characters (●, ■, ▪ → •)
    pub standardize_bullets: bool,

    /// Remove Unicode replacement characters (U+FFFD)
    pub remove_replacement_char: bool,

    /// Remove control characters other than tab and newline
    pub remove_control_chars: bool,

    /// Remove Private Use Area characters
    pub remove_pua: bool,

    /// Join words hyphenated across a line break
    pub fix_hyphenation: bool,

    /// Remove lines that hold only a page number
    pub remove_page_numbers: bool,

    /// Collapse runs of spaces and tabs, trim line ends
    pub normalize_whitespace: bool,

    /// Maximum consecutive newlines (0 = unlimited)
    pub max_consecutive_newlines: u8,
}

impl CleanupOptions {
    /// Create options from a preset.
    pub fn from_preset(preset: CleanupPreset) -> Self {
        match preset {
            CleanupPreset::Minimal => Self::minimal(),
            CleanupPreset::Standard => Self::standard(),
            CleanupPreset::Aggressive => Self::aggressive(),
        }
    }

    /// Minimal cleanup options.
    pub fn minimal() -> Self {
        Self {
            normalize_unicode: true,
            fix_ligatures: false,
            standardize_bullets: false,
            remove_replacement_char: false,
            remove_control_chars: true,
            remove_pua: false,
            fix_hyphenation: false,
            remove_page_numbers: false,
            normalize_whitespace: true,
            max_consecutive_newlines: 0,
        }
    }

    /// Standard cleanup options.
    pub fn standard() -> Self {
        Self {
            normalize_unicode: true,
            fix_ligatures: true,
            standardize_bullets: true,
            remove_replacement_char: true,
            remove_control_chars: true,
            remove_pua: false,
            fix_hyphenation: false,
            remove_page_numbers: false,
            normalize_whitespace: true,
            max_consecutive_newlines: 2,
        }
    }

    /// Aggressive cleanup options.
    pub fn aggressive() -> Self {
        Self {
            remove_pua: true,
            fix_hyphenation: true,
            remove_page_numbers: true,
            ..Self::standard()
        }
    }
}

impl Default for CleanupOptions {
    fn default() -> Self {
        Self::standard()
    }
}

/// Text cleanup pipeline.
#[derive(Debug, Clone, Default)]
pub struct CleanupPipeline {
    options: CleanupOptions,
}

impl CleanupPipeline {
    /// Create a new cleanup pipeline with the given options.
    pub fn new(options: CleanupOptions) -> Self {
        Self { options }
    }

    /// Create a pipeline from a preset.
    pub fn from_preset(preset: CleanupPreset) -> Self {
        Self::new(CleanupOptions::from_preset(preset))
    }

    /// Process text through the cleanup pipeline.
    pub fn process(&self, text: &str) -> String {
        let opts = &self.options;
        let mut result = text.replace("\r\n", "\n").replace('\r', "\n");

        // Stage 1: characters
        if opts.normalize_unicode {
            result = result.nfc().collect();
        }
        if opts.fix_ligatures && result.contains(|c: char| LIGATURES.iter().any(|(l, _)| *l == c)) {
            let mut fixed = String::with_capacity(result.len());
            for c in result.chars() {
                match LIGATURES.iter().find(|(l, _)| *l == c) {
                    Some((_, expansion)) => fixed.push_str(expansion),
                    None => fixed.push(c),
                }
            }
            result = fixed;
        }
        if opts.standardize_bullets {
            result = result.replace(BULLETS, "•");
        }
        if opts.remove_replacement_char || opts.remove_control_chars || opts.remove_pua {
            result.retain(|c| {
                !(opts.remove_replacement_char && c == '\u{FFFD}'
                    || opts.remove_control_chars && c.is_control() && c != '\n' && c != '\t'
                    || opts.remove_pua && is_private_use(c))
            });
        }

        // Stage 2: lines
        if opts.fix_hyphenation {
            result = HYPHENATION_RE.replace_all(&result, "$1$2").into_owned();
        }
        if opts.remove_page_numbers {
            result = PAGE_NUMBER_RE.replace_all(&result, "").into_owned();
        }
        if opts.normalize_whitespace {
            result = result
                .lines()
                .map(|line| INLINE_SPACE_RE.replace_all(line, " ").trim().to_string())
                .collect::<Vec<_>>()
                .join("\n");
        }
        if opts.max_consecutive_newlines > 0 {
            result = limit_newlines(&result, opts.max_consecutive_newlines as usize);
        }

        result.trim().to_string()
    }
}

fn is_private_use(c: char) -> bool {
    matches!(c as u32, 0xE000..=0xF8FF | 0xF0000..=0xFFFFD | 0x100000..=0x10FFFD)
}

fn limit_newlines(text: &str, max: usize) -> String {
    let mut out = String::with_capacity(text.len());
    let mut run = 0;
    for c in text.chars() {
        if c == '\n' {
            run += 1;
            if run > max {
                continue;
            }
        } else {
            run = 0;
        }
        out.push(c);
    }
    out
}
