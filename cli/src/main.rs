//! lexdoc CLI - editor markup to DOCX conversion tool

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use lexdoc::extract::{extract_file, ExtractOptions};
use lexdoc::{
    CleanupOptions, CleanupPipeline, CleanupPreset, ConversionPool, ConversionRequest,
    ConvertOptions, DocumentMetadata, FallbackPolicy, JsonFormat, MarkupParser, ParseOptions,
    RenderOptions, SignatureEntry,
};

#[derive(Parser)]
#[command(name = "lexdoc")]
#[command(version)]
#[command(about = "Convert editor markup to DOCX, text, HTML and JSON", long_about = None)]
struct Cli {
    /// Reject markup larger than this many bytes (0 = unlimited)
    #[arg(long, global = true, env = "LEXDOC_MAX_INPUT_BYTES")]
    max_input_bytes: Option<usize>,

    /// Fail a conversion that runs longer than this many seconds
    #[arg(long, global = true, env = "LEXDOC_TIMEOUT_SECS")]
    timeout_secs: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert markup to DOCX
    Docx {
        /// Input markup file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output file (defaults to the input name with .docx)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Document title (defaults to the file stem)
        #[arg(long)]
        title: Option<String>,

        /// Document author
        #[arg(long)]
        author: Option<String>,

        /// Creation date, RFC 3339 (e.g., 2024-01-01T00:00:00Z)
        #[arg(long, value_parser = parse_date)]
        date: Option<DateTime<Utc>>,

        /// JSON file holding an array of signature entries
        #[arg(long, value_name = "JSON")]
        signatures: Option<PathBuf>,

        /// Infer headings from short untagged lines
        #[arg(long)]
        heuristic_headings: bool,

        /// Write a plain-text file if DOCX packaging fails
        #[arg(long)]
        fallback: bool,

        /// Replace images with placeholders
        #[arg(long)]
        no_images: bool,
    },

    /// Convert markup to plain text
    Text {
        /// Input markup file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Render through the document model (title, list numbers, signatures)
        #[arg(long)]
        model: bool,

        /// Text cleanup preset
        #[arg(long, value_enum)]
        cleanup: Option<CleanupLevel>,
    },

    /// Convert plain or markdown-like text to simple HTML
    Html {
        /// Input text file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Dump the document model as JSON
    Json {
        /// Input markup file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Output compact JSON
        #[arg(long)]
        compact: bool,
    },

    /// Extract text from an uploaded document (DOCX, text, HTML)
    Extract {
        /// Input document
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Minimum non-whitespace characters for a usable result
        #[arg(long, default_value_t = lexdoc::extract::DEFAULT_MIN_CONTENT_CHARS)]
        min_chars: usize,

        /// Text cleanup preset
        #[arg(long, value_enum, default_value = "standard")]
        cleanup: CleanupLevel,
    },

    /// Convert every .html/.htm file in a directory to DOCX
    Batch {
        /// Input directory
        #[arg(value_name = "DIR")]
        input: PathBuf,

        /// Output directory (defaults to DIR/docx)
        #[arg(short, long, value_name = "DIR")]
        output: Option<PathBuf>,

        /// Worker threads (0 = one per CPU)
        #[arg(short = 'j', long, default_value_t = 0)]
        threads: usize,

        /// Infer headings from short untagged lines
        #[arg(long)]
        heuristic_headings: bool,
    },

    /// Show version information
    Version,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum CleanupLevel {
    /// Unicode normalization and whitespace only
    Minimal,
    /// Character repair and line cleanup
    Standard,
    /// Standard plus hyphen joining and page-number removal
    Aggressive,
}

impl From<CleanupLevel> for CleanupPreset {
    fn from(level: CleanupLevel) -> Self {
        match level {
            CleanupLevel::Minimal => CleanupPreset::Minimal,
            CleanupLevel::Standard => CleanupPreset::Standard,
            CleanupLevel::Aggressive => CleanupPreset::Aggressive,
        }
    }
}

type CliResult = Result<(), Box<dyn std::error::Error>>;

fn main() {
    env_logger::init();

    let cli = Cli::parse();
    let limits = Limits {
        max_input_bytes: cli.max_input_bytes,
        timeout: cli.timeout_secs.map(Duration::from_secs),
    };

    let result = match cli.command {
        Commands::Docx {
            input,
            output,
            title,
            author,
            date,
            signatures,
            heuristic_headings,
            fallback,
            no_images,
        } => {
            let mut metadata = DocumentMetadata::new(title.unwrap_or_else(|| file_stem(&input)));
            if let Some(author) = author {
                metadata = metadata.with_author(author);
            }
            if let Some(date) = date {
                metadata = metadata.with_timestamps(date, date);
            }
            let options = DocxFlags {
                heuristic_headings,
                fallback,
                no_images,
            };
            cmd_docx(&input, output.as_deref(), metadata, signatures.as_deref(), options, &limits)
        }
        Commands::Text {
            input,
            output,
            model,
            cleanup,
        } => cmd_text(&input, output.as_deref(), model, cleanup, &limits),
        Commands::Html { input, output } => cmd_html(&input, output.as_deref()),
        Commands::Json {
            input,
            output,
            compact,
        } => cmd_json(&input, output.as_deref(), compact, &limits),
        Commands::Extract {
            input,
            output,
            min_chars,
            cleanup,
        } => cmd_extract(&input, output.as_deref(), min_chars, cleanup),
        Commands::Batch {
            input,
            output,
            threads,
            heuristic_headings,
        } => cmd_batch(&input, output.as_deref(), threads, heuristic_headings, &limits),
        Commands::Version => {
            cmd_version();
            Ok(())
        }
    };

    if let Err(e) = result {
        match e.downcast_ref::<lexdoc::Error>() {
            Some(lexdoc::Error::Extraction(failure)) => {
                eprintln!("{}: {}", "Error".red().bold(), failure.user_message());
                eprintln!("  {}", failure.to_string().dimmed());
            }
            _ => eprintln!("{}: {}", "Error".red().bold(), e),
        }
        std::process::exit(1);
    }
}

struct Limits {
    max_input_bytes: Option<usize>,
    timeout: Option<Duration>,
}

impl Limits {
    fn parse_options(&self, heuristic_headings: bool) -> ParseOptions {
        let mut options = ParseOptions::new();
        if let Some(bytes) = self.max_input_bytes {
            options = options.with_max_input_bytes(bytes);
        }
        if heuristic_headings {
            options = options.heuristic_headings();
        }
        options
    }

    fn convert_options(&self, heuristic_headings: bool) -> ConvertOptions {
        let mut options = ConvertOptions::new().with_parse_options(self.parse_options(heuristic_headings));
        if let Some(timeout) = self.timeout {
            options = options.with_timeout(timeout);
        }
        options
    }
}

struct DocxFlags {
    heuristic_headings: bool,
    fallback: bool,
    no_images: bool,
}

fn parse_date(s: &str) -> Result<DateTime<Utc>, String> {
    DateTime::parse_from_rfc3339(s)
        .map(|d| d.with_timezone(&Utc))
        .map_err(|e| format!("invalid RFC 3339 date: {}", e))
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .unwrap_or_default()
        .to_string_lossy()
        .into_owned()
}

fn load_signatures(path: Option<&Path>) -> Result<Vec<SignatureEntry>, Box<dyn std::error::Error>> {
    let Some(path) = path else {
        return Ok(Vec::new());
    };
    let json = fs::read_to_string(path)?;
    let entries: Vec<SignatureEntry> = serde_json::from_str(&json)
        .map_err(|e| format!("Invalid signatures file {}: {}", path.display(), e))?;
    Ok(entries)
}

fn write_output(output: Option<&Path>, content: &str) -> CliResult {
    if let Some(path) = output {
        fs::write(path, content)?;
        println!("{} {}", "Saved to".green(), path.display());
    } else {
        println!("{}", content);
    }
    Ok(())
}

fn cmd_docx(
    input: &Path,
    output: Option<&Path>,
    metadata: DocumentMetadata,
    signatures: Option<&Path>,
    flags: DocxFlags,
    limits: &Limits,
) -> CliResult {
    let markup = fs::read_to_string(input)?;
    let signatures = load_signatures(signatures)?;

    let mut options = limits
        .convert_options(flags.heuristic_headings)
        .with_render_options(RenderOptions::new().with_images(!flags.no_images));
    if flags.fallback {
        options = options.with_fallback(FallbackPolicy::PlainText);
    }

    let pool = ConversionPool::new(1, options)?;
    let request = ConversionRequest::new(markup, metadata).with_signatures(signatures);
    let artifact = pool.convert(request)?;

    let path = output_path(input, output, artifact.extension, artifact.is_fallback())?;
    fs::write(&path, &artifact.bytes)?;

    if artifact.is_fallback() {
        println!(
            "{} DOCX packaging failed, wrote plain text instead",
            "Warning:".yellow().bold()
        );
    }
    println!("{} {}", "Saved to".green(), path.display());

    let stats = &artifact.stats;
    println!(
        "  {} {} headings, {} paragraphs, {} list items",
        "├─".dimmed(),
        stats.heading_count,
        stats.paragraph_count,
        stats.list_item_count
    );
    println!(
        "  {} {} images embedded, {} replaced",
        "├─".dimmed(),
        stats.images_embedded,
        stats.images_dropped
    );
    println!(
        "  {} {} signatures, {} words",
        "└─".dimmed(),
        stats.signature_count,
        stats.word_count
    );

    Ok(())
}

/// Where to write an artifact. Never the input file itself: a derived
/// path that collides gets a `.fallback` suffix, an explicit one is refused.
fn output_path(
    input: &Path,
    output: Option<&Path>,
    extension: &str,
    fallback: bool,
) -> Result<PathBuf, String> {
    let path = match output {
        Some(path) if !fallback => path.to_path_buf(),
        Some(path) => path.with_extension(extension),
        None => input.with_extension(extension),
    };
    if path != input {
        return Ok(path);
    }
    match output {
        Some(_) => Err(format!(
            "Refusing to overwrite the input file {}",
            input.display()
        )),
        None => Ok(input.with_file_name(format!("{}.fallback.{}", file_stem(input), extension))),
    }
}

fn cmd_text(
    input: &Path,
    output: Option<&Path>,
    model: bool,
    cleanup: Option<CleanupLevel>,
    limits: &Limits,
) -> CliResult {
    let markup = fs::read_to_string(input)?;

    let text = if model {
        let mut render_options = RenderOptions::new();
        if let Some(level) = cleanup {
            render_options = render_options.with_cleanup_preset(level.into());
        }
        let doc = MarkupParser::with_options(limits.parse_options(false)).parse(
            &markup,
            DocumentMetadata::new(file_stem(input)),
            Vec::new(),
        )?;
        lexdoc::render::to_text(&doc, &render_options)?
    } else {
        let text = lexdoc::to_plain_text(&markup);
        match cleanup {
            Some(level) => CleanupPipeline::from_preset(level.into()).process(&text),
            None => text,
        }
    };

    write_output(output, &text)
}

fn cmd_html(input: &Path, output: Option<&Path>) -> CliResult {
    let text = fs::read_to_string(input)?;
    write_output(output, &lexdoc::to_html(&text))
}

fn cmd_json(input: &Path, output: Option<&Path>, compact: bool, limits: &Limits) -> CliResult {
    let markup = fs::read_to_string(input)?;
    let doc = MarkupParser::with_options(limits.parse_options(false)).parse(
        &markup,
        DocumentMetadata::new(file_stem(input)),
        Vec::new(),
    )?;

    let format = if compact {
        JsonFormat::Compact
    } else {
        JsonFormat::Pretty
    };

    let json = lexdoc::render::to_json(&doc, format)?;
    write_output(output, &json)
}

fn cmd_extract(
    input: &Path,
    output: Option<&Path>,
    min_chars: usize,
    cleanup: CleanupLevel,
) -> CliResult {
    let options = ExtractOptions::new()
        .with_min_content_chars(min_chars)
        .with_cleanup(CleanupOptions::from_preset(cleanup.into()));
    let extracted = extract_file(input, &options)?;
    log::info!(
        "Extracted {} characters with the {} extractor",
        extracted.char_count,
        extracted.extractor
    );
    write_output(output, &extracted.text)
}

fn cmd_batch(
    input: &Path,
    output: Option<&Path>,
    threads: usize,
    heuristic_headings: bool,
    limits: &Limits,
) -> CliResult {
    let output_dir = output
        .map(|p| p.to_path_buf())
        .unwrap_or_else(|| input.join("docx"));
    fs::create_dir_all(&output_dir)?;

    let files = markup_files(input)?;
    if files.is_empty() {
        println!("{}", "No .html or .htm files found".yellow());
        return Ok(());
    }

    let pool = ConversionPool::new(threads, limits.convert_options(heuristic_headings))?;
    let pb = ProgressBar::new(files.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap()
            .progress_chars("#>-"),
    );

    let mut failures = Vec::new();
    for chunk in files.chunks(pool.threads().max(1) * 2) {
        let mut requests = Vec::with_capacity(chunk.len());
        for path in chunk {
            let markup = fs::read_to_string(path)?;
            requests.push(ConversionRequest::new(
                markup,
                DocumentMetadata::new(file_stem(path)),
            ));
        }

        for (path, result) in chunk.iter().zip(pool.convert_batch(requests)) {
            pb.set_message(file_stem(path));
            match result {
                Ok(artifact) => {
                    let target = output_dir.join(artifact.file_name(&file_stem(path)));
                    fs::write(target, &artifact.bytes)?;
                }
                Err(e) => failures.push((path.clone(), e)),
            }
            pb.inc(1);
        }
    }

    pb.finish_with_message("Done!");

    let converted = files.len() - failures.len();
    println!(
        "\n{} {} converted to {}",
        "Done!".green().bold(),
        converted,
        output_dir.display()
    );
    for (path, error) in &failures {
        println!("  {} {}: {}", "✗".red(), path.display(), error);
    }

    if failures.is_empty() {
        Ok(())
    } else {
        Err(format!("{} of {} files failed", failures.len(), files.len()).into())
    }
}

fn markup_files(dir: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut files: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| {
            path.is_file()
                && path
                    .extension()
                    .and_then(|e| e.to_str())
                    .is_some_and(|e| e.eq_ignore_ascii_case("html") || e.eq_ignore_ascii_case("htm"))
        })
        .collect();
    files.sort();
    Ok(files)
}

fn cmd_version() {
    println!("{} {}", "lexdoc".cyan().bold(), env!("CARGO_PKG_VERSION"));
    println!("Editor markup to DOCX conversion tool");
    println!();
    println!("License: MIT");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_date() {
        let date = parse_date("2024-01-01T09:30:00+02:00").unwrap();
        assert_eq!(date.to_rfc3339(), "2024-01-01T07:30:00+00:00");
        assert!(parse_date("January 1").is_err());
    }

    #[test]
    fn test_markup_files_filters_and_sorts() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("b.html"), "<p>B</p>").unwrap();
        fs::write(dir.path().join("a.HTM"), "<p>A</p>").unwrap();
        fs::write(dir.path().join("notes.txt"), "skip").unwrap();
        fs::create_dir(dir.path().join("sub.html")).unwrap();

        let files = markup_files(dir.path()).unwrap();
        let names: Vec<String> = files.iter().map(|p| file_stem(p)).collect();
        assert_eq!(names, vec!["a", "b"]);
    }

    #[test]
    fn test_load_signatures() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("signers.json");
        fs::write(
            &path,
            r#"[{"signer_name": "Jane Doe", "signer_role": "CEO", "signed_at": "2024-01-01T00:00:00Z"}]"#,
        )
        .unwrap();

        let entries = load_signatures(Some(&path)).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].role(), Some("CEO"));
        assert!(load_signatures(None).unwrap().is_empty());
    }

    #[test]
    fn test_output_path_never_overwrites_input() {
        let input = Path::new("dir/contract.txt");

        assert_eq!(
            output_path(input, None, "docx", false).unwrap(),
            PathBuf::from("dir/contract.docx")
        );
        assert_eq!(
            output_path(input, None, "txt", true).unwrap(),
            PathBuf::from("dir/contract.fallback.txt")
        );
        assert!(output_path(input, Some(Path::new("dir/contract.txt")), "txt", true).is_err());
        assert_eq!(
            output_path(input, Some(Path::new("out/c.docx")), "txt", true).unwrap(),
            PathBuf::from("out/c.txt")
        );
    }

    #[test]
    fn test_limits() {
        let limits = Limits {
            max_input_bytes: Some(10),
            timeout: Some(Duration::from_secs(3)),
        };
        let options = limits.convert_options(true);
        assert_eq!(options.parse.max_input_bytes, 10);
        assert_eq!(options.timeout, Some(Duration::from_secs(3)));
    }
}
