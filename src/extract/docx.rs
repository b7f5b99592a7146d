//! DOCX text extractor.

use std::io::{Cursor, Read};

use roxmltree::Node;
use zip::result::ZipError;
use zip::ZipArchive;

use crate::detect::is_ole_compound;
use crate::error::ExtractionFailure;

use super::TextExtractor;

const WML_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";
const MAIN_PART: &str = "word/document.xml";

/// Upper bound on the decompressed size of the main part.
const MAX_PART_BYTES: u64 = 64 * 1024 * 1024;

/// Extractor for OOXML word-processing packages.
///
/// Reads `word/document.xml` only. Paragraphs, including those in tables,
/// become blank-line separated blocks; tracked deletions are skipped.
#[derive(Debug, Clone, Copy, Default)]
pub struct DocxExtractor;

impl DocxExtractor {
    /// Create a new DOCX extractor.
    pub fn new() -> Self {
        Self
    }
}

impl TextExtractor for DocxExtractor {
    fn name(&self) -> &str {
        "docx"
    }

    fn supported_extensions(&self) -> &[&str] {
        &["docx", "docm", "dotx"]
    }

    fn extract(&self, bytes: &[u8]) -> Result<String, ExtractionFailure> {
        if is_ole_compound(bytes) {
            return Err(ExtractionFailure::Encrypted);
        }

        let mut archive = ZipArchive::new(Cursor::new(bytes))
            .map_err(|e| ExtractionFailure::Corrupted(format!("unreadable archive: {}", e)))?;
        let xml = read_part(&mut archive, MAIN_PART, MAX_PART_BYTES)?;

        let doc = roxmltree::Document::parse(&xml)
            .map_err(|e| ExtractionFailure::Corrupted(format!("invalid {}: {}", MAIN_PART, e)))?;
        let body = wml(doc.root_element(), "body").ok_or_else(|| {
            ExtractionFailure::UnsupportedStructure(format!("{} has no w:body", MAIN_PART))
        })?;

        let mut paragraphs = Vec::new();
        collect_paragraphs(body, &mut paragraphs);
        Ok(paragraphs.join("\n\n"))
    }
}

fn read_part(
    archive: &mut ZipArchive<Cursor<&[u8]>>,
    name: &str,
    limit: u64,
) -> Result<String, ExtractionFailure> {
    let entry = archive.by_name(name).map_err(|e| match e {
        ZipError::FileNotFound => {
            ExtractionFailure::UnsupportedStructure(format!("package has no {}", name))
        }
        ZipError::UnsupportedArchive(msg) if msg.contains("Password") => ExtractionFailure::Encrypted,
        other => ExtractionFailure::Corrupted(format!("cannot open {}: {}", name, other)),
    })?;

    if entry.size() > limit {
        return Err(ExtractionFailure::UnsupportedStructure(format!(
            "{} is {} bytes, over the {} byte limit",
            name,
            entry.size(),
            limit
        )));
    }

    let mut content = String::new();
    entry
        .take(limit)
        .read_to_string(&mut content)
        .map_err(|e| ExtractionFailure::Corrupted(format!("cannot read {}: {}", name, e)))?;
    Ok(content)
}

fn is_wml(node: Node, name: &str) -> bool {
    node.is_element() && node.tag_name().name() == name && node.tag_name().namespace() == Some(WML_NS)
}

fn wml<'a>(node: Node<'a, 'a>, name: &str) -> Option<Node<'a, 'a>> {
    node.children().find(|n| is_wml(*n, name))
}

fn collect_paragraphs(node: Node, out: &mut Vec<String>) {
    for child in node.children().filter(|n| n.is_element()) {
        if is_wml(child, "p") {
            let text = paragraph_text(child);
            if !text.trim().is_empty() {
                out.push(text);
            }
        } else {
            collect_paragraphs(child, out);
        }
    }
}

fn paragraph_text(p: Node) -> String {
    let mut text = String::new();
    push_runs(p, &mut text);
    text
}

fn push_runs(node: Node, text: &mut String) {
    for child in node.children().filter(|n| n.is_element()) {
        if child.tag_name().namespace() != Some(WML_NS) {
            push_runs(child, text);
            continue;
        }
        match child.tag_name().name() {
            "t" => text.push_str(child.text().unwrap_or("")),
            "tab" => text.push('\t'),
            "br" | "cr" => text.push('\n'),
            "noBreakHyphen" => text.push('-'),
            // Deleted revisions and field instructions are not visible text.
            "del" | "delText" | "instrText" | "pPr" | "rPr" => {}
            _ => push_runs(child, text),
        }
    }
}
