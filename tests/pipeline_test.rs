//! Integration tests for the markup → model → DOCX pipeline.

use std::io::{Cursor, Read};

use lexdoc::convert::{convert, ConvertOptions};
use lexdoc::render::{to_json, JsonFormat, RenderOptions};
use lexdoc::{
    html_to_docx, parse_markup, to_plain_text, Block, DocumentMetadata, MarkupParser,
    SignatureEntry, TextRun, TextStyle,
};

fn read_part(bytes: &[u8], name: &str) -> String {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
    let mut file = archive.by_name(name).unwrap();
    let mut out = String::new();
    file.read_to_string(&mut out).unwrap();
    out
}

fn body_paragraphs(document_xml: &str) -> usize {
    let doc = roxmltree::Document::parse(document_xml).unwrap();
    let body = doc
        .descendants()
        .find(|n| n.tag_name().name() == "body")
        .unwrap();
    body.children()
        .filter(|n| n.tag_name().name() == "p")
        .count()
}

#[test]
fn test_heading_and_bold_with_trailing_punctuation() {
    let model = parse_markup(
        "<h1>Agreement</h1><p>This is <strong>binding</strong>.</p>",
        DocumentMetadata::new("Agreement"),
    )
    .unwrap();

    assert_eq!(
        model.blocks(),
        &[
            Block::heading(1, vec![TextRun::new("Agreement")]),
            Block::paragraph(vec![TextRun::new("This is "), TextRun::bold("binding.")]),
        ]
    );
}

#[test]
fn test_empty_input_renders_title_only() {
    let bytes = html_to_docx("", DocumentMetadata::new("Empty Doc"), Vec::new()).unwrap();
    let document = read_part(&bytes, "word/document.xml");

    assert_eq!(body_paragraphs(&document), 1);
    assert!(document.contains("<w:pStyle w:val=\"Title\"/>"));
    assert!(document.contains("<w:jc w:val=\"center\"/>"));
    assert!(document.contains("Empty Doc"));
    assert!(document.contains("headerReference"));
    assert!(document.contains("footerReference"));
}

#[test]
fn test_script_never_appears_in_any_output() {
    let markup = "<script>alert('owned')</script><p>Hello</p><style>.secret{color:red}</style>";
    let model = parse_markup(markup, DocumentMetadata::new("Doc")).unwrap();
    assert_eq!(model.blocks(), &[Block::text("Hello")]);

    let bytes = html_to_docx(markup, DocumentMetadata::new("Doc"), Vec::new()).unwrap();
    let outputs = [
        read_part(&bytes, "word/document.xml"),
        to_plain_text(markup),
        model.plain_text(),
        to_json(&model, JsonFormat::Compact).unwrap(),
    ];
    for output in &outputs {
        assert!(!output.contains("alert"), "{}", output);
        assert!(!output.contains("owned"), "{}", output);
        assert!(!output.contains("secret"), "{}", output);
    }
}

#[test]
fn test_unterminated_script_is_dropped() {
    let model = parse_markup("<p>Before</p><script>leak()", DocumentMetadata::new("Doc")).unwrap();
    assert_eq!(model.plain_text(), "Doc\n\nBefore");
}

#[test]
fn test_unterminated_tags_terminate() {
    let model = parse_markup("<p><b>Bold<p>Next", DocumentMetadata::new("Doc")).unwrap();
    let texts: Vec<String> = model.blocks().iter().map(Block::plain_text).collect();
    assert_eq!(texts, vec!["Bold", "Next"]);
    assert!(model.blocks()[0].runs()[0].style.bold);
}

#[test]
fn test_nested_styles_merge_flags() {
    let model = parse_markup(
        "<p><b>bold <i>both</i></b><i> italic</i></p>",
        DocumentMetadata::new("Doc"),
    )
    .unwrap();
    let runs = model.blocks()[0].runs();
    assert_eq!(runs.len(), 3);
    assert_eq!(runs[0], TextRun::bold("bold "));
    assert_eq!(
        runs[1].style,
        TextStyle {
            bold: true,
            italic: true,
            ..Default::default()
        }
    );
    assert_eq!(runs[2], TextRun::italic(" italic"));
}

#[test]
fn test_lists_and_breaks() {
    let model = parse_markup(
        "<ul><li>One</li><li>Two</li></ul><hr><ol><li>First</li></ol>",
        DocumentMetadata::new("Doc"),
    )
    .unwrap();

    let blocks = model.blocks();
    assert_eq!(blocks.len(), 4);
    assert!(matches!(blocks[0], Block::ListItem { ordered: false, .. }));
    assert!(matches!(blocks[2], Block::Break));
    assert!(matches!(blocks[3], Block::ListItem { ordered: true, .. }));
}

#[test]
fn test_conversion_is_deterministic() {
    let markup = "<h2>Terms</h2><ol><li>Pay</li><li>Deliver</li></ol><p>Signed <em>below</em>.</p>";
    let metadata = DocumentMetadata::new("Contract").with_author("Legal");
    let signatures = vec![SignatureEntry::new("Jane Doe").unwrap().with_role("CEO")];

    let first = html_to_docx(markup, metadata.clone(), signatures.clone()).unwrap();
    let second = html_to_docx(markup, metadata, signatures).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_heading_levels_clamp() {
    let model = lexdoc::ModelBuilder::new(DocumentMetadata::new("Doc"))
        .with_blocks(vec![
            Block::heading(0, vec![TextRun::new("Low")]),
            Block::heading(3, vec![TextRun::new("Mid")]),
            Block::heading(9, vec![TextRun::new("High")]),
        ])
        .build()
        .unwrap();
    let bytes = lexdoc::render::to_docx(&model, &RenderOptions::default()).unwrap();
    let document = read_part(&bytes, "word/document.xml");

    let styles: Vec<&str> = document
        .match_indices("<w:pStyle w:val=\"Heading")
        .map(|(i, _)| &document[i + 24..i + 25])
        .collect();
    assert_eq!(styles, vec!["1", "3", "6"]);
}

#[test]
fn test_signature_order_and_completeness() {
    let signatures = vec![
        SignatureEntry::new("Alice Adams").unwrap(),
        SignatureEntry::new("Bob Brown")
            .unwrap()
            .with_image("data:image/png;base64,not-base64!!"),
        SignatureEntry::new("Carol Chen").unwrap().with_image("https://example.com/sig.png"),
    ];
    let artifact = convert(
        "<p>Body</p>",
        DocumentMetadata::new("Doc"),
        signatures,
        &ConvertOptions::default(),
    )
    .unwrap();
    let document = read_part(&artifact.bytes, "word/document.xml");

    let positions: Vec<usize> = ["Alice Adams", "Bob Brown", "Carol Chen"]
        .iter()
        .map(|name| document.find(name).unwrap())
        .collect();
    assert!(positions.windows(2).all(|w| w[0] < w[1]));
    assert_eq!(document.matches("<w:pBdr>").count(), 3);
    assert_eq!(artifact.stats.signature_count, 3);
    assert_eq!(artifact.stats.images_dropped, 2);
}

#[test]
fn test_custom_signature_heading() {
    let parser = MarkupParser::new();
    let model = parser
        .parse(
            "<p>Body</p>",
            DocumentMetadata::new("Doc"),
            vec![SignatureEntry::new("Jane Doe").unwrap()],
        )
        .unwrap();
    let options = RenderOptions::new().with_signature_heading("Executed by");
    let bytes = lexdoc::render::to_docx(&model, &options).unwrap();
    let document = read_part(&bytes, "word/document.xml");
    assert!(document.contains("Executed by"));
    assert!(!document.contains(">Signatures<"));
}

#[test]
fn test_entities_stay_literal_text() {
    let model = parse_markup(
        "<p>&lt;b&gt;not bold&lt;/b&gt; &amp; &#167;2</p>",
        DocumentMetadata::new("Doc"),
    )
    .unwrap();
    let runs = model.blocks()[0].runs();
    assert_eq!(runs, &[TextRun::new("<b>not bold</b> & §2")]);
}
