//! Benchmarks for markup conversion performance.
//!
//! Run with: cargo bench

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use lexdoc::{DocumentMetadata, MarkupParser, RenderOptions, SignatureEntry};

/// Creates synthetic editor markup with the given number of sections.
fn create_test_markup(sections: usize) -> String {
    let mut markup = String::new();
    for i in 0..sections {
        markup.push_str(&format!("<h2>Section {}</h2>", i + 1));
        markup.push_str(
            "<p>The <strong>Supplier</strong> shall deliver the <em>Goods</em> \
             on or before the agreed date, free of any lien or encumbrance.</p>",
        );
        markup.push_str("<ol><li>Payment within thirty days</li><li>Interest on late payment</li></ol>");
        markup.push_str("<script>track()</script><!-- reviewer note -->");
    }
    markup
}

fn signatures() -> Vec<SignatureEntry> {
    vec![
        SignatureEntry::new("Jane Doe").unwrap().with_role("CEO"),
        SignatureEntry::new("John Roe").unwrap().with_role("CFO"),
    ]
}

/// Benchmark markup parsing at various sizes.
fn bench_parsing(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse");
    let parser = MarkupParser::new();

    for sections in [1, 10, 100].iter() {
        let markup = create_test_markup(*sections);

        group.bench_function(format!("{}_sections", sections), |b| {
            b.iter(|| {
                parser
                    .parse(black_box(&markup), DocumentMetadata::new("Bench"), signatures())
                    .unwrap()
            });
        });
    }

    group.finish();
}

/// Benchmark DOCX packaging of a parsed model.
fn bench_docx(c: &mut Criterion) {
    let mut group = c.benchmark_group("to_docx");
    let options = RenderOptions::default();

    for sections in [1, 10, 100].iter() {
        let model = MarkupParser::new()
            .parse(
                &create_test_markup(*sections),
                DocumentMetadata::new("Bench"),
                signatures(),
            )
            .unwrap();

        group.bench_function(format!("{}_sections", sections), |b| {
            b.iter(|| lexdoc::render::to_docx(black_box(&model), &options).unwrap());
        });
    }

    group.finish();
}

/// Benchmark the model-free plain-text projection.
fn bench_plain_text(c: &mut Criterion) {
    let markup = create_test_markup(100);

    c.bench_function("to_plain_text", |b| {
        b.iter(|| lexdoc::to_plain_text(black_box(&markup)));
    });
}

/// Benchmark format detection.
fn bench_format_detection(c: &mut Criterion) {
    let docx = lexdoc::html_to_docx("<p>Hi</p>", DocumentMetadata::new("Bench"), Vec::new()).unwrap();
    let html = create_test_markup(1).into_bytes();

    c.bench_function("detect_docx", |b| {
        b.iter(|| lexdoc::detect_format_from_bytes(black_box(&docx)).unwrap());
    });

    c.bench_function("detect_html", |b| {
        b.iter(|| lexdoc::detect_format_from_bytes(black_box(&html)).unwrap());
    });
}

criterion_group!(
    benches,
    bench_parsing,
    bench_docx,
    bench_plain_text,
    bench_format_detection,
);
criterion_main!(benches);
