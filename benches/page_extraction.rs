//! Page Extraction Benchmarks
//!
//! Element extraction over synthetic page windows, table merging, and the
//! MuPDF open path.
//!
//! Run with: `cargo bench --bench page_extraction`

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use std::time::Duration;

use pdf_parse_server::document::{
    DocumentBackend, LayoutBlock, LayoutLine, PageLayout, PageSource, Rect, TextSpan,
};
use pdf_parse_server::mupdf::MupdfBackend;
use pdf_parse_server::parser::{merge_regions, partition_pages, PageExtractor, ParseConfig};

/// Minimal valid PDF (empty page)
fn create_minimal_pdf() -> Vec<u8> {
    let pdf_content = b"%PDF-1.4
1 0 obj
<< /Type /Catalog /Pages 2 0 R >>
endobj
2 0 obj
<< /Type /Pages /Kids [3 0 R] /Count 1 >>
endobj
3 0 obj
<< /Type /Page /Parent 2 0 R /MediaBox [0 0 612 792] /Contents 4 0 R /Resources << >> >>
endobj
4 0 obj
<< /Length 0 >>
stream
endstream
endobj
xref
0 5
0000000000 65535 f
0000000009 00000 n
0000000058 00000 n
0000000115 00000 n
0000000226 00000 n
trailer
<< /Size 5 /Root 1 0 R >>
startxref
276
%%EOF";
    pdf_content.to_vec()
}

fn line(y0: f32, cells: &[(f32, f32, &str)]) -> LayoutLine {
    let spans: Vec<TextSpan> = cells
        .iter()
        .map(|(x0, x1, text)| TextSpan {
            bbox: Rect::new(*x0, y0, *x1, y0 + 10.0),
            text: text.to_string(),
        })
        .collect();
    let bbox = spans
        .iter()
        .fold(spans[0].bbox, |acc, s| acc.union(&s.bbox));
    LayoutLine {
        bbox,
        vertical: false,
        spans,
    }
}

fn block(lines: Vec<LayoutLine>) -> LayoutBlock {
    let bbox = lines
        .iter()
        .fold(lines[0].bbox, |acc, l| acc.union(&l.bbox));
    LayoutBlock { bbox, lines }
}

/// A page of prose with one 4-column table in the middle
fn synthetic_page(index: usize) -> PageLayout {
    let prose = |top: f32| {
        block(
            (0..8)
                .map(|i| line(top + i as f32 * 12.0, &[(72.0, 540.0, "Lorem ipsum dolor sit amet")]))
                .collect(),
        )
    };
    let columns = [(72.0, 150.0), (180.0, 260.0), (290.0, 370.0), (400.0, 480.0)];
    let table = block(
        (0..12)
            .map(|r| {
                let cells: Vec<(f32, f32, &str)> =
                    columns.iter().map(|(x0, x1)| (*x0, *x1, "cell")).collect();
                line(300.0 + r as f32 * 12.0, &cells)
            })
            .collect(),
    );

    PageLayout {
        index,
        width: 612.0,
        height: 792.0,
        blocks: vec![prose(60.0), table, prose(520.0)],
        images: Vec::new(),
    }
}

fn bench_extract_window(c: &mut Criterion) {
    let extractor = PageExtractor::new(&ParseConfig::default());

    let mut group = c.benchmark_group("extract_window");
    group.measurement_time(Duration::from_secs(10));
    for pages in [1usize, 10, 50] {
        let window: Vec<PageLayout> = (0..pages).map(synthetic_page).collect();
        group.throughput(Throughput::Elements(pages as u64));
        group.bench_with_input(BenchmarkId::from_parameter(pages), &window, |b, window| {
            b.iter(|| extractor.extract_window(black_box(window)))
        });
    }
    group.finish();
}

fn bench_merge_regions(c: &mut Criterion) {
    let boxes: Vec<Rect> = (0..200)
        .map(|i| {
            let x = (i % 10) as f32 * 60.0;
            let y = (i / 10) as f32 * 40.0;
            Rect::new(x, y, x + 40.0, y + 25.0)
        })
        .collect();

    let mut group = c.benchmark_group("merge_regions");
    for tolerance in [5.0f32, 20.0] {
        group.bench_with_input(
            BenchmarkId::from_parameter(tolerance),
            &tolerance,
            |b, &tolerance| b.iter(|| merge_regions(black_box(&boxes), tolerance)),
        );
    }
    group.finish();
}

fn bench_partition(c: &mut Criterion) {
    c.bench_function("partition_pages", |b| {
        b.iter(|| partition_pages(black_box(10_000), black_box(16)))
    });
}

fn bench_mupdf_open(c: &mut Criterion) {
    let pdf_data = create_minimal_pdf();
    let backend = MupdfBackend::new();

    let mut group = c.benchmark_group("mupdf_open");
    group.throughput(Throughput::Bytes(pdf_data.len() as u64));
    group.bench_function("open_and_layout", |b| {
        b.iter(|| {
            let source = backend.open(black_box(&pdf_data)).expect("open");
            source.page_layout(0).expect("layout")
        })
    });
    group.finish();
}

criterion_group!(
    benches,
    bench_extract_window,
    bench_merge_regions,
    bench_partition,
    bench_mupdf_open
);
criterion_main!(benches);
