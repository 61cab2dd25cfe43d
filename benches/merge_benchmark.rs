//! Benchmarks for chunk merging and body rendering.
//!
//! Run with: cargo bench
//!
//! These benchmarks use synthetic mapping results and an in-memory template.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use retemplate::model::{BodyItem, Document, Paragraph, Section};
use retemplate::render::{dedup_body, render_document};
use retemplate::{extract_style_dna, AnalyzeOptions, RenderOptions};

/// Creates chunk results where every chunk repeats a few titles and the last
/// section of each chunk continues into the next.
fn create_chunks(chunk_count: usize, sections_per_chunk: usize) -> Vec<Vec<Section>> {
    (0..chunk_count)
        .map(|chunk| {
            (0..sections_per_chunk)
                .map(|i| {
                    let title = match i {
                        0 if chunk > 0 => format!("Topic {}", sections_per_chunk - 1),
                        _ => format!("Topic {}", i),
                    };
                    Section::new(
                        title,
                        vec![
                            BodyItem::text(format!("Paragraph {} of chunk {}", i, chunk)),
                            BodyItem::bullet(format!("- Point {}", i)),
                            BodyItem::text(format!("Point {}", i)),
                        ],
                    )
                })
                .collect()
        })
        .collect()
}

fn create_template() -> Document {
    Document::new()
        .with_paragraph(Paragraph::styled("Title", "Quarterly Report"))
        .with_paragraph(Paragraph::styled("TOC Heading", "Contents"))
        .with_paragraph(Paragraph::styled("toc 1", "1. Intro\t2"))
        .with_paragraph(Paragraph::styled("Heading 1", "Intro"))
        .with_paragraph(Paragraph::styled("Normal", "Old body"))
}

/// Benchmark merging at various chunk counts.
fn bench_merge_chunks(c: &mut Criterion) {
    let mut group = c.benchmark_group("merge_chunks");

    for chunk_count in [4, 32, 128].iter() {
        let chunks = create_chunks(*chunk_count, 8);

        group.bench_function(format!("{}_chunks", chunk_count), |b| {
            b.iter(|| retemplate::merge_chunks(black_box(chunks.clone())));
        });
    }

    group.finish();
}

/// Benchmark body deduplication on a long section.
fn bench_dedup_body(c: &mut Criterion) {
    let items: Vec<BodyItem> = (0..1000)
        .map(|i| match i % 3 {
            0 => BodyItem::text(format!("Line {}", i / 3)),
            1 => BodyItem::bullet(format!("* line {}", i / 3)),
            _ => BodyItem::subheading(format!("Heading {}", i)),
        })
        .collect();

    c.bench_function("dedup_body_1000_items", |b| {
        b.iter(|| dedup_body(black_box(&items)));
    });
}

/// Benchmark a full front-matter and body render into memory.
fn bench_render_document(c: &mut Criterion) {
    let template = create_template();
    let profile = extract_style_dna(&template, &AnalyzeOptions::default()).unwrap();
    let sections = retemplate::merge_chunks(create_chunks(16, 8));
    let options = RenderOptions::default();

    c.bench_function("render_document", |b| {
        b.iter(|| {
            let mut doc = template.clone();
            render_document(&mut doc, &profile, black_box(&sections), &options).unwrap()
        });
    });
}

criterion_group!(
    benches,
    bench_merge_chunks,
    bench_dedup_body,
    bench_render_document,
);
criterion_main!(benches);
