//! Benchmarks for the diff engine.
//!
//! Performance-critical paths:
//! - `diff_lines`: LCS table plus modification pairing, run on every chunk
//! - `DiffView::compute`: the above plus block grouping
//! - `render`: intra-line diffs of every modified line

#![allow(missing_docs)]

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use diff_engine::{DiffView, diff_lines};

/// A note of `lines` lines and a rewrite touching every fourth line.
fn fixture(lines: usize) -> (String, String) {
    let original: Vec<String> = (0..lines)
        .map(|i| format!("line {i}: the quick brown fox jumps over the lazy dog"))
        .collect();
    let candidate: Vec<String> = original
        .iter()
        .enumerate()
        .map(|(i, line)| {
            if i % 4 == 0 {
                line.replace("lazy", "sleepy")
            } else {
                line.clone()
            }
        })
        .collect();
    (original.join("\n"), candidate.join("\n"))
}

fn bench_diff_lines(c: &mut Criterion) {
    let mut group = c.benchmark_group("line_diff/diff_lines");

    for lines in [10usize, 100, 1000] {
        let (original, candidate) = fixture(lines);
        group.throughput(Throughput::Elements(lines as u64));
        group.bench_with_input(BenchmarkId::from_parameter(lines), &lines, |b, _| {
            b.iter(|| diff_lines(black_box(&original), black_box(&candidate)));
        });
    }

    group.finish();
}

fn bench_view_compute(c: &mut Criterion) {
    let mut group = c.benchmark_group("line_diff/view_compute");

    for lines in [10usize, 100, 1000] {
        let (original, candidate) = fixture(lines);
        group.bench_with_input(BenchmarkId::from_parameter(lines), &lines, |b, _| {
            b.iter(|| DiffView::compute(black_box(&original), black_box(&candidate)));
        });
    }

    group.finish();
}

fn bench_streaming_recompute(c: &mut Criterion) {
    let mut group = c.benchmark_group("line_diff/streaming");

    // Re-diffs a 100-line candidate as it grows one line at a time.
    let (original, candidate) = fixture(100);
    let prefixes: Vec<&str> = candidate
        .match_indices('\n')
        .map(|(i, _)| &candidate[..i])
        .collect();

    group.bench_function("100_lines", |b| {
        b.iter(|| {
            for prefix in &prefixes {
                black_box(DiffView::compute(&original, prefix));
            }
        });
    });

    group.finish();
}

fn bench_render(c: &mut Criterion) {
    let mut group = c.benchmark_group("line_diff/render");

    for lines in [10usize, 100, 1000] {
        let (original, candidate) = fixture(lines);
        let view = DiffView::compute(&original, &candidate);
        group.bench_with_input(BenchmarkId::from_parameter(lines), &view, |b, view| {
            b.iter(|| black_box(view).render());
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_diff_lines,
    bench_view_compute,
    bench_streaming_recompute,
    bench_render
);
criterion_main!(benches);
