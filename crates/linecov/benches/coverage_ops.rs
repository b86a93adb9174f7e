//! Coverage Operations Benchmarks
//!
//! Benchmarks for the per-line hot path: tracer dispatch, scope filtering
//! and store updates.
//!
//! Run with: `cargo bench --bench coverage_ops`

#![allow(clippy::unwrap_used)]

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use linecov::coverage::{is_in_scope, CoverageStore};
use linecov::prelude::*;

fn bench_scope_filter(c: &mut Criterion) {
    let mut group = c.benchmark_group("scope_filter");

    group.bench_function("in_scope", |bench| {
        bench.iter(|| is_in_scope(black_box("/proj/src"), black_box("/proj/src/models/user.rb")));
    });
    group.bench_function("out_of_scope", |bench| {
        bench.iter(|| is_in_scope(black_box("/proj/src"), black_box("/usr/lib/ruby/set.rb")));
    });

    group.finish();
}

fn bench_store_recording(c: &mut Criterion) {
    let mut group = c.benchmark_group("store_recording");

    let paths: Vec<String> = (0..50).map(|i| format!("/proj/src/file_{i}.rb")).collect();

    for count in [1_000u32, 10_000, 100_000] {
        group.bench_with_input(
            BenchmarkId::new("lines", count),
            &count,
            |bench, &n| {
                bench.iter(|| {
                    let mut store = CoverageStore::new();
                    for i in 0..n {
                        let path = &paths[(i % 50) as usize];
                        store.record_line(path, i % 200 + 1);
                    }
                    black_box(store);
                });
            },
        );
        group.bench_with_input(
            BenchmarkId::new("files", count),
            &count,
            |bench, &n| {
                bench.iter(|| {
                    let mut store = CoverageStore::new();
                    for i in 0..n {
                        store.record_file(&paths[(i % 50) as usize]);
                    }
                    black_box(store);
                });
            },
        );
    }

    group.finish();
}

fn bench_collector_dispatch(c: &mut Criterion) {
    let mut group = c.benchmark_group("collector_dispatch");

    for mode in [CoverageMode::Files, CoverageMode::Lines] {
        group.bench_function(mode.as_str(), |bench| {
            let config = CoverageConfig::builder()
                .root("/proj/src")
                .mode(mode)
                .build()
                .unwrap();
            let mut collector = Collector::with_tracer(config, ThreadTracer::new());
            let tracer = ThreadTracer::new();
            let _ = collector.start();
            let mut line = 0u32;
            bench.iter(|| {
                line = line % 500 + 1;
                black_box(tracer.emit_line(black_box("/proj/src/app/model.rb"), line));
            });
            let _ = collector.stop();
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_scope_filter,
    bench_store_recording,
    bench_collector_dispatch
);
criterion_main!(benches);
