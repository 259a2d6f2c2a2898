//! Cross-validation engine benchmarks using Criterion.
//!
//! Benchmarks cover:
//! - Scalability (1K to 50K samples, 5 folds)
//! - Fold count (2 to 20 folds)
//! - Diagnostic overhead (none, per-fold, transfer-level, all)
//! - Harvest copy modes (shared, copy, deep copy)

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use crossval::prelude::*;
use crossval_benchmarks::{KFold, ZeroOneLoss, generate_points};
use std::hint::black_box;

// ============================================================================
// Benchmark Functions
// ============================================================================

fn bench_scalability(c: &mut Criterion) {
    let mut group = c.benchmark_group("scalability");
    group.sample_size(30);

    for size in [1_000, 10_000, 50_000] {
        group.throughput(Throughput::Elements(size as u64));

        let points = generate_points(size, 3, 42);

        group.bench_with_input(BenchmarkId::new("kfold_5", size), &size, |b, _| {
            b.iter(|| {
                CrossValidation::new()
                    .splitter(KFold { k: 5, seed: 7 })
                    .build(ZeroOneLoss::default())
                    .unwrap()
                    .run(black_box(&points))
                    .unwrap()
            })
        });
    }
    group.finish();
}

fn bench_folds(c: &mut Criterion) {
    let mut group = c.benchmark_group("folds");
    group.sample_size(50);

    let points = generate_points(10_000, 3, 42);

    for k in [2, 5, 10, 20] {
        group.bench_with_input(BenchmarkId::new("kfold", k), &k, |b, &k| {
            b.iter(|| {
                CrossValidation::new()
                    .splitter(KFold { k, seed: 7 })
                    .build(ZeroOneLoss::default())
                    .unwrap()
                    .run(black_box(&points))
                    .unwrap()
            })
        });
    }
    group.finish();
}

fn bench_diagnostics(c: &mut Criterion) {
    let mut group = c.benchmark_group("diagnostics");
    group.sample_size(50);

    let points = generate_points(10_000, 3, 42);

    let configs: [(&str, &[Diagnostic]); 4] = [
        ("none", &[]),
        ("per_fold", &[Diagnostic::Results, Diagnostic::Splits]),
        (
            "transfer",
            &[
                Diagnostic::Confusion,
                Diagnostic::TrainingConfusion,
                Diagnostic::SamplesError,
            ],
        ),
        ("all", &Diagnostic::ALL),
    ];

    for (name, diagnostics) in configs {
        group.bench_function(name, |b| {
            b.iter(|| {
                let mut cv = CrossValidation::new()
                    .splitter(KFold { k: 5, seed: 7 })
                    .enable_all_of(diagnostics)
                    .build(ZeroOneLoss::default())
                    .unwrap();
                cv.run(black_box(&points)).unwrap()
            })
        });
    }
    group.finish();
}

fn bench_harvest(c: &mut Criterion) {
    let mut group = c.benchmark_group("harvest");
    group.sample_size(50);

    let points = generate_points(10_000, 3, 42);

    for (name, copy) in [
        ("shared", HarvestCopy::Shared),
        ("copy", HarvestCopy::Copy),
        ("deep_copy", HarvestCopy::DeepCopy),
    ] {
        group.bench_function(name, |b| {
            b.iter(|| {
                let mut cv = CrossValidation::new()
                    .splitter(KFold { k: 5, seed: 7 })
                    .harvest(&[HarvestAttribute::Result, HarvestAttribute::Split])
                    .copy_harvested(copy)
                    .build(ZeroOneLoss::default())
                    .unwrap();
                cv.run(black_box(&points)).unwrap()
            })
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_scalability,
    bench_folds,
    bench_diagnostics,
    bench_harvest,
);

criterion_main!(benches);
