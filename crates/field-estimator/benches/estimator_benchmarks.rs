//! Benchmarks for field estimation.
//!
//! Run with: cargo bench --package field-estimator
//! Or: cargo bench --package field-estimator -- radial

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use field_estimator::{FieldEstimator, RadialInfluenceEstimator, ScatteredInterpolator, ScatteredMethod};
use survey_common::{GridBuilder, ValueField};
use test_utils::scattered_survey;

// ============================================================================
// Scattered interpolation
// ============================================================================

fn bench_scattered(c: &mut Criterion) {
    let mut group = c.benchmark_group("scattered");
    let dataset = scattered_survey(120, 800.0, 600.0, 42);

    for resolution in [100usize, 300] {
        let grid = GridBuilder::build(800, 600, resolution).unwrap();
        group.throughput(Throughput::Elements(grid.len() as u64));

        for method in [ScatteredMethod::Nearest, ScatteredMethod::Linear, ScatteredMethod::Cubic] {
            let estimator = ScatteredInterpolator::new(method);
            group.bench_with_input(BenchmarkId::new(method.as_str(), resolution), &grid, |b, grid| {
                b.iter(|| {
                    estimator
                        .estimate(black_box(grid), black_box(&dataset), ValueField::Download)
                        .unwrap()
                })
            });
        }
    }

    group.finish();
}

// ============================================================================
// Radial influence
// ============================================================================

fn bench_radial(c: &mut Criterion) {
    let mut group = c.benchmark_group("radial");
    let grid = GridBuilder::build(800, 600, 100).unwrap();
    let estimator = RadialInfluenceEstimator::new(50.0).unwrap();

    for sources in [20usize, 200] {
        let dataset = scattered_survey(sources, 800.0, 600.0, 9);
        group.throughput(Throughput::Elements((grid.len() * sources) as u64));
        group.bench_with_input(BenchmarkId::new("sources", sources), &dataset, |b, dataset| {
            b.iter(|| {
                estimator
                    .estimate(black_box(&grid), black_box(dataset), ValueField::Download)
                    .unwrap()
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_scattered, bench_radial);
criterion_main!(benches);
