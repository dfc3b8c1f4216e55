//! Benchmarks for the quality control checks on long multi-row profiles

use argo_rtqc::{
    Check, GlobalRangeCheck, PressureIncreasingCheck, Profile, PropertyData, QcConfig,
    run_checks,
};
use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};

/// Profile of `rows` casts with `samples` levels each, with an occasional
/// pressure inversion and out-of-range temperature
fn create_profile(rows: usize, samples: usize) -> Profile {
    let mut pressure = Vec::with_capacity(rows);
    let mut temperature = Vec::with_capacity(rows);
    for row in 0..rows {
        pressure.push(
            (0..samples)
                .map(|i| if (i + row) % 97 == 0 { i as f64 - 2.0 } else { i as f64 * 2.0 })
                .collect::<Vec<f64>>(),
        );
        temperature.push(
            (0..samples)
                .map(|i| if i % 211 == 0 { 45.0 } else { 20.0 - i as f64 * 0.01 })
                .collect::<Vec<f64>>(),
        );
    }

    let salinity = vec![vec![35.0; samples]; rows];
    Profile::new(
        PropertyData::from_rows(pressure).unwrap(),
        PropertyData::from_rows(temperature).unwrap(),
        PropertyData::from_rows(salinity).unwrap(),
    )
    .unwrap()
}

fn bench_pressure_increasing(c: &mut Criterion) {
    let mut group = c.benchmark_group("pressure_increasing");
    for samples in [100, 1_000, 10_000] {
        let profile = create_profile(4, samples);
        group.bench_with_input(BenchmarkId::from_parameter(samples), &profile, |b, profile| {
            b.iter(|| {
                let check = PressureIncreasingCheck::new(black_box(profile), None);
                check.run().unwrap()
            })
        });
    }
    group.finish();
}

fn bench_global_range(c: &mut Criterion) {
    let mut group = c.benchmark_group("global_range");
    for samples in [100, 1_000, 10_000] {
        let profile = create_profile(4, samples);
        group.bench_with_input(BenchmarkId::from_parameter(samples), &profile, |b, profile| {
            b.iter(|| {
                let check = GlobalRangeCheck::new(black_box(profile), None);
                check.run().unwrap()
            })
        });
    }
    group.finish();
}

fn bench_run_and_merge(c: &mut Criterion) {
    let profile = create_profile(4, 2_000);
    let config = QcConfig::default();

    c.bench_function("run_checks_and_merge", |b| {
        b.iter(|| {
            let run = run_checks(black_box(&profile), None, &config).unwrap();
            run.merged(&profile).unwrap()
        })
    });
}

criterion_group!(
    benches,
    bench_pressure_increasing,
    bench_global_range,
    bench_run_and_merge
);
criterion_main!(benches);
