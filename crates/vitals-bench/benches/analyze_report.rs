// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use vitals_analyze::{AnalysisConfig, Analyzer};
use vitals_bench::corrupted_fixture;
use vitals_clean::{CleaningConfig, CleaningPipeline};

fn benchmark_analyze_u100_d90(c: &mut Criterion) {
    let (readings, population) = corrupted_fixture(100, 90).expect("benchmark fixture should build");
    let cleaned = CleaningPipeline::new(CleaningConfig::default())
        .expect("cleaning config should be valid")
        .apply(&readings)
        .expect("fixture should clean");
    let analyzer = Analyzer::new(AnalysisConfig::default()).expect("analysis config should be valid");

    c.bench_function("analyze_report_u100_d90", |b| {
        b.iter(|| {
            analyzer
                .analyze(black_box(&cleaned.readings), black_box(&population))
                .expect("analysis benchmark should succeed");
        })
    });
}

criterion_group!(benches, benchmark_analyze_u100_d90);
criterion_main!(benches);
