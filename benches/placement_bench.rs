//! Benchmarks for the placement grid scan.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use wifi_sitesurvey::{
    AuxiliarySensors, CaptureRequest, MotionSample, RawSignal, SpatialLayout,
    PlacementConfig, PlacementOptimizer, SurveyConfig, SurveyPlanner,
};

fn build_layout(points: usize) -> SpatialLayout {
    let planner = SurveyPlanner::new(SurveyConfig::default());
    planner.start_session().unwrap();
    for i in 0..points {
        planner
            .capture(CaptureRequest {
                label: format!("spot-{i}"),
                kind: None,
                floor: 1 + (i % 3) as u32,
                raw_signal: RawSignal::Fraction((i % 10) as f64 / 10.0),
                sensors: AuxiliarySensors::all_available(),
                motion: MotionSample {
                    heading_rad: (i as f64 * 0.7).sin(),
                    step_count: 4 + (i % 5) as u32,
                    altitude_delta_m: 0.0,
                },
            })
            .unwrap();
    }
    planner.end_session().unwrap();
    planner.snapshot_layout().unwrap()
}

fn bench_grid_scan(c: &mut Criterion) {
    let mut group = c.benchmark_group("placement_scan");

    for &points in &[10usize, 50, 200] {
        let layout = build_layout(points);
        let optimizer = PlacementOptimizer::new(PlacementConfig::default());
        group.bench_function(format!("grid20_points{points}"), |b| {
            b.iter(|| optimizer.optimize(black_box(&layout)).unwrap())
        });
    }

    let layout = build_layout(50);
    let optimizer = PlacementOptimizer::new(PlacementConfig {
        grid_resolution: 100,
        ..PlacementConfig::default()
    });
    group.bench_function("grid100_points50", |b| {
        b.iter(|| optimizer.optimize(black_box(&layout)).unwrap())
    });

    group.finish();
}

criterion_group!(benches, bench_grid_scan);
criterion_main!(benches);
