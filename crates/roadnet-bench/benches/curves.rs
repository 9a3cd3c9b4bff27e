use criterion::{BatchSize, BenchmarkId, Criterion, criterion_group, criterion_main};
use roadnet_core::{EditorConfig, NodeFlag, NodeId, Vec2, Vec3};
use roadnet_graph::{CubicCurve, FlatHeightMap, QuadCurve, RoadMap};
use std::hint::black_box;

fn anchors() -> (RoadMap, EditorConfig) {
    let mut map = RoadMap::new();
    map.add_node(Vec3::new(-200.0, 0.0, -150.0), NodeFlag::Standard);
    map.add_node(Vec3::new(250.0, 0.0, 180.0), NodeFlag::Standard);
    let mut config = EditorConfig::default();
    config.curve.max_interpolation_points = 200;
    (map, config)
}

fn bench_preview(c: &mut Criterion) {
    let (map, config) = anchors();
    let start = NodeId(1);
    let end = NodeId(2);

    let mut group = c.benchmark_group("curve_preview");
    for n in [10usize, 50, 200] {
        group.bench_with_input(BenchmarkId::new("quadratic", n), &n, |b, &n| {
            let mut curve = QuadCurve::with_points(&map, start, end, n, &config).expect("curve");
            b.iter(|| {
                curve.set_control_point(0, black_box(Vec2::new(10.0, -40.0)));
                black_box(curve.preview().len());
            })
        });
        group.bench_with_input(BenchmarkId::new("cubic", n), &n, |b, &n| {
            let mut curve = CubicCurve::with_points(&map, start, end, n, &config).expect("curve");
            b.iter(|| {
                curve.update_control_point(1, black_box(0.5), black_box(-0.5));
                black_box(curve.preview().len());
            })
        });
    }
    group.finish();
}

fn bench_commit(c: &mut Criterion) {
    let (map, config) = anchors();
    c.bench_function("cubic_commit_50_points", |b| {
        b.iter_batched(
            || {
                let curve = CubicCurve::with_points(&map, NodeId(1), NodeId(2), 50, &config)
                    .expect("curve");
                (map.clone(), curve)
            },
            |(mut map, curve)| {
                let change = curve.commit(&mut map, &FlatHeightMap(0.0)).expect("commit");
                black_box((map, change));
            },
            BatchSize::SmallInput,
        )
    });
}

criterion_group!(benches, bench_preview, bench_commit);
criterion_main!(benches);
