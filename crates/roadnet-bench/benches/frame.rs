use criterion::{Criterion, criterion_group, criterion_main};
use parking_lot::Mutex;
use roadnet_bench::grid_session;
use roadnet_core::Vec2;
use roadnet_render::{Palette, Renderer, Viewport, connection_pass, node_pass};
use std::hint::black_box;
use std::sync::Arc;

fn viewport(zoom: f64) -> Viewport {
    Viewport::centered_on(Vec2::new(0.0, 0.0), 1280.0, 800.0, zoom, 1024.0)
}

fn bench_passes(c: &mut Criterion) {
    let session = grid_session(100).expect("fixture");
    let palette = Palette::default();

    for zoom in [0.5, 4.0] {
        let view = viewport(zoom);
        c.bench_function(&format!("connection_pass_10k_zoom_{zoom}"), |b| {
            b.iter(|| black_box(connection_pass(session.map(), &view, &palette, 40.0)))
        });
        c.bench_function(&format!("node_pass_10k_zoom_{zoom}"), |b| {
            b.iter(|| black_box(node_pass(&session, &view, &palette)))
        });
    }
}

fn bench_full_frame(c: &mut Criterion) {
    let session = Arc::new(Mutex::new(grid_session(100).expect("fixture")));
    let mut renderer = Renderer::start(session).expect("renderer");
    let view = viewport(4.0);

    c.bench_function("paint_frame_10k_nodes", |b| {
        b.iter(|| black_box(renderer.paint(view).primitives.len()))
    });
    renderer.shutdown();
}

criterion_group!(benches, bench_passes, bench_full_frame);
criterion_main!(benches);
