use criterion::{black_box, criterion_group, criterion_main, Criterion};
use doctor_map::color::Rgb;
use doctor_map::config::BoundaryConfig;
use doctor_map::data::{BoundaryData, BoundaryFeature};
use doctor_map::districts::DistrictTable;
use doctor_map::map::{MapRenderer, Viewport};
use doctor_map::marker::{MarkerLayer, MarkerStyle};
use glam::DVec2;

const BACKGROUND: Rgb = Rgb::from_u32(0xf5f5f5);

fn viewport() -> Viewport {
    // 120 x 40 character canvas
    Viewport::new(66.0, 28.5, 6.5, 64.0, 240, 160)
}

/// Ring of `n` points around a centre, a stand-in for a district outline
fn district_ring(lon: f64, lat: f64, radius: f64, n: usize) -> Vec<(f64, f64)> {
    (0..=n)
        .map(|i| {
            let t = i as f64 / n as f64 * std::f64::consts::TAU;
            (lon + radius * t.cos(), lat + radius * t.sin())
        })
        .collect()
}

fn synthetic_boundary(table: &DistrictTable) -> BoundaryData {
    BoundaryData {
        features: table
            .records()
            .iter()
            .filter_map(|r| {
                let (lon, lat) = r.coordinate?;
                Some(BoundaryFeature {
                    name: Some(r.name.clone()),
                    polygons: vec![vec![district_ring(lon, lat, 0.6, 400)]],
                })
            })
            .collect(),
    }
}

fn bench_projection(c: &mut Criterion) {
    let vp = viewport();
    c.bench_function("project_1k_points", |b| {
        b.iter(|| {
            for i in 0..1000 {
                let lon = 62.0 + (i % 80) as f64 * 0.1;
                let lat = 25.0 + (i / 80) as f64 * 0.5;
                black_box(vp.project(lon, lat));
            }
        })
    });
}

fn bench_markers(c: &mut Criterion) {
    let table = DistrictTable::builtin();
    let style = MarkerStyle::default();
    c.bench_function("marker_layer_build", |b| {
        b.iter(|| MarkerLayer::build(black_box(&table), &style, BACKGROUND))
    });

    let vp = viewport();
    let mut layer = MarkerLayer::build(&table, &style, BACKGROUND);
    c.bench_function("hover_hit_test", |b| {
        b.iter(|| {
            for x in (0..240).step_by(6) {
                layer.pointer_moved(&vp, Some(DVec2::new(x as f64, 80.0)));
            }
        })
    });
}

fn bench_render(c: &mut Criterion) {
    let table = DistrictTable::builtin();
    let markers = MarkerLayer::build(&table, &MarkerStyle::default(), BACKGROUND);
    let mut renderer = MapRenderer::new(BACKGROUND, BoundaryConfig::default());
    renderer.set_boundary(synthetic_boundary(&table));
    let vp = viewport();

    c.bench_function("render_frame", |b| {
        b.iter(|| renderer.render(120, 40, black_box(&vp), &markers))
    });
}

criterion_group!(benches, bench_projection, bench_markers, bench_render);
criterion_main!(benches);
