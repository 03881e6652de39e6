//! Benchmarks for heatmap tile rendering and encoding.
//!
//! Run with: cargo bench --package renderer --bench render_benchmarks

use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use heatmap_common::TileCoord;
use rand::{Rng, SeedableRng};
use renderer::{encode_as, ColorScheme, ImageFormat, RenderOptions, TileRenderer};
use test_utils::{clustered_points, fixtures, uniform_points_in_tile};

fn renderer() -> TileRenderer {
    TileRenderer::new(Arc::new(ColorScheme::classic()), RenderOptions::default()).unwrap()
}

fn bench_render_point_counts(c: &mut Criterion) {
    let mut group = c.benchmark_group("render_points");
    let tile = fixtures::paris_tile();
    let r = renderer();

    for count in [10usize, 100, 1_000, 10_000] {
        let points = uniform_points_in_tile(&tile, count, 42);
        group.throughput(Throughput::Elements(count as u64));
        group.bench_with_input(BenchmarkId::from_parameter(count), &points, |b, points| {
            b.iter(|| r.render(black_box(&tile), black_box(points)).unwrap())
        });
    }
    group.finish();
}

fn bench_dot_radius(c: &mut Criterion) {
    let mut group = c.benchmark_group("render_dot_radius");
    let tile = fixtures::nyc_tile();
    let points = clustered_points(fixtures::tile_center(&tile), 0.1, 2_000, 7);

    for radius in [4u32, 16, 48] {
        let r = TileRenderer::new(
            Arc::new(ColorScheme::fire()),
            RenderOptions {
                dot_radius: radius,
                intensity_cap: 128,
            },
        )
        .unwrap();
        group.bench_with_input(BenchmarkId::from_parameter(radius), &points, |b, points| {
            b.iter(|| r.render(black_box(&tile), black_box(points)).unwrap())
        });
    }
    group.finish();
}

fn bench_encode(c: &mut Criterion) {
    let mut group = c.benchmark_group("encode");
    let tile = fixtures::paris_tile();
    let image = renderer()
        .render(&tile, &uniform_points_in_tile(&tile, 1_000, 1))
        .unwrap();

    for format in [ImageFormat::Png, ImageFormat::Jpeg] {
        group.bench_with_input(BenchmarkId::from_parameter(format), &image, |b, image| {
            b.iter(|| encode_as(black_box(image), format).unwrap())
        });
    }

    // Full-colour noise forces the RGBA fallback.
    let mut rng = rand::rngs::StdRng::seed_from_u64(9);
    let mut noise = image::RgbaImage::new(256, 256);
    for px in noise.pixels_mut() {
        *px = image::Rgba([rng.gen(), rng.gen(), rng.gen(), 255]);
    }
    group.bench_function("png_rgba_fallback", |b| {
        b.iter(|| encode_as(black_box(&noise), ImageFormat::Png).unwrap())
    });
    group.finish();
}

fn bench_world_tile(c: &mut Criterion) {
    let tile = TileCoord::new(0, 0, 0);
    let points: Vec<_> = fixtures::sample_tiles()
        .iter()
        .flat_map(|t| uniform_points_in_tile(t, 500, t.z as u64))
        .collect();
    let r = renderer();

    c.bench_function("render_world_tile", |b| {
        b.iter(|| r.render(black_box(&tile), black_box(&points)).unwrap())
    });
}

criterion_group!(
    benches,
    bench_render_point_counts,
    bench_dot_radius,
    bench_encode,
    bench_world_tile
);
criterion_main!(benches);
