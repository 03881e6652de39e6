//! Rendering behaviour over whole tiles.

use std::sync::Arc;

use heatmap_common::{GeoPoint, HeatmapError, TileCoord};
use renderer::{ColorScheme, ImageFormat, RenderOptions, TileRenderer};
use test_utils::{clustered_points, fixtures, shuffled, uniform_points_in_tile};

fn renderer() -> TileRenderer {
    TileRenderer::new(Arc::new(ColorScheme::pbj()), RenderOptions::default()).unwrap()
}

#[test]
fn test_point_order_does_not_matter() {
    let tile = fixtures::paris_tile();
    let points = uniform_points_in_tile(&tile, 200, 7);
    let r = renderer();

    let a = r.render(&tile, &points).unwrap();
    let b = r.render(&tile, &shuffled(&points, 99)).unwrap();
    assert_eq!(a, b);

    let png_a = r.render_encoded(&tile, &points, ImageFormat::Png).unwrap();
    let png_b = r.render_encoded(&tile, &shuffled(&points, 3), ImageFormat::Png).unwrap();
    assert_eq!(png_a, png_b);
}

#[test]
fn test_rendering_is_idempotent() {
    let tile = fixtures::nyc_tile();
    let points = clustered_points(fixtures::tile_center(&tile), 0.05, 500, 11);
    let r = renderer();

    for format in [ImageFormat::Png, ImageFormat::Jpeg] {
        let first = r.render_encoded(&tile, &points, format).unwrap();
        let second = r.render_encoded(&tile, &points, format).unwrap();
        assert_eq!(first, second, "{} output differs between runs", format);
    }
}

#[test]
fn test_empty_input_is_no_data() {
    let r = renderer();
    for tile in fixtures::sample_tiles() {
        assert!(matches!(r.render(&tile, &[]), Err(HeatmapError::NoData(_))));
    }
}

#[test]
fn test_dot_just_outside_tile_bleeds_in() {
    let tile = fixtures::paris_tile();
    let outside = fixtures::point_in_tile(&tile, -8.0 / 256.0, 0.5);
    let image = renderer().render(&tile, &[outside]).unwrap();

    let row = (0..256).find(|&y| image.get_pixel(0, y).0[3] > 0);
    assert!(row.is_some(), "no colour reached the west edge");
    assert_eq!(image.get_pixel(255, 128).0, [0, 0, 0, 0]);
}

#[test]
fn test_distant_point_leaves_tile_transparent() {
    let tile = fixtures::paris_tile();
    let far = fixtures::point_in_tile(&tile, -0.5, 0.5);
    let image = renderer().render(&tile, &[far]).unwrap();
    assert!(image.pixels().all(|p| p.0[3] == 0));
}

#[test]
fn test_denser_area_is_more_intense() {
    let tile = TileCoord::new(8, 128, 100);
    let mut points = vec![fixtures::point_in_tile(&tile, 0.25, 0.5)];
    points.extend(std::iter::repeat(fixtures::point_in_tile(&tile, 0.75, 0.5)).take(5));

    // High cap so stacked dots stay below saturation.
    let options = RenderOptions {
        dot_radius: 16,
        intensity_cap: 2000,
    };
    let image = TileRenderer::new(Arc::new(ColorScheme::classic()), options)
        .unwrap()
        .render(&tile, &points)
        .unwrap();

    let alpha = |fx: f64| {
        (0..256)
            .map(|y| image.get_pixel((fx * 256.0) as u32, y).0[3])
            .max()
            .unwrap_or(0)
    };
    assert!(alpha(0.75) > alpha(0.25));
}

#[test]
fn test_unprojectable_points_are_skipped() {
    let tile = fixtures::paris_tile();
    let good = fixtures::tile_center(&tile);
    let r = renderer();

    let clean = r.render(&tile, &[good]).unwrap();
    let noisy = r
        .render(
            &tile,
            &[GeoPoint::new(f64::NAN, 48.0), good, GeoPoint::new(2.3, 88.0)],
        )
        .unwrap();
    assert_eq!(clean, noisy);
}
