//! Seeded point generators.
//!
//! Every generator takes an explicit seed so test runs are reproducible.

use heatmap_common::{GeoPoint, TileCoord};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Creates `count` points uniformly distributed inside a tile.
pub fn uniform_points_in_tile(tile: &TileCoord, count: usize, seed: u64) -> Vec<GeoPoint> {
    let b = tile.bounds();
    let mut rng = StdRng::seed_from_u64(seed);

    (0..count)
        .map(|_| {
            GeoPoint::new(
                rng.gen_range(b.min_x..b.max_x),
                rng.gen_range(b.min_y..b.max_y),
            )
        })
        .collect()
}

/// Creates a cluster of `count` points around `center`.
///
/// Offsets are uniform in a disc of `radius_deg` degrees, which concentrates
/// density towards the centre the way real point data (shops, sightings,
/// GPS fixes) tends to cluster.
pub fn clustered_points(center: GeoPoint, radius_deg: f64, count: usize, seed: u64) -> Vec<GeoPoint> {
    let mut rng = StdRng::seed_from_u64(seed);

    (0..count)
        .map(|_| {
            let angle = rng.gen_range(0.0..std::f64::consts::TAU);
            let dist = rng.gen_range(0.0..radius_deg);
            GeoPoint::new(center.lon + dist * angle.cos(), center.lat + dist * angle.sin())
        })
        .collect()
}

/// Deterministic permutation of a point set (Fisher-Yates with a seed).
pub fn shuffled(points: &[GeoPoint], seed: u64) -> Vec<GeoPoint> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut out = points.to_vec();
    for i in (1..out.len()).rev() {
        let j = rng.gen_range(0..=i);
        out.swap(i, j);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uniform_points_inside_tile() {
        let tile = TileCoord::new(10, 500, 400);
        let bounds = tile.bounds();
        let points = uniform_points_in_tile(&tile, 200, 7);
        assert_eq!(points.len(), 200);
        assert!(points.iter().all(|p| bounds.contains(p)));
    }

    #[test]
    fn test_generators_are_seeded() {
        let center = GeoPoint::new(2.35, 48.85);
        assert_eq!(
            clustered_points(center, 0.01, 50, 42),
            clustered_points(center, 0.01, 50, 42)
        );
        assert_ne!(
            clustered_points(center, 0.01, 50, 42),
            clustered_points(center, 0.01, 50, 43)
        );
    }

    #[test]
    fn test_shuffled_is_permutation() {
        let points = uniform_points_in_tile(&TileCoord::new(3, 1, 1), 16, 5);
        let mut a = shuffled(&points, 1);
        assert_ne!(a, points);

        let key = |p: &GeoPoint| (p.lon.to_bits(), p.lat.to_bits());
        let mut b = points.clone();
        a.sort_by_key(key);
        b.sort_by_key(key);
        assert_eq!(a, b);
    }
}
