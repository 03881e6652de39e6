//! Geographic point type.

use serde::{Deserialize, Serialize};

/// Largest latitude representable in Web Mercator, `atan(sinh(π))` in degrees.
pub const MAX_LATITUDE: f64 = 85.051_128_779_806_59;

/// A WGS84 point in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lon: f64,
    pub lat: f64,
}

impl GeoPoint {
    pub fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }

    /// Whether the Mercator transform is defined for this point.
    ///
    /// Near the poles `tan`/`sec` diverge, so anything outside the
    /// Web Mercator latitude band is rejected. Longitude is unconstrained:
    /// out-of-range values project outside the tile and are clipped there.
    pub fn is_projectable(&self) -> bool {
        self.lon.is_finite() && self.lat.is_finite() && self.lat.abs() <= MAX_LATITUDE
    }
}

impl From<(f64, f64)> for GeoPoint {
    fn from((lon, lat): (f64, f64)) -> Self {
        Self { lon, lat }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_projectable_range() {
        assert!(GeoPoint::new(2.35, 48.85).is_projectable());
        assert!(GeoPoint::new(-180.0, -MAX_LATITUDE).is_projectable());
        assert!(!GeoPoint::new(0.0, 89.9).is_projectable());
        assert!(!GeoPoint::new(0.0, -90.0).is_projectable());
        assert!(GeoPoint::new(181.0, 0.0).is_projectable());
        assert!(GeoPoint::new(-540.0, 10.0).is_projectable());
        assert!(!GeoPoint::new(f64::NAN, 0.0).is_projectable());
        assert!(!GeoPoint::new(f64::INFINITY, 0.0).is_projectable());
    }
}
