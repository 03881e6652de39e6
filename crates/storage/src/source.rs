//! Point source abstraction.

use async_trait::async_trait;
use heatmap_common::{BoundingBox, GeoPoint, HeatmapResult};

/// Anything that can answer "which points fall in this box".
///
/// Implementations may return points slightly outside the box; the renderer
/// clips by pixel position anyway.
#[async_trait]
pub trait PointSource: Send + Sync {
    async fn find_in_bbox(&self, bbox: &BoundingBox) -> HeatmapResult<Vec<GeoPoint>>;

    /// Total number of points held by the source.
    async fn count(&self) -> HeatmapResult<u64>;

    /// Short name for logs.
    fn name(&self) -> &'static str;
}
