//! Prometheus metrics for tile serving.

use std::time::Duration;

use metrics::{counter, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};
use renderer::ImageFormat;

/// Install the global Prometheus recorder.
pub fn install_recorder() -> Result<PrometheusHandle, BuildError> {
    PrometheusBuilder::new()
        .set_buckets_for_metric(
            metrics_exporter_prometheus::Matcher::Full("heatmap_render_duration_ms".to_string()),
            &[1.0, 2.5, 5.0, 10.0, 25.0, 50.0, 100.0, 250.0, 500.0],
        )?
        .install_recorder()
}

pub fn record_tile_request() {
    counter!("heatmap_tile_requests_total").increment(1);
}

pub fn record_tile_error(kind: &'static str) {
    counter!("heatmap_tile_errors_total", "kind" => kind).increment(1);
}

pub fn record_points_per_tile(count: usize) {
    histogram!("heatmap_points_per_tile").record(count as f64);
}

pub fn record_tile_rendered(format: ImageFormat, elapsed: Duration) {
    counter!("heatmap_tiles_rendered_total", "format" => format.as_str()).increment(1);
    histogram!("heatmap_render_duration_ms").record(elapsed.as_secs_f64() * 1000.0);
}
