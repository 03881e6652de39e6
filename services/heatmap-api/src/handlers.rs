//! HTTP request handlers.

use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::Extension,
    http::{header, HeaderMap, StatusCode, Uri},
    response::{Html, IntoResponse, Response},
};
use metrics_exporter_prometheus::PrometheusHandle;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, instrument, warn};

use heatmap_common::{HeatmapError, HeatmapResult, TileCoord};
use renderer::ImageFormat;

use crate::metrics;
use crate::state::AppState;

/// Any prefix, then `z/x/y.ext`.
static TILE_PATH: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\A/.*/(\d+)/(\d+)/(\d+)\.(png|jpeg)\z").expect("tile path pattern is valid")
});

static INDEX_TEMPLATE: &str = include_str!("../assets/index.html");

/// A parsed tile request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileRequest {
    pub tile: TileCoord,
    pub format: ImageFormat,
}

/// Parse a request path such as `/tiles/12/2074/1409.png`.
pub fn parse_tile_path(path: &str) -> HeatmapResult<TileRequest> {
    let caps = TILE_PATH
        .captures(path)
        .ok_or_else(|| HeatmapError::MalformedAddress(path.to_string()))?;

    let number = |i: usize| -> HeatmapResult<u32> {
        caps[i]
            .parse()
            .map_err(|_| HeatmapError::MalformedAddress(format!("{}: '{}' is not a tile index", path, &caps[i])))
    };

    let tile = TileCoord::try_new(number(1)?, number(2)?, number(3)?)?;
    let format = ImageFormat::from_extension(&caps[4])?;

    Ok(TileRequest { tile, format })
}

#[instrument(skip(state, uri), fields(path = %uri.path()))]
pub async fn tile_handler(Extension(state): Extension<Arc<AppState>>, uri: Uri) -> Response {
    metrics::record_tile_request();

    match render_tile(&state, uri.path()).await {
        Ok((format, bytes)) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, format.content_type())],
            bytes,
        )
            .into_response(),
        Err(e) => {
            warn!(path = %uri.path(), kind = e.kind(), error = %e, "Tile request failed");
            metrics::record_tile_error(e.kind());
            let status = StatusCode::from_u16(e.http_status_code()).unwrap_or(StatusCode::NOT_FOUND);
            (status, e.to_string()).into_response()
        }
    }
}

async fn render_tile(state: &AppState, path: &str) -> HeatmapResult<(ImageFormat, Vec<u8>)> {
    let TileRequest { tile, format } = parse_tile_path(path)?;

    let bounds = state.renderer.query_bounds(&tile);
    let points = state.points.find_in_bbox(&bounds).await?;
    if points.is_empty() {
        return Err(HeatmapError::NoData(tile.to_string()));
    }
    metrics::record_points_per_tile(points.len());
    debug!(tile = %tile, points = points.len(), "Queried points");

    let renderer = state.renderer.clone();
    let start = Instant::now();
    let bytes = tokio::task::spawn_blocking(move || renderer.render_encoded(&tile, &points, format))
        .await
        .map_err(|e| HeatmapError::InternalError(format!("render task failed: {}", e)))??;
    metrics::record_tile_rendered(format, start.elapsed());

    Ok((format, bytes))
}

pub async fn index_handler(Extension(state): Extension<Arc<AppState>>) -> Html<String> {
    Html(INDEX_TEMPLATE.replace("{{title}}", &escape_html(&state.page_title)))
}

fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Echo the W3C `traceparent` header.
pub async fn trace_handler(headers: HeaderMap) -> String {
    let traceparent = headers
        .get("traceparent")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    format!("Trace is: {}\n", traceparent)
}

pub async fn health_handler() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

pub async fn metrics_handler(Extension(handle): Extension<PrometheusHandle>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        handle.render(),
    )
}
