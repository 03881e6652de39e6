use std::sync::Arc;

use heatmap_common::{BoundingBox, GeoPoint, TileMargin};
use storage::{MemoryPointStore, PointSource};
use test_utils::{fixtures, uniform_points_in_tile, write_points_file, write_temp_geojson};

fn paris_bbox() -> BoundingBox {
    let (min_x, min_y, max_x, max_y) = fixtures::bbox::PARIS;
    BoundingBox::new(min_x, min_y, max_x, max_y)
}

#[tokio::test]
async fn test_load_feature_collection_file() {
    let file = write_temp_geojson(&fixtures::paris_geojson());
    let store = MemoryPointStore::from_file(file.path()).unwrap();

    // The LineString feature is skipped.
    assert_eq!(store.len(), 5);
    assert_eq!(store.count().await.unwrap(), 5);
    assert_eq!(store.points(), fixtures::paris_landmarks().as_slice());
}

#[tokio::test]
async fn test_find_in_bbox_filters() {
    let store = MemoryPointStore::from_points(
        fixtures::paris_landmarks()
            .into_iter()
            .chain([GeoPoint::new(-74.0, 40.7), GeoPoint::new(151.2, -33.9)])
            .collect(),
    );

    let found = store.find_in_bbox(&paris_bbox()).await.unwrap();
    assert_eq!(found.len(), 5);
    assert!(found.iter().all(|p| paris_bbox().contains(p)));

    let empty = store
        .find_in_bbox(&BoundingBox::new(10.0, 10.0, 11.0, 11.0))
        .await
        .unwrap();
    assert!(empty.is_empty());
}

#[tokio::test]
async fn test_bbox_edges_are_inclusive() {
    let store = MemoryPointStore::from_points(vec![GeoPoint::new(1.0, 1.0), GeoPoint::new(2.0, 2.0)]);
    let found = store
        .find_in_bbox(&BoundingBox::new(1.0, 1.0, 2.0, 2.0))
        .await
        .unwrap();
    assert_eq!(found.len(), 2);
}

#[tokio::test]
async fn test_tile_query_through_trait_object() {
    let tile = fixtures::paris_tile();
    let inside = uniform_points_in_tile(&tile, 50, 3);
    let file = write_points_file(&inside);

    let source: Arc<dyn PointSource> = Arc::new(MemoryPointStore::from_file(file.path()).unwrap());
    let bounds = TileMargin::default().query_bounds(&tile);
    let found = source.find_in_bbox(&bounds).await.unwrap();

    assert_eq!(found.len(), 50);
    assert_eq!(source.name(), "memory");
}

#[test]
fn test_missing_file_is_error() {
    assert!(MemoryPointStore::from_file("/nonexistent/points.geojson").is_err());
}
