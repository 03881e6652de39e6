//! Point catalog using PostgreSQL.

use sqlx::{postgres::PgPoolOptions, FromRow, PgPool, Postgres, QueryBuilder};
use tracing::{debug, info};

use async_trait::async_trait;
use heatmap_common::{BoundingBox, GeoPoint, HeatmapError, HeatmapResult};

use crate::source::PointSource;

/// Rows per INSERT statement when loading points.
const INSERT_BATCH_SIZE: usize = 1000;

/// Database connection pool and point queries.
#[derive(Clone)]
pub struct PointCatalog {
    pool: PgPool,
}

impl PointCatalog {
    /// Create a new catalog connection from database URL.
    pub async fn connect(database_url: &str) -> HeatmapResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(database_url)
            .await
            .map_err(|e| HeatmapError::DatabaseError(format!("Connection failed: {}", e)))?;

        Ok(Self { pool })
    }

    /// Create the points table and index if they do not exist.
    pub async fn migrate(&self) -> HeatmapResult<()> {
        for statement in SCHEMA_SQL.split(';') {
            let trimmed = statement.trim();
            if !trimmed.is_empty() {
                sqlx::query(trimmed)
                    .execute(&self.pool)
                    .await
                    .map_err(|e| HeatmapError::DatabaseError(format!("Migration failed: {}", e)))?;
            }
        }

        info!("Point catalog schema ready");
        Ok(())
    }

    /// Insert points in batches inside a single transaction.
    pub async fn insert_points(&self, points: &[GeoPoint]) -> HeatmapResult<u64> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| HeatmapError::DatabaseError(format!("Transaction failed: {}", e)))?;

        let mut inserted = 0;
        for batch in points.chunks(INSERT_BATCH_SIZE) {
            let mut builder: QueryBuilder<Postgres> = QueryBuilder::new("INSERT INTO points (lon, lat) ");
            builder.push_values(batch, |mut row, p| {
                row.push_bind(p.lon).push_bind(p.lat);
            });

            let result = builder
                .build()
                .execute(&mut *tx)
                .await
                .map_err(|e| HeatmapError::DatabaseError(format!("Insert failed: {}", e)))?;
            inserted += result.rows_affected();
        }

        tx.commit()
            .await
            .map_err(|e| HeatmapError::DatabaseError(format!("Commit failed: {}", e)))?;

        debug!(inserted, "Inserted points");
        Ok(inserted)
    }
}

#[async_trait]
impl PointSource for PointCatalog {
    async fn find_in_bbox(&self, bbox: &BoundingBox) -> HeatmapResult<Vec<GeoPoint>> {
        let rows = sqlx::query_as::<_, PointRow>(
            "SELECT lon, lat FROM points \
             WHERE lon BETWEEN $1 AND $3 AND lat BETWEEN $2 AND $4",
        )
        .bind(bbox.min_x)
        .bind(bbox.min_y)
        .bind(bbox.max_x)
        .bind(bbox.max_y)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| HeatmapError::DatabaseError(format!("Query failed: {}", e)))?;

        Ok(rows.into_iter().map(GeoPoint::from).collect())
    }

    async fn count(&self) -> HeatmapResult<u64> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM points")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| HeatmapError::DatabaseError(format!("Query failed: {}", e)))?;

        Ok(count.max(0) as u64)
    }

    fn name(&self) -> &'static str {
        "postgres"
    }
}

/// Internal row type for point queries.
#[derive(FromRow)]
struct PointRow {
    lon: f64,
    lat: f64,
}

impl From<PointRow> for GeoPoint {
    fn from(row: PointRow) -> Self {
        GeoPoint::new(row.lon, row.lat)
    }
}

const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS points (
    id BIGSERIAL PRIMARY KEY,
    lon DOUBLE PRECISION NOT NULL,
    lat DOUBLE PRECISION NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_points_lon_lat ON points(lon, lat);
"#;
