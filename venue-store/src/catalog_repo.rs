use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use venue_core::repository::{RepoError, ResourceRepository};
use venue_domain::resource::{Resource, ResourceKind};

/// Read-only catalog lookups; catalog content management lives outside
/// this subsystem.
pub struct PgResourceRepository {
    pool: PgPool,
}

impl PgResourceRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn row_to_resource(row: &PgRow) -> Result<Resource, RepoError> {
    let kind: String = row.try_get("kind")?;
    let weekly: serde_json::Value = row.try_get("weekly_availability")?;
    let chair_ids: serde_json::Value = row.try_get("chair_ids")?;
    Ok(Resource {
        id: row.try_get("id")?,
        kind: kind.parse::<ResourceKind>()?,
        name: row.try_get("name")?,
        tag: row.try_get("tag")?,
        price_per_hour: row.try_get("price_per_hour")?,
        weekly_availability: serde_json::from_value(weekly)?,
        blocked_from: row.try_get("blocked_from")?,
        blocked_to: row.try_get("blocked_to")?,
        chair_ids: serde_json::from_value(chair_ids)?,
    })
}

#[async_trait]
impl ResourceRepository for PgResourceRepository {
    async fn get(&self, id: Uuid) -> Result<Option<Resource>, RepoError> {
        let row = sqlx::query(
            "SELECT id, kind, name, tag, price_per_hour, weekly_availability, blocked_from, \
             blocked_to, chair_ids FROM resources WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref().map(row_to_resource).transpose()
    }

    async fn list(&self) -> Result<Vec<Resource>, RepoError> {
        let rows = sqlx::query(
            "SELECT id, kind, name, tag, price_per_hour, weekly_availability, blocked_from, \
             blocked_to, chair_ids FROM resources ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(row_to_resource).collect()
    }
}
