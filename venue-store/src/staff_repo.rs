use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use venue_core::repository::{RepoError, StaffRepository};
use venue_domain::staff::StaffCredential;

use crate::is_unique_violation;

pub struct PgStaffRepository {
    pool: PgPool,
}

impl PgStaffRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn row_to_credential(row: &PgRow) -> Result<StaffCredential, RepoError> {
    Ok(StaffCredential {
        id: row.try_get("id")?,
        pin: row.try_get("pin")?,
        display_name: row.try_get("display_name")?,
        owner_id: row.try_get("owner_id")?,
        is_active: row.try_get("is_active")?,
        last_used_at: row.try_get("last_used_at")?,
        created_at: row.try_get("created_at")?,
    })
}

#[async_trait]
impl StaffRepository for PgStaffRepository {
    /// The partial unique index on active PINs turns a duplicate into a
    /// constraint violation, reported as `false` for the caller to surface.
    async fn insert(&self, credential: &StaffCredential) -> Result<bool, RepoError> {
        let result = sqlx::query(
            "INSERT INTO staff_credentials (id, pin, display_name, owner_id, is_active, \
             last_used_at, created_at) VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(credential.id)
        .bind(&credential.pin)
        .bind(&credential.display_name)
        .bind(&credential.owner_id)
        .bind(credential.is_active)
        .bind(credential.last_used_at)
        .bind(credential.created_at)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(true),
            Err(err) if is_unique_violation(&err) => Ok(false),
            Err(err) => Err(err.into()),
        }
    }

    async fn find_active_by_pin(&self, pin: &str) -> Result<Option<StaffCredential>, RepoError> {
        let row = sqlx::query(
            "SELECT id, pin, display_name, owner_id, is_active, last_used_at, created_at \
             FROM staff_credentials WHERE pin = $1 AND is_active",
        )
        .bind(pin)
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref().map(row_to_credential).transpose()
    }

    async fn touch_last_used(&self, id: Uuid, at: DateTime<Utc>) -> Result<(), RepoError> {
        sqlx::query("UPDATE staff_credentials SET last_used_at = $2 WHERE id = $1")
            .bind(id)
            .bind(at)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn set_active(&self, id: Uuid, active: bool) -> Result<bool, RepoError> {
        let result = sqlx::query("UPDATE staff_credentials SET is_active = $2 WHERE id = $1")
            .bind(id)
            .bind(active)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() == 1)
    }

    async fn list_for_owner(&self, owner_id: &str) -> Result<Vec<StaffCredential>, RepoError> {
        let rows = sqlx::query(
            "SELECT id, pin, display_name, owner_id, is_active, last_used_at, created_at \
             FROM staff_credentials WHERE owner_id = $1 ORDER BY created_at",
        )
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(row_to_credential).collect()
    }
}
