use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use venue_core::repository::{CreateOutcome, RepoError, ReservationRepository};
use venue_domain::availability::find_conflict;
use venue_domain::reservation::{PaymentStatus, Reservation, ReservationStatus};

pub struct PgReservationRepository {
    pool: PgPool,
}

impl PgReservationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const RESERVATION_COLUMNS: &str = "id, resource_id, chair_ids, date, start_time, duration_hours, \
     party_size, customer_name, customer_email, total_price, status, payment_status, \
     payment_reference, staff_name, staff_pin, is_manual_booking, comments, created_at, updated_at";

fn row_to_reservation(row: &PgRow) -> Result<Reservation, RepoError> {
    let status: String = row.try_get("status")?;
    let payment_status: String = row.try_get("payment_status")?;
    let chair_ids: serde_json::Value = row.try_get("chair_ids")?;
    Ok(Reservation {
        id: row.try_get("id")?,
        resource_id: row.try_get("resource_id")?,
        chair_ids: serde_json::from_value(chair_ids)?,
        date: row.try_get("date")?,
        start_time: row.try_get("start_time")?,
        duration_hours: row.try_get::<i32, _>("duration_hours")? as u32,
        party_size: row.try_get::<i32, _>("party_size")? as u32,
        customer_name: row.try_get("customer_name")?,
        customer_email: row.try_get("customer_email")?,
        total_price: row.try_get("total_price")?,
        status: status.parse::<ReservationStatus>()?,
        payment_status: payment_status.parse::<PaymentStatus>()?,
        payment_reference: row.try_get("payment_reference")?,
        staff_name: row.try_get("staff_name")?,
        staff_pin: row.try_get("staff_pin")?,
        is_manual_booking: row.try_get("is_manual_booking")?,
        comments: row.try_get("comments")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

#[async_trait]
impl ReservationRepository for PgReservationRepository {
    /// The overlap scan and the insert run in one transaction holding a
    /// per-(resource, date) advisory lock, so two concurrent creations on
    /// the same slot serialize instead of both passing the scan.
    async fn create_if_free(&self, reservation: &Reservation) -> Result<CreateOutcome, RepoError> {
        let slot = reservation.slot()?;
        let mut tx = self.pool.begin().await?;

        sqlx::query("SELECT pg_advisory_xact_lock(hashtextextended($1, 0))")
            .bind(format!("{}:{}", reservation.resource_id, reservation.date))
            .execute(&mut *tx)
            .await?;

        let rows = sqlx::query(&format!(
            "SELECT {RESERVATION_COLUMNS} FROM reservations \
             WHERE resource_id = $1 AND date = $2 AND status IN ('pending', 'confirmed')"
        ))
        .bind(reservation.resource_id)
        .bind(&reservation.date)
        .fetch_all(&mut *tx)
        .await?;

        let existing = rows
            .iter()
            .map(row_to_reservation)
            .collect::<Result<Vec<_>, _>>()?;

        if let Some(hit) = find_conflict(&reservation.key(), slot, &existing)? {
            return Ok(CreateOutcome::Conflict(hit.clone()));
        }

        sqlx::query(
            "INSERT INTO reservations (id, resource_id, chair_ids, date, start_time, \
             duration_hours, party_size, customer_name, customer_email, total_price, status, \
             payment_status, payment_reference, staff_name, staff_pin, is_manual_booking, \
             comments, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18, $19)",
        )
        .bind(reservation.id)
        .bind(reservation.resource_id)
        .bind(serde_json::to_value(&reservation.chair_ids)?)
        .bind(&reservation.date)
        .bind(&reservation.start_time)
        .bind(reservation.duration_hours as i32)
        .bind(reservation.party_size as i32)
        .bind(&reservation.customer_name)
        .bind(&reservation.customer_email)
        .bind(reservation.total_price)
        .bind(reservation.status.as_str())
        .bind(reservation.payment_status.as_str())
        .bind(&reservation.payment_reference)
        .bind(&reservation.staff_name)
        .bind(&reservation.staff_pin)
        .bind(reservation.is_manual_booking)
        .bind(&reservation.comments)
        .bind(reservation.created_at)
        .bind(reservation.updated_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(CreateOutcome::Created(reservation.clone()))
    }

    async fn get(&self, id: Uuid) -> Result<Option<Reservation>, RepoError> {
        let row = sqlx::query(&format!(
            "SELECT {RESERVATION_COLUMNS} FROM reservations WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref().map(row_to_reservation).transpose()
    }

    async fn list_active_for_resource(
        &self,
        resource_id: Uuid,
        date: &str,
    ) -> Result<Vec<Reservation>, RepoError> {
        let rows = sqlx::query(&format!(
            "SELECT {RESERVATION_COLUMNS} FROM reservations \
             WHERE resource_id = $1 AND date = $2 AND status IN ('pending', 'confirmed')"
        ))
        .bind(resource_id)
        .bind(date)
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(row_to_reservation).collect()
    }

    async fn list_for_date(&self, date: &str) -> Result<Vec<Reservation>, RepoError> {
        let rows = sqlx::query(&format!(
            "SELECT {RESERVATION_COLUMNS} FROM reservations WHERE date = $1 ORDER BY start_time"
        ))
        .bind(date)
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(row_to_reservation).collect()
    }

    async fn list_for_customer(&self, email: &str) -> Result<Vec<Reservation>, RepoError> {
        let rows = sqlx::query(&format!(
            "SELECT {RESERVATION_COLUMNS} FROM reservations \
             WHERE LOWER(customer_email) = LOWER($1) ORDER BY created_at DESC"
        ))
        .bind(email)
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(row_to_reservation).collect()
    }

    async fn update_status(
        &self,
        id: Uuid,
        status: ReservationStatus,
        payment_status: Option<PaymentStatus>,
    ) -> Result<Option<Reservation>, RepoError> {
        let row = sqlx::query(&format!(
            "UPDATE reservations \
             SET status = $2, payment_status = COALESCE($3, payment_status), updated_at = NOW() \
             WHERE id = $1 RETURNING {RESERVATION_COLUMNS}"
        ))
        .bind(id)
        .bind(status.as_str())
        .bind(payment_status.map(|p| p.as_str()))
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref().map(row_to_reservation).transpose()
    }

    async fn update_payment_status(
        &self,
        id: Uuid,
        payment_status: PaymentStatus,
    ) -> Result<Option<Reservation>, RepoError> {
        let row = sqlx::query(&format!(
            "UPDATE reservations SET payment_status = $2, updated_at = NOW() \
             WHERE id = $1 RETURNING {RESERVATION_COLUMNS}"
        ))
        .bind(id)
        .bind(payment_status.as_str())
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref().map(row_to_reservation).transpose()
    }

    /// The `WHERE` clause filters out rows already in the target state, so a
    /// webhook replay updates nothing and returns an empty batch.
    async fn apply_payment_reference(
        &self,
        payment_reference: &str,
        status: ReservationStatus,
        payment_status: PaymentStatus,
    ) -> Result<Vec<Reservation>, RepoError> {
        let rows = sqlx::query(&format!(
            "UPDATE reservations SET status = $2, payment_status = $3, updated_at = NOW() \
             WHERE payment_reference = $1 AND (status <> $2 OR payment_status <> $3) \
             RETURNING {RESERVATION_COLUMNS}"
        ))
        .bind(payment_reference)
        .bind(status.as_str())
        .bind(payment_status.as_str())
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(row_to_reservation).collect()
    }

    async fn delete(&self, id: Uuid) -> Result<bool, RepoError> {
        let result = sqlx::query("DELETE FROM reservations WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() == 1)
    }
}
