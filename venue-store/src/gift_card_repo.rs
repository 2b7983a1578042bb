use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use venue_core::repository::{GiftCardRepository, RepoError};
use venue_domain::gift_card::{GiftCard, GiftCardKind, GiftCardStatus, UsageEntry};

use crate::is_unique_violation;

pub struct PgGiftCardRepository {
    pool: PgPool,
}

impl PgGiftCardRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const CARD_COLUMNS: &str = "id, code, pin, amount, balance, status, kind, owner, purchased_by, \
     is_active, created_at, purchased_at, history";

fn row_to_card(row: &PgRow) -> Result<GiftCard, RepoError> {
    let status: String = row.try_get("status")?;
    let kind: String = row.try_get("kind")?;
    let history: serde_json::Value = row.try_get("history")?;
    Ok(GiftCard {
        id: row.try_get("id")?,
        code: row.try_get("code")?,
        pin: row.try_get("pin")?,
        amount: row.try_get("amount")?,
        balance: row.try_get("balance")?,
        status: status.parse::<GiftCardStatus>()?,
        kind: kind.parse::<GiftCardKind>()?,
        owner: row.try_get("owner")?,
        purchased_by: row.try_get("purchased_by")?,
        is_active: row.try_get("is_active")?,
        created_at: row.try_get("created_at")?,
        purchased_at: row.try_get("purchased_at")?,
        history: serde_json::from_value(history)?,
    })
}

#[async_trait]
impl GiftCardRepository for PgGiftCardRepository {
    async fn insert(&self, card: &GiftCard) -> Result<(), RepoError> {
        sqlx::query(
            "INSERT INTO gift_cards (id, code, pin, amount, balance, status, kind, owner, \
             purchased_by, is_active, created_at, purchased_at, history) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)",
        )
        .bind(card.id)
        .bind(&card.code)
        .bind(&card.pin)
        .bind(card.amount)
        .bind(card.balance)
        .bind(card.status.as_str())
        .bind(card.kind.as_str())
        .bind(&card.owner)
        .bind(&card.purchased_by)
        .bind(card.is_active)
        .bind(card.created_at)
        .bind(card.purchased_at)
        .bind(serde_json::to_value(&card.history)?)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<Option<GiftCard>, RepoError> {
        let row = sqlx::query(&format!("SELECT {CARD_COLUMNS} FROM gift_cards WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(row_to_card).transpose()
    }

    async fn find_by_code(&self, code: &str) -> Result<Option<GiftCard>, RepoError> {
        let row = sqlx::query(&format!(
            "SELECT {CARD_COLUMNS} FROM gift_cards WHERE code = $1"
        ))
        .bind(code)
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref().map(row_to_card).transpose()
    }

    async fn list_for_owner(&self, owner: &str) -> Result<Vec<GiftCard>, RepoError> {
        let rows = sqlx::query(&format!(
            "SELECT {CARD_COLUMNS} FROM gift_cards WHERE owner = $1 ORDER BY created_at DESC"
        ))
        .bind(owner)
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(row_to_card).collect()
    }

    /// Dedicated monotonic counter; the row update serializes concurrent
    /// draws so no two purchases ever observe the same value.
    async fn next_code_number(&self) -> Result<u64, RepoError> {
        let row = sqlx::query(
            "UPDATE gift_card_code_counter SET value = value + 1 WHERE id = 1 RETURNING value",
        )
        .fetch_one(&self.pool)
        .await?;
        let value: i64 = row.try_get("value")?;
        Ok(value as u64)
    }

    async fn pin_exists(&self, pin: &str) -> Result<bool, RepoError> {
        let row = sqlx::query("SELECT EXISTS(SELECT 1 FROM gift_cards WHERE pin = $1) AS hit")
            .bind(pin)
            .fetch_one(&self.pool)
            .await?;
        Ok(row.try_get("hit")?)
    }

    /// `purchased_by IS NULL` guards single assignment; a unique-index
    /// collision on code or PIN reads as "not assigned" so the caller can
    /// probe-retry with fresh values.
    async fn assign_code(
        &self,
        id: Uuid,
        code: &str,
        pin: &str,
        buyer: &str,
        purchased_at: DateTime<Utc>,
    ) -> Result<bool, RepoError> {
        let result = sqlx::query(
            "UPDATE gift_cards SET code = $2, pin = $3, purchased_by = $4, purchased_at = $5 \
             WHERE id = $1 AND purchased_by IS NULL",
        )
        .bind(id)
        .bind(code)
        .bind(pin)
        .bind(buyer)
        .bind(purchased_at)
        .execute(&self.pool)
        .await;

        match result {
            Ok(done) => Ok(done.rows_affected() == 1),
            Err(err) if is_unique_violation(&err) => Ok(false),
            Err(err) => Err(err.into()),
        }
    }

    async fn update_balance(
        &self,
        id: Uuid,
        expected_balance: i64,
        expected_status: GiftCardStatus,
        new_balance: i64,
        new_status: GiftCardStatus,
        entry: &UsageEntry,
    ) -> Result<bool, RepoError> {
        let result = sqlx::query(
            "UPDATE gift_cards \
             SET balance = $4, status = $5, history = history || $6::jsonb \
             WHERE id = $1 AND balance = $2 AND status = $3",
        )
        .bind(id)
        .bind(expected_balance)
        .bind(expected_status.as_str())
        .bind(new_balance)
        .bind(new_status.as_str())
        .bind(serde_json::to_value(entry)?)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() == 1)
    }

    async fn update_status(
        &self,
        id: Uuid,
        from: GiftCardStatus,
        to: GiftCardStatus,
    ) -> Result<bool, RepoError> {
        let result = sqlx::query(
            "UPDATE gift_cards SET status = $3 WHERE id = $1 AND status = $2",
        )
        .bind(id)
        .bind(from.as_str())
        .bind(to.as_str())
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() == 1)
    }
}
