//! Persistence layer: schema setup and the transaction recorder.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use sqlx::postgres::PgPool;
use sqlx::Row;
use tracing::info;

use crate::categories::TransactionKind;
use crate::dialogue::TransactionDraft;

/// A finalized transaction record, constructed only at save time.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTransaction {
    pub user_id: i64,
    pub kind: TransactionKind,
    pub category_name: String,
    pub amount: f64,
    pub description: String,
    pub created_at: DateTime<Utc>,
}

impl NewTransaction {
    /// Assemble a record from a completed entry draft.
    ///
    /// The state machine guarantees the draft is complete before it hands it
    /// out, so no business validation happens here.
    pub fn from_draft(user_id: i64, draft: &TransactionDraft, created_at: DateTime<Utc>) -> Self {
        Self {
            user_id,
            kind: draft.kind,
            category_name: draft.category.clone(),
            amount: draft.amount,
            description: draft.description.clone(),
            created_at,
        }
    }
}

/// Initialize the database schema.
pub async fn init_database_schema(pool: &PgPool) -> Result<()> {
    info!("Initializing database schema...");

    sqlx::query(
        "CREATE TABLE IF NOT EXISTS transactions (
            id BIGSERIAL PRIMARY KEY,
            user_id BIGINT NOT NULL,
            type TEXT NOT NULL,
            category_name TEXT NOT NULL,
            amount DOUBLE PRECISION NOT NULL,
            description TEXT NOT NULL DEFAULT '',
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )",
    )
    .execute(pool)
    .await
    .context("Failed to create transactions table")?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_transactions_user_id ON transactions (user_id)")
        .execute(pool)
        .await
        .context("Failed to create transactions user index")?;

    info!("Database schema initialized successfully");
    Ok(())
}

/// Insert a transaction record, returning its row id.
pub async fn insert_transaction(pool: &PgPool, tx: &NewTransaction) -> Result<i64> {
    let row = sqlx::query(
        "INSERT INTO transactions (user_id, type, category_name, amount, description, created_at)
         VALUES ($1, $2, $3, $4, $5, $6)
         RETURNING id",
    )
    .bind(tx.user_id)
    .bind(tx.kind.as_str())
    .bind(&tx.category_name)
    .bind(tx.amount)
    .bind(&tx.description)
    .bind(tx.created_at)
    .fetch_one(pool)
    .await
    .context("Failed to insert transaction")?;

    let id: i64 = row.try_get("id").context("Insert returned no id")?;
    info!(user_id = tx.user_id, transaction_id = id, "Transaction recorded");
    Ok(id)
}

/// Record a completed entry draft for the given user.
pub async fn save_transaction(pool: &PgPool, user_id: i64, draft: &TransactionDraft) -> Result<i64> {
    let record = NewTransaction::from_draft(user_id, draft, Utc::now());
    insert_transaction(pool, &record).await
}
