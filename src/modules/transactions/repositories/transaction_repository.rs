use async_trait::async_trait;
use chrono::NaiveDateTime;
use sqlx::MySqlPool;

use crate::core::{AppError, Result};
use crate::modules::transactions::models::{LedgerTransaction, TransactionKind};

/// Persistence for income and expense entries
#[async_trait]
pub trait TransactionRepository: Send + Sync {
    async fn create(&self, transaction: &LedgerTransaction) -> Result<()>;

    /// Entries dated within `[from, to]`, newest first. `kind = None` returns both.
    async fn list_between(
        &self,
        user_id: &str,
        kind: Option<TransactionKind>,
        from: NaiveDateTime,
        to: NaiveDateTime,
    ) -> Result<Vec<LedgerTransaction>>;

    /// Newest first, paginated
    async fn list_recent(
        &self,
        user_id: &str,
        kind: Option<TransactionKind>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<LedgerTransaction>>;

    /// Returns false when nothing matched
    async fn delete(&self, user_id: &str, id: &str) -> Result<bool>;
}

pub struct MySqlTransactionRepository {
    pool: MySqlPool,
}

impl MySqlTransactionRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TransactionRepository for MySqlTransactionRepository {
    async fn create(&self, transaction: &LedgerTransaction) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO transactions (
                id, user_id, kind, amount, category, note, date, created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&transaction.id)
        .bind(&transaction.user_id)
        .bind(transaction.kind.as_str())
        .bind(transaction.amount)
        .bind(&transaction.category)
        .bind(&transaction.note)
        .bind(transaction.date)
        .bind(transaction.created_at)
        .bind(transaction.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::Internal(format!("Failed to insert transaction: {}", e)))?;

        Ok(())
    }

    async fn list_between(
        &self,
        user_id: &str,
        kind: Option<TransactionKind>,
        from: NaiveDateTime,
        to: NaiveDateTime,
    ) -> Result<Vec<LedgerTransaction>> {
        let kind = kind.map(|k| k.as_str());
        let rows = sqlx::query_as::<_, LedgerTransaction>(
            r#"
            SELECT id, user_id, kind, amount, category, note, date, created_at, updated_at
            FROM transactions
            WHERE user_id = ?
              AND (? IS NULL OR kind = ?)
              AND date BETWEEN ? AND ?
            ORDER BY date DESC
            "#,
        )
        .bind(user_id)
        .bind(kind)
        .bind(kind)
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn list_recent(
        &self,
        user_id: &str,
        kind: Option<TransactionKind>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<LedgerTransaction>> {
        let kind = kind.map(|k| k.as_str());
        let rows = sqlx::query_as::<_, LedgerTransaction>(
            r#"
            SELECT id, user_id, kind, amount, category, note, date, created_at, updated_at
            FROM transactions
            WHERE user_id = ?
              AND (? IS NULL OR kind = ?)
            ORDER BY date DESC
            LIMIT ? OFFSET ?
            "#,
        )
        .bind(user_id)
        .bind(kind)
        .bind(kind)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn delete(&self, user_id: &str, id: &str) -> Result<bool> {
        let rows_affected = sqlx::query("DELETE FROM transactions WHERE id = ? AND user_id = ?")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await?
            .rows_affected();

        Ok(rows_affected > 0)
    }
}
