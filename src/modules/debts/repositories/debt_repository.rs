// MySQL persistence for debt records
//
// - Batch insert of a whole installment plan (single transaction)
// - Per-user reads ordered by due date
// - Paid-state updates and deletes scoped to the owning user

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::{MySql, MySqlPool, Transaction};

use crate::core::{AppError, Result};
use crate::modules::debts::models::Debt;

#[async_trait]
pub trait DebtRepository: Send + Sync {
    /// Insert every record or none of them
    async fn create_batch(&self, debts: &[Debt]) -> Result<()>;

    async fn find_by_id(&self, user_id: &str, id: &str) -> Result<Option<Debt>>;

    /// All debts for a user, due date ascending
    async fn list_by_user(&self, user_id: &str) -> Result<Vec<Debt>>;

    /// Unpaid debts due on or after `from`, due date ascending
    async fn list_unpaid_due_from(
        &self,
        user_id: &str,
        from: NaiveDate,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Debt>>;

    /// Unpaid debts due within `[from, to]`, due date ascending
    async fn list_unpaid_due_between(
        &self,
        user_id: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<Debt>>;

    /// Flip an unpaid debt to paid using `debt.paid_at`
    ///
    /// Returns false when no unpaid row matched, so of two racing payers
    /// exactly one succeeds.
    async fn update_payment(&self, debt: &Debt) -> Result<bool>;

    /// Returns false when nothing matched
    async fn delete(&self, user_id: &str, id: &str) -> Result<bool>;
}

const DEBT_COLUMNS: &str = r#"
    id, user_id, plan_id, amount, installment_amount, installment_number,
    total_installments, due_date, note, paid, paid_at, date, created_at, updated_at
"#;

pub struct MySqlDebtRepository {
    pool: MySqlPool,
}

impl MySqlDebtRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    async fn insert_with_tx(&self, tx: &mut Transaction<'_, MySql>, debt: &Debt) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO debts (
                id, user_id, plan_id, amount, installment_amount, installment_number,
                total_installments, due_date, note, paid, paid_at, date, created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&debt.id)
        .bind(&debt.user_id)
        .bind(&debt.plan_id)
        .bind(debt.amount)
        .bind(debt.installment_amount)
        .bind(debt.installment_number)
        .bind(debt.total_installments)
        .bind(debt.due_date)
        .bind(&debt.note)
        .bind(debt.paid)
        .bind(debt.paid_at)
        .bind(debt.date)
        .bind(debt.created_at)
        .bind(debt.updated_at)
        .execute(tx.as_mut())
        .await
        .map_err(|e| AppError::Internal(format!("Failed to insert debt: {}", e)))?;

        Ok(())
    }
}

#[async_trait]
impl DebtRepository for MySqlDebtRepository {
    async fn create_batch(&self, debts: &[Debt]) -> Result<()> {
        if debts.is_empty() {
            return Ok(());
        }

        let mut tx = self.pool.begin().await
            .map_err(|e| AppError::Internal(format!("Failed to start transaction: {}", e)))?;

        // Dropping `tx` on an early return rolls the batch back
        for debt in debts {
            self.insert_with_tx(&mut tx, debt).await?;
        }

        tx.commit().await
            .map_err(|e| AppError::Internal(format!("Failed to commit transaction: {}", e)))?;

        Ok(())
    }

    async fn find_by_id(&self, user_id: &str, id: &str) -> Result<Option<Debt>> {
        let sql = format!("SELECT {} FROM debts WHERE id = ? AND user_id = ?", DEBT_COLUMNS);
        let debt = sqlx::query_as::<_, Debt>(&sql)
            .bind(id)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(debt)
    }

    async fn list_by_user(&self, user_id: &str) -> Result<Vec<Debt>> {
        let sql = format!(
            "SELECT {} FROM debts WHERE user_id = ? ORDER BY due_date ASC, installment_number ASC",
            DEBT_COLUMNS
        );
        let debts = sqlx::query_as::<_, Debt>(&sql)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(debts)
    }

    async fn list_unpaid_due_from(
        &self,
        user_id: &str,
        from: NaiveDate,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Debt>> {
        let sql = format!(
            r#"
            SELECT {} FROM debts
            WHERE user_id = ? AND paid = FALSE AND due_date >= ?
            ORDER BY due_date ASC, installment_number ASC
            LIMIT ? OFFSET ?
            "#,
            DEBT_COLUMNS
        );
        let debts = sqlx::query_as::<_, Debt>(&sql)
            .bind(user_id)
            .bind(from)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;

        Ok(debts)
    }

    async fn list_unpaid_due_between(
        &self,
        user_id: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<Debt>> {
        let sql = format!(
            r#"
            SELECT {} FROM debts
            WHERE user_id = ? AND paid = FALSE AND due_date BETWEEN ? AND ?
            ORDER BY due_date ASC, installment_number ASC
            "#,
            DEBT_COLUMNS
        );
        let debts = sqlx::query_as::<_, Debt>(&sql)
            .bind(user_id)
            .bind(from)
            .bind(to)
            .fetch_all(&self.pool)
            .await?;

        Ok(debts)
    }

    async fn update_payment(&self, debt: &Debt) -> Result<bool> {
        let rows_affected = sqlx::query(
            r#"
            UPDATE debts
            SET paid = TRUE, paid_at = ?, updated_at = ?
            WHERE id = ? AND user_id = ? AND paid = FALSE
            "#,
        )
        .bind(debt.paid_at)
        .bind(debt.updated_at)
        .bind(&debt.id)
        .bind(&debt.user_id)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::Internal(format!("Failed to update debt: {}", e)))?
        .rows_affected();

        Ok(rows_affected > 0)
    }

    async fn delete(&self, user_id: &str, id: &str) -> Result<bool> {
        let rows_affected = sqlx::query("DELETE FROM debts WHERE id = ? AND user_id = ?")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await?
            .rows_affected();

        Ok(rows_affected > 0)
    }
}
