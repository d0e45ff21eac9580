use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use tracing::info;

use crate::core::{AppError, Currency, MonthCalendar, Result};
use crate::modules::transactions::models::{
    LedgerTransaction, RecordTransactionRequest, TransactionKind,
};
use crate::modules::transactions::repositories::TransactionRepository;

/// Largest page accepted by the history endpoint
pub const MAX_HISTORY_PAGE: i64 = 100;

/// Income and expense bookkeeping
pub struct TransactionService {
    repository: Arc<dyn TransactionRepository>,
    currency: Currency,
}

impl TransactionService {
    pub fn new(repository: Arc<dyn TransactionRepository>, currency: Currency) -> Self {
        Self {
            repository,
            currency,
        }
    }

    /// Record an income or expense for a user
    pub async fn record(
        &self,
        user_id: &str,
        kind: TransactionKind,
        request: RecordTransactionRequest,
    ) -> Result<LedgerTransaction> {
        let transaction = LedgerTransaction::new(
            user_id,
            kind,
            request.amount,
            request.category.as_deref(),
            request.note.as_deref(),
            request.date.unwrap_or_else(|| Utc::now().naive_utc()),
            self.currency,
        )?;

        self.repository.create(&transaction).await?;

        info!(
            user_id = user_id,
            kind = %kind,
            amount = %transaction.amount,
            category = transaction.category.as_str(),
            "Transaction recorded"
        );

        Ok(transaction)
    }

    /// Entries of one kind dated in the month containing `day`, newest first
    pub async fn monthly(
        &self,
        user_id: &str,
        kind: TransactionKind,
        day: NaiveDate,
    ) -> Result<Vec<LedgerTransaction>> {
        let (from, to) = MonthCalendar::month_window(day);
        self.repository
            .list_between(user_id, Some(kind), from, to)
            .await
    }

    /// Paginated history, newest first
    pub async fn history(
        &self,
        user_id: &str,
        kind: Option<TransactionKind>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<LedgerTransaction>> {
        if !(1..=MAX_HISTORY_PAGE).contains(&limit) {
            return Err(AppError::validation(format!(
                "limit must be between 1 and {}",
                MAX_HISTORY_PAGE
            )));
        }
        if offset < 0 {
            return Err(AppError::validation("offset cannot be negative"));
        }

        self.repository
            .list_recent(user_id, kind, limit, offset)
            .await
    }

    pub async fn delete(&self, user_id: &str, id: &str) -> Result<()> {
        if !self.repository.delete(user_id, id).await? {
            return Err(AppError::not_found("Transaction not found"));
        }
        info!(user_id = user_id, transaction_id = id, "Transaction deleted");
        Ok(())
    }
}
