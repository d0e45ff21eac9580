use std::sync::Arc;

use chrono::NaiveDate;
use tracing::debug;

use crate::core::{MonthCalendar, Result};
use crate::modules::debts::repositories::DebtRepository;
use crate::modules::summary::models::FinancialSummary;
use crate::modules::transactions::repositories::TransactionRepository;

/// Aggregates income, expenses and debts into a monthly summary
pub struct SummaryService {
    transaction_repo: Arc<dyn TransactionRepository>,
    debt_repo: Arc<dyn DebtRepository>,
}

impl SummaryService {
    pub fn new(
        transaction_repo: Arc<dyn TransactionRepository>,
        debt_repo: Arc<dyn DebtRepository>,
    ) -> Self {
        Self {
            transaction_repo,
            debt_repo,
        }
    }

    /// Summary for the calendar month containing `today`
    pub async fn monthly_summary(&self, user_id: &str, today: NaiveDate) -> Result<FinancialSummary> {
        let (from, to) = MonthCalendar::month_window(today);
        let transactions = self
            .transaction_repo
            .list_between(user_id, None, from, to)
            .await?;
        let debts = self.debt_repo.list_by_user(user_id).await?;

        let summary = FinancialSummary::compute(&transactions, &debts, today);

        debug!(
            user_id = user_id,
            month = %summary.month_start,
            ratio = %summary.debt_to_income_ratio,
            health = ?summary.health,
            "Summary computed"
        );

        Ok(summary)
    }
}
