use chrono::NaiveDate;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::core::MonthCalendar;
use crate::modules::debts::models::Debt;
use crate::modules::transactions::models::{LedgerTransaction, TransactionKind};

/// Ratio below which obligations are considered healthy (percent)
pub const HEALTHY_RATIO_LIMIT: Decimal = Decimal::from_parts(30, 0, 0, false, 0);
/// Ratio below which obligations are a warning (percent)
pub const WARNING_RATIO_LIMIT: Decimal = Decimal::from_parts(50, 0, 0, false, 0);

/// Classification of the debt-to-income ratio
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DebtHealth {
    Healthy,
    Warning,
    Critical,
}

impl DebtHealth {
    pub fn from_ratio(ratio: Decimal) -> Self {
        if ratio < HEALTHY_RATIO_LIMIT {
            Self::Healthy
        } else if ratio < WARNING_RATIO_LIMIT {
            Self::Warning
        } else {
            Self::Critical
        }
    }
}

/// Month-scoped view of a user's finances
#[derive(Debug, Clone, PartialEq)]
pub struct FinancialSummary {
    pub month_start: NaiveDate,
    pub month_end: NaiveDate,
    pub total_income: Decimal,
    pub total_expense: Decimal,
    /// Debts settled during the month
    pub paid_debts: Decimal,
    pub balance: Decimal,
    /// Every unpaid debt regardless of due date
    pub outstanding_debt: Decimal,
    /// Unpaid debts due on or before the month end
    pub monthly_obligation: Decimal,
    pub salary_income: Decimal,
    /// Percent, two decimal places
    pub debt_to_income_ratio: Decimal,
    pub health: DebtHealth,
}

impl FinancialSummary {
    /// Build the summary for the month containing `today`
    ///
    /// Transactions outside the month are ignored, so callers may pass a
    /// wider slice than the month window.
    pub fn compute(transactions: &[LedgerTransaction], debts: &[Debt], today: NaiveDate) -> Self {
        let month_start = MonthCalendar::start_of_month(today);
        let month_end = MonthCalendar::end_of_month(today);

        let in_month: Vec<&LedgerTransaction> = transactions
            .iter()
            .filter(|tx| MonthCalendar::same_month(tx.date.date(), today))
            .collect();

        let total_income = sum_kind(&in_month, TransactionKind::Income);
        let total_expense = sum_kind(&in_month, TransactionKind::Expense);
        let salary_income: Decimal = in_month
            .iter()
            .filter(|tx| tx.is_salary())
            .map(|tx| tx.amount)
            .sum();

        let paid_debts: Decimal = debts
            .iter()
            .filter(|d| {
                d.paid
                    && d.paid_at
                        .map(|at| MonthCalendar::same_month(at.date(), today))
                        .unwrap_or(false)
            })
            .map(|d| d.amount)
            .sum();

        let unpaid = debts.iter().filter(|d| !d.paid);
        let outstanding_debt: Decimal = unpaid.clone().map(|d| d.amount).sum();
        let monthly_obligation: Decimal = unpaid
            .filter(|d| d.due_date <= month_end)
            .map(|d| d.amount)
            .sum();

        let debt_to_income_ratio = debt_to_income_ratio(monthly_obligation, salary_income);

        Self {
            month_start,
            month_end,
            total_income,
            total_expense,
            paid_debts,
            balance: total_income - total_expense - paid_debts,
            outstanding_debt,
            monthly_obligation,
            salary_income,
            debt_to_income_ratio,
            health: DebtHealth::from_ratio(debt_to_income_ratio),
        }
    }
}

fn sum_kind(transactions: &[&LedgerTransaction], kind: TransactionKind) -> Decimal {
    transactions
        .iter()
        .filter(|tx| tx.kind == kind)
        .map(|tx| tx.amount)
        .sum()
}

/// Obligation as a percentage of salary income, rounded half-up to 2 dp
///
/// Without salary income any obligation counts as 100%.
pub fn debt_to_income_ratio(obligation: Decimal, salary_income: Decimal) -> Decimal {
    if salary_income.is_zero() {
        return if obligation > Decimal::ZERO {
            Decimal::ONE_HUNDRED
        } else {
            Decimal::ZERO
        };
    }

    (obligation / salary_income * Decimal::ONE_HUNDRED)
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Response for GET /api/summary
#[derive(Debug, Serialize)]
pub struct SummaryResponse {
    pub currency: String,
    pub month_start: String,
    pub month_end: String,
    pub total_income: String,
    pub total_expense: String,
    pub paid_debts: String,
    pub balance: String,
    pub outstanding_debt: String,
    pub monthly_obligation: String,
    pub debt_to_income_ratio: String,
    pub health: DebtHealth,
}

impl SummaryResponse {
    pub fn new(summary: FinancialSummary, currency: &str) -> Self {
        Self {
            currency: currency.to_string(),
            month_start: summary.month_start.to_string(),
            month_end: summary.month_end.to_string(),
            total_income: summary.total_income.normalize().to_string(),
            total_expense: summary.total_expense.normalize().to_string(),
            paid_debts: summary.paid_debts.normalize().to_string(),
            balance: summary.balance.normalize().to_string(),
            outstanding_debt: summary.outstanding_debt.normalize().to_string(),
            monthly_obligation: summary.monthly_obligation.normalize().to_string(),
            debt_to_income_ratio: summary.debt_to_income_ratio.normalize().to_string(),
            health: summary.health,
        }
    }
}
