use chrono::NaiveDate;
use rust_decimal::Decimal;
use tracing::{debug, warn};

use crate::core::{AppError, Currency, MonthCalendar, Result};
use crate::modules::installments::models::Installment;

/// Splits a debt total into monthly installments.
///
/// Every installment but the last gets `total / tenor` truncated to the
/// currency's minor unit; the last one absorbs the remainder so the batch
/// always sums to the total exactly. Pure: no I/O and nothing to retry.
#[derive(Debug, Clone, Copy)]
pub struct InstallmentPlanner {
    currency: Currency,
}

impl InstallmentPlanner {
    pub fn new(currency: Currency) -> Self {
        Self { currency }
    }

    pub fn currency(&self) -> Currency {
        self.currency
    }

    /// Plan `tenor` monthly installments starting on `start_date`
    ///
    /// # Arguments
    /// * `total_amount` - Debt total, must be positive
    /// * `tenor` - Number of monthly installments, at least 1
    /// * `start_date` - Due date of the first installment
    /// * `base_note` - Label prefix; used verbatim when `tenor == 1`
    ///
    /// # Errors
    /// * `AppError::InvalidTenor` when `tenor < 1`
    /// * `AppError::Validation` when `total_amount <= 0`
    pub fn plan(
        &self,
        total_amount: Decimal,
        tenor: i32,
        start_date: NaiveDate,
        base_note: &str,
    ) -> Result<Vec<Installment>> {
        if tenor < 1 {
            return Err(AppError::InvalidTenor(tenor));
        }

        if total_amount <= Decimal::ZERO {
            return Err(AppError::validation(format!(
                "Total amount must be positive, got {}",
                total_amount
            )));
        }

        let count = tenor as u32;
        let base_amount = self.base_amount(total_amount, tenor);
        let last_amount = total_amount - base_amount * Decimal::from(count - 1);

        debug!(
            tenor,
            total = %total_amount,
            base = %base_amount,
            last = %last_amount,
            currency = %self.currency,
            "Planning installments"
        );

        let mut installments = Vec::with_capacity(count as usize);
        for index in 0..count {
            let amount = if index == count - 1 {
                last_amount
            } else {
                base_amount
            };

            installments.push(Installment::new(
                amount,
                MonthCalendar::add_months(start_date, index)?,
                Self::label(base_note, index, count),
                index,
                count,
            ));
        }

        let distributed: Decimal = installments.iter().map(|i| i.amount()).sum();
        if distributed != total_amount {
            warn!(
                "Installment amount mismatch: distributed {} vs total {}",
                distributed, total_amount
            );
            return Err(AppError::internal(format!(
                "Installment amounts ({}) do not sum to total ({})",
                distributed, total_amount
            )));
        }

        Ok(installments)
    }

    /// Regular (non-final) installment amount for a plan
    pub fn base_amount(&self, total_amount: Decimal, tenor: i32) -> Decimal {
        if tenor < 1 {
            return Decimal::ZERO;
        }
        self.currency.truncate(total_amount / Decimal::from(tenor))
    }

    fn label(base_note: &str, index: u32, count: u32) -> String {
        if count == 1 {
            base_note.to_string()
        } else {
            format!("{}, {}/{}", base_note, index + 1, count)
        }
    }
}

/// Convenience wrapper around [`InstallmentPlanner::plan`]
pub fn plan_installments(
    total_amount: Decimal,
    tenor: i32,
    start_date: NaiveDate,
    base_note: &str,
    currency: Currency,
) -> Result<Vec<Installment>> {
    InstallmentPlanner::new(currency).plan(total_amount, tenor, start_date, base_note)
}
