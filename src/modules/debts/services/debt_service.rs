use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime, Utc};
use rust_decimal::Decimal;
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::LedgerConfig;
use crate::core::{AppError, Currency, MonthCalendar, Result};
use crate::modules::debts::models::{debt_base_note, CreateDebtRequest, Debt};
use crate::modules::debts::repositories::DebtRepository;
use crate::modules::installments::models::Installment;
use crate::modules::installments::services::InstallmentPlanner;

/// Largest page accepted by the upcoming debts listing
pub const MAX_UPCOMING_PAGE: i64 = 100;

/// A persisted installment plan
#[derive(Debug, Clone)]
pub struct CreatedDebtPlan {
    pub plan_id: String,
    /// In installment order
    pub debts: Vec<Debt>,
}

impl CreatedDebtPlan {
    pub fn debt_ids(&self) -> Vec<String> {
        self.debts.iter().map(|d| d.id.clone()).collect()
    }
}

/// Debt creation workflow and debt bookkeeping
pub struct DebtService {
    debt_repo: Arc<dyn DebtRepository>,
    ledger: LedgerConfig,
}

impl DebtService {
    pub fn new(debt_repo: Arc<dyn DebtRepository>, ledger: LedgerConfig) -> Self {
        Self { debt_repo, ledger }
    }

    pub fn ledger(&self) -> &LedgerConfig {
        &self.ledger
    }

    /// Plan a debt without persisting anything
    ///
    /// Applies the same validation and note formatting as
    /// [`DebtService::create_debt_with_tenor`], so the preview matches what
    /// would be stored.
    pub fn preview(&self, request: &CreateDebtRequest) -> Result<Vec<Installment>> {
        let currency = request.currency.unwrap_or(self.ledger.currency);
        self.validate_request(request, currency)?;

        InstallmentPlanner::new(currency).plan(
            request.total_amount,
            request.tenor,
            request.start_date,
            &debt_base_note(request.note.as_deref()),
        )
    }

    /// Split a debt into monthly installments and store one record per installment
    ///
    /// # Business Rules
    /// - Tenor must be between 1 and the configured maximum
    /// - The total must be expressible in the currency and cover at least one
    ///   minor unit per installment
    /// - All records are written in one transaction; a failed write leaves nothing behind
    pub async fn create_debt_with_tenor(
        &self,
        user_id: &str,
        request: CreateDebtRequest,
    ) -> Result<CreatedDebtPlan> {
        let installments = self.preview(&request)?;

        let plan_id = Uuid::new_v4().to_string();
        let now = Utc::now().naive_utc();
        let debts: Vec<Debt> = installments
            .iter()
            .map(|installment| Debt::from_installment(user_id, &plan_id, installment, now))
            .collect();

        info!(
            user_id = user_id,
            plan_id = plan_id.as_str(),
            tenor = request.tenor,
            total = %request.total_amount,
            "Creating debt plan"
        );

        if let Err(e) = self.debt_repo.create_batch(&debts).await {
            warn!(
                user_id = user_id,
                plan_id = plan_id.as_str(),
                error = %e,
                "Debt plan rolled back"
            );
            return Err(e);
        }

        Ok(CreatedDebtPlan { plan_id, debts })
    }

    /// All debts for a user, due date ascending
    pub async fn list_debts(&self, user_id: &str) -> Result<Vec<Debt>> {
        self.debt_repo.list_by_user(user_id).await
    }

    /// Unpaid debts due today or later
    pub async fn upcoming_debts(
        &self,
        user_id: &str,
        today: NaiveDate,
        limit: Option<i64>,
        offset: i64,
    ) -> Result<Vec<Debt>> {
        let limit = limit.unwrap_or(self.ledger.upcoming_debts_limit);
        if !(1..=MAX_UPCOMING_PAGE).contains(&limit) {
            return Err(AppError::validation(format!(
                "limit must be between 1 and {}",
                MAX_UPCOMING_PAGE
            )));
        }
        if offset < 0 {
            return Err(AppError::validation("offset cannot be negative"));
        }

        self.debt_repo
            .list_unpaid_due_from(user_id, today, limit, offset)
            .await
    }

    /// Unpaid debts due in the calendar month containing `today`
    pub async fn debts_due_in_month(&self, user_id: &str, today: NaiveDate) -> Result<Vec<Debt>> {
        self.debt_repo
            .list_unpaid_due_between(
                user_id,
                MonthCalendar::start_of_month(today),
                MonthCalendar::end_of_month(today),
            )
            .await
    }

    /// Mark one of the user's debts as paid
    pub async fn mark_as_paid(&self, user_id: &str, debt_id: &str) -> Result<Debt> {
        self.mark_as_paid_at(user_id, debt_id, Utc::now().naive_utc())
            .await
    }

    pub async fn mark_as_paid_at(
        &self,
        user_id: &str,
        debt_id: &str,
        now: NaiveDateTime,
    ) -> Result<Debt> {
        let mut debt = self
            .debt_repo
            .find_by_id(user_id, debt_id)
            .await?
            .filter(|d| d.belongs_to(user_id))
            .ok_or_else(|| AppError::not_found("Debt not found"))?;

        debt.mark_as_paid(now)?;
        if !self.debt_repo.update_payment(&debt).await? {
            // Lost a race: re-read to tell a concurrent payment from a delete
            return match self.debt_repo.find_by_id(user_id, debt_id).await? {
                Some(current) if current.paid => Err(AppError::validation(format!(
                    "Debt {} is already paid",
                    debt_id
                ))),
                _ => Err(AppError::not_found("Debt not found")),
            };
        }

        info!(
            user_id = user_id,
            debt_id = debt_id,
            amount = %debt.amount,
            "Debt marked as paid"
        );

        Ok(debt)
    }

    pub async fn delete_debt(&self, user_id: &str, debt_id: &str) -> Result<()> {
        if !self.debt_repo.delete(user_id, debt_id).await? {
            return Err(AppError::not_found("Debt not found"));
        }
        info!(user_id = user_id, debt_id = debt_id, "Debt deleted");
        Ok(())
    }

    fn validate_request(&self, request: &CreateDebtRequest, currency: Currency) -> Result<()> {
        if request.tenor < 1 {
            return Err(AppError::InvalidTenor(request.tenor));
        }

        if request.tenor > self.ledger.max_tenor {
            return Err(AppError::validation(format!(
                "Tenor must be at most {} months, got {}",
                self.ledger.max_tenor, request.tenor
            )));
        }

        if request.total_amount <= Decimal::ZERO {
            return Err(AppError::validation("Total amount must be positive"));
        }

        currency
            .validate_amount(request.total_amount)
            .map_err(AppError::Validation)?;

        let base = InstallmentPlanner::new(currency).base_amount(request.total_amount, request.tenor);
        if base < currency.smallest_unit() {
            return Err(AppError::validation(format!(
                "{} is too small to split into {} installments",
                currency.format_amount(request.total_amount),
                request.tenor
            )));
        }

        Ok(())
    }
}

/// Sum of unpaid amounts
pub fn total_unpaid(debts: &[Debt]) -> Decimal {
    debts.iter().filter(|d| !d.paid).map(|d| d.amount).sum()
}
