use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::core::{AppError, Currency, Result};
use crate::modules::installments::models::Installment;

/// Suffix appended to every persisted debt note
pub const DEBT_NOTE_SUFFIX: &str = "Debt payment";

/// Base note handed to the planner for a user's free-text note
pub fn debt_base_note(note: Option<&str>) -> String {
    match note.map(str::trim).filter(|n| !n.is_empty()) {
        Some(note) => format!("{}, {}", note, DEBT_NOTE_SUFFIX),
        None => DEBT_NOTE_SUFFIX.to_string(),
    }
}

/// A single debt record, one per installment of a plan
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Debt {
    pub id: String,
    pub user_id: String,
    /// Shared by all installments created from one request
    pub plan_id: String,
    pub amount: Decimal,
    pub installment_amount: Decimal,
    /// 1-based
    pub installment_number: i32,
    pub total_installments: i32,
    pub due_date: NaiveDate,
    pub note: String,
    pub paid: bool,
    pub paid_at: Option<NaiveDateTime>,
    /// When the debt was recorded
    pub date: NaiveDateTime,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Derived display state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DebtStatus {
    Paid,
    Overdue,
    Upcoming,
}

impl Debt {
    /// Build the persisted record for one planned installment
    pub fn from_installment(
        user_id: &str,
        plan_id: &str,
        installment: &Installment,
        now: NaiveDateTime,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            plan_id: plan_id.to_string(),
            amount: installment.amount(),
            installment_amount: installment.amount(),
            installment_number: installment.installment_number() as i32,
            total_installments: installment.total_installments() as i32,
            due_date: installment.due_date(),
            note: installment.sequence_label().to_string(),
            paid: false,
            paid_at: None,
            date: now,
            created_at: now,
            updated_at: now,
        }
    }

    /// Mark the debt as settled
    pub fn mark_as_paid(&mut self, now: NaiveDateTime) -> Result<()> {
        if self.paid {
            return Err(AppError::validation(format!(
                "Debt {} is already paid",
                self.id
            )));
        }

        self.paid = true;
        self.paid_at = Some(now);
        self.updated_at = now;
        Ok(())
    }

    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        !self.paid && self.due_date < today
    }

    pub fn status(&self, today: NaiveDate) -> DebtStatus {
        if self.paid {
            DebtStatus::Paid
        } else if self.is_overdue(today) {
            DebtStatus::Overdue
        } else {
            DebtStatus::Upcoming
        }
    }

    pub fn belongs_to(&self, user_id: &str) -> bool {
        self.user_id == user_id
    }
}

/// Body of POST /api/debts
#[derive(Debug, Clone, Deserialize)]
pub struct CreateDebtRequest {
    pub total_amount: Decimal,
    #[serde(default = "default_tenor")]
    pub tenor: i32,
    /// Due date of the first installment
    pub start_date: NaiveDate,
    #[serde(default)]
    pub note: Option<String>,
    #[serde(default)]
    pub currency: Option<Currency>,
}

fn default_tenor() -> i32 {
    1
}

#[derive(Debug, Serialize)]
pub struct DebtResponse {
    pub id: String,
    pub plan_id: String,
    pub amount: String,
    pub installment_amount: String,
    pub installment_number: i32,
    pub total_installments: i32,
    pub due_date: String,
    pub note: String,
    pub paid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub paid_at: Option<String>,
    pub status: DebtStatus,
}

impl DebtResponse {
    pub fn from_debt(debt: Debt, today: NaiveDate) -> Self {
        let status = debt.status(today);
        Self {
            id: debt.id,
            plan_id: debt.plan_id,
            amount: debt.amount.normalize().to_string(),
            installment_amount: debt.installment_amount.normalize().to_string(),
            installment_number: debt.installment_number,
            total_installments: debt.total_installments,
            due_date: debt.due_date.to_string(),
            note: debt.note,
            paid: debt.paid,
            paid_at: debt.paid_at.map(|dt| dt.to_string()),
            status,
        }
    }
}

/// Response for POST /api/debts
#[derive(Debug, Serialize)]
pub struct CreateDebtResponse {
    pub plan_id: String,
    pub debt_ids: Vec<String>,
    pub debts: Vec<DebtResponse>,
}

/// Response for the debt listing endpoints
#[derive(Debug, Serialize)]
pub struct DebtListResponse {
    pub debts: Vec<DebtResponse>,
    /// Sum of unpaid amounts in `debts`
    pub total_unpaid: String,
}
