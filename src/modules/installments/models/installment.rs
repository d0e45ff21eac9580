use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::core::Currency;

/// One scheduled partial payment of a larger debt.
///
/// Produced by the planner as part of a batch and never mutated afterwards;
/// paid state lives on the persisted debt record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Installment {
    amount: Decimal,
    due_date: NaiveDate,
    sequence_label: String,
    installment_index: u32,
    total_installments: u32,
}

impl Installment {
    pub(crate) fn new(
        amount: Decimal,
        due_date: NaiveDate,
        sequence_label: String,
        installment_index: u32,
        total_installments: u32,
    ) -> Self {
        Self {
            amount,
            due_date,
            sequence_label,
            installment_index,
            total_installments,
        }
    }

    pub fn amount(&self) -> Decimal {
        self.amount
    }

    pub fn due_date(&self) -> NaiveDate {
        self.due_date
    }

    pub fn sequence_label(&self) -> &str {
        &self.sequence_label
    }

    /// Zero-based position in the batch
    pub fn installment_index(&self) -> u32 {
        self.installment_index
    }

    /// One-based position, as shown to users ("2" in "2/3")
    pub fn installment_number(&self) -> u32 {
        self.installment_index + 1
    }

    pub fn total_installments(&self) -> u32 {
        self.total_installments
    }

    pub fn is_last(&self) -> bool {
        self.installment_number() == self.total_installments
    }
}

/// Body of POST /api/installments/preview
#[derive(Debug, Clone, Deserialize)]
pub struct InstallmentPlanRequest {
    pub total_amount: Decimal,
    pub tenor: i32,
    pub start_date: NaiveDate,
    #[serde(default)]
    pub note: Option<String>,
    /// Overrides the ledger currency for precision
    #[serde(default)]
    pub currency: Option<Currency>,
}

#[derive(Debug, Serialize)]
pub struct InstallmentResponse {
    pub installment_number: u32,
    pub total_installments: u32,
    pub amount: String,
    pub due_date: String,
    pub note: String,
}

impl From<&Installment> for InstallmentResponse {
    fn from(installment: &Installment) -> Self {
        Self {
            installment_number: installment.installment_number(),
            total_installments: installment.total_installments(),
            amount: installment.amount().to_string(),
            due_date: installment.due_date().to_string(),
            note: installment.sequence_label().to_string(),
        }
    }
}

/// Response for POST /api/installments/preview
#[derive(Debug, Serialize)]
pub struct InstallmentPlanResponse {
    pub currency: Currency,
    pub total_amount: String,
    pub tenor: i32,
    /// Human-readable regular installment, e.g. "IDR 333333"
    pub installment_amount_display: String,
    pub installments: Vec<InstallmentResponse>,
}
