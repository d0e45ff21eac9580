use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::core::{AppError, Currency, Result};

/// Income category counted towards the debt-to-income ratio
pub const SALARY_CATEGORY: &str = "salary";
pub const DEFAULT_CATEGORY: &str = "other";

/// Direction of money flow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    Income,
    Expense,
}

impl TransactionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
        }
    }
}

impl std::fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl TryFrom<String> for TransactionKind {
    type Error = String;

    fn try_from(value: String) -> std::result::Result<Self, Self::Error> {
        match value.as_str() {
            "income" => Ok(Self::Income),
            "expense" => Ok(Self::Expense),
            _ => Err(format!("Invalid transaction kind: {}", value)),
        }
    }
}

/// An income or expense entry. Amounts are stored positive.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct LedgerTransaction {
    pub id: String,
    pub user_id: String,
    #[sqlx(try_from = "String")]
    pub kind: TransactionKind,
    pub amount: Decimal,
    pub category: String,
    pub note: String,
    /// When the money moved
    pub date: NaiveDateTime,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl LedgerTransaction {
    /// Validate and build a new entry
    pub fn new(
        user_id: &str,
        kind: TransactionKind,
        amount: Decimal,
        category: Option<&str>,
        note: Option<&str>,
        date: NaiveDateTime,
        currency: Currency,
    ) -> Result<Self> {
        if amount <= Decimal::ZERO {
            return Err(AppError::validation(format!(
                "{} amount must be positive",
                kind
            )));
        }

        currency.validate_amount(amount).map_err(AppError::Validation)?;

        let now = chrono::Utc::now().naive_utc();
        Ok(Self {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            kind,
            amount,
            category: normalize_category(category),
            note: note.map(str::trim).unwrap_or_default().to_string(),
            date,
            created_at: now,
            updated_at: now,
        })
    }

    /// Positive for income, negative for expense
    pub fn signed_amount(&self) -> Decimal {
        match self.kind {
            TransactionKind::Income => self.amount,
            TransactionKind::Expense => -self.amount,
        }
    }

    pub fn is_salary(&self) -> bool {
        self.kind == TransactionKind::Income && self.category == SALARY_CATEGORY
    }
}

fn normalize_category(category: Option<&str>) -> String {
    category
        .map(|c| c.trim().to_lowercase())
        .filter(|c| !c.is_empty())
        .unwrap_or_else(|| DEFAULT_CATEGORY.to_string())
}

/// Body of POST /api/incomes and POST /api/expenses
#[derive(Debug, Clone, Deserialize)]
pub struct RecordTransactionRequest {
    pub amount: Decimal,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub note: Option<String>,
    /// Defaults to now
    #[serde(default)]
    pub date: Option<NaiveDateTime>,
}

#[derive(Debug, Serialize)]
pub struct TransactionResponse {
    pub id: String,
    pub kind: TransactionKind,
    pub amount: String,
    pub category: String,
    pub note: String,
    pub date: String,
}

impl From<LedgerTransaction> for TransactionResponse {
    fn from(tx: LedgerTransaction) -> Self {
        Self {
            id: tx.id,
            kind: tx.kind,
            amount: tx.amount.normalize().to_string(),
            category: tx.category,
            note: tx.note,
            date: tx.date.to_string(),
        }
    }
}
