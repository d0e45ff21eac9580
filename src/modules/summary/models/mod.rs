pub mod financial_summary;

pub use financial_summary::{
    debt_to_income_ratio, DebtHealth, FinancialSummary, SummaryResponse, HEALTHY_RATIO_LIMIT,
    WARNING_RATIO_LIMIT,
};
