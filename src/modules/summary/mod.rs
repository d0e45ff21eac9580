pub mod controllers;
pub mod models;
pub mod services;

pub use models::{DebtHealth, FinancialSummary};
pub use services::SummaryService;
