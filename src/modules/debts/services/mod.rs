pub mod debt_service;

pub use debt_service::{total_unpaid, CreatedDebtPlan, DebtService, MAX_UPCOMING_PAGE};
