pub mod debt_repository;

pub use debt_repository::{DebtRepository, MySqlDebtRepository};
