pub mod controllers;
pub mod models;
pub mod repositories;
pub mod services;

pub use models::{CreateDebtRequest, Debt, DebtStatus};
pub use repositories::{DebtRepository, MySqlDebtRepository};
pub use services::{CreatedDebtPlan, DebtService};
