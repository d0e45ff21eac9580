//! Fintrack personal finance service
//!
//! Tracks income, expenses and debts per user. Debts taken on a tenor are
//! split into monthly installments by the installment planner and stored as
//! one record per installment.

pub mod config;
pub mod core;
pub mod middleware;
pub mod modules;

use actix_web::web;

// Re-export commonly used types
pub use modules::debts;
pub use modules::installments;
pub use modules::summary;
pub use modules::transactions;
pub use modules::users;

/// Register every authenticated route under the caller's scope
///
/// Handlers expect `web::Data<Arc<DebtService>>`, `web::Data<Arc<TransactionService>>`,
/// `web::Data<Arc<SummaryService>>`, `web::Data<Arc<KeyService>>` and
/// `web::Data<LedgerConfig>` to be registered.
pub fn configure_api(cfg: &mut web::ServiceConfig) {
    cfg.configure(debts::controllers::configure)
        .configure(installments::controllers::configure)
        .configure(transactions::controllers::configure)
        .configure(summary::controllers::configure)
        .configure(users::controllers::configure);
}
