pub mod controllers;
pub mod models;
pub mod repositories;
pub mod services;

pub use models::{LedgerTransaction, TransactionKind};
pub use repositories::{MySqlTransactionRepository, TransactionRepository};
pub use services::TransactionService;
