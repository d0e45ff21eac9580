pub mod transaction_service;

pub use transaction_service::{TransactionService, MAX_HISTORY_PAGE};
