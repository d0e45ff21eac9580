pub mod ledger_transaction;

pub use ledger_transaction::{
    LedgerTransaction, RecordTransactionRequest, TransactionKind, TransactionResponse,
    DEFAULT_CATEGORY, SALARY_CATEGORY,
};
