pub mod debt;

pub use debt::{
    debt_base_note, CreateDebtRequest, CreateDebtResponse, Debt, DebtListResponse, DebtResponse,
    DebtStatus, DEBT_NOTE_SUFFIX,
};
