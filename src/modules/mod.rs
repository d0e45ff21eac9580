pub mod debts;
pub mod health;
pub mod installments;
pub mod summary;
pub mod transactions;
pub mod users;
