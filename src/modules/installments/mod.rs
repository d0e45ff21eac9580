pub mod controllers;
pub mod models;
pub mod services;

pub use models::Installment;
pub use services::{plan_installments, InstallmentPlanner};
