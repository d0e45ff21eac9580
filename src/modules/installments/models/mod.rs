pub mod installment;

pub use installment::{
    Installment, InstallmentPlanRequest, InstallmentPlanResponse, InstallmentResponse,
};
