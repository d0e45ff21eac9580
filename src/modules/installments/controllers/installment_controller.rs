// HTTP handlers for installment planning
//
// Endpoints:
// - POST /api/installments/preview - Plan a debt without saving it

use std::sync::Arc;

use actix_web::{web, HttpResponse};

use crate::core::Result;
use crate::middleware::auth::AuthenticatedUser;
use crate::modules::debts::models::CreateDebtRequest;
use crate::modules::debts::services::DebtService;
use crate::modules::installments::models::{
    InstallmentPlanRequest, InstallmentPlanResponse, InstallmentResponse,
};

/// POST /api/installments/preview
///
/// Runs the planner with the same rules and note format as debt creation.
///
/// # Returns
/// - 200: Planned installments
/// - 400: Invalid tenor or amount
pub async fn preview_installments(
    service: web::Data<Arc<DebtService>>,
    _user: AuthenticatedUser,
    request: web::Json<InstallmentPlanRequest>,
) -> Result<HttpResponse> {
    let request = request.into_inner();
    let currency = request.currency.unwrap_or(service.ledger().currency);

    let installments = service.preview(&CreateDebtRequest {
        total_amount: request.total_amount,
        tenor: request.tenor,
        start_date: request.start_date,
        note: request.note,
        currency: Some(currency),
    })?;

    let regular = installments
        .first()
        .map(|i| i.amount())
        .unwrap_or(request.total_amount);

    let response = InstallmentPlanResponse {
        currency,
        total_amount: request.total_amount.to_string(),
        tenor: request.tenor,
        installment_amount_display: currency.format_amount(regular),
        installments: installments.iter().map(InstallmentResponse::from).collect(),
    };

    Ok(HttpResponse::Ok().json(response))
}

/// Configure installment routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/installments").route("/preview", web::post().to(preview_installments)),
    );
}
