// HTTP handlers for debt endpoints
//
// Endpoints:
// - POST   /api/debts                  - Create a debt, split by tenor
// - GET    /api/debts                  - List all debts
// - GET    /api/debts/upcoming         - Unpaid debts due from today, paginated
// - GET    /api/debts/due-this-month   - Unpaid debts due this month
// - POST   /api/debts/{id}/pay         - Mark a debt as paid
// - DELETE /api/debts/{id}             - Delete a debt

use std::sync::Arc;

use actix_web::{web, HttpResponse};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;

use crate::core::Result;
use crate::middleware::auth::AuthenticatedUser;
use crate::modules::debts::models::{
    CreateDebtRequest, CreateDebtResponse, Debt, DebtListResponse, DebtResponse,
};
use crate::modules::debts::services::{total_unpaid, DebtService};

/// Query parameters for the upcoming debts listing
#[derive(Debug, Deserialize)]
pub struct UpcomingDebtsQuery {
    pub limit: Option<i64>,
    #[serde(default)]
    pub offset: i64,
    /// Reference day, defaults to today (UTC)
    pub as_of: Option<NaiveDate>,
}

/// Query parameters for month-scoped listings
#[derive(Debug, Deserialize)]
pub struct AsOfQuery {
    pub as_of: Option<NaiveDate>,
}

fn today_or(as_of: Option<NaiveDate>) -> NaiveDate {
    as_of.unwrap_or_else(|| Utc::now().date_naive())
}

fn list_response(debts: Vec<Debt>, today: NaiveDate) -> DebtListResponse {
    let total = total_unpaid(&debts);
    DebtListResponse {
        debts: debts
            .into_iter()
            .map(|d| DebtResponse::from_debt(d, today))
            .collect(),
        total_unpaid: total.normalize().to_string(),
    }
}

/// POST /api/debts
///
/// # Returns
/// - 201: Plan created, one debt per installment
/// - 400: Invalid tenor, amount or currency precision
pub async fn create_debt(
    service: web::Data<Arc<DebtService>>,
    user: AuthenticatedUser,
    request: web::Json<CreateDebtRequest>,
) -> Result<HttpResponse> {
    let plan = service
        .create_debt_with_tenor(&user.user_id, request.into_inner())
        .await?;

    let today = Utc::now().date_naive();
    let response = CreateDebtResponse {
        plan_id: plan.plan_id.clone(),
        debt_ids: plan.debt_ids(),
        debts: plan
            .debts
            .into_iter()
            .map(|d| DebtResponse::from_debt(d, today))
            .collect(),
    };

    Ok(HttpResponse::Created().json(response))
}

/// GET /api/debts
pub async fn list_debts(
    service: web::Data<Arc<DebtService>>,
    user: AuthenticatedUser,
    query: web::Query<AsOfQuery>,
) -> Result<HttpResponse> {
    let debts = service.list_debts(&user.user_id).await?;
    Ok(HttpResponse::Ok().json(list_response(debts, today_or(query.as_of))))
}

/// GET /api/debts/upcoming?limit=5&offset=0
pub async fn upcoming_debts(
    service: web::Data<Arc<DebtService>>,
    user: AuthenticatedUser,
    query: web::Query<UpcomingDebtsQuery>,
) -> Result<HttpResponse> {
    let today = today_or(query.as_of);
    let debts = service
        .upcoming_debts(&user.user_id, today, query.limit, query.offset)
        .await?;

    Ok(HttpResponse::Ok().json(list_response(debts, today)))
}

/// GET /api/debts/due-this-month
pub async fn debts_due_this_month(
    service: web::Data<Arc<DebtService>>,
    user: AuthenticatedUser,
    query: web::Query<AsOfQuery>,
) -> Result<HttpResponse> {
    let today = today_or(query.as_of);
    let debts = service.debts_due_in_month(&user.user_id, today).await?;

    Ok(HttpResponse::Ok().json(list_response(debts, today)))
}

/// POST /api/debts/{id}/pay
///
/// # Returns
/// - 200: Updated debt
/// - 400: Debt already paid
/// - 404: No such debt for this user
pub async fn mark_debt_paid(
    service: web::Data<Arc<DebtService>>,
    user: AuthenticatedUser,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    let debt = service.mark_as_paid(&user.user_id, &path).await?;
    Ok(HttpResponse::Ok().json(DebtResponse::from_debt(debt, Utc::now().date_naive())))
}

/// DELETE /api/debts/{id}
pub async fn delete_debt(
    service: web::Data<Arc<DebtService>>,
    user: AuthenticatedUser,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    service.delete_debt(&user.user_id, &path).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Configure debt routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/debts")
            .route("", web::post().to(create_debt))
            .route("", web::get().to(list_debts))
            .route("/upcoming", web::get().to(upcoming_debts))
            .route("/due-this-month", web::get().to(debts_due_this_month))
            .route("/{id}/pay", web::post().to(mark_debt_paid))
            .route("/{id}", web::delete().to(delete_debt)),
    );
}
