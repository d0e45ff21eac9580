// HTTP handlers for income and expense entries
//
// Endpoints:
// - POST   /api/incomes            - Record income
// - GET    /api/incomes            - Incomes in one month, newest first
// - POST   /api/expenses           - Record expense
// - GET    /api/expenses           - Expenses in one month, newest first
// - GET    /api/transactions       - History, newest first
// - DELETE /api/transactions/{id}  - Delete an entry

use std::sync::Arc;

use actix_web::{web, HttpResponse};
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::core::{MonthCalendar, Result};
use crate::middleware::auth::AuthenticatedUser;
use crate::modules::transactions::models::{
    RecordTransactionRequest, TransactionKind, TransactionResponse,
};
use crate::modules::transactions::services::TransactionService;

/// Query parameters for transaction history
#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub kind: Option<TransactionKind>,
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}

fn default_limit() -> i64 {
    20
}

#[derive(Debug, Deserialize)]
pub struct MonthQuery {
    /// Any day of the month to list, defaults to today (UTC)
    pub month: Option<NaiveDate>,
}

#[derive(Debug, Serialize)]
pub struct MonthlyResponse {
    pub month_start: NaiveDate,
    pub transactions: Vec<TransactionResponse>,
}

#[derive(Debug, Serialize)]
pub struct HistoryResponse {
    pub transactions: Vec<TransactionResponse>,
    pub limit: i64,
    pub offset: i64,
    /// Offset of the next page, absent on the last page
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_offset: Option<i64>,
}

/// POST /api/incomes
pub async fn record_income(
    service: web::Data<Arc<TransactionService>>,
    user: AuthenticatedUser,
    request: web::Json<RecordTransactionRequest>,
) -> Result<HttpResponse> {
    let tx = service
        .record(&user.user_id, TransactionKind::Income, request.into_inner())
        .await?;
    Ok(HttpResponse::Created().json(TransactionResponse::from(tx)))
}

/// POST /api/expenses
pub async fn record_expense(
    service: web::Data<Arc<TransactionService>>,
    user: AuthenticatedUser,
    request: web::Json<RecordTransactionRequest>,
) -> Result<HttpResponse> {
    let tx = service
        .record(&user.user_id, TransactionKind::Expense, request.into_inner())
        .await?;
    Ok(HttpResponse::Created().json(TransactionResponse::from(tx)))
}

async fn monthly(
    service: &TransactionService,
    user_id: &str,
    kind: TransactionKind,
    query: MonthQuery,
) -> Result<HttpResponse> {
    let day = query.month.unwrap_or_else(|| Utc::now().date_naive());
    let transactions = service.monthly(user_id, kind, day).await?;

    Ok(HttpResponse::Ok().json(MonthlyResponse {
        month_start: MonthCalendar::start_of_month(day),
        transactions: transactions.into_iter().map(TransactionResponse::from).collect(),
    }))
}

/// GET /api/incomes?month=2024-02-01
pub async fn monthly_incomes(
    service: web::Data<Arc<TransactionService>>,
    user: AuthenticatedUser,
    query: web::Query<MonthQuery>,
) -> Result<HttpResponse> {
    monthly(&service, &user.user_id, TransactionKind::Income, query.into_inner()).await
}

/// GET /api/expenses?month=2024-02-01
pub async fn monthly_expenses(
    service: web::Data<Arc<TransactionService>>,
    user: AuthenticatedUser,
    query: web::Query<MonthQuery>,
) -> Result<HttpResponse> {
    monthly(&service, &user.user_id, TransactionKind::Expense, query.into_inner()).await
}

/// GET /api/transactions?kind=expense&limit=20&offset=0
pub async fn history(
    service: web::Data<Arc<TransactionService>>,
    user: AuthenticatedUser,
    query: web::Query<HistoryQuery>,
) -> Result<HttpResponse> {
    let query = query.into_inner();
    let transactions = service
        .history(&user.user_id, query.kind, query.limit, query.offset)
        .await?;

    let next_offset =
        (transactions.len() as i64 == query.limit).then(|| query.offset + query.limit);

    Ok(HttpResponse::Ok().json(HistoryResponse {
        transactions: transactions.into_iter().map(TransactionResponse::from).collect(),
        limit: query.limit,
        offset: query.offset,
        next_offset,
    }))
}

/// DELETE /api/transactions/{id}
pub async fn delete_transaction(
    service: web::Data<Arc<TransactionService>>,
    user: AuthenticatedUser,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    service.delete(&user.user_id, &path).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Configure income/expense routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/incomes")
            .route(web::post().to(record_income))
            .route(web::get().to(monthly_incomes)),
    )
    .service(
        web::resource("/expenses")
            .route(web::post().to(record_expense))
            .route(web::get().to(monthly_expenses)),
    )
    .service(
        web::scope("/transactions")
            .route("", web::get().to(history))
            .route("/{id}", web::delete().to(delete_transaction)),
    );
}
