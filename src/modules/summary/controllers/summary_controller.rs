use std::sync::Arc;

use actix_web::{web, HttpResponse};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;

use crate::config::LedgerConfig;
use crate::core::Result;
use crate::middleware::auth::AuthenticatedUser;
use crate::modules::summary::models::SummaryResponse;
use crate::modules::summary::services::SummaryService;

#[derive(Debug, Deserialize)]
pub struct SummaryQuery {
    /// Any day of the month to summarize, defaults to today (UTC)
    pub as_of: Option<NaiveDate>,
}

/// GET /api/summary?as_of=2024-02-10
pub async fn get_summary(
    service: web::Data<Arc<SummaryService>>,
    ledger: web::Data<LedgerConfig>,
    user: AuthenticatedUser,
    query: web::Query<SummaryQuery>,
) -> Result<HttpResponse> {
    let today = query.as_of.unwrap_or_else(|| Utc::now().date_naive());
    let summary = service.monthly_summary(&user.user_id, today).await?;

    Ok(HttpResponse::Ok().json(SummaryResponse::new(
        summary,
        &ledger.currency.to_string(),
    )))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/summary", web::get().to(get_summary));
}
