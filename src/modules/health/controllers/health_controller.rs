use actix_web::{web, HttpResponse, Responder};
use serde::{Deserialize, Serialize};
use sqlx::MySqlPool;

pub const SERVICE_NAME: &str = "fintrack";

/// Liveness response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub version: String,
    pub timestamp: String,
}

/// Readiness response
#[derive(Debug, Serialize, Deserialize)]
pub struct ReadinessResponse {
    pub ready: bool,
    pub database: bool,
}

/// GET / - Service banner
pub async fn index() -> impl Responder {
    HttpResponse::Ok().json(serde_json::json!({
        "service": SERVICE_NAME,
        "version": env!("CARGO_PKG_VERSION"),
        "status": "running"
    }))
}

/// GET /health - Liveness probe, does not touch dependencies
pub async fn health_check() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        status: "healthy".to_string(),
        service: SERVICE_NAME.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}

/// GET /ready - Readiness probe, checks database connectivity
pub async fn readiness_check(pool: web::Data<MySqlPool>) -> impl Responder {
    let database = match sqlx::query("SELECT 1").execute(pool.get_ref()).await {
        Ok(_) => true,
        Err(e) => {
            tracing::error!(error = %e, "Database readiness check failed");
            false
        }
    };

    let response = ReadinessResponse {
        ready: database,
        database,
    };

    if response.ready {
        HttpResponse::Ok().json(response)
    } else {
        HttpResponse::ServiceUnavailable().json(response)
    }
}

/// Liveness and banner routes, usable without a database
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(index))
        .route("/health", web::get().to(health_check));
}

/// Readiness route; requires a `web::Data<MySqlPool>`
pub fn configure_readiness(cfg: &mut web::ServiceConfig) {
    cfg.route("/ready", web::get().to(readiness_check));
}
