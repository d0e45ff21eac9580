// HTTP handlers for API key management
//
// Endpoints:
// - DELETE /api/keys/current - Revoke the key used for this request

use std::sync::Arc;

use actix_web::{web, HttpRequest, HttpResponse};

use crate::core::{AppError, Result};
use crate::middleware::auth::{AuthenticatedUser, API_KEY_HEADER};
use crate::modules::users::models::key_digest;
use crate::modules::users::services::KeyService;

/// DELETE /api/keys/current
pub async fn revoke_current_key(
    service: web::Data<Arc<KeyService>>,
    user: AuthenticatedUser,
    req: HttpRequest,
) -> Result<HttpResponse> {
    let api_key = req
        .headers()
        .get(API_KEY_HEADER)
        .and_then(|h| h.to_str().ok())
        .map(str::trim)
        .ok_or_else(|| AppError::unauthorized("Missing X-API-Key header"))?;

    service.revoke(&user.user_id, &key_digest(api_key)).await?;
    Ok(HttpResponse::NoContent().finish())
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/keys/current", web::delete().to(revoke_current_key));
}
