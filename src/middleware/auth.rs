use crate::core::{AppError, AuthStateStore, Principal};
use crate::modules::users::{key_digest, UserRepository};
use actix_web::{
    dev::{forward_ready, Payload, Service, ServiceRequest, ServiceResponse, Transform},
    Error, FromRequest, HttpMessage, HttpRequest,
};
use futures_util::future::LocalBoxFuture;
use std::future::{ready, Ready};
use std::ops::Deref;
use std::rc::Rc;
use std::sync::Arc;

pub const API_KEY_HEADER: &str = "X-API-Key";

/// Paths served without credentials
const PUBLIC_PATHS: [&str; 3] = ["/", "/health", "/ready"];

/// API key authentication middleware
///
/// Resolves the `X-API-Key` header to a [`Principal`], first through the
/// shared [`AuthStateStore`] and then through the user repository. Resolved
/// identities are published to the store so later requests skip the lookup
/// until the store's TTL lapses.
pub struct ApiKeyAuth {
    store: Arc<AuthStateStore>,
    users: Arc<dyn UserRepository>,
}

impl ApiKeyAuth {
    pub fn new(store: Arc<AuthStateStore>, users: Arc<dyn UserRepository>) -> Self {
        Self { store, users }
    }
}

impl<S, B> Transform<S, ServiceRequest> for ApiKeyAuth
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = ApiKeyAuthMiddleware<S>;
    type Future = Ready<std::result::Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(ApiKeyAuthMiddleware {
            service: Rc::new(service),
            store: self.store.clone(),
            users: self.users.clone(),
        }))
    }
}

pub struct ApiKeyAuthMiddleware<S> {
    service: Rc<S>,
    store: Arc<AuthStateStore>,
    users: Arc<dyn UserRepository>,
}

impl<S, B> Service<ServiceRequest> for ApiKeyAuthMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, std::result::Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let svc = self.service.clone();
        let store = self.store.clone();
        let users = self.users.clone();

        Box::pin(async move {
            if PUBLIC_PATHS.contains(&req.path()) {
                return svc.call(req).await;
            }

            let api_key = req
                .headers()
                .get(API_KEY_HEADER)
                .and_then(|h| h.to_str().ok())
                .map(str::trim)
                .filter(|k| !k.is_empty())
                .ok_or_else(|| Error::from(AppError::unauthorized("Missing X-API-Key header")))?;

            let principal = resolve_principal(&store, users.as_ref(), api_key)
                .await
                .map_err(Error::from)?;

            tracing::debug!(user_id = principal.user_id.as_str(), "Request authenticated");
            req.extensions_mut().insert(principal);

            svc.call(req).await
        })
    }
}

async fn resolve_principal(
    store: &AuthStateStore,
    users: &dyn UserRepository,
    api_key: &str,
) -> crate::core::Result<Principal> {
    if store.is_shut_down() {
        return Err(AppError::unauthorized("Authentication is unavailable"));
    }

    let digest = key_digest(api_key);
    if let Some(principal) = store.current(&digest) {
        return Ok(principal);
    }

    let principal = users
        .find_principal_by_key_digest(&digest)
        .await?
        .ok_or_else(|| AppError::unauthorized("Invalid API key"))?;

    if let Err(e) = users.record_key_use(&digest).await {
        tracing::warn!(error = %e, "Failed to record API key use");
    }

    store.publish(digest, principal.clone());
    Ok(principal)
}

/// The caller resolved by [`ApiKeyAuth`]
///
/// Extracting it on a route that is not wrapped by the middleware yields 401.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub Principal);

impl Deref for AuthenticatedUser {
    type Target = Principal;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl FromRequest for AuthenticatedUser {
    type Error = AppError;
    type Future = Ready<std::result::Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(
            req.extensions()
                .get::<Principal>()
                .cloned()
                .map(AuthenticatedUser)
                .ok_or_else(|| AppError::unauthorized("Authentication required")),
        )
    }
}
