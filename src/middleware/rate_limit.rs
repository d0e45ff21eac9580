use actix_web::{
    body::{BoxBody, EitherBody},
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    Error, ResponseError,
};
use futures_util::future::LocalBoxFuture;
use governor::{
    clock::DefaultClock,
    state::{InMemoryState, NotKeyed},
    Quota, RateLimiter as GovernorRateLimiter,
};
use std::future::{ready, Ready};
use std::num::NonZeroU32;
use std::rc::Rc;
use std::sync::Arc;

use crate::core::AppError;

type DirectLimiter = GovernorRateLimiter<NotKeyed, InMemoryState, DefaultClock>;

/// Process-wide request quota using governor
///
/// Clones share one quota, so a single instance can wrap every worker's app.
#[derive(Clone)]
pub struct RateLimiter {
    limiter: Arc<DirectLimiter>,
    per_minute: u32,
}

impl RateLimiter {
    /// Quota of `requests_per_minute`; zero is raised to one
    pub fn new(requests_per_minute: u32) -> Self {
        let per_minute = NonZeroU32::new(requests_per_minute).unwrap_or(NonZeroU32::MIN);
        let limiter = Arc::new(GovernorRateLimiter::direct(Quota::per_minute(per_minute)));

        Self {
            limiter,
            per_minute: per_minute.get(),
        }
    }
}

impl<S, B> Transform<S, ServiceRequest> for RateLimiter
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<BoxBody, B>>;
    type Error = Error;
    type InitError = ();
    type Transform = RateLimiterMiddleware<S>;
    type Future = Ready<std::result::Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RateLimiterMiddleware {
            service: Rc::new(service),
            limiter: self.limiter.clone(),
            per_minute: self.per_minute,
        }))
    }
}

pub struct RateLimiterMiddleware<S> {
    service: Rc<S>,
    limiter: Arc<DirectLimiter>,
    per_minute: u32,
}

impl<S, B> Service<ServiceRequest> for RateLimiterMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<BoxBody, B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, std::result::Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let svc = self.service.clone();
        let limiter = self.limiter.clone();
        let per_minute = self.per_minute;

        Box::pin(async move {
            // Probes are never throttled
            if req.path() == "/health" || req.path() == "/ready" {
                return svc.call(req).await.map(|res| res.map_into_right_body());
            }

            if limiter.check().is_err() {
                tracing::warn!(path = %req.path(), "Rate limit exceeded");
                let error = AppError::RateLimitExceeded(format!(
                    "Maximum {} requests per minute",
                    per_minute
                ));
                let response = error.error_response();
                return Ok(req.into_response(response).map_into_left_body());
            }

            svc.call(req).await.map(|res| res.map_into_right_body())
        })
    }
}
