use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    error::{JsonPayloadError, QueryPayloadError},
    Error, HttpMessage, HttpRequest,
};
use futures_util::future::LocalBoxFuture;
use std::future::{ready, Ready};
use std::rc::Rc;

use crate::core::AppError;
use crate::middleware::request_id::RequestIdValue;

/// Logs every request that ends in a client or server error
pub struct ErrorHandler;

impl<S, B> Transform<S, ServiceRequest> for ErrorHandler
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = ErrorHandlerMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(ErrorHandlerMiddleware {
            service: Rc::new(service),
        }))
    }
}

pub struct ErrorHandlerMiddleware<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for ErrorHandlerMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = self.service.clone();
        let request_id = req
            .extensions()
            .get::<RequestIdValue>()
            .map(|id| id.0.clone())
            .unwrap_or_default();
        let path = req.path().to_string();

        Box::pin(async move {
            let result = service.call(req).await;

            match &result {
                Ok(res) if res.status().is_server_error() => {
                    tracing::error!(
                        request_id = %request_id,
                        path = %path,
                        status = res.status().as_u16(),
                        "Request failed"
                    );
                }
                Ok(res) if res.status().is_client_error() => {
                    tracing::warn!(
                        request_id = %request_id,
                        path = %path,
                        status = res.status().as_u16(),
                        "Request rejected"
                    );
                }
                Err(err) => {
                    tracing::warn!(
                        request_id = %request_id,
                        path = %path,
                        error = %err,
                        "Request error"
                    );
                }
                _ => {}
            }

            result
        })
    }
}

/// Render malformed JSON bodies in the standard error envelope
pub fn json_error_handler(err: JsonPayloadError, _req: &HttpRequest) -> Error {
    AppError::validation(format!("Invalid request body: {}", err)).into()
}

/// Render malformed query strings in the standard error envelope
pub fn query_error_handler(err: QueryPayloadError, _req: &HttpRequest) -> Error {
    AppError::validation(format!("Invalid query string: {}", err)).into()
}
