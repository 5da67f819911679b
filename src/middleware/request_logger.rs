use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    Error,
};
use futures::future::LocalBoxFuture;
use std::rc::Rc;
use std::time::Instant;

/// Logs method, path, status and latency of every request.
///
/// Query strings are left out; they may carry identifiers.
pub struct RequestLogger;

impl<S, B> Transform<S, ServiceRequest> for RequestLogger
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = RequestLoggerService<S>;
    type Future = std::future::Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        std::future::ready(Ok(RequestLoggerService {
            service: Rc::new(service),
        }))
    }
}

pub struct RequestLoggerService<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for RequestLoggerService<S>
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
        let start_time = Instant::now();
        let method = req.method().to_string();
        let path = req.path().to_string();

        tracing::debug!(method = %method, path = %path, "Request started");

        let service = self.service.clone();

        Box::pin(async move {
            let res = service.call(req).await?;

            let status = res.status().as_u16();
            let elapsed_ms = start_time.elapsed().as_millis() as u64;

            if status >= 500 {
                tracing::error!(
                    method = %method,
                    path = %path,
                    status,
                    elapsed_ms,
                    "Request failed"
                );
            } else {
                tracing::info!(
                    method = %method,
                    path = %path,
                    status,
                    elapsed_ms,
                    "Request completed"
                );
            }

            Ok(res)
        })
    }
}
