use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    web, Error,
};
use futures::future::LocalBoxFuture;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Counts requests to the static front-end
#[derive(Debug, Default)]
pub struct ApiMetrics {
    file_server_hits: AtomicU64,
}

impl ApiMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_hit(&self) {
        self.file_server_hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn hits(&self) -> u64 {
        self.file_server_hits.load(Ordering::Relaxed)
    }

    pub fn reset(&self) {
        self.file_server_hits.store(0, Ordering::Relaxed);
    }
}

/// Bumps `ApiMetrics` once per request passing through the wrapped scope.
///
/// `ApiMetrics` must be registered as `web::Data`; without it requests
/// pass through uncounted.
pub struct HitCounter;

impl<S, B> Transform<S, ServiceRequest> for HitCounter
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = HitCounterService<S>;
    type Future = std::future::Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        std::future::ready(Ok(HitCounterService {
            service: Rc::new(service),
        }))
    }
}

pub struct HitCounterService<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for HitCounterService<S>
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
        match req.app_data::<web::Data<ApiMetrics>>() {
            Some(metrics) => metrics.record_hit(),
            None => tracing::warn!("ApiMetrics not registered; hit not counted"),
        }

        let service = self.service.clone();
        Box::pin(async move { service.call(req).await })
    }
}
