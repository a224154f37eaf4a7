//! Health routes module

use std::sync::Arc;
use warp::Filter;

use crate::application::use_cases::HealthCheckUseCase;
use crate::infrastructure::adapters::PaymentRepository;
use crate::infrastructure::http::{
    handlers::handle_health_request,
    utils::{with_health_use_case, with_repository},
};

/// Health routes configuration
pub struct HealthRoutes;

impl HealthRoutes {
    /// Create the `GET /healthcheck` route
    pub fn create_health_route(
        health_use_case: Arc<HealthCheckUseCase>,
        repository: Arc<dyn PaymentRepository>,
    ) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
        warp::path("healthcheck")
            .and(warp::path::end())
            .and(warp::get())
            .and(with_health_use_case(health_use_case))
            .and(with_repository(repository))
            .and_then(handle_health_request)
    }
}
