//! Route builder module
//!
//! This module contains the main route builder that orchestrates the creation
//! of all application routes.

use std::sync::Arc;
use warp::Filter;

use crate::application::services::NotificationService;
use crate::application::use_cases::HealthCheckUseCase;
use crate::config::AppConfig;
use crate::infrastructure::adapters::{MonitoringAdapter, PaymentRepository};
use crate::infrastructure::http::routes::{HealthRoutes, MetricsRoutes, NotificationRoutes};

/// Route builder that orchestrates the creation of all application routes
pub struct RouteBuilder;

impl RouteBuilder {
    /// Build all application routes
    pub fn build_routes(
        config: &AppConfig,
        notification_service: Arc<NotificationService>,
        health_use_case: Arc<HealthCheckUseCase>,
        repository: Arc<dyn PaymentRepository>,
        monitoring: Arc<MonitoringAdapter>,
    ) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
        let notification_route = NotificationRoutes::create_worldpay_route(config, notification_service);
        let health_route = HealthRoutes::create_health_route(health_use_case, repository);
        let metrics_route = MetricsRoutes::create_prometheus_route(monitoring);

        notification_route.or(health_route).or(metrics_route)
    }
}
