//! HTTP utilities - Common helper functions
//!
//! Caller IP extraction and service injection for warp filters.

use std::net::IpAddr;
use std::sync::Arc;
use warp::Filter;

use crate::application::services::NotificationService;
use crate::application::use_cases::HealthCheckUseCase;
use crate::infrastructure::adapters::{MonitoringAdapter, PaymentRepository};

/// Caller IP as reported by the reverse proxy: the first `X-Forwarded-For` entry
pub fn client_ip_from_forwarded(forwarded_for: Option<&str>) -> Option<IpAddr> {
    forwarded_for?
        .split(',')
        .next()
        .map(str::trim)
        .and_then(|ip| ip.parse().ok())
}

/// Helper function to inject the notification service into route
pub fn with_notification_service(
    service: Arc<NotificationService>,
) -> impl Filter<Extract = (Arc<NotificationService>,), Error = std::convert::Infallible> + Clone {
    warp::any().map(move || service.clone())
}

/// Helper function to inject health use case into route
pub fn with_health_use_case(
    health_use_case: Arc<HealthCheckUseCase>,
) -> impl Filter<Extract = (Arc<HealthCheckUseCase>,), Error = std::convert::Infallible> + Clone {
    warp::any().map(move || health_use_case.clone())
}

/// Helper function to inject the payment store into route
pub fn with_repository(
    repository: Arc<dyn PaymentRepository>,
) -> impl Filter<Extract = (Arc<dyn PaymentRepository>,), Error = std::convert::Infallible> + Clone {
    warp::any().map(move || repository.clone())
}

/// Helper function to inject the monitoring adapter into route
pub fn with_monitoring(
    monitoring: Arc<MonitoringAdapter>,
) -> impl Filter<Extract = (Arc<MonitoringAdapter>,), Error = std::convert::Infallible> + Clone {
    warp::any().map(move || monitoring.clone())
}
