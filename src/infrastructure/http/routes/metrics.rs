//! Metrics routes module

use std::sync::Arc;
use warp::Filter;

use crate::infrastructure::adapters::MonitoringAdapter;
use crate::infrastructure::http::{handlers::handle_prometheus_request, utils::with_monitoring};

/// Metrics routes configuration
pub struct MetricsRoutes;

impl MetricsRoutes {
    /// Create the Prometheus `GET /metrics` route
    pub fn create_prometheus_route(
        monitoring: Arc<MonitoringAdapter>,
    ) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
        warp::path("metrics")
            .and(warp::path::end())
            .and(warp::get())
            .and(with_monitoring(monitoring))
            .and_then(handle_prometheus_request)
    }
}
