//! Metrics handler module

use std::sync::Arc;
use tracing::error;
use warp::http::StatusCode;
use warp::Reply;

use crate::infrastructure::adapters::MonitoringAdapter;

/// Handle Prometheus metrics requests
pub async fn handle_prometheus_request(
    monitoring_adapter: Arc<MonitoringAdapter>,
) -> Result<impl Reply, warp::reject::Rejection> {
    let (body, status) = match monitoring_adapter.get_prometheus_metrics() {
        Ok(metrics) => (metrics, StatusCode::OK),
        Err(e) => {
            error!(error = %e, "Failed to encode metrics");
            (String::new(), StatusCode::INTERNAL_SERVER_ERROR)
        }
    };

    Ok(warp::reply::with_header(
        warp::reply::with_status(body, status),
        "Content-Type",
        "text/plain; version=0.0.4; charset=utf-8",
    ))
}
