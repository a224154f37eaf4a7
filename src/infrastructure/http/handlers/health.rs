//! Health check handler module

use std::sync::Arc;
use tracing::error;
use warp::http::StatusCode;
use warp::Reply;

use crate::application::use_cases::HealthCheckUseCase;
use crate::infrastructure::adapters::PaymentRepository;

/// Handle health check requests
pub async fn handle_health_request(
    health_use_case: Arc<HealthCheckUseCase>,
    repository: Arc<dyn PaymentRepository>,
) -> Result<impl Reply, warp::reject::Rejection> {
    let response = match health_use_case.execute(Some(repository)).await {
        Ok(health) => {
            let status = StatusCode::from_u16(health.http_status_code()).unwrap_or(StatusCode::SERVICE_UNAVAILABLE);
            warp::reply::with_status(warp::reply::json(&health), status)
        }
        Err(e) => {
            error!(error = %e, "Health check failed");
            warp::reply::with_status(
                warp::reply::json(&serde_json::json!({ "status": "unhealthy", "error": e.to_string() })),
                e.http_status_code(),
            )
        }
    };
    Ok(response)
}
