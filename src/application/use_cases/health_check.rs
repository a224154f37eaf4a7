use crate::{
    domain::{account::GatewayName, health::*},
    infrastructure::adapters::PaymentRepository,
    shared::error::AppResult,
};
use serde_json::json;
use std::sync::Arc;
use std::time::Instant;

/// Health check use case
pub struct HealthCheckUseCase {
    started: Instant,
}

impl HealthCheckUseCase {
    /// Create a new health check use case
    pub fn new() -> Self {
        Self { started: Instant::now() }
    }

    /// Report service health, probing the payment store when one is wired in
    pub async fn execute(&self, repository: Option<Arc<dyn PaymentRepository>>) -> AppResult<HealthResponse> {
        let mut status = HealthStatus::Healthy;
        let mut details = json!({
            "timestamp": chrono::Utc::now().to_rfc3339(),
            "version": env!("CARGO_PKG_VERSION"),
            "uptime": self.get_uptime(),
            "gateways": [GatewayName::Worldpay.as_str()],
        });

        match repository {
            Some(repository) => match repository.find_account("healthcheck").await {
                Ok(_) => {
                    details["payment_store"] = json!({ "status": "available" });
                }
                Err(e) => {
                    status = HealthStatus::Degraded;
                    details["payment_store"] = json!({ "status": "unavailable", "error": e.to_string() });
                }
            },
            None => {
                status = HealthStatus::Unhealthy;
                details["payment_store"] = json!({ "status": "not_configured" });
            }
        }

        Ok(HealthResponse::new(status, details))
    }

    fn get_uptime(&self) -> String {
        let secs = self.started.elapsed().as_secs();
        format!("{}d {}h {}m", secs / 86400, (secs % 86400) / 3600, (secs % 3600) / 60)
    }
}

impl Default for HealthCheckUseCase {
    fn default() -> Self {
        Self::new()
    }
}
