use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Service health as reported by the healthcheck endpoint
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    /// Service is fully operational
    Healthy,
    /// Serving, but a dependency (e.g. the payment store) looks wrong
    Degraded,
    /// Service is unavailable
    Unhealthy,
}

impl std::fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HealthStatus::Healthy => write!(f, "healthy"),
            HealthStatus::Degraded => write!(f, "degraded"),
            HealthStatus::Unhealthy => write!(f, "unhealthy"),
        }
    }
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Overall health status
    pub status: HealthStatus,
    /// Detailed health information
    pub details: Value,
}

impl HealthResponse {
    /// Create a new health response
    pub fn new(status: HealthStatus, details: Value) -> Self {
        Self { status, details }
    }

    /// Check if the service is available (healthy or degraded)
    pub fn is_available(&self) -> bool {
        matches!(self.status, HealthStatus::Healthy | HealthStatus::Degraded)
    }

    /// Get HTTP status code for the health status
    pub fn http_status_code(&self) -> u16 {
        if self.is_available() {
            200
        } else {
            503
        }
    }
}
