//! HTTP server implementation
//!
//! Serves the Worldpay notification endpoint alongside health and metrics.
//! TLS termination is left to the reverse proxy in front of the connector.

use crate::{
    application::{services::NotificationService, use_cases::HealthCheckUseCase},
    config::AppConfig,
    infrastructure::{
        adapters::{MonitoringAdapter, PaymentRepository},
        http::routes::RouteBuilder,
    },
    shared::error::{AppError, AppResult},
};
use std::sync::Arc;
use tracing::{info, instrument};
use warp::{Filter, Reply};

/// HTTP server for the gateway connector
pub struct HttpServer {
    config: AppConfig,
    notification_service: Arc<NotificationService>,
    health_use_case: Arc<HealthCheckUseCase>,
    repository: Arc<dyn PaymentRepository>,
    monitoring: Arc<MonitoringAdapter>,
}

impl HttpServer {
    pub fn new(
        config: AppConfig,
        notification_service: Arc<NotificationService>,
        repository: Arc<dyn PaymentRepository>,
        monitoring: Arc<MonitoringAdapter>,
    ) -> Self {
        Self {
            config,
            notification_service,
            health_use_case: Arc::new(HealthCheckUseCase::new()),
            repository,
            monitoring,
        }
    }

    /// Get a reference to the configuration
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Run the HTTP server until the process is stopped
    #[instrument(skip(self))]
    pub async fn run(self) -> AppResult<()> {
        let addr: std::net::SocketAddr = self
            .config
            .server_address()
            .parse()
            .map_err(|e| AppError::Config(format!("Invalid server address: {}", e)))?;

        info!(
            secure_notifications = self.config.worldpay.secure_notifications_enabled,
            "Starting HTTP server on {}", addr
        );

        let routes = self.create_routes();
        warp::serve(routes).run(addr).await;

        Ok(())
    }

    fn create_routes(self) -> impl Filter<Extract = impl Reply, Error = warp::Rejection> + Clone {
        RouteBuilder::build_routes(
            &self.config,
            self.notification_service,
            self.health_use_case,
            self.repository,
            self.monitoring,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::adapters::hostname_resolver::MockHostnameResolver;
    use crate::infrastructure::adapters::InMemoryPaymentRepository;
    use crate::tests::{config::test_config, fixtures};

    #[tokio::test]
    async fn test_server_routes() {
        let repository = InMemoryPaymentRepository::new();
        let monitoring = Arc::new(MonitoringAdapter::new().unwrap());
        let service = fixtures::notification_service(&repository, MockHostnameResolver::new(), monitoring.clone(), false);
        let server = HttpServer::new(test_config(), service, Arc::new(repository), monitoring);
        assert_eq!(server.config().server.port, 0);

        let routes = server.create_routes();
        let res = warp::test::request().path("/healthcheck").reply(&routes).await;
        assert_eq!(res.status(), warp::http::StatusCode::OK);
    }
}
