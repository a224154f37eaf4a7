//! Merchant credential validation

use std::sync::Arc;
use tracing::info;

use crate::domain::account::GatewayAccount;
use crate::infrastructure::gateways::PaymentGateway;
use crate::shared::error::{AppError, AppResult};

pub struct CredentialsService {
    gateway: Arc<dyn PaymentGateway>,
}

impl CredentialsService {
    pub fn new(gateway: Arc<dyn PaymentGateway>) -> Self {
        Self { gateway }
    }

    /// Check stored credentials without touching any real order
    pub async fn validate(&self, account: &GatewayAccount) -> AppResult<bool> {
        if account.gateway != self.gateway.name() {
            return Err(AppError::UnsupportedGateway(account.gateway.to_string()));
        }

        let valid = self.gateway.validate_credentials(account).await?;
        info!(gateway_account_id = %account.id, valid = valid, "Credentials checked");
        Ok(valid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::app_config::WorldpayConfig;
    use crate::infrastructure::adapters::gateway_transport::{MockGatewayTransport, TransportError};
    use crate::infrastructure::adapters::monitoring::MonitoringAdapter;
    use crate::infrastructure::gateways::WorldpayGateway;
    use crate::tests::fixtures;

    fn service(transport: MockGatewayTransport) -> CredentialsService {
        CredentialsService::new(Arc::new(WorldpayGateway::new(
            Arc::new(transport),
            WorldpayConfig::default(),
            Arc::new(MonitoringAdapter::new().unwrap()),
        )))
    }

    #[tokio::test]
    async fn test_sentinels() {
        let mut transport = MockGatewayTransport::new();
        transport
            .expect_post()
            .times(1)
            .returning(|_| Ok(fixtures::http_ok(fixtures::reply_error("4", "Security violation"))));
        assert_eq!(service(transport).validate(&fixtures::account()).await, Ok(false));

        let mut transport = MockGatewayTransport::new();
        transport.expect_post().times(1).returning(|_| {
            Err(TransportError::Status {
                status: 401,
                body: "Unauthorized".to_string(),
            })
        });
        assert_eq!(service(transport).validate(&fixtures::account()).await, Ok(false));
    }

    #[tokio::test]
    async fn test_unexpected_reply_is_an_error() {
        let mut transport = MockGatewayTransport::new();
        transport
            .expect_post()
            .times(1)
            .returning(|_| Ok(fixtures::http_ok("<html>maintenance</html>".to_string())));
        assert!(matches!(
            service(transport).validate(&fixtures::account()).await,
            Err(AppError::UnexpectedResponse { .. })
        ));
    }
}
