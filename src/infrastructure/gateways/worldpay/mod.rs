//! Worldpay XML integration

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, warn};
use uuid::Uuid;

use crate::config::app_config::WorldpayConfig;
use crate::domain::account::{GatewayAccount, GatewayName};
use crate::domain::authorisation::{
    AuthorisationRequest, AuthorisationResponse, GatewayError, GatewayErrorKind, ThreeDsContinuationRequest,
};
use crate::domain::modification::{
    CancelRequest, CaptureRequest, ModificationOutcome, ModificationResponse, QueryRequest, QueryResponse, RefundRequest,
};
use crate::domain::notification::Notification;
use crate::domain::status::MappedStatus;
use crate::infrastructure::adapters::gateway_transport::{
    BasicCredentials, GatewayHttpResponse, GatewayRequest, GatewayTransport, TransportError,
};
use crate::infrastructure::adapters::monitoring::MonitoringAdapter;
use crate::infrastructure::gateways::{GatewayOrder, PaymentGateway};
use crate::shared::error::AppResult;
use crate::shared::logging::LoggingUtils;

pub mod credentials;
pub mod notification;
pub mod order_builder;
pub mod response;
pub mod status_mapper;

pub struct WorldpayGateway {
    transport: Arc<dyn GatewayTransport>,
    config: WorldpayConfig,
    monitoring: Arc<MonitoringAdapter>,
}

impl WorldpayGateway {
    pub fn new(transport: Arc<dyn GatewayTransport>, config: WorldpayConfig, monitoring: Arc<MonitoringAdapter>) -> Self {
        Self {
            transport,
            config,
            monitoring,
        }
    }

    async fn send(
        &self,
        account: &GatewayAccount,
        order: GatewayOrder,
        transaction_id: &str,
        cookies: Vec<(String, String)>,
    ) -> Result<GatewayHttpResponse, TransportError> {
        let order_type = order.order_type;
        LoggingUtils::log_gateway_request(
            GatewayName::Worldpay.as_str(),
            order_type.as_str(),
            transaction_id,
            &account.id,
        );

        let request = GatewayRequest {
            url: self.config.url_for(account).to_string(),
            order,
            credentials: Some(BasicCredentials {
                username: account.credentials.username.clone(),
                password: account.credentials.password.clone(),
            }),
            cookies,
        };

        let started = Instant::now();
        let result = self.transport.post(request).await;
        self.monitoring
            .observe_gateway_latency(order_type, started.elapsed().as_secs_f64());
        result
    }

    /// Turn a transport failure into a redacted error and log it
    fn transport_failure(
        &self,
        account: &GatewayAccount,
        transaction_id: &str,
        failure: TransportError,
        sensitive: &[&str],
    ) -> GatewayError {
        let error = match failure {
            TransportError::Timeout(detail) => GatewayError::new(
                GatewayErrorKind::Timeout,
                None,
                LoggingUtils::redact(&detail, sensitive),
            ),
            TransportError::Status { status, body } => GatewayError::new(
                GatewayErrorKind::HttpStatus(status),
                None,
                format!("HTTP {}: {}", status, LoggingUtils::redact(body.trim(), sensitive)),
            ),
            TransportError::Io(detail) => GatewayError::new(
                GatewayErrorKind::Connection,
                None,
                LoggingUtils::redact(&detail, sensitive),
            ),
        };

        error!(
            gateway = "worldpay",
            gateway_account_id = %account.id,
            transaction_id = %transaction_id,
            error = %error,
            "Gateway request failed"
        );
        error
    }

    async fn modify(&self, account: &GatewayAccount, transaction_id: &str, order: GatewayOrder) -> ModificationResponse {
        match self.send(account, order, transaction_id, Vec::new()).await {
            Ok(response) => response::interpret_modification(transaction_id, &response.body),
            Err(failure) => ModificationResponse {
                transaction_id: transaction_id.to_string(),
                outcome: ModificationOutcome::Error {
                    error: self.transport_failure(account, transaction_id, failure, &[]),
                },
            },
        }
    }
}

#[async_trait]
impl PaymentGateway for WorldpayGateway {
    fn name(&self) -> GatewayName {
        GatewayName::Worldpay
    }

    async fn authorise(
        &self,
        request: &AuthorisationRequest,
        exemption_requested: bool,
    ) -> AppResult<AuthorisationResponse> {
        let order = order_builder::build_authorise(request, exemption_requested)?;
        let transaction_id = request.transaction_id.as_deref().unwrap_or_default();
        let sensitive: Vec<&str> = request.cardholder_name().into_iter().collect();

        let response = match self.send(&request.account, order, transaction_id, Vec::new()).await {
            Ok(http) => response::interpret_authorisation(&http, &sensitive),
            Err(failure) => {
                AuthorisationResponse::error(self.transport_failure(&request.account, transaction_id, failure, &sensitive))
            }
        };

        Ok(AuthorisationResponse {
            transaction_id: response.transaction_id.or_else(|| request.transaction_id.clone()),
            ..response
        })
    }

    async fn continue_authorisation(&self, request: &ThreeDsContinuationRequest) -> AppResult<AuthorisationResponse> {
        let order = order_builder::build_continuation(request)?;
        let transaction_id = request.transaction_id.as_deref().unwrap_or_default();
        let cookies = request
            .session_identifier
            .as_ref()
            .map(|session| vec![(response::SESSION_COOKIE.to_string(), session.as_str().to_string())])
            .unwrap_or_default();

        let response = match self.send(&request.account, order, transaction_id, cookies).await {
            Ok(http) => response::interpret_authorisation(&http, &[]),
            Err(failure) => AuthorisationResponse::error(self.transport_failure(&request.account, transaction_id, failure, &[])),
        };

        Ok(AuthorisationResponse {
            transaction_id: response.transaction_id.or_else(|| request.transaction_id.clone()),
            ..response
        })
    }

    async fn capture(&self, request: &CaptureRequest) -> AppResult<ModificationResponse> {
        let order = order_builder::build_capture(request)?;
        let transaction_id = request.transaction_id.as_deref().unwrap_or_default();
        Ok(self.modify(&request.account, transaction_id, order).await)
    }

    async fn cancel(&self, request: &CancelRequest) -> AppResult<ModificationResponse> {
        let order = order_builder::build_cancel(request)?;
        let transaction_id = request.transaction_id.as_deref().unwrap_or_default();
        Ok(self.modify(&request.account, transaction_id, order).await)
    }

    async fn refund(&self, request: &RefundRequest) -> AppResult<ModificationResponse> {
        let order = order_builder::build_refund(request)?;
        let transaction_id = request.transaction_id.as_deref().unwrap_or_default();
        Ok(self.modify(&request.account, transaction_id, order).await)
    }

    async fn query(&self, request: &QueryRequest) -> AppResult<QueryResponse> {
        let order = order_builder::build_inquiry(&request.account, request.transaction_id.as_deref())?;
        let transaction_id = request.transaction_id.as_deref().unwrap_or_default();

        match self.send(&request.account, order, transaction_id, Vec::new()).await {
            Ok(http) => Ok(response::interpret_inquiry(transaction_id, &http.body)),
            Err(failure) => Ok(QueryResponse {
                transaction_id: transaction_id.to_string(),
                raw_status: None,
                mapped: MappedStatus::Unknown,
                error: Some(self.transport_failure(&request.account, transaction_id, failure, &[])),
            }),
        }
    }

    async fn validate_credentials(&self, account: &GatewayAccount) -> AppResult<bool> {
        // A random order code is guaranteed not to exist for this merchant
        let probe = Uuid::new_v4().to_string();
        let order = order_builder::build_inquiry(account, Some(&probe))?;
        let result = self.send(account, order, &probe, Vec::new()).await;

        let verdict = credentials::interpret_credentials_check(result);
        if let Err(e) = &verdict {
            warn!(gateway_account_id = %account.id, error = %e, "Credentials check inconclusive");
        }
        verdict
    }

    fn parse_notification(&self, payload: &str) -> AppResult<Notification> {
        notification::parse_notification(payload)
    }

    fn map_notification_status(&self, status: &str) -> MappedStatus {
        status_mapper::map_notification_status(status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::authorisation::{ChallengeResult, GatewayOutcome, ProviderSessionIdentifier};
    use crate::infrastructure::adapters::gateway_transport::MockGatewayTransport;
    use crate::shared::error::AppError;
    use crate::tests::fixtures;

    fn gateway(transport: MockGatewayTransport) -> WorldpayGateway {
        WorldpayGateway::new(
            Arc::new(transport),
            WorldpayConfig::default(),
            Arc::new(MonitoringAdapter::new().unwrap()),
        )
    }

    #[tokio::test]
    async fn test_authorise_uses_account_credentials_and_url() {
        let mut transport = MockGatewayTransport::new();
        transport
            .expect_post()
            .withf(|request| {
                request.url.contains("secure-test")
                    && request.credentials.as_ref().map(|c| c.username.as_str()) == Some(fixtures::USERNAME)
                    && request.cookies.is_empty()
            })
            .times(1)
            .returning(|_| Ok(fixtures::http_ok(fixtures::authorised_reply("tx-1"))));

        let response = gateway(transport)
            .authorise(&fixtures::card_request("tx-1"), false)
            .await
            .unwrap();
        assert_eq!(response.outcome, GatewayOutcome::Authorised);
    }

    #[tokio::test]
    async fn test_timeout_and_http_errors_are_distinguished() {
        let mut transport = MockGatewayTransport::new();
        transport
            .expect_post()
            .times(1)
            .returning(|_| Err(TransportError::Timeout("read timed out".to_string())));
        let response = gateway(transport)
            .authorise(&fixtures::card_request("tx-1"), false)
            .await
            .unwrap();
        match response.outcome {
            GatewayOutcome::Error { error } => assert_eq!(error.kind, GatewayErrorKind::Timeout),
            other => panic!("expected timeout, got {:?}", other),
        }

        let mut transport = MockGatewayTransport::new();
        transport.expect_post().times(1).returning(|_| {
            Err(TransportError::Status {
                status: 500,
                body: "<cardHolderName>Mr Payment</cardHolderName> failed for Mr Payment".to_string(),
            })
        });
        let response = gateway(transport)
            .authorise(&fixtures::card_request("tx-1"), false)
            .await
            .unwrap();
        match response.outcome {
            GatewayOutcome::Error { error } => {
                assert_eq!(error.kind, GatewayErrorKind::HttpStatus(500));
                assert!(!error.message.contains("Mr Payment"));
            }
            other => panic!("expected HTTP error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_contract_violation_never_reaches_transport() {
        let mut transport = MockGatewayTransport::new();
        transport.expect_post().times(0);

        let mut request = fixtures::card_request("tx-1");
        request.transaction_id = None;
        let result = gateway(transport).authorise(&request, false).await;
        assert!(matches!(result, Err(AppError::MissingMandatoryField { .. })));
    }

    #[tokio::test]
    async fn test_continuation_forwards_session_cookie() {
        let mut transport = MockGatewayTransport::new();
        transport
            .expect_post()
            .withf(|request| {
                request.cookies == vec![("machine".to_string(), "node-7".to_string())]
                    && request.order.payload.contains("<paResponse>pa-res</paResponse>")
            })
            .times(1)
            .returning(|_| Ok(fixtures::http_ok(fixtures::authorised_reply("tx-1"))));

        let request = ThreeDsContinuationRequest {
            account: fixtures::account(),
            transaction_id: Some("tx-1".to_string()),
            session_identifier: Some(ProviderSessionIdentifier::new("node-7")),
            challenge_result: ChallengeResult {
                pa_response: Some("pa-res".to_string()),
            },
        };
        let response = gateway(transport).continue_authorisation(&request).await.unwrap();
        assert_eq!(response.outcome, GatewayOutcome::Authorised);
    }

    #[tokio::test]
    async fn test_credentials_probe_uses_fresh_order_code() {
        let mut transport = MockGatewayTransport::new();
        transport
            .expect_post()
            .withf(|request| request.order.payload.contains("<orderInquiry orderCode=\"") && !request.order.payload.contains("tx-"))
            .times(1)
            .returning(|_| Ok(fixtures::http_ok(fixtures::reply_error("5", "Could not find payment for order"))));

        assert_eq!(gateway(transport).validate_credentials(&fixtures::account()).await, Ok(true));
    }

    #[tokio::test]
    async fn test_modification_transport_error() {
        let mut transport = MockGatewayTransport::new();
        transport
            .expect_post()
            .times(1)
            .returning(|_| Err(TransportError::Io("connection reset".to_string())));

        let request = CancelRequest {
            account: fixtures::account(),
            transaction_id: Some("tx-1".to_string()),
        };
        let response = gateway(transport).cancel(&request).await.unwrap();
        match response.outcome {
            ModificationOutcome::Error { error } => assert_eq!(error.kind, GatewayErrorKind::Connection),
            other => panic!("expected error, got {:?}", other),
        }
    }
}
