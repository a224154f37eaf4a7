//! Scenario tests across services, gateway and HTTP routes
//!
//! Each scenario drives the real Worldpay gateway against a mocked transport
//! and the in-memory payment store.

use std::sync::Arc;

use chrono::NaiveDate;
use warp::http::StatusCode;

use crate::{
    application::{
        services::{AuthorisationService, ModificationService, ThreeDsService},
        use_cases::HealthCheckUseCase,
    },
    config::app_config::WorldpayConfig,
    domain::{
        account::GatewayName,
        authorisation::{ChallengeResult, ExemptionDecision, GatewayOutcome, ThreeDsContinuationRequest},
        modification::{CaptureRequest, RefundRequest},
        notification::NotificationDisposition,
        payment::{Payment, Refund},
        status::{ChargeStatus, RefundStatus},
    },
    infrastructure::{
        adapters::{
            gateway_transport::{GatewayHttpResponse, MockGatewayTransport, TransportError},
            hostname_resolver::MockHostnameResolver,
            InMemoryPaymentRepository, MonitoringAdapter, PaymentRepository,
        },
        gateways::WorldpayGateway,
        http::routes::RouteBuilder,
    },
    tests::{
        config::{self, test_config},
        fixtures,
    },
};

struct Scenario {
    gateway: Arc<WorldpayGateway>,
    repository: InMemoryPaymentRepository,
    monitoring: Arc<MonitoringAdapter>,
}

impl Scenario {
    async fn new(transport: MockGatewayTransport, payment: Payment) -> Self {
        config::init();
        let monitoring = Arc::new(MonitoringAdapter::new().unwrap());
        let repository = InMemoryPaymentRepository::new();
        repository.insert_account(fixtures::exemption_account()).await;
        repository.insert_payment(payment).await;
        let gateway = Arc::new(WorldpayGateway::new(
            Arc::new(transport),
            WorldpayConfig::default(),
            monitoring.clone(),
        ));
        Self {
            gateway,
            repository,
            monitoring,
        }
    }

    async fn stored(&self) -> Payment {
        self.repository
            .find_payment(GatewayName::Worldpay, "tx-1")
            .await
            .unwrap()
            .unwrap()
    }

    async fn notify(&self, body: String) -> (StatusCode, String) {
        let service = fixtures::notification_service(
            &self.repository,
            MockHostnameResolver::new(),
            self.monitoring.clone(),
            false,
        );
        let routes = RouteBuilder::build_routes(
            &test_config(),
            service,
            Arc::new(HealthCheckUseCase::new()),
            Arc::new(self.repository.clone()),
            self.monitoring.clone(),
        );
        let res = warp::test::request()
            .method("POST")
            .path("/v1/api/notifications/worldpay")
            .header("x-forwarded-for", "195.35.90.1, 10.0.0.1")
            .body(body)
            .reply(&routes)
            .await;
        (res.status(), String::from_utf8_lossy(res.body()).into_owned())
    }
}

#[tokio::test]
async fn test_exemption_challenge_then_authorised() {
    let mut transport = MockGatewayTransport::new();
    let mut seq = mockall::Sequence::new();
    transport
        .expect_post()
        .withf(|request| request.order.payload.contains("<exemption") && request.cookies.is_empty())
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_| {
            Ok(GatewayHttpResponse {
                status: 200,
                body: fixtures::flex_reply("tx-1"),
                cookies: vec![("machine".to_string(), "node-3".to_string())],
            })
        });
    transport
        .expect_post()
        .withf(|request| {
            request.order.payload.contains("<paResponse>pa-res-1</paResponse>")
                && request.cookies == vec![("machine".to_string(), "node-3".to_string())]
        })
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_| Ok(fixtures::http_ok(fixtures::authorised_reply("tx-1"))));

    let scenario = Scenario::new(transport, fixtures::payment("tx-1", ChargeStatus::AuthorisationReady)).await;
    let authorisation = AuthorisationService::new(
        scenario.gateway.clone(),
        Arc::new(scenario.repository.clone()),
        scenario.monitoring.clone(),
    );
    let three_ds = ThreeDsService::new(scenario.gateway.clone(), scenario.monitoring.clone());

    let mut request = fixtures::card_request("tx-1");
    request.account = fixtures::exemption_account();
    let first = authorisation.authorise(&request).await.unwrap();
    assert_eq!(first.charge_status, ChargeStatus::Authorisation3dsRequired);
    assert!(matches!(first.outcome, GatewayOutcome::Requires3ds { .. }));

    let continued = three_ds
        .continue_authorisation(&ThreeDsContinuationRequest {
            account: fixtures::exemption_account(),
            transaction_id: Some(first.transaction_id.clone()),
            session_identifier: first.session_identifier.clone(),
            challenge_result: ChallengeResult {
                pa_response: Some("pa-res-1".to_string()),
            },
        })
        .await
        .unwrap();

    assert_eq!(continued.outcome, GatewayOutcome::Authorised);
    assert_eq!(continued.charge_status, ChargeStatus::AuthorisationSuccess);
    assert_eq!(continued.session_identifier, None);
    assert_eq!(scenario.monitoring.soft_decline_retry_count(), 0);
}

#[tokio::test]
async fn test_soft_decline_retry_recorded_on_payment() {
    let mut transport = MockGatewayTransport::new();
    let mut seq = mockall::Sequence::new();
    transport
        .expect_post()
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_| {
            Ok(fixtures::http_ok(fixtures::reply_with_exemption(
                "tx-1",
                "REFUSED",
                "REJECTED",
            )))
        });
    transport
        .expect_post()
        .withf(|request| !request.order.payload.contains("<exemption"))
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_| Ok(fixtures::http_ok(fixtures::authorised_reply("tx-1"))));

    let scenario = Scenario::new(transport, fixtures::payment("tx-1", ChargeStatus::AuthorisationReady)).await;
    let service = AuthorisationService::new(
        scenario.gateway.clone(),
        Arc::new(scenario.repository.clone()),
        scenario.monitoring.clone(),
    );

    let mut request = fixtures::card_request("tx-1");
    request.account = fixtures::exemption_account();
    let result = service.authorise(&request).await.unwrap();

    assert_eq!(result.outcome, GatewayOutcome::Authorised);
    assert_eq!(result.attempts, 2);
    assert_eq!(scenario.stored().await.exemption, ExemptionDecision::Rejected);
    assert_eq!(scenario.monitoring.soft_decline_retry_count(), 1);
}

#[tokio::test]
async fn test_capture_then_duplicate_notifications() {
    let mut transport = MockGatewayTransport::new();
    transport
        .expect_post()
        .times(1)
        .returning(|_| Ok(fixtures::http_ok(fixtures::ok_reply("captureReceived", "tx-1"))));

    let scenario = Scenario::new(transport, fixtures::payment("tx-1", ChargeStatus::AuthorisationSuccess)).await;
    let modifications = ModificationService::new(scenario.gateway.clone(), Arc::new(scenario.repository.clone()));
    modifications
        .capture(&CaptureRequest {
            account: fixtures::exemption_account(),
            transaction_id: Some("tx-1".to_string()),
            amount: Some(500),
            currency: "GBP".to_string(),
            capture_date: NaiveDate::from_ymd_opt(2024, 1, 9).unwrap(),
        })
        .await
        .unwrap();
    assert_eq!(scenario.stored().await.status, ChargeStatus::CaptureSubmitted);

    for _ in 0..2 {
        let (status, body) = scenario
            .notify(fixtures::notification_xml("tx-1", "CAPTURED", None, None))
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "[OK]");
    }

    let payment = scenario.stored().await;
    assert_eq!(payment.status, ChargeStatus::Captured);
    assert_eq!(payment.capture_events(), 1);
    assert_eq!(
        scenario
            .monitoring
            .notification_count("worldpay", NotificationDisposition::Acknowledged),
        2
    );
}

#[tokio::test]
async fn test_refund_submitted_then_settled_by_notification() {
    let mut transport = MockGatewayTransport::new();
    transport
        .expect_post()
        .times(1)
        .returning(|_| Ok(fixtures::http_ok(fixtures::ok_reply("refundReceived", "tx-1"))));

    let mut payment = fixtures::payment("tx-1", ChargeStatus::Captured);
    payment.refunds.push(Refund {
        reference: "refund-9".to_string(),
        amount: 100,
        status: RefundStatus::Created,
        settled_on: None,
    });
    let scenario = Scenario::new(transport, payment).await;
    let modifications = ModificationService::new(scenario.gateway.clone(), Arc::new(scenario.repository.clone()));
    modifications
        .refund(&RefundRequest {
            account: fixtures::exemption_account(),
            transaction_id: Some("tx-1".to_string()),
            reference: "refund-9".to_string(),
            amount: Some(100),
            currency: "GBP".to_string(),
        })
        .await
        .unwrap();

    let (status, _) = scenario
        .notify(fixtures::notification_xml("tx-1", "REFUNDED", Some("refund-9"), Some("auth-ref-9")))
        .await;
    assert_eq!(status, StatusCode::OK);

    let stored = scenario.stored().await;
    let refund = stored.find_refund("refund-9").unwrap();
    assert_eq!(refund.status, RefundStatus::Refunded);
    assert_eq!(refund.settled_on, NaiveDate::from_ymd_opt(2024, 1, 10));
}

#[tokio::test]
async fn test_archived_payment_takes_late_capture() {
    let mut payment = fixtures::payment("tx-1", ChargeStatus::Expired);
    payment.archived = true;
    let scenario = Scenario::new(MockGatewayTransport::new(), payment).await;

    let (status, _) = scenario
        .notify(fixtures::notification_xml("tx-1", "CAPTURED", None, None))
        .await;
    assert_eq!(status, StatusCode::OK);

    let stored = scenario.stored().await;
    assert_eq!(stored.capture_events(), 1);
    assert_eq!(stored.captured_on, NaiveDate::from_ymd_opt(2024, 1, 10));
}

#[tokio::test]
async fn test_capture_timeout_settled_by_notification() {
    let mut transport = MockGatewayTransport::new();
    transport
        .expect_post()
        .times(1)
        .returning(|_| Err(TransportError::Timeout("read timeout".to_string())));

    let scenario = Scenario::new(transport, fixtures::payment("tx-1", ChargeStatus::AuthorisationSuccess)).await;
    let modifications = ModificationService::new(scenario.gateway.clone(), Arc::new(scenario.repository.clone()));
    let response = modifications
        .capture(&CaptureRequest {
            account: fixtures::exemption_account(),
            transaction_id: Some("tx-1".to_string()),
            amount: Some(500),
            currency: "GBP".to_string(),
            capture_date: NaiveDate::from_ymd_opt(2024, 1, 9).unwrap(),
        })
        .await
        .unwrap();
    assert!(response.is_indeterminate());
    assert_eq!(scenario.stored().await.status, ChargeStatus::AuthorisationSuccess);

    let (status, body) = scenario
        .notify(fixtures::notification_xml("tx-1", "CAPTURED", None, None))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "[OK]");

    let payment = scenario.stored().await;
    assert_eq!(payment.status, ChargeStatus::Captured);
    assert_eq!(payment.capture_events(), 1);
}

#[tokio::test]
async fn test_capture_error_overridden_by_capture_notification() {
    let mut transport = MockGatewayTransport::new();
    transport
        .expect_post()
        .times(1)
        .returning(|_| Ok(fixtures::http_ok(fixtures::reply_error("5", "Order not ready"))));

    let scenario = Scenario::new(transport, fixtures::payment("tx-1", ChargeStatus::CaptureReady)).await;
    let modifications = ModificationService::new(scenario.gateway.clone(), Arc::new(scenario.repository.clone()));
    modifications
        .capture(&CaptureRequest {
            account: fixtures::exemption_account(),
            transaction_id: Some("tx-1".to_string()),
            amount: Some(500),
            currency: "GBP".to_string(),
            capture_date: NaiveDate::from_ymd_opt(2024, 1, 9).unwrap(),
        })
        .await
        .unwrap();
    assert_eq!(scenario.stored().await.status, ChargeStatus::CaptureError);

    let (status, _) = scenario
        .notify(fixtures::notification_xml("tx-1", "CAPTURED", None, None))
        .await;
    assert_eq!(status, StatusCode::OK);

    let payment = scenario.stored().await;
    assert_eq!(payment.status, ChargeStatus::Captured);
    assert!(!payment
        .events
        .iter()
        .any(|e| matches!(e, crate::domain::payment::PaymentEvent::LateCaptureRecorded { .. })));
}

#[tokio::test]
async fn test_refund_timeout_settled_by_notification() {
    let mut transport = MockGatewayTransport::new();
    transport
        .expect_post()
        .times(1)
        .returning(|_| Err(TransportError::Timeout("read timeout".to_string())));

    let mut payment = fixtures::payment("tx-1", ChargeStatus::Captured);
    payment.refunds.push(Refund {
        reference: "refund-9".to_string(),
        amount: 100,
        status: RefundStatus::Created,
        settled_on: None,
    });
    let scenario = Scenario::new(transport, payment).await;
    let modifications = ModificationService::new(scenario.gateway.clone(), Arc::new(scenario.repository.clone()));
    let response = modifications
        .refund(&RefundRequest {
            account: fixtures::exemption_account(),
            transaction_id: Some("tx-1".to_string()),
            reference: "refund-9".to_string(),
            amount: Some(100),
            currency: "GBP".to_string(),
        })
        .await
        .unwrap();
    assert!(response.is_indeterminate());
    assert_eq!(
        scenario.stored().await.find_refund("refund-9").unwrap().status,
        RefundStatus::Created
    );

    let (status, _) = scenario
        .notify(fixtures::notification_xml("tx-1", "REFUNDED", Some("refund-9"), Some("auth-ref-9")))
        .await;
    assert_eq!(status, StatusCode::OK);

    let stored = scenario.stored().await;
    assert_eq!(stored.find_refund("refund-9").unwrap().status, RefundStatus::Refunded);
}

#[tokio::test]
async fn test_refund_error_overridden_by_refunded_notification() {
    let mut payment = fixtures::payment("tx-1", ChargeStatus::Captured);
    payment.refunds.push(Refund {
        reference: "refund-9".to_string(),
        amount: 100,
        status: RefundStatus::RefundError,
        settled_on: None,
    });
    let scenario = Scenario::new(MockGatewayTransport::new(), payment).await;

    let (status, _) = scenario
        .notify(fixtures::notification_xml("tx-1", "REFUNDED", Some("refund-9"), Some("auth-ref-9")))
        .await;
    assert_eq!(status, StatusCode::OK);

    let stored = scenario.stored().await;
    let refund = stored.find_refund("refund-9").unwrap();
    assert_eq!(refund.status, RefundStatus::Refunded);
    assert_eq!(refund.settled_on, NaiveDate::from_ymd_opt(2024, 1, 10));
}
