//! Test fixtures for the gateway connector
//!
//! Accounts, payments, authorisation requests and canned Worldpay replies
//! shared by unit and scenario tests.

use std::sync::Arc;

use crate::application::services::{NotificationOrigin, NotificationService};
use crate::config::app_config::WorldpayConfig;
use crate::domain::account::{GatewayAccount, GatewayName, IntegrationVersion, MerchantCredentials, ThreeDsSettings};
use crate::domain::authorisation::{
    Address, ApplePayToken, AuthorisationRequest, BrowserDetails, CardDetails, GooglePayToken, PaymentData,
};
use crate::domain::payment::Payment;
use crate::domain::status::ChargeStatus;
use crate::infrastructure::adapters::gateway_transport::{GatewayHttpResponse, MockGatewayTransport};
use crate::infrastructure::adapters::hostname_resolver::MockHostnameResolver;
use crate::infrastructure::adapters::{InMemoryPaymentRepository, MonitoringAdapter};
use crate::infrastructure::gateways::WorldpayGateway;

pub const ACCOUNT_ID: &str = "account-1";
pub const MERCHANT_CODE: &str = "MERCHANTCODE";
pub const USERNAME: &str = "worldpay-user";
pub const PASSWORD: &str = "worldpay-pass";

const REPLY_HEADER: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE paymentService PUBLIC "-//WorldPay//DTD WorldPay PaymentService v1//EN" "http://dtd.worldpay.com/paymentService_v1.dtd">
<paymentService version="1.4" merchantCode="MERCHANTCODE">"#;

/// Test account with 3DS, exemptions and payer forwarding all switched off
pub fn account() -> GatewayAccount {
    GatewayAccount {
        id: ACCOUNT_ID.to_string(),
        gateway: GatewayName::Worldpay,
        live: false,
        credentials: MerchantCredentials {
            merchant_code: MERCHANT_CODE.to_string(),
            username: USERNAME.to_string(),
            password: PASSWORD.to_string(),
        },
        three_ds: ThreeDsSettings {
            requires_3ds: false,
            integration_version: IntegrationVersion::Two,
            exemption_engine_enabled: false,
        },
        send_payer_ip_address_to_gateway: false,
        send_payer_email_to_gateway: false,
        allow_telephone_payment_notifications: false,
    }
}

/// Account with 3DS enforced and the exemption engine on
pub fn exemption_account() -> GatewayAccount {
    let mut account = account();
    account.three_ds.requires_3ds = true;
    account.three_ds.exemption_engine_enabled = true;
    account
}

pub fn payment(transaction_id: &str, status: ChargeStatus) -> Payment {
    Payment::new(
        format!("charge-{}", transaction_id),
        ACCOUNT_ID,
        GatewayName::Worldpay,
        transaction_id,
        500,
        status,
    )
}

fn request(transaction_id: &str, payment_data: PaymentData) -> AuthorisationRequest {
    AuthorisationRequest {
        account: account(),
        transaction_id: Some(transaction_id.to_string()),
        description: "Test payment".to_string(),
        amount: Some(500),
        currency: "GBP".to_string(),
        payment_data,
        billing_address: Some(Address {
            line1: "10 Downing Street".to_string(),
            line2: None,
            postcode: "SW1A 1AA".to_string(),
            city: "London".to_string(),
            county: None,
            country: "GB".to_string(),
        }),
        client_ip: Some("203.0.113.9".to_string()),
        email: Some("payer@example.org".to_string()),
        browser: Some(BrowserDetails {
            accept_header: Some("text/html".to_string()),
            user_agent_header: Some("Mozilla/5.0".to_string()),
        }),
        agreement: None,
        device_data_collection_result: None,
    }
}

pub fn card_request(transaction_id: &str) -> AuthorisationRequest {
    request(
        transaction_id,
        PaymentData::Card(CardDetails {
            card_number: "4444333322221111".to_string(),
            cardholder_name: "Mr Payment".to_string(),
            cvc: Some("123".to_string()),
            end_date: "12/30".to_string(),
        }),
    )
}

pub fn apple_pay_request(transaction_id: &str) -> AuthorisationRequest {
    request(
        transaction_id,
        PaymentData::ApplePay(ApplePayToken {
            ephemeral_public_key: "ephemeral-key".to_string(),
            public_key_hash: "key-hash".to_string(),
            transaction_id: "apple-tx".to_string(),
            signature: "apple-signature".to_string(),
            version: "EC_v1".to_string(),
            data: "encrypted-data".to_string(),
            cardholder_name: Some("Mr Payment".to_string()),
        }),
    )
}

pub fn google_pay_request(transaction_id: &str) -> AuthorisationRequest {
    request(
        transaction_id,
        PaymentData::GooglePay(GooglePayToken {
            protocol_version: "ECv1".to_string(),
            signature: "google-signature".to_string(),
            signed_message: "signed-message".to_string(),
            cardholder_name: None,
        }),
    )
}

/// Notification processor over `repository`. The gateway transport is never
/// called while handling notifications.
pub fn notification_service(
    repository: &InMemoryPaymentRepository,
    resolver: MockHostnameResolver,
    monitoring: Arc<MonitoringAdapter>,
    secure: bool,
) -> Arc<NotificationService> {
    let gateway = Arc::new(WorldpayGateway::new(
        Arc::new(MockGatewayTransport::new()),
        WorldpayConfig::default(),
        monitoring.clone(),
    ));
    Arc::new(NotificationService::new(
        gateway,
        Arc::new(repository.clone()),
        Arc::new(resolver),
        monitoring,
        NotificationOrigin {
            secure,
            domain: ".worldpay.com".to_string(),
        },
    ))
}

pub fn http_ok(body: String) -> GatewayHttpResponse {
    GatewayHttpResponse {
        status: 200,
        body,
        cookies: Vec::new(),
    }
}

fn wrap_reply(inner: &str) -> String {
    format!("{}\n  <reply>\n{}\n  </reply>\n</paymentService>", REPLY_HEADER, inner)
}

fn order_status(transaction_id: &str, inner: &str) -> String {
    wrap_reply(&format!(
        "    <orderStatus orderCode=\"{}\">\n{}\n    </orderStatus>",
        transaction_id, inner
    ))
}

fn payment_block(last_event: &str) -> String {
    format!(
        r#"      <payment>
        <paymentMethod>VISA-SSL</paymentMethod>
        <amount value="500" currencyCode="GBP" exponent="2" debitCreditIndicator="credit"/>
        <lastEvent>{}</lastEvent>
        <ISO8583ReturnCode code="0" description="APPROVED"/>
      </payment>"#,
        last_event
    )
}

pub fn last_event_reply(transaction_id: &str, last_event: &str) -> String {
    order_status(transaction_id, &payment_block(last_event))
}

pub fn authorised_reply(transaction_id: &str) -> String {
    last_event_reply(transaction_id, "AUTHORISED")
}

pub fn reply_with_exemption(transaction_id: &str, last_event: &str, result: &str) -> String {
    order_status(
        transaction_id,
        &format!(
            "{}\n      <exemptionResponse result=\"{}\" reason=\"ISSUER_DECISION\"/>",
            payment_block(last_event),
            result
        ),
    )
}

const LEGACY_CHALLENGE: &str = r#"      <requestInfo>
        <request3DSecure>
          <paRequest>pa-req-1</paRequest>
          <issuerURL>https://issuer.example/3ds</issuerURL>
        </request3DSecure>
      </requestInfo>"#;

const LEGACY_CHALLENGE_WITHOUT_PA_REQUEST: &str = r#"      <requestInfo>
        <request3DSecure>
          <issuerURL>https://issuer.example/3ds</issuerURL>
        </request3DSecure>
      </requestInfo>"#;

const FLEX_CHALLENGE: &str = r#"      <challengeRequired>
        <threeDSChallengeDetails>
          <threeDSVersion>2.1.0</threeDSVersion>
          <transactionId3DS>3ds-tx-1</transactionId3DS>
          <acsURL>https://acs.example/challenge</acsURL>
          <payload>payload-1</payload>
        </threeDSChallengeDetails>
      </challengeRequired>"#;

const FLEX_CHALLENGE_WITHOUT_ACS_URL: &str = r#"      <challengeRequired>
        <threeDSChallengeDetails>
          <threeDSVersion>2.1.0</threeDSVersion>
          <transactionId3DS>3ds-tx-1</transactionId3DS>
          <payload>payload-1</payload>
        </threeDSChallengeDetails>
      </challengeRequired>"#;

/// Complete legacy 3DS fields, no flex fields
pub fn legacy_reply(transaction_id: &str) -> String {
    order_status(transaction_id, LEGACY_CHALLENGE)
}

pub fn legacy_and_flex_reply(transaction_id: &str) -> String {
    order_status(transaction_id, &format!("{}\n{}", LEGACY_CHALLENGE, FLEX_CHALLENGE))
}

pub fn flex_reply(transaction_id: &str) -> String {
    order_status(transaction_id, FLEX_CHALLENGE)
}

/// Legacy block missing its `paRequest`, followed by a complete flex block
pub fn partial_legacy_and_flex_reply(transaction_id: &str) -> String {
    order_status(
        transaction_id,
        &format!("{}\n{}", LEGACY_CHALLENGE_WITHOUT_PA_REQUEST, FLEX_CHALLENGE),
    )
}

/// Flex block missing its `acsURL`, alongside a payment with `last_event`
pub fn partial_flex_reply(transaction_id: &str, last_event: &str) -> String {
    order_status(
        transaction_id,
        &format!("{}\n{}", FLEX_CHALLENGE_WITHOUT_ACS_URL, payment_block(last_event)),
    )
}

pub fn order_error_reply(transaction_id: &str, code: &str, message: &str) -> String {
    order_status(
        transaction_id,
        &format!("      <error code=\"{}\">{}</error>", code, message),
    )
}

pub fn reply_error(code: &str, message: &str) -> String {
    wrap_reply(&format!("    <error code=\"{}\">{}</error>", code, message))
}

pub fn ok_reply(element: &str, transaction_id: &str) -> String {
    wrap_reply(&format!(
        "    <ok>\n      <{element} orderCode=\"{tx}\"/>\n    </ok>",
        element = element,
        tx = transaction_id
    ))
}

/// Order notification as Worldpay posts it, booked on 2024-01-10
pub fn notification_xml(
    transaction_id: &str,
    status: &str,
    refund_reference: Option<&str>,
    refund_authorisation_reference: Option<&str>,
) -> String {
    let mut references = String::new();
    if let Some(reference) = refund_reference {
        references.push_str(&format!(
            "\n        <journalReference type=\"refund\" reference=\"{}\"/>",
            reference
        ));
    }
    if let Some(reference) = refund_authorisation_reference {
        references.push_str(&format!(
            "\n        <journalReference type=\"refundAuthorisation\" reference=\"{}\"/>",
            reference
        ));
    }

    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE paymentService PUBLIC "-//WorldPay//DTD WorldPay PaymentService v1//EN" "http://dtd.worldpay.com/paymentService_v1.dtd">
<paymentService version="1.4" merchantCode="{merchant}">
  <notify>
    <orderStatusEvent orderCode="{tx}">
      <payment>
        <paymentMethod>VISA-SSL</paymentMethod>
        <amount value="500" currencyCode="GBP" exponent="2" debitCreditIndicator="credit"/>
        <lastEvent>{status}</lastEvent>
      </payment>
      <journal journalType="{status}">
        <bookingDate>
          <date dayOfMonth="10" month="01" year="2024"/>
        </bookingDate>{references}
      </journal>
    </orderStatusEvent>
  </notify>
</paymentService>"#,
        merchant = MERCHANT_CODE,
        tx = transaction_id,
        status = status,
        references = references
    )
}
