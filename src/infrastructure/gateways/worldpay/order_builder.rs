//! Worldpay XML order construction
//!
//! Field presence is decided here, from the request and the account settings.
//! Serialization goes through `quick_xml::se`; the declaration and DOCTYPE are
//! prepended by hand.

use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use crate::domain::account::GatewayAccount;
use crate::domain::authorisation::{
    Address, AgreementLinkage, AuthorisationRequest, OrderRequestType, PaymentData, ThreeDsContinuationRequest,
};
use crate::domain::modification::{CancelRequest, CaptureRequest, RefundRequest};
use crate::infrastructure::gateways::GatewayOrder;
use crate::shared::error::{AppError, AppResult};

pub mod worldpay_constants {
    pub const WORLDPAY_VERSION: &str = "1.4";
    pub const XML_DECLARATION: &str = r#"<?xml version="1.0" encoding="UTF-8"?>"#;
    pub const DOC_TYPE: &str = r#"<!DOCTYPE paymentService PUBLIC "-//WorldPay//DTD WorldPay PaymentService v1//EN" "http://dtd.worldpay.com/paymentService_v1.dtd">"#;
    pub const AMOUNT_EXPONENT: &str = "2";
    pub const CHALLENGE_WINDOW_SIZE: &str = "390x400";
    pub const CHALLENGE_PREFERENCE: &str = "noPreference";
    pub const EXEMPTION_TYPE: &str = "OP";
    pub const EXEMPTION_PLACEMENT: &str = "OPTIMISED";
    pub const TOKEN_SCOPE: &str = "merchant";
}

use worldpay_constants::*;

#[derive(Debug, Serialize)]
#[serde(rename = "paymentService")]
struct PaymentService {
    #[serde(rename = "@version")]
    version: &'static str,
    #[serde(rename = "@merchantCode")]
    merchant_code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    submit: Option<Submit>,
    #[serde(skip_serializing_if = "Option::is_none")]
    modify: Option<Modify>,
    #[serde(skip_serializing_if = "Option::is_none")]
    inquiry: Option<Inquiry>,
}

#[derive(Debug, Serialize)]
struct Submit {
    order: Order,
}

#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
struct Order {
    #[serde(rename = "@orderCode")]
    order_code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    amount: Option<Amount>,
    #[serde(skip_serializing_if = "Option::is_none")]
    payment_details: Option<PaymentDetails>,
    #[serde(skip_serializing_if = "Option::is_none")]
    shopper: Option<Shopper>,
    #[serde(skip_serializing_if = "Option::is_none")]
    create_token: Option<CreateToken>,
    #[serde(rename = "info3DSecure", skip_serializing_if = "Option::is_none")]
    info_3d_secure: Option<Info3dSecure>,
    #[serde(skip_serializing_if = "Option::is_none")]
    session: Option<Session>,
    #[serde(rename = "additional3DSData", skip_serializing_if = "Option::is_none")]
    additional_3ds_data: Option<Additional3dsData>,
    #[serde(skip_serializing_if = "Option::is_none")]
    exemption: Option<Exemption>,
}

#[derive(Debug, Serialize)]
struct Amount {
    #[serde(rename = "@value")]
    value: u64,
    #[serde(rename = "@currencyCode")]
    currency_code: String,
    #[serde(rename = "@exponent")]
    exponent: &'static str,
}

#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
struct PaymentDetails {
    #[serde(rename = "CARD-SSL", skip_serializing_if = "Option::is_none")]
    card: Option<CardSsl>,
    #[serde(rename = "APPLEPAY-SSL", skip_serializing_if = "Option::is_none")]
    apple_pay: Option<ApplePaySsl>,
    #[serde(rename = "PAYWITHGOOGLE-SSL", skip_serializing_if = "Option::is_none")]
    google_pay: Option<GooglePaySsl>,
    #[serde(rename = "TOKEN-SSL", skip_serializing_if = "Option::is_none")]
    token: Option<TokenSsl>,
    #[serde(skip_serializing_if = "Option::is_none")]
    stored_credentials: Option<StoredCredentials>,
    #[serde(skip_serializing_if = "Option::is_none")]
    session: Option<Session>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CardSsl {
    card_number: String,
    expiry_date: ExpiryDate,
    card_holder_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    cvc: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    card_address: Option<CardAddress>,
}

#[derive(Debug, Serialize)]
struct ExpiryDate {
    date: MonthYear,
}

#[derive(Debug, Serialize)]
struct MonthYear {
    #[serde(rename = "@month")]
    month: String,
    #[serde(rename = "@year")]
    year: String,
}

#[derive(Debug, Serialize)]
struct CardAddress {
    address: WorldpayAddress,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct WorldpayAddress {
    address1: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    address2: Option<String>,
    postal_code: String,
    city: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    state: Option<String>,
    country_code: String,
}

#[derive(Debug, Serialize)]
struct ApplePaySsl {
    header: ApplePayHeader,
    signature: String,
    version: String,
    data: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ApplePayHeader {
    ephemeral_public_key: String,
    public_key_hash: String,
    transaction_id: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GooglePaySsl {
    protocol_version: String,
    signature: String,
    signed_message: String,
}

#[derive(Debug, Serialize)]
struct TokenSsl {
    #[serde(rename = "@tokenScope")]
    token_scope: &'static str,
    #[serde(rename = "@captureCvc")]
    capture_cvc: &'static str,
    #[serde(rename = "paymentTokenID")]
    payment_token_id: String,
}

#[derive(Debug, Serialize)]
struct StoredCredentials {
    #[serde(rename = "@usage")]
    usage: &'static str,
    #[serde(rename = "@merchantInitiatedReason", skip_serializing_if = "Option::is_none")]
    merchant_initiated_reason: Option<&'static str>,
    #[serde(rename = "schemeTransactionIdentifier", skip_serializing_if = "Option::is_none")]
    scheme_transaction_identifier: Option<String>,
}

#[derive(Debug, Serialize)]
struct Session {
    #[serde(rename = "@shopperIPAddress", skip_serializing_if = "Option::is_none")]
    shopper_ip_address: Option<String>,
    #[serde(rename = "@id")]
    id: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Shopper {
    #[serde(skip_serializing_if = "Option::is_none")]
    shopper_email_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    browser: Option<Browser>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Browser {
    #[serde(skip_serializing_if = "Option::is_none")]
    accept_header: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    user_agent_header: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateToken {
    #[serde(rename = "@tokenScope")]
    token_scope: &'static str,
    token_event_reference: String,
    token_reason: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Info3dSecure {
    #[serde(skip_serializing_if = "Option::is_none")]
    pa_response: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    completed_authentication: Option<Empty>,
}

#[derive(Debug, Serialize)]
struct Empty {}

#[derive(Debug, Serialize)]
struct Additional3dsData {
    #[serde(rename = "@dfReferenceId")]
    df_reference_id: String,
    #[serde(rename = "@challengeWindowSize")]
    challenge_window_size: &'static str,
    #[serde(rename = "@challengePreference")]
    challenge_preference: &'static str,
}

#[derive(Debug, Serialize)]
struct Exemption {
    #[serde(rename = "@type")]
    exemption_type: &'static str,
    #[serde(rename = "@placement")]
    placement: &'static str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Modify {
    order_modification: OrderModification,
}

#[derive(Debug, Serialize)]
struct OrderModification {
    #[serde(rename = "@orderCode")]
    order_code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    capture: Option<Capture>,
    #[serde(skip_serializing_if = "Option::is_none")]
    cancel: Option<Empty>,
    #[serde(skip_serializing_if = "Option::is_none")]
    refund: Option<Refund>,
}

#[derive(Debug, Serialize)]
struct Capture {
    date: CaptureDate,
    amount: Amount,
}

#[derive(Debug, Serialize)]
struct CaptureDate {
    #[serde(rename = "@dayOfMonth")]
    day_of_month: String,
    #[serde(rename = "@month")]
    month: String,
    #[serde(rename = "@year")]
    year: String,
}

#[derive(Debug, Serialize)]
struct Refund {
    #[serde(rename = "@reference")]
    reference: String,
    amount: Amount,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Inquiry {
    order_inquiry: OrderInquiry,
}

#[derive(Debug, Serialize)]
struct OrderInquiry {
    #[serde(rename = "@orderCode")]
    order_code: String,
}

/// Build an authorisation order.
///
/// The exemption element is only added when the caller asked for it *and* the
/// account enforces 3DS with the exemption engine switched on.
pub fn build_authorise(request: &AuthorisationRequest, exemption_requested: bool) -> AppResult<GatewayOrder> {
    let operation = request.payment_data.order_request_type();
    let merchant_code = require_merchant_code(&request.account, operation)?;
    let order_code = require_transaction_id(request.transaction_id.as_deref(), operation)?;
    let amount = request.amount.ok_or(AppError::MissingMandatoryField {
        operation,
        field: "amount",
    })?;

    let account = &request.account;
    let three_ds_required = account.three_ds.requires_3ds || request.device_data_collection_result.is_some();
    let include_exemption = exemption_requested && account.three_ds.exemption_engine_applies();

    let shopper_ip_address = request
        .client_ip
        .clone()
        .filter(|_| account.send_payer_ip_address_to_gateway);
    let session = (three_ds_required || shopper_ip_address.is_some()).then(|| Session {
        shopper_ip_address,
        id: order_code.clone(),
    });

    let mut payment_details = PaymentDetails {
        session,
        ..PaymentDetails::default()
    };

    match &request.agreement {
        Some(AgreementLinkage::Reuse {
            payment_token_id,
            scheme_transaction_identifier,
            ..
        }) => {
            payment_details.token = Some(TokenSsl {
                token_scope: TOKEN_SCOPE,
                capture_cvc: "false",
                payment_token_id: payment_token_id.clone(),
            });
            payment_details.stored_credentials = Some(StoredCredentials {
                usage: "USED",
                merchant_initiated_reason: Some("UNSCHEDULED"),
                scheme_transaction_identifier: scheme_transaction_identifier.clone(),
            });
        }
        Some(AgreementLinkage::SetUp { .. }) => {
            payment_details.stored_credentials = Some(StoredCredentials {
                usage: "FIRST",
                merchant_initiated_reason: None,
                scheme_transaction_identifier: None,
            });
            attach_instrument(&mut payment_details, &request.payment_data, request.billing_address.as_ref(), operation)?;
        }
        None => {
            attach_instrument(&mut payment_details, &request.payment_data, request.billing_address.as_ref(), operation)?;
        }
    }

    let shopper_email_address = request
        .email
        .clone()
        .filter(|_| account.send_payer_email_to_gateway);
    let browser = request
        .browser
        .as_ref()
        .filter(|_| three_ds_required)
        .map(|b| Browser {
            accept_header: b.accept_header.clone(),
            user_agent_header: b.user_agent_header.clone(),
        });
    let shopper = (shopper_email_address.is_some() || browser.is_some()).then_some(Shopper {
        shopper_email_address,
        browser,
    });

    let create_token = match &request.agreement {
        Some(AgreementLinkage::SetUp { agreement_id }) => Some(CreateToken {
            token_scope: TOKEN_SCOPE,
            token_event_reference: agreement_id.clone(),
            token_reason: request.description.clone(),
        }),
        _ => None,
    };

    let additional_3ds_data = request
        .device_data_collection_result
        .clone()
        .filter(|_| three_ds_required)
        .map(|df_reference_id| Additional3dsData {
            df_reference_id,
            challenge_window_size: CHALLENGE_WINDOW_SIZE,
            challenge_preference: CHALLENGE_PREFERENCE,
        });

    let exemption = include_exemption.then_some(Exemption {
        exemption_type: EXEMPTION_TYPE,
        placement: EXEMPTION_PLACEMENT,
    });

    let order = Order {
        order_code,
        description: Some(request.description.clone()),
        amount: Some(Amount {
            value: amount,
            currency_code: request.currency.clone(),
            exponent: AMOUNT_EXPONENT,
        }),
        payment_details: Some(payment_details),
        shopper,
        create_token,
        additional_3ds_data,
        exemption,
        ..Order::default()
    };

    serialize_submit(merchant_code, order, operation)
}

fn attach_instrument(
    payment_details: &mut PaymentDetails,
    payment_data: &PaymentData,
    billing_address: Option<&Address>,
    operation: OrderRequestType,
) -> AppResult<()> {
    match payment_data {
        PaymentData::Card(card) => {
            let (month, year) = card.expiry_month_year().ok_or(AppError::MissingMandatoryField {
                operation,
                field: "end_date",
            })?;
            payment_details.card = Some(CardSsl {
                card_number: card.card_number.clone(),
                expiry_date: ExpiryDate {
                    date: MonthYear { month, year },
                },
                card_holder_name: card.cardholder_name.clone(),
                cvc: card.cvc.clone(),
                card_address: billing_address.map(|address| CardAddress {
                    address: WorldpayAddress {
                        address1: address.line1.clone(),
                        address2: address.line2.clone(),
                        postal_code: address.postcode.clone(),
                        city: address.city.clone(),
                        state: address.county.clone(),
                        country_code: address.country.clone(),
                    },
                }),
            });
        }
        PaymentData::ApplePay(token) => {
            payment_details.apple_pay = Some(ApplePaySsl {
                header: ApplePayHeader {
                    ephemeral_public_key: token.ephemeral_public_key.clone(),
                    public_key_hash: token.public_key_hash.clone(),
                    transaction_id: token.transaction_id.clone(),
                },
                signature: token.signature.clone(),
                version: token.version.clone(),
                data: token.data.clone(),
            });
        }
        PaymentData::GooglePay(token) => {
            payment_details.google_pay = Some(GooglePaySsl {
                protocol_version: token.protocol_version.clone(),
                signature: token.signature.clone(),
                signed_message: token.signed_message.clone(),
            });
        }
    }
    Ok(())
}

/// Build the second leg of a 3DS authorisation
pub fn build_continuation(request: &ThreeDsContinuationRequest) -> AppResult<GatewayOrder> {
    let operation = OrderRequestType::Authorise3ds;
    let merchant_code = require_merchant_code(&request.account, operation)?;
    let order_code = require_transaction_id(request.transaction_id.as_deref(), operation)?;

    let info_3d_secure = match &request.challenge_result.pa_response {
        Some(pa_response) => Info3dSecure {
            pa_response: Some(pa_response.clone()),
            completed_authentication: None,
        },
        None => Info3dSecure {
            pa_response: None,
            completed_authentication: Some(Empty {}),
        },
    };

    let order = Order {
        info_3d_secure: Some(info_3d_secure),
        session: Some(Session {
            shopper_ip_address: None,
            id: order_code.clone(),
        }),
        order_code,
        ..Order::default()
    };

    serialize_submit(merchant_code, order, operation)
}

pub fn build_capture(request: &CaptureRequest) -> AppResult<GatewayOrder> {
    let operation = OrderRequestType::Capture;
    let merchant_code = require_merchant_code(&request.account, operation)?;
    let order_code = require_transaction_id(request.transaction_id.as_deref(), operation)?;
    let amount = request.amount.ok_or(AppError::MissingMandatoryField {
        operation,
        field: "amount",
    })?;

    let modification = OrderModification {
        order_code,
        capture: Some(Capture {
            date: capture_date(request.capture_date),
            amount: Amount {
                value: amount,
                currency_code: request.currency.clone(),
                exponent: AMOUNT_EXPONENT,
            },
        }),
        cancel: None,
        refund: None,
    };

    serialize_modification(merchant_code, modification, operation)
}

pub fn build_cancel(request: &CancelRequest) -> AppResult<GatewayOrder> {
    let operation = OrderRequestType::Cancel;
    let merchant_code = require_merchant_code(&request.account, operation)?;
    let order_code = require_transaction_id(request.transaction_id.as_deref(), operation)?;

    let modification = OrderModification {
        order_code,
        capture: None,
        cancel: Some(Empty {}),
        refund: None,
    };

    serialize_modification(merchant_code, modification, operation)
}

pub fn build_refund(request: &RefundRequest) -> AppResult<GatewayOrder> {
    let operation = OrderRequestType::Refund;
    let merchant_code = require_merchant_code(&request.account, operation)?;
    let order_code = require_transaction_id(request.transaction_id.as_deref(), operation)?;
    let amount = request.amount.ok_or(AppError::MissingMandatoryField {
        operation,
        field: "amount",
    })?;

    let modification = OrderModification {
        order_code,
        capture: None,
        cancel: None,
        refund: Some(Refund {
            reference: request.reference.clone(),
            amount: Amount {
                value: amount,
                currency_code: request.currency.clone(),
                exponent: AMOUNT_EXPONENT,
            },
        }),
    };

    serialize_modification(merchant_code, modification, operation)
}

pub fn build_inquiry(account: &GatewayAccount, transaction_id: Option<&str>) -> AppResult<GatewayOrder> {
    let operation = OrderRequestType::Query;
    let merchant_code = require_merchant_code(account, operation)?;
    let order_code = require_transaction_id(transaction_id, operation)?;

    let service = PaymentService {
        version: WORLDPAY_VERSION,
        merchant_code,
        submit: None,
        modify: None,
        inquiry: Some(Inquiry {
            order_inquiry: OrderInquiry { order_code },
        }),
    };

    serialize(&service, operation)
}

fn capture_date(date: NaiveDate) -> CaptureDate {
    CaptureDate {
        day_of_month: format!("{:02}", date.day()),
        month: format!("{:02}", date.month()),
        year: date.year().to_string(),
    }
}

fn require_merchant_code(account: &GatewayAccount, operation: OrderRequestType) -> AppResult<String> {
    let code = account.merchant_code().trim();
    if code.is_empty() {
        return Err(AppError::MissingMandatoryField {
            operation,
            field: "merchant_code",
        });
    }
    Ok(code.to_string())
}

fn require_transaction_id(transaction_id: Option<&str>, operation: OrderRequestType) -> AppResult<String> {
    match transaction_id.map(str::trim) {
        Some(id) if !id.is_empty() => Ok(id.to_string()),
        _ => Err(AppError::MissingMandatoryField {
            operation,
            field: "transaction_id",
        }),
    }
}

fn serialize_submit(merchant_code: String, order: Order, operation: OrderRequestType) -> AppResult<GatewayOrder> {
    let service = PaymentService {
        version: WORLDPAY_VERSION,
        merchant_code,
        submit: Some(Submit { order }),
        modify: None,
        inquiry: None,
    };
    serialize(&service, operation)
}

fn serialize_modification(
    merchant_code: String,
    order_modification: OrderModification,
    operation: OrderRequestType,
) -> AppResult<GatewayOrder> {
    let service = PaymentService {
        version: WORLDPAY_VERSION,
        merchant_code,
        submit: None,
        modify: Some(Modify { order_modification }),
        inquiry: None,
    };
    serialize(&service, operation)
}

fn serialize(service: &PaymentService, operation: OrderRequestType) -> AppResult<GatewayOrder> {
    let body = quick_xml::se::to_string(service)?;
    Ok(GatewayOrder::xml(
        operation,
        format!("{}\n{}\n{}", XML_DECLARATION, DOC_TYPE, body),
    ))
}
