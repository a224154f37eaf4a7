//! Worldpay reply parsing and interpretation

use serde::Deserialize;
use tracing::{debug, warn};

use crate::domain::authorisation::{
    AuthorisationResponse, ExemptionResult, GatewayError, GatewayErrorKind, GatewayOutcome, ProviderSessionIdentifier,
    ThreeDsChallenge,
};
use crate::domain::modification::{ModificationOutcome, ModificationResponse, QueryResponse};
use crate::domain::status::MappedStatus;
use crate::infrastructure::adapters::gateway_transport::GatewayHttpResponse;
use crate::infrastructure::gateways::worldpay::status_mapper;
use crate::shared::logging::LoggingUtils;

/// Cookie Worldpay uses to pin a 3DS round-trip to one node
pub const SESSION_COOKIE: &str = "machine";

#[derive(Debug, Deserialize)]
pub(crate) struct PaymentServiceReply {
    pub reply: Option<Reply>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Reply {
    pub order_status: Option<OrderStatus>,
    pub error: Option<ErrorElement>,
    pub ok: Option<OkElement>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct OrderStatus {
    #[serde(rename = "@orderCode")]
    pub order_code: Option<String>,
    pub payment: Option<PaymentElement>,
    pub request_info: Option<RequestInfo>,
    pub challenge_required: Option<ChallengeRequired>,
    pub exemption_response: Option<ExemptionResponse>,
    pub error: Option<ErrorElement>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PaymentElement {
    pub last_event: Option<String>,
    #[serde(rename = "ISO8583ReturnCode")]
    pub return_code: Option<ReturnCode>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ReturnCode {
    #[serde(rename = "@code")]
    pub code: Option<String>,
    #[serde(rename = "@description")]
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RequestInfo {
    #[serde(rename = "request3DSecure")]
    pub request_3d_secure: Option<Request3dSecure>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Request3dSecure {
    #[serde(rename = "paRequest")]
    pub pa_request: Option<String>,
    #[serde(rename = "issuerURL")]
    pub issuer_url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ChallengeRequired {
    #[serde(rename = "threeDSChallengeDetails")]
    pub details: Option<ChallengeDetails>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ChallengeDetails {
    #[serde(rename = "threeDSVersion")]
    pub version: Option<String>,
    #[serde(rename = "transactionId3DS")]
    pub transaction_id: Option<String>,
    #[serde(rename = "acsURL")]
    pub acs_url: Option<String>,
    pub payload: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ExemptionResponse {
    #[serde(rename = "@result")]
    pub result: Option<String>,
    #[serde(rename = "@reason")]
    pub reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ErrorElement {
    #[serde(rename = "@code")]
    pub code: Option<String>,
    #[serde(rename = "$text", default)]
    pub message: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct OkElement {
    pub capture_received: Option<Received>,
    pub cancel_received: Option<Received>,
    pub refund_received: Option<Received>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Received {
    #[serde(rename = "@orderCode")]
    pub order_code: Option<String>,
}

pub(crate) fn parse_reply(body: &str) -> Result<Reply, GatewayError> {
    let envelope: PaymentServiceReply = quick_xml::de::from_str(body).map_err(|e| {
        GatewayError::new(
            GatewayErrorKind::UnparseableResponse,
            None,
            format!("could not parse gateway reply: {}", e),
        )
    })?;

    envelope.reply.ok_or_else(|| {
        GatewayError::new(GatewayErrorKind::UnparseableResponse, None, "reply element missing")
    })
}

fn reply_error(error: &ErrorElement, sensitive: &[&str]) -> GatewayError {
    GatewayError::new(
        GatewayErrorKind::GatewayReply,
        error.code.clone(),
        LoggingUtils::redact(error.message.trim(), sensitive),
    )
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Challenge carried by the reply, Legacy taking priority over Flex.
/// Incomplete challenge blocks are ignored.
fn extract_challenge(order_status: &OrderStatus) -> Option<ThreeDsChallenge> {
    let legacy = order_status
        .request_info
        .as_ref()
        .and_then(|info| info.request_3d_secure.as_ref())
        .and_then(|secure| {
            Some(ThreeDsChallenge::Legacy {
                issuer_url: non_empty(&secure.issuer_url)?,
                pa_request: non_empty(&secure.pa_request)?,
            })
        });
    if legacy.is_some() {
        return legacy;
    }

    order_status
        .challenge_required
        .as_ref()
        .and_then(|required| required.details.as_ref())
        .and_then(|details| {
            Some(ThreeDsChallenge::Flex {
                acs_url: non_empty(&details.acs_url)?,
                transaction_id: non_empty(&details.transaction_id)?,
                payload: non_empty(&details.payload)?,
                protocol_version: non_empty(&details.version)?,
            })
        })
}

/// Interpret an authorisation or 3DS continuation reply
pub fn interpret_authorisation(response: &GatewayHttpResponse, sensitive: &[&str]) -> AuthorisationResponse {
    let session_identifier = response.cookie(SESSION_COOKIE).map(ProviderSessionIdentifier::new);

    let reply = match parse_reply(&response.body) {
        Ok(reply) => reply,
        Err(error) => {
            return AuthorisationResponse {
                session_identifier,
                ..AuthorisationResponse::error(error)
            }
        }
    };

    if let Some(error) = &reply.error {
        return AuthorisationResponse {
            session_identifier,
            ..AuthorisationResponse::error(reply_error(error, sensitive))
        };
    }

    let Some(order_status) = reply.order_status else {
        return AuthorisationResponse {
            session_identifier,
            ..AuthorisationResponse::error(GatewayError::new(
                GatewayErrorKind::UnparseableResponse,
                None,
                "orderStatus element missing",
            ))
        };
    };

    let transaction_id = order_status.order_code.clone();

    if let Some(error) = &order_status.error {
        return AuthorisationResponse {
            session_identifier,
            transaction_id,
            ..AuthorisationResponse::error(reply_error(error, sensitive))
        };
    }

    let exemption = order_status.exemption_response.as_ref().and_then(|e| {
        let result = e.result.as_deref()?;
        let parsed = ExemptionResult::from_token(result);
        match parsed {
            Some(_) => debug!(result = %result, reason = ?e.reason, "Exemption result"),
            None => warn!(result = %result, reason = ?e.reason, "Unrecognised exemption result"),
        }
        parsed
    });

    if let Some(code) = order_status.payment.as_ref().and_then(|p| p.return_code.as_ref()) {
        debug!(iso_code = ?code.code, description = ?code.description, "Issuer return code");
    }

    let outcome = match extract_challenge(&order_status) {
        Some(challenge) => GatewayOutcome::Requires3ds { challenge },
        None => {
            let last_event = order_status
                .payment
                .as_ref()
                .and_then(|p| p.last_event.as_deref())
                .map(str::trim);
            match last_event {
                Some("AUTHORISED") => GatewayOutcome::Authorised,
                Some("REFUSED") => match exemption {
                    Some(result) if result.is_soft_decline() => GatewayOutcome::SoftDeclined { exemption: result },
                    _ => GatewayOutcome::Rejected,
                },
                Some("CANCELLED") => GatewayOutcome::Cancelled,
                other => GatewayOutcome::Error {
                    error: GatewayError::new(
                        GatewayErrorKind::UnexpectedStatus,
                        None,
                        format!("unexpected last event: {}", other.unwrap_or("none")),
                    ),
                },
            }
        }
    };

    AuthorisationResponse {
        outcome,
        exemption,
        session_identifier,
        transaction_id,
    }
}

/// Interpret a capture, cancel or refund reply
pub fn interpret_modification(transaction_id: &str, body: &str) -> ModificationResponse {
    let outcome = match parse_reply(body) {
        Ok(reply) => match (&reply.ok, &reply.error) {
            (Some(ok), _) if received(ok).is_some() => {
                let acknowledged = received(ok).and_then(|r| r.order_code.as_deref());
                if acknowledged.is_some_and(|code| code != transaction_id) {
                    warn!(
                        transaction_id = %transaction_id,
                        acknowledged = ?acknowledged,
                        "Modification acknowledged for a different order code"
                    );
                }
                ModificationOutcome::Received
            }
            (_, Some(error)) => ModificationOutcome::Error {
                error: reply_error(error, &[]),
            },
            _ => ModificationOutcome::Error {
                error: GatewayError::new(
                    GatewayErrorKind::UnparseableResponse,
                    None,
                    "neither ok nor error in modification reply",
                ),
            },
        },
        Err(error) => ModificationOutcome::Error { error },
    };

    ModificationResponse {
        transaction_id: transaction_id.to_string(),
        outcome,
    }
}

fn received(ok: &OkElement) -> Option<&Received> {
    ok.capture_received
        .as_ref()
        .or(ok.cancel_received.as_ref())
        .or(ok.refund_received.as_ref())
}

/// Interpret an order inquiry reply
pub fn interpret_inquiry(transaction_id: &str, body: &str) -> QueryResponse {
    let unmapped = |error: GatewayError| QueryResponse {
        transaction_id: transaction_id.to_string(),
        raw_status: None,
        mapped: MappedStatus::Unknown,
        error: Some(error),
    };

    let reply = match parse_reply(body) {
        Ok(reply) => reply,
        Err(error) => return unmapped(error),
    };
    if let Some(error) = &reply.error {
        return unmapped(reply_error(error, &[]));
    }
    let Some(order_status) = reply.order_status else {
        return unmapped(GatewayError::new(
            GatewayErrorKind::UnparseableResponse,
            None,
            "orderStatus element missing",
        ));
    };
    if let Some(error) = &order_status.error {
        return unmapped(reply_error(error, &[]));
    }

    let raw_status = order_status
        .payment
        .and_then(|p| p.last_event)
        .map(|event| event.trim().to_string());
    let mapped = raw_status
        .as_deref()
        .map(status_mapper::map_inquiry_status)
        .unwrap_or(MappedStatus::Unknown);

    QueryResponse {
        transaction_id: transaction_id.to_string(),
        raw_status,
        mapped,
        error: None,
    }
}
