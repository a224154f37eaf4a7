//! Authorisation domain models
//!
//! Requests, 3-D Secure challenges and the outcomes a gateway can hand back
//! for an authorisation round-trip.

use serde::{Deserialize, Serialize};

use crate::domain::account::GatewayAccount;
use crate::domain::status::ChargeStatus;

/// Operation tag declared by every wire payload
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderRequestType {
    Authorise,
    Authorise3ds,
    AuthoriseApplePay,
    AuthoriseGooglePay,
    Capture,
    Cancel,
    Refund,
    Query,
}

impl OrderRequestType {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderRequestType::Authorise => "AUTHORISE",
            OrderRequestType::Authorise3ds => "AUTHORISE_3DS",
            OrderRequestType::AuthoriseApplePay => "AUTHORISE_APPLE_PAY",
            OrderRequestType::AuthoriseGooglePay => "AUTHORISE_GOOGLE_PAY",
            OrderRequestType::Capture => "CAPTURE",
            OrderRequestType::Cancel => "CANCEL",
            OrderRequestType::Refund => "REFUND",
            OrderRequestType::Query => "QUERY",
        }
    }
}

impl std::fmt::Display for OrderRequestType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Postal address used for card verification
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Address {
    pub line1: String,
    pub line2: Option<String>,
    pub postcode: String,
    pub city: String,
    pub county: Option<String>,
    pub country: String,
}

#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CardDetails {
    pub card_number: String,
    pub cardholder_name: String,
    pub cvc: Option<String>,
    /// Expiry as `MM/YY`
    pub end_date: String,
}

impl CardDetails {
    /// Two-digit month and four-digit year from the `MM/YY` expiry
    pub fn expiry_month_year(&self) -> Option<(String, String)> {
        let (month, year) = self.end_date.split_once('/')?;
        let month = month.trim();
        let year = year.trim();
        if month.len() != 2 || year.len() != 2 {
            return None;
        }
        if !month.chars().all(|c| c.is_ascii_digit()) || !year.chars().all(|c| c.is_ascii_digit()) {
            return None;
        }
        Some((month.to_string(), format!("20{}", year)))
    }
}

impl std::fmt::Debug for CardDetails {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let last_digits: String = self
            .card_number
            .chars()
            .rev()
            .take(4)
            .collect::<Vec<_>>()
            .into_iter()
            .rev()
            .collect();
        f.debug_struct("CardDetails")
            .field("card_number", &format!("****{}", last_digits))
            .field("cardholder_name", &"***")
            .field("end_date", &self.end_date)
            .finish()
    }
}

/// Apple Pay payment token as decrypted-at-gateway payload
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ApplePayToken {
    pub ephemeral_public_key: String,
    pub public_key_hash: String,
    pub transaction_id: String,
    pub signature: String,
    pub version: String,
    pub data: String,
    pub cardholder_name: Option<String>,
}

/// Google Pay encrypted payment token
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GooglePayToken {
    pub protocol_version: String,
    pub signature: String,
    pub signed_message: String,
    pub cardholder_name: Option<String>,
}

/// Payment instrument carried by an authorisation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PaymentData {
    Card(CardDetails),
    ApplePay(ApplePayToken),
    GooglePay(GooglePayToken),
}

impl PaymentData {
    pub fn cardholder_name(&self) -> Option<&str> {
        match self {
            PaymentData::Card(card) => Some(card.cardholder_name.as_str()),
            PaymentData::ApplePay(token) => token.cardholder_name.as_deref(),
            PaymentData::GooglePay(token) => token.cardholder_name.as_deref(),
        }
    }

    pub fn order_request_type(&self) -> OrderRequestType {
        match self {
            PaymentData::Card(_) => OrderRequestType::Authorise,
            PaymentData::ApplePay(_) => OrderRequestType::AuthoriseApplePay,
            PaymentData::GooglePay(_) => OrderRequestType::AuthoriseGooglePay,
        }
    }
}

/// Browser headers forwarded for 3-D Secure risk assessment
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct BrowserDetails {
    pub accept_header: Option<String>,
    pub user_agent_header: Option<String>,
}

/// Recurring-payment agreement linkage
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum AgreementLinkage {
    /// Customer-initiated payment that stores credentials for later use
    SetUp { agreement_id: String },
    /// Merchant-initiated payment reusing stored credentials
    Reuse {
        agreement_id: String,
        payment_token_id: String,
        scheme_transaction_identifier: Option<String>,
    },
}

/// Abstract authorisation request. Built once per attempt and never mutated.
#[derive(Debug, Clone)]
pub struct AuthorisationRequest {
    pub account: GatewayAccount,
    /// Correlator sent to the gateway as the order code
    pub transaction_id: Option<String>,
    pub description: String,
    /// Minor units
    pub amount: Option<u64>,
    pub currency: String,
    pub payment_data: PaymentData,
    pub billing_address: Option<Address>,
    pub client_ip: Option<String>,
    pub email: Option<String>,
    pub browser: Option<BrowserDetails>,
    pub agreement: Option<AgreementLinkage>,
    /// Reference returned by the browser-side device data collection step
    pub device_data_collection_result: Option<String>,
}

impl AuthorisationRequest {
    pub fn gateway_account_id(&self) -> &str {
        &self.account.id
    }

    pub fn cardholder_name(&self) -> Option<&str> {
        self.payment_data.cardholder_name()
    }
}

/// Outcome of the exemption engine, persisted on the payment
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExemptionDecision {
    #[default]
    NotRequested,
    Honoured,
    Rejected,
    OutOfScope,
}

/// Raw exemption result a gateway returns
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExemptionResult {
    Honoured,
    Rejected,
    OutOfScope,
}

impl ExemptionResult {
    pub fn from_token(token: &str) -> Option<Self> {
        match token.trim() {
            "HONOURED" => Some(ExemptionResult::Honoured),
            "REJECTED" => Some(ExemptionResult::Rejected),
            "OUT_OF_SCOPE" => Some(ExemptionResult::OutOfScope),
            _ => None,
        }
    }

    pub fn decision(&self) -> ExemptionDecision {
        match self {
            ExemptionResult::Honoured => ExemptionDecision::Honoured,
            ExemptionResult::Rejected => ExemptionDecision::Rejected,
            ExemptionResult::OutOfScope => ExemptionDecision::OutOfScope,
        }
    }

    /// Rejected and out-of-scope exemptions require a resubmission without exemption
    pub fn is_soft_decline(&self) -> bool {
        matches!(self, ExemptionResult::Rejected | ExemptionResult::OutOfScope)
    }
}

/// Challenge parameters the cardholder must complete
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "version", rename_all = "snake_case")]
pub enum ThreeDsChallenge {
    Legacy {
        issuer_url: String,
        pa_request: String,
    },
    Flex {
        acs_url: String,
        transaction_id: String,
        payload: String,
        protocol_version: String,
    },
}

/// Opaque gateway session token linking both phases of a 3DS round-trip
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct ProviderSessionIdentifier(String);

impl ProviderSessionIdentifier {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ProviderSessionIdentifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", content = "status", rename_all = "snake_case")]
pub enum GatewayErrorKind {
    /// Connect or read timeout
    Timeout,
    /// Non-2xx HTTP status
    HttpStatus(u16),
    /// Connection or other I/O failure
    Connection,
    /// Well-formed reply carrying an error element
    GatewayReply,
    /// Body could not be parsed into the expected structure
    UnparseableResponse,
    /// Parsed reply with a last event outside the authorisation vocabulary
    UnexpectedStatus,
}

/// Failure details attached to an error outcome. The message is already redacted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GatewayError {
    pub kind: GatewayErrorKind,
    pub code: Option<String>,
    pub message: String,
}

impl GatewayError {
    pub fn new(kind: GatewayErrorKind, code: Option<String>, message: impl Into<String>) -> Self {
        Self { kind, code, message: message.into() }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self.kind, GatewayErrorKind::Timeout)
    }

    /// The request may have reached the gateway; its effect is unknown until it reports back
    pub fn is_indeterminate(&self) -> bool {
        matches!(self.kind, GatewayErrorKind::Timeout | GatewayErrorKind::Connection)
    }
}

impl std::fmt::Display for GatewayError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.code {
            Some(code) => write!(f, "{:?} [{}]: {}", self.kind, code, self.message),
            None => write!(f, "{:?}: {}", self.kind, self.message),
        }
    }
}

/// What a single gateway round-trip amounted to
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum GatewayOutcome {
    Authorised,
    Rejected,
    Cancelled,
    Requires3ds { challenge: ThreeDsChallenge },
    /// Refused because the exemption request was not accepted
    SoftDeclined { exemption: ExemptionResult },
    Error { error: GatewayError },
}

impl GatewayOutcome {
    pub fn label(&self) -> &'static str {
        match self {
            GatewayOutcome::Authorised => "authorised",
            GatewayOutcome::Rejected => "rejected",
            GatewayOutcome::Cancelled => "cancelled",
            GatewayOutcome::Requires3ds { .. } => "requires_3ds",
            GatewayOutcome::SoftDeclined { .. } => "soft_declined",
            GatewayOutcome::Error { .. } => "error",
        }
    }

    pub fn is_soft_decline(&self) -> bool {
        matches!(self, GatewayOutcome::SoftDeclined { .. })
    }

    /// Canonical charge status the platform records for this outcome
    pub fn charge_status(&self) -> ChargeStatus {
        match self {
            GatewayOutcome::Authorised => ChargeStatus::AuthorisationSuccess,
            GatewayOutcome::Rejected | GatewayOutcome::SoftDeclined { .. } => ChargeStatus::AuthorisationRejected,
            GatewayOutcome::Cancelled => ChargeStatus::AuthorisationCancelled,
            GatewayOutcome::Requires3ds { .. } => ChargeStatus::Authorisation3dsRequired,
            GatewayOutcome::Error { error } if error.is_timeout() => ChargeStatus::AuthorisationTimeout,
            GatewayOutcome::Error { .. } => ChargeStatus::AuthorisationError,
        }
    }
}

/// Interpreted gateway reply to an authorisation or 3DS continuation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorisationResponse {
    pub outcome: GatewayOutcome,
    pub exemption: Option<ExemptionResult>,
    pub session_identifier: Option<ProviderSessionIdentifier>,
    pub transaction_id: Option<String>,
}

impl AuthorisationResponse {
    pub fn error(error: GatewayError) -> Self {
        Self {
            outcome: GatewayOutcome::Error { error },
            exemption: None,
            session_identifier: None,
            transaction_id: None,
        }
    }
}

/// Final result of an orchestrated authorisation, handed to persistence
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthorisationResult {
    pub transaction_id: String,
    pub outcome: GatewayOutcome,
    pub charge_status: ChargeStatus,
    /// Decision the payment holds after an authorisation; on a 3DS
    /// continuation, the decision carried by that reply
    pub exemption: ExemptionDecision,
    pub session_identifier: Option<ProviderSessionIdentifier>,
    /// Number of gateway requests issued, including the soft-decline retry
    pub attempts: u8,
}

/// Cardholder's response to a challenge
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct ChallengeResult {
    /// Legacy PaRes; `None` when the front end collected only a session value
    pub pa_response: Option<String>,
}

/// Phase-two request of a 3DS flow
#[derive(Debug, Clone)]
pub struct ThreeDsContinuationRequest {
    pub account: GatewayAccount,
    pub transaction_id: Option<String>,
    pub session_identifier: Option<ProviderSessionIdentifier>,
    pub challenge_result: ChallengeResult,
}
