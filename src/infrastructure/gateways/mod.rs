//! Payment provider integrations
//!
//! Each provider implements [`PaymentGateway`]. Transport failures never
//! surface as `Err`: they come back as error outcomes so the caller can record
//! them. `Err` is reserved for contract violations and replies with no mapping.

use async_trait::async_trait;

use crate::domain::account::{GatewayAccount, GatewayName};
use crate::domain::authorisation::{AuthorisationRequest, AuthorisationResponse, OrderRequestType, ThreeDsContinuationRequest};
use crate::domain::modification::{CancelRequest, CaptureRequest, ModificationResponse, QueryRequest, QueryResponse, RefundRequest};
use crate::domain::notification::Notification;
use crate::domain::status::MappedStatus;
use crate::shared::error::AppResult;

pub mod worldpay;

pub use worldpay::WorldpayGateway;

/// Serialized, operation-tagged request body
#[derive(Clone, PartialEq, Eq)]
pub struct GatewayOrder {
    pub order_type: OrderRequestType,
    pub payload: String,
    pub content_type: &'static str,
}

impl GatewayOrder {
    pub fn xml(order_type: OrderRequestType, payload: String) -> Self {
        Self {
            order_type,
            payload,
            content_type: "application/xml",
        }
    }
}

// Payloads carry card data; only the shape is printed
impl std::fmt::Debug for GatewayOrder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GatewayOrder")
            .field("order_type", &self.order_type)
            .field("content_type", &self.content_type)
            .field("payload_len", &self.payload.len())
            .finish()
    }
}

#[async_trait]
pub trait PaymentGateway: Send + Sync {
    fn name(&self) -> GatewayName;

    /// Submit one authorisation. `exemption_requested` is a request, not a
    /// guarantee: the builder still checks the account's 3DS settings.
    async fn authorise(
        &self,
        request: &AuthorisationRequest,
        exemption_requested: bool,
    ) -> AppResult<AuthorisationResponse>;

    async fn continue_authorisation(&self, request: &ThreeDsContinuationRequest) -> AppResult<AuthorisationResponse>;

    async fn capture(&self, request: &CaptureRequest) -> AppResult<ModificationResponse>;

    async fn cancel(&self, request: &CancelRequest) -> AppResult<ModificationResponse>;

    async fn refund(&self, request: &RefundRequest) -> AppResult<ModificationResponse>;

    async fn query(&self, request: &QueryRequest) -> AppResult<QueryResponse>;

    /// `Ok(true)` valid, `Ok(false)` rejected, `Err` when the reply is not conclusive
    async fn validate_credentials(&self, account: &GatewayAccount) -> AppResult<bool>;

    fn parse_notification(&self, payload: &str) -> AppResult<Notification>;

    fn map_notification_status(&self, status: &str) -> MappedStatus;
}
