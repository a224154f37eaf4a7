//! Domain layer - Core payment models and business rules
//!
//! This module contains the gateway-neutral models shared by the orchestration
//! services and the provider integrations. Nothing here performs I/O.

pub mod account;
pub mod authorisation;
pub mod health;
pub mod modification;
pub mod notification;
pub mod payment;
pub mod status;

pub use account::{GatewayAccount, GatewayName, IntegrationVersion, MerchantCredentials, ThreeDsSettings};
pub use authorisation::{
    AgreementLinkage, AuthorisationRequest, AuthorisationResponse, AuthorisationResult,
    ChallengeResult, ExemptionDecision, ExemptionResult, GatewayError, GatewayErrorKind,
    GatewayOutcome, OrderRequestType, PaymentData, ProviderSessionIdentifier, ThreeDsChallenge,
    ThreeDsContinuationRequest,
};
pub use health::{HealthResponse, HealthStatus};
pub use modification::{
    CancelRequest, CaptureRequest, ModificationOutcome, ModificationResponse, QueryRequest,
    QueryResponse, RefundRequest,
};
pub use notification::{Notification, NotificationDisposition};
pub use payment::{Payment, PaymentEvent, Refund, StatusSnapshot, TransitionOutcome};
pub use status::{ChargeStatus, MappedStatus, RefundStatus};
