//! Payment records as seen through the persistence boundary

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::account::GatewayName;
use crate::domain::authorisation::{ExemptionDecision, ProviderSessionIdentifier};
use crate::domain::status::{ChargeStatus, RefundStatus};

/// Refund recorded against a payment
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Refund {
    /// Platform refund id, sent to the gateway as the refund reference
    pub reference: String,
    pub amount: u64,
    pub status: RefundStatus,
    pub settled_on: Option<NaiveDate>,
}

/// Entry in a payment's event history
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum PaymentEvent {
    ChargeStatusChanged {
        from: ChargeStatus,
        to: ChargeStatus,
        occurred_at: DateTime<Utc>,
    },
    /// Capture confirmed for a payment that had already been archived
    LateCaptureRecorded {
        booking_date: Option<NaiveDate>,
        occurred_at: DateTime<Utc>,
    },
    RefundStatusChanged {
        reference: String,
        from: RefundStatus,
        to: RefundStatus,
        occurred_at: DateTime<Utc>,
    },
    ExemptionRecorded {
        decision: ExemptionDecision,
        occurred_at: DateTime<Utc>,
    },
}

/// Long-lived payment entity. Owned by the persistence layer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Payment {
    pub external_id: String,
    pub gateway_account_id: String,
    pub gateway: GatewayName,
    /// Provider transaction id (the order code)
    pub gateway_transaction_id: String,
    pub amount: u64,
    pub status: ChargeStatus,
    pub exemption: ExemptionDecision,
    pub session_identifier: Option<ProviderSessionIdentifier>,
    /// Payment moved out of the live store; late events take a dedicated path
    pub archived: bool,
    pub captured_on: Option<NaiveDate>,
    pub refunds: Vec<Refund>,
    pub events: Vec<PaymentEvent>,
}

impl Payment {
    pub fn new(
        external_id: impl Into<String>,
        gateway_account_id: impl Into<String>,
        gateway: GatewayName,
        gateway_transaction_id: impl Into<String>,
        amount: u64,
        status: ChargeStatus,
    ) -> Self {
        Self {
            external_id: external_id.into(),
            gateway_account_id: gateway_account_id.into(),
            gateway,
            gateway_transaction_id: gateway_transaction_id.into(),
            amount,
            status,
            exemption: ExemptionDecision::NotRequested,
            session_identifier: None,
            archived: false,
            captured_on: None,
            refunds: Vec::new(),
            events: Vec::new(),
        }
    }

    /// Capture confirmations for these payments need the late-capture transition
    pub fn requires_late_capture(&self) -> bool {
        self.archived
            || (self.status.is_finished()
                && self.status != ChargeStatus::Captured
                && !ChargeStatus::capturable_from().contains(&self.status))
    }

    pub fn find_refund(&self, reference: &str) -> Option<&Refund> {
        self.refunds.iter().find(|r| r.reference == reference)
    }

    pub fn capture_events(&self) -> usize {
        self.events
            .iter()
            .filter(|e| match e {
                PaymentEvent::ChargeStatusChanged { to, .. } => *to == ChargeStatus::Captured,
                PaymentEvent::LateCaptureRecorded { .. } => true,
                _ => false,
            })
            .count()
    }
}

/// Result of a conditional write
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionOutcome {
    Applied,
    /// Target state was already in place; counts as success
    AlreadyApplied,
    /// Current state is not an allowed predecessor
    Conflict(StatusSnapshot),
    NotFound,
}

impl TransitionOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, TransitionOutcome::Applied | TransitionOutcome::AlreadyApplied)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusSnapshot {
    Charge(ChargeStatus),
    Refund(RefundStatus),
}
