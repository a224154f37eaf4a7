//! Canonical, gateway-neutral payment statuses

use serde::{Deserialize, Serialize};

/// Platform view of a charge
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ChargeStatus {
    Created,
    EnteringCardDetails,
    AuthorisationReady,
    Authorisation3dsRequired,
    Authorisation3dsReady,
    AuthorisationSuccess,
    AuthorisationRejected,
    AuthorisationCancelled,
    AuthorisationError,
    AuthorisationTimeout,
    CaptureApproved,
    CaptureReady,
    CaptureSubmitted,
    Captured,
    CaptureError,
    UserCancelled,
    SystemCancelled,
    Expired,
}

impl ChargeStatus {
    /// No further gateway-driven transition is expected from this status
    pub fn is_finished(&self) -> bool {
        matches!(
            self,
            ChargeStatus::AuthorisationRejected
                | ChargeStatus::AuthorisationCancelled
                | ChargeStatus::AuthorisationError
                | ChargeStatus::AuthorisationTimeout
                | ChargeStatus::Captured
                | ChargeStatus::CaptureError
                | ChargeStatus::UserCancelled
                | ChargeStatus::SystemCancelled
                | ChargeStatus::Expired
        )
    }

    /// Statuses from which a capture confirmation is a normal transition
    pub fn capturable_from() -> &'static [ChargeStatus] {
        &[
            ChargeStatus::AuthorisationSuccess,
            ChargeStatus::CaptureApproved,
            ChargeStatus::CaptureReady,
            ChargeStatus::CaptureSubmitted,
            // gateway confirmation overrides a locally recorded capture failure
            ChargeStatus::CaptureError,
        ]
    }
}

impl std::fmt::Display for ChargeStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Platform view of a refund
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RefundStatus {
    Created,
    RefundSubmitted,
    Refunded,
    RefundError,
}

impl RefundStatus {
    pub fn is_finished(&self) -> bool {
        matches!(self, RefundStatus::Refunded | RefundStatus::RefundError)
    }

    /// Statuses a refund may be in before moving to `self`
    pub fn allowed_predecessors(&self) -> &'static [RefundStatus] {
        match self {
            RefundStatus::Created => &[],
            RefundStatus::RefundSubmitted => &[RefundStatus::Created],
            RefundStatus::Refunded => &[
                RefundStatus::Created,
                RefundStatus::RefundSubmitted,
                RefundStatus::RefundError,
            ],
            RefundStatus::RefundError => &[RefundStatus::Created, RefundStatus::RefundSubmitted],
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, RefundStatus::Refunded)
    }
}

impl std::fmt::Display for RefundStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Result of looking a raw gateway token up in a vocabulary table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MappedStatus {
    /// Valid token with no action attached
    Ignored,
    Charge(ChargeStatus),
    Refund(RefundStatus),
    /// Not in the table. Must never mutate payment state.
    Unknown,
}

impl MappedStatus {
    pub fn label(&self) -> &'static str {
        match self {
            MappedStatus::Ignored => "ignored",
            MappedStatus::Charge(_) => "charge",
            MappedStatus::Refund(_) => "refund",
            MappedStatus::Unknown => "unknown",
        }
    }
}
