//! Capture, cancel, refund and status query models

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::account::GatewayAccount;
use crate::domain::authorisation::GatewayError;
use crate::domain::status::{ChargeStatus, MappedStatus, RefundStatus};

#[derive(Debug, Clone)]
pub struct CaptureRequest {
    pub account: GatewayAccount,
    pub transaction_id: Option<String>,
    pub amount: Option<u64>,
    pub currency: String,
    pub capture_date: NaiveDate,
}

#[derive(Debug, Clone)]
pub struct CancelRequest {
    pub account: GatewayAccount,
    pub transaction_id: Option<String>,
}

#[derive(Debug, Clone)]
pub struct RefundRequest {
    pub account: GatewayAccount,
    pub transaction_id: Option<String>,
    /// Platform refund id, echoed back by refund notifications
    pub reference: String,
    pub amount: Option<u64>,
    pub currency: String,
}

#[derive(Debug, Clone)]
pub struct QueryRequest {
    pub account: GatewayAccount,
    pub transaction_id: Option<String>,
}

/// Whether the gateway accepted a modification for processing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ModificationOutcome {
    Received,
    Error { error: GatewayError },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModificationResponse {
    pub transaction_id: String,
    pub outcome: ModificationOutcome,
}

impl ModificationResponse {
    pub fn is_received(&self) -> bool {
        matches!(self.outcome, ModificationOutcome::Received)
    }

    /// Timed out or lost connection: the gateway may still act on the request
    pub fn is_indeterminate(&self) -> bool {
        matches!(&self.outcome, ModificationOutcome::Error { error } if error.is_indeterminate())
    }

    /// Charge status to record after a capture request, `None` when the
    /// outcome is not known and the notification flow must settle it
    pub fn capture_status(&self) -> Option<ChargeStatus> {
        match &self.outcome {
            ModificationOutcome::Received => Some(ChargeStatus::CaptureSubmitted),
            ModificationOutcome::Error { error } if error.is_indeterminate() => None,
            ModificationOutcome::Error { .. } => Some(ChargeStatus::CaptureError),
        }
    }

    /// Charge status to record after a cancel request
    pub fn cancel_status(&self) -> Option<ChargeStatus> {
        self.is_received().then_some(ChargeStatus::SystemCancelled)
    }

    /// Refund status to record after a refund request
    pub fn refund_status(&self) -> Option<RefundStatus> {
        match &self.outcome {
            ModificationOutcome::Received => Some(RefundStatus::RefundSubmitted),
            ModificationOutcome::Error { error } if error.is_indeterminate() => None,
            ModificationOutcome::Error { .. } => Some(RefundStatus::RefundError),
        }
    }
}

/// Gateway's current view of a transaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryResponse {
    pub transaction_id: String,
    pub raw_status: Option<String>,
    pub mapped: MappedStatus,
    pub error: Option<GatewayError>,
}
