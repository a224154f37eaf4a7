//! Capture, cancel, refund and status query against an authorised payment
//!
//! Each request goes to the gateway first. The platform status is then moved
//! with a conditional write; a transition that no longer applies is logged and
//! left alone. Timeouts and lost connections write nothing, leaving the
//! gateway's notifications to settle the payment.

use std::sync::Arc;
use tracing::{info, warn};

use crate::domain::account::GatewayName;
use crate::domain::modification::{
    CancelRequest, CaptureRequest, ModificationOutcome, ModificationResponse, QueryRequest, QueryResponse,
    RefundRequest,
};
use crate::domain::payment::TransitionOutcome;
use crate::domain::status::ChargeStatus;
use crate::infrastructure::adapters::payments_store::PaymentRepository;
use crate::infrastructure::gateways::PaymentGateway;
use crate::shared::error::AppResult;

const CAPTURE_FROM: &[ChargeStatus] = &[
    ChargeStatus::AuthorisationSuccess,
    ChargeStatus::CaptureApproved,
    ChargeStatus::CaptureReady,
];

const CANCEL_FROM: &[ChargeStatus] = &[
    ChargeStatus::Created,
    ChargeStatus::EnteringCardDetails,
    ChargeStatus::AuthorisationReady,
    ChargeStatus::Authorisation3dsRequired,
    ChargeStatus::Authorisation3dsReady,
    ChargeStatus::AuthorisationSuccess,
];

pub struct ModificationService {
    gateway: Arc<dyn PaymentGateway>,
    repository: Arc<dyn PaymentRepository>,
}

impl ModificationService {
    pub fn new(gateway: Arc<dyn PaymentGateway>, repository: Arc<dyn PaymentRepository>) -> Self {
        Self { gateway, repository }
    }

    pub async fn capture(&self, request: &CaptureRequest) -> AppResult<ModificationResponse> {
        let response = self.gateway.capture(request).await?;
        let Some(status) = response.capture_status() else {
            log_indeterminate("capture", &response);
            return Ok(response);
        };
        let outcome = self
            .repository
            .transition_charge(self.gateway.name(), &response.transaction_id, CAPTURE_FROM, status)
            .await?;
        log_transition("capture", &response, outcome);
        Ok(response)
    }

    pub async fn cancel(&self, request: &CancelRequest) -> AppResult<ModificationResponse> {
        let response = self.gateway.cancel(request).await?;
        if let Some(status) = response.cancel_status() {
            let outcome = self
                .repository
                .transition_charge(self.gateway.name(), &response.transaction_id, CANCEL_FROM, status)
                .await?;
            log_transition("cancel", &response, outcome);
        } else {
            warn!(transaction_id = %response.transaction_id, outcome = ?response.outcome, "Cancel not accepted");
        }
        Ok(response)
    }

    pub async fn refund(&self, request: &RefundRequest) -> AppResult<ModificationResponse> {
        let response = self.gateway.refund(request).await?;
        let Some(status) = response.refund_status() else {
            log_indeterminate("refund", &response);
            return Ok(response);
        };
        let outcome = self
            .repository
            .transition_refund(
                self.gateway.name(),
                &response.transaction_id,
                &request.reference,
                status,
                None,
            )
            .await?;
        log_transition("refund", &response, outcome);
        Ok(response)
    }

    /// Read-only: the gateway's view is returned, never written back
    pub async fn query(&self, request: &QueryRequest) -> AppResult<QueryResponse> {
        let response = self.gateway.query(request).await?;
        info!(
            gateway = %GatewayName::Worldpay,
            transaction_id = %response.transaction_id,
            raw_status = ?response.raw_status,
            mapped = response.mapped.label(),
            "Gateway status queried"
        );
        Ok(response)
    }
}

fn log_transition(operation: &str, response: &ModificationResponse, outcome: TransitionOutcome) {
    match (&response.outcome, outcome.is_success()) {
        (ModificationOutcome::Received, true) => {
            info!(operation = %operation, transaction_id = %response.transaction_id, "Modification recorded");
        }
        (ModificationOutcome::Error { error }, true) => {
            warn!(
                operation = %operation,
                transaction_id = %response.transaction_id,
                error = %error,
                "Modification failed, recorded as error"
            );
        }
        (_, false) => {
            warn!(
                operation = %operation,
                transaction_id = %response.transaction_id,
                received = response.is_received(),
                outcome = ?outcome,
                "Modification not recorded against payment"
            );
        }
    }
}

/// Timeouts and lost connections leave the payment as it is
fn log_indeterminate(operation: &str, response: &ModificationResponse) {
    if let ModificationOutcome::Error { error } = &response.outcome {
        warn!(
            operation = %operation,
            transaction_id = %response.transaction_id,
            error = %error,
            "Modification outcome unknown, payment left unchanged"
        );
    }
}
