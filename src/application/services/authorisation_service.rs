//! Authorisation orchestration
//!
//! Decides whether to ask for an exemption, applies the soft-decline retry
//! and records the exemption decision on the payment.

use std::sync::Arc;
use tracing::{info, warn};

use crate::domain::authorisation::{
    AuthorisationRequest, AuthorisationResponse, AuthorisationResult, ExemptionDecision, ExemptionResult,
    GatewayOutcome,
};
use crate::domain::payment::TransitionOutcome;
use crate::infrastructure::adapters::monitoring::MonitoringAdapter;
use crate::infrastructure::adapters::payments_store::PaymentRepository;
use crate::infrastructure::gateways::PaymentGateway;
use crate::shared::error::AppResult;

pub struct AuthorisationService {
    gateway: Arc<dyn PaymentGateway>,
    repository: Arc<dyn PaymentRepository>,
    monitoring: Arc<MonitoringAdapter>,
}

impl AuthorisationService {
    pub fn new(
        gateway: Arc<dyn PaymentGateway>,
        repository: Arc<dyn PaymentRepository>,
        monitoring: Arc<MonitoringAdapter>,
    ) -> Self {
        Self {
            gateway,
            repository,
            monitoring,
        }
    }

    /// Authorise a payment, resubmitting once without exemption on a soft decline.
    ///
    /// Contract violations come back as `Err` before anything is sent. Every
    /// gateway-side failure is an `Error` outcome in the returned result.
    pub async fn authorise(&self, request: &AuthorisationRequest) -> AppResult<AuthorisationResult> {
        let exemption_enabled = request.account.three_ds.exemption_engine_applies();
        let first = self.gateway.authorise(request, exemption_enabled).await?;
        let transaction_id = first
            .transaction_id
            .clone()
            .or_else(|| request.transaction_id.clone())
            .unwrap_or_default();

        let (response, exemption, attempts) = match first.outcome {
            GatewayOutcome::SoftDeclined { exemption } => {
                self.persist_exemption(&transaction_id, exemption.decision()).await;
                self.monitoring.record_soft_decline_retry();
                info!(
                    transaction_id = %transaction_id,
                    exemption = ?exemption,
                    "Exemption not accepted, resubmitting without exemption"
                );

                // Whatever the retry returns is final
                let retry = self.gateway.authorise(request, false).await?;
                (final_response(retry), exemption.decision(), 2)
            }
            _ => {
                let decision = if !exemption_enabled {
                    self.persist_exemption(&transaction_id, ExemptionDecision::NotRequested).await;
                    ExemptionDecision::NotRequested
                } else if first.exemption == Some(ExemptionResult::Honoured) {
                    self.persist_exemption(&transaction_id, ExemptionDecision::Honoured).await;
                    ExemptionDecision::Honoured
                } else {
                    self.stored_exemption(&transaction_id).await
                };
                (first, decision, 1)
            }
        };

        let result = to_result(transaction_id, response, exemption, attempts);
        self.monitoring
            .record_authorisation(self.gateway.name().as_str(), result.outcome.label());
        info!(
            transaction_id = %result.transaction_id,
            gateway_account_id = %request.gateway_account_id(),
            outcome = %result.outcome.label(),
            charge_status = %result.charge_status,
            attempts = result.attempts,
            "Authorisation complete"
        );
        Ok(result)
    }

    /// Decision currently held for the payment, used when this attempt records none
    async fn stored_exemption(&self, transaction_id: &str) -> ExemptionDecision {
        match self.repository.find_payment(self.gateway.name(), transaction_id).await {
            Ok(Some(payment)) => payment.exemption,
            Ok(None) => ExemptionDecision::default(),
            Err(e) => {
                warn!(transaction_id = %transaction_id, error = %e, "Failed to read stored exemption decision");
                ExemptionDecision::default()
            }
        }
    }

    async fn persist_exemption(&self, transaction_id: &str, decision: ExemptionDecision) {
        match self
            .repository
            .record_exemption(self.gateway.name(), transaction_id, decision)
            .await
        {
            Ok(outcome) if outcome.is_success() => {}
            Ok(TransitionOutcome::NotFound) => {
                warn!(transaction_id = %transaction_id, "No payment to record the exemption decision on")
            }
            Ok(outcome) => {
                warn!(transaction_id = %transaction_id, outcome = ?outcome, "Exemption decision not recorded")
            }
            Err(e) => warn!(transaction_id = %transaction_id, error = %e, "Failed to record exemption decision"),
        }
    }
}

/// A soft decline on the retry is reported as a plain rejection
pub(crate) fn final_response(response: AuthorisationResponse) -> AuthorisationResponse {
    match response.outcome {
        GatewayOutcome::SoftDeclined { .. } => AuthorisationResponse {
            outcome: GatewayOutcome::Rejected,
            ..response
        },
        _ => response,
    }
}

/// The session identifier is only kept while a challenge is outstanding
pub(crate) fn to_result(
    transaction_id: String,
    response: AuthorisationResponse,
    exemption: ExemptionDecision,
    attempts: u8,
) -> AuthorisationResult {
    let session_identifier = match response.outcome {
        GatewayOutcome::Requires3ds { .. } => response.session_identifier,
        _ => None,
    };
    AuthorisationResult {
        charge_status: response.outcome.charge_status(),
        transaction_id,
        outcome: response.outcome,
        exemption,
        session_identifier,
        attempts,
    }
}
