//! Second phase of a 3-D Secure authorisation

use std::sync::Arc;
use tracing::info;

use crate::application::services::authorisation_service::{final_response, to_result};
use crate::domain::authorisation::{AuthorisationResult, ThreeDsContinuationRequest};
use crate::infrastructure::adapters::monitoring::MonitoringAdapter;
use crate::infrastructure::gateways::PaymentGateway;
use crate::shared::error::AppResult;

pub struct ThreeDsService {
    gateway: Arc<dyn PaymentGateway>,
    monitoring: Arc<MonitoringAdapter>,
}

impl ThreeDsService {
    pub fn new(gateway: Arc<dyn PaymentGateway>, monitoring: Arc<MonitoringAdapter>) -> Self {
        Self { gateway, monitoring }
    }

    /// Send the challenge result back with the phase-one session correlator.
    /// A second challenge is surfaced as is; there is no retry here.
    pub async fn continue_authorisation(&self, request: &ThreeDsContinuationRequest) -> AppResult<AuthorisationResult> {
        let response = final_response(self.gateway.continue_authorisation(request).await?);
        let transaction_id = response
            .transaction_id
            .clone()
            .or_else(|| request.transaction_id.clone())
            .unwrap_or_default();
        let exemption = response.exemption.map(|e| e.decision()).unwrap_or_default();

        let result = to_result(transaction_id, response, exemption, 1);
        self.monitoring
            .record_authorisation(self.gateway.name().as_str(), result.outcome.label());
        info!(
            transaction_id = %result.transaction_id,
            gateway_account_id = %request.account.id,
            outcome = %result.outcome.label(),
            has_session = request.session_identifier.is_some(),
            "3DS continuation complete"
        );
        Ok(result)
    }
}
