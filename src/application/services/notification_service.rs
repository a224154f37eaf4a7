//! Gateway notification reconciliation
//!
//! Every notification ends in a disposition. `Acknowledged` tells the gateway
//! to stop sending it, including for payloads we deliberately ignore;
//! `NotYetHandled` asks for redelivery. Redelivery of something already
//! applied is absorbed by the conditional writes in the repository.

use std::net::IpAddr;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use crate::config::app_config::WorldpayConfig;
use crate::domain::account::GatewayAccount;
use crate::domain::notification::{Notification, NotificationDisposition};
use crate::domain::payment::{Payment, TransitionOutcome};
use crate::domain::status::{ChargeStatus, MappedStatus, RefundStatus};
use crate::infrastructure::adapters::hostname_resolver::HostnameResolver;
use crate::infrastructure::adapters::monitoring::MonitoringAdapter;
use crate::infrastructure::adapters::payments_store::PaymentRepository;
use crate::infrastructure::gateways::PaymentGateway;
use crate::shared::error::AppResult;
use crate::shared::logging::LoggingUtils;

use NotificationDisposition::{Acknowledged, Forbidden, NotYetHandled};

/// Trusted-origin settings for inbound notifications
#[derive(Debug, Clone)]
pub struct NotificationOrigin {
    pub secure: bool,
    /// Domain suffix, e.g. `.worldpay.com`
    pub domain: String,
}

impl From<&WorldpayConfig> for NotificationOrigin {
    fn from(config: &WorldpayConfig) -> Self {
        Self {
            secure: config.secure_notifications_enabled,
            domain: config.notification_domain.clone(),
        }
    }
}

pub struct NotificationService {
    gateway: Arc<dyn PaymentGateway>,
    repository: Arc<dyn PaymentRepository>,
    resolver: Arc<dyn HostnameResolver>,
    monitoring: Arc<MonitoringAdapter>,
    origin: NotificationOrigin,
}

impl NotificationService {
    pub fn new(
        gateway: Arc<dyn PaymentGateway>,
        repository: Arc<dyn PaymentRepository>,
        resolver: Arc<dyn HostnameResolver>,
        monitoring: Arc<MonitoringAdapter>,
        origin: NotificationOrigin,
    ) -> Self {
        Self {
            gateway,
            repository,
            resolver,
            monitoring,
            origin,
        }
    }

    /// Process one notification body received from `client_ip`
    pub async fn handle(&self, payload: &str, client_ip: Option<IpAddr>) -> NotificationDisposition {
        let disposition = if !self.is_trusted_origin(client_ip).await {
            LoggingUtils::log_forbidden_notification(
                self.gateway.name().as_str(),
                &client_ip.map(|ip| ip.to_string()).unwrap_or_else(|| "unknown".to_string()),
            );
            Forbidden
        } else {
            match self.process(payload).await {
                Ok(disposition) => disposition,
                Err(e) => {
                    error!(error = %e, "Notification processing failed");
                    NotYetHandled
                }
            }
        };

        self.monitoring
            .record_notification(self.gateway.name().as_str(), disposition);
        disposition
    }

    async fn is_trusted_origin(&self, client_ip: Option<IpAddr>) -> bool {
        if !self.origin.secure {
            return true;
        }
        let Some(ip) = client_ip else {
            return false;
        };
        match self.resolver.reverse_lookup(ip).await {
            Some(host) => {
                let host = host.trim_end_matches('.').to_ascii_lowercase();
                host.ends_with(&self.origin.domain.to_ascii_lowercase())
            }
            None => false,
        }
    }

    async fn process(&self, payload: &str) -> AppResult<NotificationDisposition> {
        let notification = match self.gateway.parse_notification(payload) {
            Ok(notification) => notification,
            Err(e) => {
                warn!(error = %e, "Ignoring unparseable notification");
                return Ok(Acknowledged);
            }
        };

        let mapped = self.gateway.map_notification_status(&notification.status);
        if mapped == MappedStatus::Ignored {
            debug!(status = %notification.status, "Notification status ignored");
            return Ok(Acknowledged);
        }

        let Some(transaction_id) = notification.transaction_id() else {
            warn!(status = %notification.status, "Notification without transaction id");
            return Ok(Acknowledged);
        };

        let gateway = self.gateway.name();
        let Some(payment) = self.repository.find_payment(gateway, transaction_id).await? else {
            return self.payment_not_found(&notification, transaction_id).await;
        };

        let Some(account) = self.repository.find_account(&payment.gateway_account_id).await? else {
            error!(
                transaction_id = %transaction_id,
                gateway_account_id = %payment.gateway_account_id,
                "No gateway account for notified payment"
            );
            return Ok(NotYetHandled);
        };

        info!(
            transaction_id = %transaction_id,
            gateway_account_id = %account.id,
            status = %notification.status,
            mapped = mapped.label(),
            "Processing notification"
        );

        match mapped {
            MappedStatus::Charge(ChargeStatus::Captured) => self.apply_capture(&notification, &payment).await,
            MappedStatus::Charge(ChargeStatus::AuthorisationError) => {
                log_gateway_error(&notification, &account);
                Ok(Acknowledged)
            }
            MappedStatus::Refund(status) => self.apply_refund(&notification, &payment, status).await,
            MappedStatus::Charge(_) | MappedStatus::Unknown | MappedStatus::Ignored => {
                warn!(
                    transaction_id = %transaction_id,
                    status = %notification.status,
                    "Unknown notification status, no action taken"
                );
                Ok(Acknowledged)
            }
        }
    }

    async fn payment_not_found(
        &self,
        notification: &Notification,
        transaction_id: &str,
    ) -> AppResult<NotificationDisposition> {
        let account = self
            .repository
            .find_account_by_merchant_code(self.gateway.name(), &notification.merchant_code)
            .await?;

        // Telephone payments are notified before the platform has a record of them
        if account.is_some_and(|a| a.allow_telephone_payment_notifications) {
            info!(transaction_id = %transaction_id, "Payment not yet recorded, asking for redelivery");
            return Ok(NotYetHandled);
        }

        warn!(transaction_id = %transaction_id, status = %notification.status, "Notification for unknown payment");
        Ok(Acknowledged)
    }

    async fn apply_capture(&self, notification: &Notification, payment: &Payment) -> AppResult<NotificationDisposition> {
        let gateway = self.gateway.name();
        let transaction_id = payment.gateway_transaction_id.as_str();

        let outcome = if payment.requires_late_capture() {
            self.repository
                .record_late_capture(gateway, transaction_id, notification.booking_date)
                .await?
        } else {
            self.repository
                .transition_charge(gateway, transaction_id, ChargeStatus::capturable_from(), ChargeStatus::Captured)
                .await?
        };

        match outcome {
            TransitionOutcome::Applied | TransitionOutcome::AlreadyApplied => {
                info!(transaction_id = %transaction_id, outcome = ?outcome, "Capture confirmed");
                Ok(Acknowledged)
            }
            TransitionOutcome::Conflict(current) => {
                warn!(transaction_id = %transaction_id, current = ?current, "Capture notified before payment was capturable");
                Ok(NotYetHandled)
            }
            TransitionOutcome::NotFound => Ok(NotYetHandled),
        }
    }

    async fn apply_refund(
        &self,
        notification: &Notification,
        payment: &Payment,
        status: RefundStatus,
    ) -> AppResult<NotificationDisposition> {
        let transaction_id = payment.gateway_transaction_id.as_str();

        // Refunds raised in the gateway's own console carry no authorisation reference
        if status == RefundStatus::RefundSubmitted && notification.refund_authorisation_reference.is_none() {
            info!(transaction_id = %transaction_id, "Ignoring refund submitted outside the platform");
            return Ok(Acknowledged);
        }

        let Some(reference) = notification.reference.as_deref() else {
            warn!(transaction_id = %transaction_id, status = %notification.status, "Refund notification without reference");
            return Ok(Acknowledged);
        };

        let outcome = self
            .repository
            .transition_refund(self.gateway.name(), transaction_id, reference, status, notification.booking_date)
            .await?;

        if outcome.is_success() {
            info!(transaction_id = %transaction_id, reference = %reference, status = %status, "Refund updated");
        } else {
            warn!(
                transaction_id = %transaction_id,
                reference = %reference,
                status = %status,
                outcome = ?outcome,
                "Refund notification not applied"
            );
        }
        Ok(Acknowledged)
    }
}

/// Gateway-side errors on live accounts need attention; on test accounts they are routine
fn log_gateway_error(notification: &Notification, account: &GatewayAccount) {
    let transaction_id = notification.transaction_id().unwrap_or_default();
    if account.live {
        error!(
            transaction_id = %transaction_id,
            gateway_account_id = %account.id,
            account_type = account.account_type(),
            "Gateway reported an error for payment"
        );
    } else {
        warn!(
            transaction_id = %transaction_id,
            gateway_account_id = %account.id,
            account_type = account.account_type(),
            "Gateway reported an error for payment"
        );
    }
}
