//! Payment repository boundary and its in-memory implementation
//!
//! Every method is one atomic unit: a status change and the event it appends
//! happen under the same write lock, or neither happens.

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::account::{GatewayAccount, GatewayName};
use crate::domain::authorisation::ExemptionDecision;
use crate::domain::payment::{Payment, PaymentEvent, StatusSnapshot, TransitionOutcome};
use crate::domain::status::{ChargeStatus, RefundStatus};
use crate::shared::error::AppResult;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PaymentRepository: Send + Sync {
    async fn find_payment(&self, gateway: GatewayName, transaction_id: &str) -> AppResult<Option<Payment>>;

    async fn find_account(&self, gateway_account_id: &str) -> AppResult<Option<GatewayAccount>>;

    async fn find_account_by_merchant_code(
        &self,
        gateway: GatewayName,
        merchant_code: &str,
    ) -> AppResult<Option<GatewayAccount>>;

    async fn record_exemption(
        &self,
        gateway: GatewayName,
        transaction_id: &str,
        decision: ExemptionDecision,
    ) -> AppResult<TransitionOutcome>;

    /// Move the charge to `to` if it is currently in one of `from`
    async fn transition_charge(
        &self,
        gateway: GatewayName,
        transaction_id: &str,
        from: &[ChargeStatus],
        to: ChargeStatus,
    ) -> AppResult<TransitionOutcome>;

    /// Record a capture confirmed after the payment was archived or finalised
    async fn record_late_capture(
        &self,
        gateway: GatewayName,
        transaction_id: &str,
        booking_date: Option<NaiveDate>,
    ) -> AppResult<TransitionOutcome>;

    /// Move the refund identified by `reference` to `to`, checking its allowed predecessors
    async fn transition_refund(
        &self,
        gateway: GatewayName,
        transaction_id: &str,
        reference: &str,
        to: RefundStatus,
        booking_date: Option<NaiveDate>,
    ) -> AppResult<TransitionOutcome>;
}

type PaymentKey = (GatewayName, String);

/// In-memory store used by the service binary and tests
#[derive(Clone, Default)]
pub struct InMemoryPaymentRepository {
    payments: Arc<RwLock<HashMap<PaymentKey, Payment>>>,
    accounts: Arc<RwLock<HashMap<String, GatewayAccount>>>,
}

impl InMemoryPaymentRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert_account(&self, account: GatewayAccount) {
        self.accounts.write().await.insert(account.id.clone(), account);
    }

    pub async fn insert_payment(&self, payment: Payment) {
        let key = (payment.gateway, payment.gateway_transaction_id.clone());
        self.payments.write().await.insert(key, payment);
    }

    pub async fn payment_count(&self) -> usize {
        self.payments.read().await.len()
    }

    fn key(gateway: GatewayName, transaction_id: &str) -> PaymentKey {
        (gateway, transaction_id.to_string())
    }
}

#[async_trait]
impl PaymentRepository for InMemoryPaymentRepository {
    async fn find_payment(&self, gateway: GatewayName, transaction_id: &str) -> AppResult<Option<Payment>> {
        Ok(self.payments.read().await.get(&Self::key(gateway, transaction_id)).cloned())
    }

    async fn find_account(&self, gateway_account_id: &str) -> AppResult<Option<GatewayAccount>> {
        Ok(self.accounts.read().await.get(gateway_account_id).cloned())
    }

    async fn find_account_by_merchant_code(
        &self,
        gateway: GatewayName,
        merchant_code: &str,
    ) -> AppResult<Option<GatewayAccount>> {
        Ok(self
            .accounts
            .read()
            .await
            .values()
            .find(|a| a.gateway == gateway && a.merchant_code() == merchant_code)
            .cloned())
    }

    async fn record_exemption(
        &self,
        gateway: GatewayName,
        transaction_id: &str,
        decision: ExemptionDecision,
    ) -> AppResult<TransitionOutcome> {
        let mut payments = self.payments.write().await;
        let Some(payment) = payments.get_mut(&Self::key(gateway, transaction_id)) else {
            return Ok(TransitionOutcome::NotFound);
        };

        if payment.exemption == decision {
            return Ok(TransitionOutcome::AlreadyApplied);
        }

        payment.exemption = decision;
        payment.events.push(PaymentEvent::ExemptionRecorded {
            decision,
            occurred_at: Utc::now(),
        });
        Ok(TransitionOutcome::Applied)
    }

    async fn transition_charge(
        &self,
        gateway: GatewayName,
        transaction_id: &str,
        from: &[ChargeStatus],
        to: ChargeStatus,
    ) -> AppResult<TransitionOutcome> {
        let mut payments = self.payments.write().await;
        let Some(payment) = payments.get_mut(&Self::key(gateway, transaction_id)) else {
            return Ok(TransitionOutcome::NotFound);
        };

        if payment.status == to {
            return Ok(TransitionOutcome::AlreadyApplied);
        }
        if !from.contains(&payment.status) {
            return Ok(TransitionOutcome::Conflict(StatusSnapshot::Charge(payment.status)));
        }

        let previous = payment.status;
        payment.status = to;
        payment.events.push(PaymentEvent::ChargeStatusChanged {
            from: previous,
            to,
            occurred_at: Utc::now(),
        });
        Ok(TransitionOutcome::Applied)
    }

    async fn record_late_capture(
        &self,
        gateway: GatewayName,
        transaction_id: &str,
        booking_date: Option<NaiveDate>,
    ) -> AppResult<TransitionOutcome> {
        let mut payments = self.payments.write().await;
        let Some(payment) = payments.get_mut(&Self::key(gateway, transaction_id)) else {
            return Ok(TransitionOutcome::NotFound);
        };

        let already_recorded = payment
            .events
            .iter()
            .any(|e| matches!(e, PaymentEvent::LateCaptureRecorded { .. }));
        if already_recorded || payment.status == ChargeStatus::Captured {
            return Ok(TransitionOutcome::AlreadyApplied);
        }

        payment.captured_on = booking_date.or(payment.captured_on);
        payment.events.push(PaymentEvent::LateCaptureRecorded {
            booking_date,
            occurred_at: Utc::now(),
        });
        Ok(TransitionOutcome::Applied)
    }

    async fn transition_refund(
        &self,
        gateway: GatewayName,
        transaction_id: &str,
        reference: &str,
        to: RefundStatus,
        booking_date: Option<NaiveDate>,
    ) -> AppResult<TransitionOutcome> {
        let mut payments = self.payments.write().await;
        let Some(payment) = payments.get_mut(&Self::key(gateway, transaction_id)) else {
            return Ok(TransitionOutcome::NotFound);
        };
        let Some(refund) = payment.refunds.iter_mut().find(|r| r.reference == reference) else {
            return Ok(TransitionOutcome::NotFound);
        };

        if refund.status == to {
            return Ok(TransitionOutcome::AlreadyApplied);
        }
        if !to.allowed_predecessors().contains(&refund.status) {
            return Ok(TransitionOutcome::Conflict(StatusSnapshot::Refund(refund.status)));
        }

        let previous = refund.status;
        refund.status = to;
        if to.is_success() {
            refund.settled_on = booking_date;
        }
        payment.events.push(PaymentEvent::RefundStatusChanged {
            reference: reference.to_string(),
            from: previous,
            to,
            occurred_at: Utc::now(),
        });
        Ok(TransitionOutcome::Applied)
    }
}
