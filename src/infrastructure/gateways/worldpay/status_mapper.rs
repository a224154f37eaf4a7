//! Worldpay status vocabulary
//!
//! Two process-wide tables: one for asynchronous notifications, one for
//! order inquiries. Lookups are total; a token missing from a table maps to
//! [`MappedStatus::Unknown`].

use std::collections::HashMap;
use std::sync::LazyLock;

use crate::domain::status::{ChargeStatus, MappedStatus, RefundStatus};

static NOTIFICATION_STATUSES: LazyLock<HashMap<&'static str, MappedStatus>> = LazyLock::new(|| {
    use MappedStatus::{Charge, Ignored, Refund};

    HashMap::from([
        ("SENT_FOR_AUTHORISATION", Ignored),
        ("AUTHORISED", Ignored),
        ("CANCELLED", Ignored),
        ("EXPIRED", Ignored),
        ("REFUSED", Ignored),
        ("REFUSED_BY_BANK", Ignored),
        ("SETTLED", Ignored),
        ("SETTLED_BY_MERCHANT", Ignored),
        ("CHARGED_BACK", Ignored),
        ("CHARGEBACK_REVERSED", Ignored),
        ("INFORMATION_REQUESTED", Ignored),
        ("INFORMATION_SUPPLIED", Ignored),
        ("CAPTURED", Charge(ChargeStatus::Captured)),
        ("ERROR", Charge(ChargeStatus::AuthorisationError)),
        ("SENT_FOR_REFUND", Refund(RefundStatus::RefundSubmitted)),
        ("REFUNDED", Refund(RefundStatus::Refunded)),
        ("REFUNDED_BY_MERCHANT", Refund(RefundStatus::Refunded)),
        ("REFUND_FAILED", Refund(RefundStatus::RefundError)),
    ])
});

static INQUIRY_STATUSES: LazyLock<HashMap<&'static str, ChargeStatus>> = LazyLock::new(|| {
    HashMap::from([
        ("SENT_FOR_AUTHORISATION", ChargeStatus::AuthorisationReady),
        ("AUTHORISED", ChargeStatus::AuthorisationSuccess),
        ("REFUSED", ChargeStatus::AuthorisationRejected),
        ("REFUSED_BY_BANK", ChargeStatus::AuthorisationRejected),
        ("CANCELLED", ChargeStatus::AuthorisationCancelled),
        ("EXPIRED", ChargeStatus::Expired),
        ("ERROR", ChargeStatus::AuthorisationError),
        ("CAPTURED", ChargeStatus::Captured),
        ("SETTLED", ChargeStatus::Captured),
        ("SETTLED_BY_MERCHANT", ChargeStatus::Captured),
        ("SENT_FOR_REFUND", ChargeStatus::Captured),
        ("REFUNDED", ChargeStatus::Captured),
        ("REFUNDED_BY_MERCHANT", ChargeStatus::Captured),
        ("REFUND_FAILED", ChargeStatus::Captured),
    ])
});

/// Map a notification status token
pub fn map_notification_status(token: &str) -> MappedStatus {
    NOTIFICATION_STATUSES
        .get(token.trim())
        .copied()
        .unwrap_or(MappedStatus::Unknown)
}

/// Map the last event reported by an order inquiry
pub fn map_inquiry_status(token: &str) -> MappedStatus {
    INQUIRY_STATUSES
        .get(token.trim())
        .map(|status| MappedStatus::Charge(*status))
        .unwrap_or(MappedStatus::Unknown)
}
