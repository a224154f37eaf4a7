//! Worldpay order notification parsing

use chrono::NaiveDate;
use serde::Deserialize;
use tracing::debug;

use crate::domain::notification::Notification;
use crate::shared::error::{AppError, AppResult};

const REFUND_REFERENCE: &str = "refund";
const REFUND_AUTHORISATION_REFERENCE: &str = "refundAuthorisation";

#[derive(Debug, Deserialize)]
struct NotificationEnvelope {
    #[serde(rename = "@merchantCode")]
    merchant_code: Option<String>,
    notify: Option<Notify>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Notify {
    order_status_event: Option<OrderStatusEvent>,
}

#[derive(Debug, Deserialize)]
struct OrderStatusEvent {
    #[serde(rename = "@orderCode")]
    order_code: Option<String>,
    payment: Option<NotifiedPayment>,
    journal: Option<Journal>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NotifiedPayment {
    last_event: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Journal {
    #[serde(rename = "@journalType")]
    journal_type: Option<String>,
    #[serde(rename = "bookingDate")]
    booking_date: Option<BookingDate>,
    #[serde(rename = "journalReference", default)]
    references: Vec<JournalReference>,
}

#[derive(Debug, Deserialize)]
struct BookingDate {
    date: Option<DayMonthYear>,
}

#[derive(Debug, Deserialize)]
struct DayMonthYear {
    #[serde(rename = "@dayOfMonth")]
    day_of_month: Option<String>,
    #[serde(rename = "@month")]
    month: Option<String>,
    #[serde(rename = "@year")]
    year: Option<String>,
}

impl DayMonthYear {
    fn to_date(&self) -> Option<NaiveDate> {
        let day = self.day_of_month.as_deref()?.trim().parse().ok()?;
        let month = self.month.as_deref()?.trim().parse().ok()?;
        let year = self.year.as_deref()?.trim().parse().ok()?;
        NaiveDate::from_ymd_opt(year, month, day)
    }
}

#[derive(Debug, Deserialize)]
struct JournalReference {
    #[serde(rename = "@type")]
    reference_type: Option<String>,
    #[serde(rename = "@reference")]
    reference: Option<String>,
}

fn malformed(detail: impl Into<String>) -> AppError {
    AppError::Validation(format!("Malformed Worldpay notification: {}", detail.into()))
}

/// Parse a notification body. Merchant code and a status token are required;
/// everything else is optional.
pub fn parse_notification(payload: &str) -> AppResult<Notification> {
    let envelope: NotificationEnvelope =
        quick_xml::de::from_str(payload).map_err(|e| malformed(e.to_string()))?;

    let merchant_code = envelope
        .merchant_code
        .map(|code| code.trim().to_string())
        .filter(|code| !code.is_empty())
        .ok_or_else(|| malformed("merchantCode missing"))?;

    let event = envelope
        .notify
        .and_then(|notify| notify.order_status_event)
        .ok_or_else(|| malformed("orderStatusEvent missing"))?;

    let journal = event.journal;
    let status = event
        .payment
        .and_then(|payment| payment.last_event)
        .or_else(|| journal.as_ref().and_then(|j| j.journal_type.clone()))
        .map(|status| status.trim().to_string())
        .filter(|status| !status.is_empty())
        .ok_or_else(|| malformed("status missing"))?;

    let booking_date = journal
        .as_ref()
        .and_then(|j| j.booking_date.as_ref())
        .and_then(|b| b.date.as_ref())
        .and_then(|date| {
            let parsed = date.to_date();
            if parsed.is_none() {
                debug!(?date, "Ignoring invalid booking date");
            }
            parsed
        });

    let reference_of = |kind: &str| {
        journal.as_ref().and_then(|j| {
            j.references
                .iter()
                .find(|r| r.reference_type.as_deref() == Some(kind))
                .and_then(|r| r.reference.clone())
                .filter(|r| !r.trim().is_empty())
        })
    };

    Ok(Notification {
        merchant_code,
        status,
        booking_date,
        transaction_id: event.order_code.map(|code| code.trim().to_string()),
        reference: reference_of(REFUND_REFERENCE),
        refund_authorisation_reference: reference_of(REFUND_AUTHORISATION_REFERENCE),
    })
}
