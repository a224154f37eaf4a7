//! Gateway-initiated notification models

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One parsed gateway callback
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub merchant_code: String,
    pub status: String,
    pub booking_date: Option<NaiveDate>,
    pub transaction_id: Option<String>,
    /// Platform refund reference, present on refund events
    pub reference: Option<String>,
    /// Present when the refund was requested through the authenticated API
    pub refund_authorisation_reference: Option<String>,
}

impl Notification {
    pub fn transaction_id(&self) -> Option<&str> {
        self.transaction_id.as_deref().filter(|id| !id.trim().is_empty())
    }
}

/// What the processor tells the sender
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationDisposition {
    /// Processed or deliberately ignored; the sender must not resend
    Acknowledged,
    /// Origin check failed; nothing was touched
    Forbidden,
    /// Transient condition; the sender should redeliver later
    NotYetHandled,
}

impl NotificationDisposition {
    pub fn label(&self) -> &'static str {
        match self {
            NotificationDisposition::Acknowledged => "acknowledged",
            NotificationDisposition::Forbidden => "forbidden",
            NotificationDisposition::NotYetHandled => "not_yet_handled",
        }
    }
}
