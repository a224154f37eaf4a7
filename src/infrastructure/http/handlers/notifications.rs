//! Gateway notification handler
//!
//! The acknowledgement body is what Worldpay expects; anything other than a
//! 200 with `[OK]` makes it redeliver.

use bytes::Bytes;
use std::sync::Arc;
use tracing::warn;
use warp::http::StatusCode;
use warp::Reply;

use crate::application::services::NotificationService;
use crate::domain::notification::NotificationDisposition;
use crate::infrastructure::http::utils::client_ip_from_forwarded;

pub const ACKNOWLEDGEMENT: &str = "[OK]";

/// Handle a Worldpay order notification
pub async fn handle_worldpay_notification(
    body: Bytes,
    forwarded_for: Option<String>,
    service: Arc<NotificationService>,
) -> Result<impl Reply, warp::reject::Rejection> {
    let client_ip = client_ip_from_forwarded(forwarded_for.as_deref());
    if client_ip.is_none() {
        warn!(forwarded_for = ?forwarded_for, "Notification without a usable caller address");
    }

    let payload = String::from_utf8_lossy(&body);
    let disposition = service.handle(&payload, client_ip).await;

    let (text, status) = match disposition {
        NotificationDisposition::Acknowledged => (ACKNOWLEDGEMENT, StatusCode::OK),
        NotificationDisposition::Forbidden => ("", StatusCode::FORBIDDEN),
        NotificationDisposition::NotYetHandled => ("", StatusCode::INTERNAL_SERVER_ERROR),
    };
    Ok(warp::reply::with_status(text, status))
}
