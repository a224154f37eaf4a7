//! Logging utilities module
//!
//! This module provides centralized logging functionality and the scrubbing
//! applied to any gateway text before it reaches a log line or an error message.

use regex::Regex;
use std::sync::LazyLock;
use tracing::{info, warn};

static CARD_HOLDER_NAME_ELEMENT: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r"(?s)<cardHolderName>.*?</cardHolderName>").ok()
});

const REDACTED: &str = "[REDACTED]";

/// Logging utilities for the application
pub struct LoggingUtils;

impl LoggingUtils {
    /// Initialize logging with the specified configuration
    pub fn initialize(level: &str, format: &str, _structured: bool) -> crate::Result<()> {
        use tracing_subscriber::{fmt, EnvFilter};

        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(level));

        let builder = fmt::Subscriber::builder()
            .with_env_filter(filter)
            .with_target(false)
            .with_thread_ids(true)
            .with_thread_names(true)
            .with_file(true)
            .with_line_number(true)
            .with_ansi(false);

        let result = if format.eq_ignore_ascii_case("json") {
            tracing::subscriber::set_global_default(builder.json().finish())
        } else {
            tracing::subscriber::set_global_default(builder.finish())
        };

        result.map_err(|e| {
            crate::shared::error::AppError::Internal(format!("Failed to initialize logging: {}", e))
        })
    }

    /// Scrub cardholder-identifying values from free text.
    ///
    /// Removes every `<cardHolderName>` element and every literal occurrence of
    /// the supplied sensitive values.
    pub fn redact(text: &str, sensitive_values: &[&str]) -> String {
        let mut scrubbed = match CARD_HOLDER_NAME_ELEMENT.as_ref() {
            Some(pattern) => pattern
                .replace_all(text, format!("<cardHolderName>{}</cardHolderName>", REDACTED).as_str())
                .into_owned(),
            None => text.to_string(),
        };

        for value in sensitive_values.iter().map(|v| v.trim()).filter(|v| !v.is_empty()) {
            scrubbed = scrubbed.replace(value, REDACTED);
        }

        scrubbed
    }

    /// Log an outbound gateway request
    pub fn log_gateway_request(gateway: &str, order_type: &str, transaction_id: &str, gateway_account_id: &str) {
        info!(
            gateway = %gateway,
            order_type = %order_type,
            transaction_id = %transaction_id,
            gateway_account_id = %gateway_account_id,
            "Sending request to gateway"
        );
    }

    /// Log a rejected notification origin
    pub fn log_forbidden_notification(gateway: &str, client_ip: &str) {
        warn!(
            gateway = %gateway,
            client_ip = %client_ip,
            "Notification received from untrusted origin"
        );
    }
}
