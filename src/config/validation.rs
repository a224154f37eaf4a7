//! Configuration validation module
//!
//! Cross-field rules the validator derives cannot express.

use crate::config::app_config::WorldpayConfig;
use crate::config::AppConfig;
use crate::shared::error::AppError;

/// Configuration validator for additional validation logic
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate the complete configuration
    pub fn validate_config(config: &AppConfig) -> crate::Result<()> {
        Self::validate_gateway_url(&config.worldpay.live_url)?;
        Self::validate_gateway_url(&config.worldpay.test_url)?;
        Self::validate_notification_settings(&config.worldpay)?;
        Ok(())
    }

    fn validate_gateway_url(url: &str) -> crate::Result<()> {
        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(AppError::Validation(
                "Gateway URL must start with http:// or https://".to_string(),
            ));
        }

        if url.contains("localhost") || url.contains("127.0.0.1") {
            // Allow localhost for development
            Ok(())
        } else if !url.starts_with("https://") {
            Err(AppError::Validation("Production gateway URL must use HTTPS".to_string()))
        } else {
            Ok(())
        }
    }

    fn validate_notification_settings(worldpay: &WorldpayConfig) -> crate::Result<()> {
        if !worldpay.secure_notifications_enabled {
            tracing::warn!("Notification origin checks are disabled");
            return Ok(());
        }

        if worldpay.notification_domain.is_empty() {
            return Err(AppError::Validation(
                "notification_domain is required when secure notifications are enabled".to_string(),
            ));
        }

        if !worldpay.notification_domain.starts_with('.') {
            return Err(AppError::Validation(
                "notification_domain must start with '.'".to_string(),
            ));
        }

        Ok(())
    }
}
