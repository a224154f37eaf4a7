//! Application configuration structures
//!
//! This module contains the main configuration structures for the application.

use serde::{Deserialize, Serialize};
use std::net::{IpAddr, Ipv4Addr};
use std::time::Duration;
use validator::Validate;

use crate::domain::account::GatewayAccount;

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ServerConfig {
    /// Server address to bind to
    pub bind_address: IpAddr,

    /// Server port
    #[validate(range(min = 1, max = 65535))]
    pub port: u16,

    /// Maximum notification body size in bytes
    #[validate(range(min = 1024, max = 10485760))] // 1KB to 10MB
    pub max_request_size: u64,
}

/// Worldpay gateway configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct WorldpayConfig {
    /// Endpoint used for test accounts
    #[validate(url)]
    pub test_url: String,

    /// Endpoint used for live accounts
    #[validate(url)]
    pub live_url: String,

    #[validate(range(min = 100, max = 60000))]
    pub connect_timeout_ms: u64,

    #[validate(range(min = 100, max = 300000))]
    pub read_timeout_ms: u64,

    /// Reject notifications whose source does not reverse-resolve into `notification_domain`
    pub secure_notifications_enabled: bool,

    /// Trusted domain suffix, leading dot included (e.g. `.worldpay.com`)
    pub notification_domain: String,
}

impl WorldpayConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms)
    }

    pub fn url_for(&self, account: &GatewayAccount) -> &str {
        if account.live {
            &self.live_url
        } else {
            &self.test_url
        }
    }
}

impl Default for WorldpayConfig {
    fn default() -> Self {
        Self {
            test_url: "https://secure-test.worldpay.com/jsp/merchant/xml/paymentService.jsp".to_string(),
            live_url: "https://secure.worldpay.com/jsp/merchant/xml/paymentService.jsp".to_string(),
            connect_timeout_ms: 5000,
            read_timeout_ms: 30000,
            secure_notifications_enabled: true,
            notification_domain: ".worldpay.com".to_string(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LoggingConfig {
    /// Log level
    #[validate(length(min = 1))]
    pub level: String,

    /// Log format
    #[validate(length(min = 1))]
    pub format: String,

    /// Enable structured logging
    pub structured: bool,
}

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub worldpay: WorldpayConfig,
    pub logging: LoggingConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                bind_address: IpAddr::V4(Ipv4Addr::LOCALHOST),
                port: 9300,
                max_request_size: 64 * 1024,
            },
            worldpay: WorldpayConfig::default(),
            logging: LoggingConfig {
                level: "info".to_string(),
                format: "json".to_string(),
                structured: true,
            },
        }
    }
}

impl AppConfig {
    /// Load configuration from file and environment variables
    pub fn load() -> crate::Result<Self> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("Conf").required(false))
            .add_source(config::Environment::with_prefix("GATEWAY_CONNECTOR").separator("__"))
            .build()
            .map_err(|e| crate::shared::error::AppError::Config(format!("Failed to build configuration: {}", e)))?;

        let config: AppConfig = config
            .try_deserialize()
            .map_err(|e| crate::shared::error::AppError::Config(format!("Failed to deserialize configuration: {}", e)))?;

        config
            .validate_config()
            .map_err(|e| crate::shared::error::AppError::Validation(format!("Configuration validation failed: {}", e)))?;

        crate::config::ConfigValidator::validate_config(&config)?;

        Ok(config)
    }

    /// Validate each section
    pub fn validate_config(&self) -> Result<(), validator::ValidationErrors> {
        self.server.validate()?;
        self.worldpay.validate()?;
        self.logging.validate()?;
        Ok(())
    }

    /// Get server address as string
    pub fn server_address(&self) -> String {
        format!("{}:{}", self.server.bind_address, self.server.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::fixtures;

    #[test]
    fn test_default_config_is_valid() {
        assert!(AppConfig::default().validate_config().is_ok());
    }

    #[test]
    fn test_invalid_gateway_url_rejected() {
        let mut config = AppConfig::default();
        config.worldpay.live_url = "not a url".to_string();
        assert!(config.validate_config().is_err());
    }

    #[test]
    fn test_url_selected_by_account_type() {
        let config = WorldpayConfig::default();
        let mut account = fixtures::account();
        account.live = false;
        assert!(config.url_for(&account).contains("secure-test"));
        account.live = true;
        assert!(!config.url_for(&account).contains("secure-test"));
    }
}
