//! Test suite for the gateway connector
//!
//! Unit tests live next to the code they cover. This module holds the shared
//! fixtures and the cross-module scenarios (authorisation with retry, 3DS
//! round-trips, notification reconciliation, webhook routes).

pub mod fixtures;
pub mod integration;

/// Test configuration and utilities
pub mod config {
    use crate::config::AppConfig;
    use std::sync::Once;

    static INIT: Once = Once::new();

    /// Initialize test environment
    pub fn init() {
        INIT.call_once(|| {
            let _ = tracing_subscriber::fmt()
                .with_env_filter("debug")
                .with_test_writer()
                .try_init();
        });
    }

    /// Configuration with a random port and secured notifications off
    pub fn test_config() -> AppConfig {
        let mut config = AppConfig::default();
        config.server.port = 0;
        config.server.bind_address = "127.0.0.1".parse().unwrap();
        config.worldpay.secure_notifications_enabled = false;
        config
    }
}
