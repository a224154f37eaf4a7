//! HTTP route handlers module
//!
//! One handler per endpoint family, kept apart from the filters that route to them.

pub mod health;
pub mod metrics;
pub mod notifications;

pub use health::handle_health_request;
pub use metrics::handle_prometheus_request;
pub use notifications::handle_worldpay_notification;
