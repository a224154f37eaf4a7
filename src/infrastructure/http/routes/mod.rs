//! HTTP routes module
//!
//! This module contains all HTTP route configurations.

pub mod builder;
pub mod health;
pub mod metrics;
pub mod notifications;

pub use builder::RouteBuilder;
pub use health::HealthRoutes;
pub use metrics::MetricsRoutes;
pub use notifications::NotificationRoutes;
