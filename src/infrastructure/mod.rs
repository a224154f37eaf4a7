//! Infrastructure layer - External concerns and adapters
//!
//! This module contains the outbound gateway integration, the storage and
//! DNS adapters, and the inbound HTTP surface.

pub mod adapters;
pub mod gateways;
pub mod http;

pub use adapters::{InMemoryPaymentRepository, MonitoringAdapter, PaymentRepository};
pub use gateways::{PaymentGateway, WorldpayGateway};
