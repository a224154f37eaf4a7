//! Infrastructure adapters module
//!
//! This module contains adapters for external services and infrastructure concerns.

pub mod gateway_transport;
pub mod hostname_resolver;
pub mod monitoring;
pub mod payments_store;

// Re-export all adapters
pub use gateway_transport::{
    BasicCredentials, GatewayHttpResponse, GatewayRequest, GatewayTransport, ReqwestGatewayTransport,
    TransportError,
};
pub use hostname_resolver::{DnsHostnameResolver, HostnameResolver};
pub use monitoring::MonitoringAdapter;
pub use payments_store::{InMemoryPaymentRepository, PaymentRepository};
