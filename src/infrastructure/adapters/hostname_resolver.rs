//! Reverse DNS lookups for notification origin checks

use async_trait::async_trait;
use std::net::IpAddr;
use tracing::debug;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait HostnameResolver: Send + Sync {
    /// Hostname the address reverse-resolves to, if any
    async fn reverse_lookup(&self, ip: IpAddr) -> Option<String>;
}

/// Resolver backed by the system's `getnameinfo`
#[derive(Debug, Default, Clone)]
pub struct DnsHostnameResolver;

#[async_trait]
impl HostnameResolver for DnsHostnameResolver {
    async fn reverse_lookup(&self, ip: IpAddr) -> Option<String> {
        match tokio::task::spawn_blocking(move || dns_lookup::lookup_addr(&ip)).await {
            Ok(Ok(hostname)) => Some(hostname),
            Ok(Err(e)) => {
                debug!(ip = %ip, error = %e, "Reverse lookup failed");
                None
            }
            Err(e) => {
                debug!(ip = %ip, error = %e, "Reverse lookup task aborted");
                None
            }
        }
    }
}
