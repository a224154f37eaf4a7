//! HTTP transport adapter for gateway requests
//!
//! One POST per operation. Timeouts and non-2xx statuses come back as
//! classified [`TransportError`]s so callers can tell them apart; nothing is
//! retried at this layer.

use async_trait::async_trait;
use reqwest::header::{CONTENT_TYPE, COOKIE};
use reqwest::Client;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

use crate::infrastructure::gateways::GatewayOrder;
use crate::shared::error::{AppError, AppResult};

/// Basic-auth pair the gateway expects on every request
#[derive(Clone, PartialEq, Eq)]
pub struct BasicCredentials {
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for BasicCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BasicCredentials")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayRequest {
    pub url: String,
    pub order: GatewayOrder,
    pub credentials: Option<BasicCredentials>,
    /// Cookies to send back to the gateway, as name/value pairs
    pub cookies: Vec<(String, String)>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayHttpResponse {
    pub status: u16,
    pub body: String,
    pub cookies: Vec<(String, String)>,
}

impl GatewayHttpResponse {
    pub fn cookie(&self, name: &str) -> Option<&str> {
        self.cookies
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }
}

/// Classified transport failure
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("gateway request timed out: {0}")]
    Timeout(String),

    #[error("gateway returned HTTP {status}")]
    Status { status: u16, body: String },

    #[error("gateway request failed: {0}")]
    Io(String),
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GatewayTransport: Send + Sync {
    async fn post(&self, request: GatewayRequest) -> Result<GatewayHttpResponse, TransportError>;
}

/// reqwest-backed transport with connect and read timeouts
pub struct ReqwestGatewayTransport {
    client: Client,
}

impl ReqwestGatewayTransport {
    pub fn new(connect_timeout: Duration, read_timeout: Duration) -> AppResult<Self> {
        let client = Client::builder()
            .connect_timeout(connect_timeout)
            .timeout(read_timeout)
            .build()
            .map_err(|e| AppError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client })
    }

    fn classify(error: reqwest::Error) -> TransportError {
        if error.is_timeout() {
            TransportError::Timeout(error.to_string())
        } else {
            TransportError::Io(error.to_string())
        }
    }
}

#[async_trait]
impl GatewayTransport for ReqwestGatewayTransport {
    async fn post(&self, request: GatewayRequest) -> Result<GatewayHttpResponse, TransportError> {
        let mut builder = self
            .client
            .post(&request.url)
            .header(CONTENT_TYPE, request.order.content_type)
            .body(request.order.payload);

        if let Some(credentials) = &request.credentials {
            builder = builder.basic_auth(&credentials.username, Some(&credentials.password));
        }

        if !request.cookies.is_empty() {
            let cookie_header = request
                .cookies
                .iter()
                .map(|(name, value)| format!("{}={}", name, value))
                .collect::<Vec<_>>()
                .join("; ");
            builder = builder.header(COOKIE, cookie_header);
        }

        let response = builder.send().await.map_err(Self::classify)?;

        let status = response.status().as_u16();
        let cookies: Vec<(String, String)> = response
            .cookies()
            .map(|c| (c.name().to_string(), c.value().to_string()))
            .collect();
        let body = response.text().await.map_err(Self::classify)?;

        debug!(
            order_type = %request.order.order_type,
            status = status,
            "Gateway responded"
        );

        if !(200..300).contains(&status) {
            return Err(TransportError::Status { status, body });
        }

        Ok(GatewayHttpResponse { status, body, cookies })
    }
}
