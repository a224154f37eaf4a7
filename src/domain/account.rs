//! Gateway account domain models

use serde::{Deserialize, Serialize};

/// Payment providers this service knows how to talk to
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum GatewayName {
    Worldpay,
}

impl GatewayName {
    pub fn as_str(&self) -> &'static str {
        match self {
            GatewayName::Worldpay => "worldpay",
        }
    }
}

impl std::fmt::Display for GatewayName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for GatewayName {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "worldpay" => Ok(GatewayName::Worldpay),
            _ => Err(format!("unsupported gateway: {}", s)),
        }
    }
}

/// 3-D Secure integration generation configured for an account
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum IntegrationVersion {
    /// Legacy issuer redirect with PaRequest/PaResponse
    #[serde(rename = "1")]
    One,
    /// Flex: device data collection plus challenge window
    #[serde(rename = "2")]
    #[default]
    Two,
}

/// Account-level 3-D Secure settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct ThreeDsSettings {
    pub requires_3ds: bool,
    pub integration_version: IntegrationVersion,
    /// Gateway-side risk exemption engine is switched on for this merchant
    pub exemption_engine_enabled: bool,
}

impl ThreeDsSettings {
    /// An exemption may only be requested when 3DS is enforced and the engine is on
    pub fn exemption_engine_applies(&self) -> bool {
        self.requires_3ds && self.exemption_engine_enabled
    }
}

/// Merchant credentials held for a gateway account
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct MerchantCredentials {
    pub merchant_code: String,
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for MerchantCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MerchantCredentials")
            .field("merchant_code", &self.merchant_code)
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

/// A merchant's account with a payment provider
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GatewayAccount {
    pub id: String,
    pub gateway: GatewayName,
    pub live: bool,
    pub credentials: MerchantCredentials,
    pub three_ds: ThreeDsSettings,
    pub send_payer_ip_address_to_gateway: bool,
    pub send_payer_email_to_gateway: bool,
    /// Telephone payments can be notified before the platform has recorded them
    pub allow_telephone_payment_notifications: bool,
}

impl GatewayAccount {
    pub fn merchant_code(&self) -> &str {
        &self.credentials.merchant_code
    }

    pub fn account_type(&self) -> &'static str {
        if self.live {
            "live"
        } else {
            "test"
        }
    }
}
