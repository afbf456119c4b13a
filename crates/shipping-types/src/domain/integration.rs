use serde::{Deserialize, Serialize};

use crate::domain::carrier::Parcel;

pub const DEFAULT_BASE_URI: &str = "https://www.shippypro.com/api/v1";

/// Private integration config of one platform + env, as served by the config store.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct IntegrationConfig {
    pub api_key: Option<String>,
    pub base_uri: Option<String>,
    pub webhook_secret: Option<String>,
    #[serde(default)]
    pub signature_scheme: SignatureScheme,
    #[serde(default)]
    pub carrier_settings: CarrierSettings,
}

/// How inbound webhook signatures are checked against the webhook secret.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum SignatureScheme {
    /// The signature header carries the shared secret itself.
    #[default]
    SharedSecret,
    /// The signature header carries hex(HMAC-SHA256(secret, body)).
    HmacSha256,
}

/// Resolved credentials for one platform + env. Never cached across calls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub api_key: String,
    pub base_uri: String,
    pub webhook_secret: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CarrierSettings {
    pub default_carrier: Option<String>,
    /// Fixed fee added to the declared value, in minor units.
    #[serde(default)]
    pub fixed_fee: i64,
    pub default_packaging_size: Option<String>,
    #[serde(default)]
    pub pricing: Vec<PackagePricing>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PackagePricing {
    /// Carrier this entry applies to; `None` applies to every carrier.
    pub carrier: Option<String>,
    pub size: String,
    /// Package price in minor units.
    pub price: i64,
    pub dimensions: Parcel,
}

impl CarrierSettings {
    /// Pricing entry for `size`, preferring a carrier-specific entry over a generic one.
    pub fn pricing_for(&self, carrier: &str, size: &str) -> Option<&PackagePricing> {
        let sized = || self.pricing.iter().filter(move |p| p.size == size);
        sized()
            .find(|p| {
                p.carrier
                    .as_deref()
                    .is_some_and(|c| c.eq_ignore_ascii_case(carrier))
            })
            .or_else(|| sized().find(|p| p.carrier.is_none()))
    }
}
