//! Typed shapes of the carrier API calls the gateway makes.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::domain::address::Address;
use crate::domain::de::{f64_or_string, numeric_id, one_or_many, opt_string_or_number, string_or_number};

pub const GET_RATES: &str = "GetRates";
pub const SHIP: &str = "Ship";
pub const GET_ORDER: &str = "GetOrder";

fn default_shipping_service() -> String {
    "Standard".into()
}

/// Parcel spec; dimensions in cm, weight in kg.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct Parcel {
    pub length: f64,
    pub width: f64,
    pub height: f64,
    pub weight: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RateRequest {
    pub to_address: Address,
    pub from_address: Address,
    pub parcels: Vec<Parcel>,
    #[serde(rename = "TotalValue")]
    pub total_value: String,
    #[serde(rename = "ContentDescription", default)]
    pub content_description: String,
    #[serde(rename = "ShippingService", default = "default_shipping_service")]
    pub shipping_service: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ShipRequest {
    pub to_address: Address,
    pub from_address: Address,
    pub parcels: Vec<Parcel>,
    #[serde(rename = "TotalValue")]
    pub total_value: String,
    #[serde(rename = "TransactionID")]
    pub transaction_id: String,
    #[serde(rename = "ContentDescription")]
    pub content_description: String,
    #[serde(rename = "CarrierName")]
    pub carrier_name: String,
    #[serde(rename = "CarrierService")]
    pub carrier_service: String,
    #[serde(rename = "CarrierID", serialize_with = "numeric_id")]
    pub carrier_id: String,
    #[serde(rename = "RateID")]
    pub rate_id: String,
    #[serde(rename = "OrderID", serialize_with = "numeric_id")]
    pub order_id: String,
    #[serde(rename = "ShipmentCost")]
    pub shipment_cost: f64,
    #[serde(rename = "AmountPaid")]
    pub amount_paid: f64,
    #[serde(rename = "ShippingService", default = "default_shipping_service")]
    pub shipping_service: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OrderLookup {
    #[serde(
        rename = "OrderID",
        deserialize_with = "string_or_number",
        serialize_with = "numeric_id"
    )]
    pub order_id: String,
}

/// One carrier API invocation.
#[derive(Debug, Clone, PartialEq)]
pub enum CarrierCall {
    GetRates(RateRequest),
    Ship(ShipRequest),
    GetOrder(OrderLookup),
    /// Passthrough for carrier methods without a typed shape.
    RawInvoke { method: String, params: Value },
}

impl CarrierCall {
    /// Builds a call from a caller-supplied method name and parameter map.
    ///
    /// `GetRates` and `GetOrder` must fit their typed shapes; any other name is passed
    /// through untouched and left for the carrier to accept or reject.
    pub fn from_invocation(method: &str, params: Value) -> Result<Self, serde_json::Error> {
        match method {
            GET_RATES => Ok(CarrierCall::GetRates(serde_json::from_value(params)?)),
            GET_ORDER => Ok(CarrierCall::GetOrder(serde_json::from_value(params)?)),
            _ => Ok(CarrierCall::RawInvoke {
                method: method.to_string(),
                params,
            }),
        }
    }

    pub fn get_order(order_id: impl Into<String>) -> Self {
        CarrierCall::GetOrder(OrderLookup {
            order_id: order_id.into(),
        })
    }

    pub fn method_name(&self) -> &str {
        match self {
            CarrierCall::GetRates(_) => GET_RATES,
            CarrierCall::Ship(_) => SHIP,
            CarrierCall::GetOrder(_) => GET_ORDER,
            CarrierCall::RawInvoke { method, .. } => method,
        }
    }

    pub fn params(&self) -> Result<Value, serde_json::Error> {
        match self {
            CarrierCall::GetRates(r) => serde_json::to_value(r),
            CarrierCall::Ship(s) => serde_json::to_value(s),
            CarrierCall::GetOrder(o) => serde_json::to_value(o),
            CarrierCall::RawInvoke { params, .. } => Ok(params.clone()),
        }
    }

    /// Request body: `{ "Method": ..., "Params": ... }`.
    pub fn to_body(&self) -> Result<Value, serde_json::Error> {
        Ok(json!({ "Method": self.method_name(), "Params": self.params()? }))
    }
}

/// One entry of a rate-shopping response.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CarrierRate {
    #[serde(rename = "carrier")]
    pub carrier_name: String,
    #[serde(default)]
    pub service: String,
    #[serde(default, deserialize_with = "string_or_number")]
    pub carrier_id: String,
    #[serde(default, deserialize_with = "string_or_number")]
    pub rate_id: String,
    #[serde(default, deserialize_with = "string_or_number")]
    pub order_id: String,
    #[serde(rename = "rate", default, deserialize_with = "f64_or_string")]
    pub price: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RatesResponse {
    #[serde(rename = "Rates", default)]
    pub rates: Vec<CarrierRate>,
}

impl RatesResponse {
    pub fn for_carrier(&self, carrier: &str) -> Option<&CarrierRate> {
        self.rates
            .iter()
            .find(|r| r.carrier_name.eq_ignore_ascii_case(carrier))
    }
}

/// Label purchase response (partial, only fields we need).
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct ShipmentResult {
    #[serde(rename = "NewOrderID", default, deserialize_with = "opt_string_or_number")]
    pub new_order_id: Option<String>,
    #[serde(rename = "TrackingNumber", default, deserialize_with = "opt_string_or_number")]
    pub tracking_number: Option<String>,
    #[serde(rename = "TrackingExternalLink", default)]
    pub tracking_link: Option<String>,
    #[serde(rename = "LabelURL", default, deserialize_with = "one_or_many")]
    pub label_urls: Vec<String>,
}

impl ShipmentResult {
    pub fn first_label_url(&self) -> Option<&str> {
        self.label_urls.first().map(String::as_str)
    }
}
