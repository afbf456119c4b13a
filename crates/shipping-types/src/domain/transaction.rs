use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::domain::address::AddressBlock;
use crate::domain::de::opt_string_or_number;

/// Marketplace transaction, owned by the platform's transaction store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: String,
    pub owner_id: Option<String>,
    pub taker_id: Option<String>,
    pub currency: String,
    #[serde(default)]
    pub taker_amount: i64,
    #[serde(default)]
    pub metadata: TransactionMetadata,
    #[serde(default)]
    pub asset_snapshot: AssetSnapshot,
    #[serde(default)]
    pub platform_data: PlatformData,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TransactionMetadata {
    /// Explicit carrier override for this transaction.
    pub carrier: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    /// Destination address block.
    pub address: Option<AddressBlock>,
    /// Shipping fare recorded at checkout, in minor units.
    pub shipping_fare: Option<i64>,
    /// Extra amount transferred by the taker towards shipping, in minor units.
    pub taker_transfer: Option<i64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AssetSnapshot {
    pub id: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    #[serde(default)]
    pub custom_attributes: CustomAttributes,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CustomAttributes {
    pub packaging_size: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PlatformData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tracking: Option<TrackingInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shippypro: Option<ShippyproRecord>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TrackingInfo {
    pub number: Option<String>,
    pub link: Option<String>,
}

/// Carrier-side bookkeeping kept on the transaction once a label is purchased.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ShippyproRecord {
    #[serde(default, deserialize_with = "opt_string_or_number")]
    pub order_id: Option<String>,
    pub label_url: Option<String>,
}

/// Partial update of `platformData.tracking` and `platformData.shippypro`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ShipmentPatch {
    pub tracking: TrackingInfo,
    pub shippypro: ShippyproRecord,
}

impl ShipmentPatch {
    /// Merges the patch: only fields carried by the patch are overwritten.
    pub fn apply(&self, tx: &mut Transaction) {
        let data = &mut tx.platform_data;
        let tracking = data.tracking.get_or_insert_with(TrackingInfo::default);
        if self.tracking.number.is_some() {
            tracking.number = self.tracking.number.clone();
        }
        if self.tracking.link.is_some() {
            tracking.link = self.tracking.link.clone();
        }
        let record = data.shippypro.get_or_insert_with(ShippyproRecord::default);
        if self.shippypro.order_id.is_some() {
            record.order_id = self.shippypro.order_id.clone();
        }
        if self.shippypro.label_url.is_some() {
            record.label_url = self.shippypro.label_url.clone();
        }
    }
}

impl Transaction {
    /// Carrier order already created for this transaction, if any.
    pub fn existing_order_id(&self) -> Option<&str> {
        self.platform_data
            .shippypro
            .as_ref()
            .and_then(|r| r.order_id.as_deref())
            .filter(|id| !id.is_empty())
    }

    pub fn packaging_size(&self) -> Option<&str> {
        self.asset_snapshot
            .custom_attributes
            .packaging_size
            .as_deref()
    }

    pub fn content_description(&self) -> String {
        self.asset_snapshot
            .name
            .clone()
            .or_else(|| self.asset_snapshot.description.clone())
            .unwrap_or_else(|| format!("Transaction {}", self.id))
    }
}
