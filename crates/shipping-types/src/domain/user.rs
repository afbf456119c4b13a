use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::domain::address::AddressBlock;

/// Platform user, owned by the user store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub firstname: Option<String>,
    pub lastname: Option<String>,
    pub email: Option<String>,
    pub username: Option<String>,
    #[serde(default)]
    pub platform_data: UserPlatformData,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct UserPlatformData {
    #[serde(rename = "_private", default)]
    pub private: PrivateData,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PrivateData {
    #[serde(default)]
    pub verified: VerifiedInfo,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct VerifiedInfo {
    pub individual_info: Option<AddressBlock>,
    pub company_info: Option<AddressBlock>,
}

impl User {
    /// "Firstname Lastname", falling back to the username.
    pub fn display_name(&self) -> Option<String> {
        let full = [self.firstname.as_deref(), self.lastname.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        if full.is_empty() {
            self.username.clone().filter(|u| !u.trim().is_empty())
        } else {
            Some(full)
        }
    }

    /// Verified postal info; company info takes precedence over individual info.
    pub fn verified_address(&self) -> Option<&AddressBlock> {
        let verified = &self.platform_data.private.verified;
        verified
            .company_info
            .as_ref()
            .filter(|b| b.has_street())
            .or_else(|| verified.individual_info.as_ref().filter(|b| b.has_street()))
    }

    pub fn verified_phone(&self) -> Option<String> {
        let verified = &self.platform_data.private.verified;
        verified
            .individual_info
            .as_ref()
            .and_then(|b| b.phone.clone())
            .or_else(|| verified.company_info.as_ref().and_then(|b| b.phone.clone()))
    }
}
