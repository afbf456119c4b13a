use serde::{Deserialize, Serialize};

/// Address or contact block as it is stored on users and transactions: every field may be absent.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AddressBlock {
    pub name: Option<String>,
    #[serde(alias = "companyName")]
    pub company: Option<String>,
    #[serde(alias = "street")]
    pub street1: Option<String>,
    pub street2: Option<String>,
    pub city: Option<String>,
    #[serde(alias = "region")]
    pub state: Option<String>,
    #[serde(alias = "postalCode")]
    pub zip: Option<String>,
    pub country: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
}

/// Contact values used when the address block itself leaves them out.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactFallback {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("address field missing: {0}")]
pub struct MissingField(pub &'static str);

/// Carrier-ready address with every required field present.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Address {
    pub name: String,
    #[serde(default)]
    pub company: String,
    pub street1: String,
    #[serde(default)]
    pub street2: String,
    pub city: String,
    #[serde(default)]
    pub state: String,
    pub zip: String,
    pub country: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub email: String,
}

fn present(v: Option<String>) -> Option<String> {
    v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

fn required(v: Option<String>, field: &'static str) -> Result<String, MissingField> {
    present(v).ok_or(MissingField(field))
}

impl AddressBlock {
    pub fn has_street(&self) -> bool {
        present(self.street1.clone()).is_some()
    }

    /// Resolves the block into a carrier address. Name and contact fields fall back to
    /// `contact`; postal fields never do.
    pub fn resolve(self, contact: ContactFallback) -> Result<Address, MissingField> {
        let name = present(self.name)
            .or(present(contact.name))
            .ok_or(MissingField("name"))?;
        Ok(Address {
            name,
            company: present(self.company).unwrap_or_default(),
            street1: required(self.street1, "street1")?,
            street2: present(self.street2).unwrap_or_default(),
            city: required(self.city, "city")?,
            state: present(self.state).unwrap_or_default(),
            zip: required(self.zip, "zip")?,
            country: required(self.country, "country")?,
            phone: present(self.phone)
                .or(present(contact.phone))
                .unwrap_or_default(),
            email: present(self.email)
                .or(present(contact.email))
                .unwrap_or_default(),
        })
    }
}
