use serde::Deserialize;
use shipping_types::domain::integration::IntegrationConfig;
use shipping_types::domain::platform::PlatformScope;
use shipping_types::domain::transaction::Transaction;
use shipping_types::domain::user::User;

use crate::memory::{InMemoryConfigStore, InMemoryTransactionStore, InMemoryUserStore};

/// Seed data for the in-memory stores, keyed by public platform id.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Fixtures {
    #[serde(default)]
    pub configs: Vec<Scoped<IntegrationConfig>>,
    #[serde(default)]
    pub transactions: Vec<Scoped<Transaction>>,
    #[serde(default)]
    pub users: Vec<Scoped<User>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scoped<T> {
    pub public_platform_id: String,
    #[serde(alias = "config", alias = "transaction", alias = "user")]
    pub value: T,
}

fn scope_of(public_id: &str) -> anyhow::Result<PlatformScope> {
    PlatformScope::parse_public_id(public_id)
        .ok_or_else(|| anyhow::anyhow!("malformed public platform id {public_id:?}"))
}

impl Fixtures {
    pub async fn from_file(path: &str) -> anyhow::Result<Self> {
        let raw = tokio::fs::read_to_string(path).await?;
        Ok(serde_json::from_str(&raw)?)
    }

    pub fn load_into(
        self,
        config: &InMemoryConfigStore,
        transactions: &InMemoryTransactionStore,
        users: &InMemoryUserStore,
    ) -> anyhow::Result<()> {
        for c in self.configs {
            config.insert(scope_of(&c.public_platform_id)?, c.value);
        }
        for t in self.transactions {
            transactions.insert(&scope_of(&t.public_platform_id)?, t.value);
        }
        for u in self.users {
            users.insert(&scope_of(&u.public_platform_id)?, u.value);
        }
        Ok(())
    }
}
