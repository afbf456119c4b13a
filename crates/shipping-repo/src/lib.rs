use shipping_types::ports::event_store::EventStore;
use std::sync::Arc;

pub mod fixtures;
pub mod memory;
#[cfg(feature = "sqlite")]
pub mod sqlite;

use memory::{InMemoryConfigStore, InMemoryEventStore, InMemoryTransactionStore, InMemoryUserStore};

/// Store adapters backing one gateway process.
#[derive(Clone)]
pub struct Repo {
    pub config: InMemoryConfigStore,
    pub transactions: InMemoryTransactionStore,
    pub users: InMemoryUserStore,
    pub events: Arc<dyn EventStore>,
}

pub async fn build_repo(url: Option<&str>) -> anyhow::Result<Repo> {
    Repo::build_repo(url).await
}

impl Repo {
    pub fn in_memory() -> Self {
        Self {
            config: InMemoryConfigStore::new(),
            transactions: InMemoryTransactionStore::new(),
            users: InMemoryUserStore::new(),
            events: Arc::new(InMemoryEventStore::new()),
        }
    }

    #[cfg(not(feature = "sqlite"))]
    pub async fn build_repo(database_url: Option<&str>) -> anyhow::Result<Self> {
        if database_url.is_some() {
            tracing::warn!("DATABASE_URL ignored: built without the `sqlite` feature");
        }
        Ok(Self::in_memory())
    }

    #[cfg(feature = "sqlite")]
    pub async fn build_repo(database_url: Option<&str>) -> anyhow::Result<Self> {
        let mut repo = Self::in_memory();
        if let Some(url) = database_url {
            repo.events = Arc::new(sqlite::SqliteEventStore::new(url).await?);
            tracing::info!("event log stored in {}", url);
        }
        Ok(repo)
    }

    pub async fn load_fixtures(&self, path: &str) -> anyhow::Result<()> {
        fixtures::Fixtures::from_file(path)
            .await?
            .load_into(&self.config, &self.transactions, &self.users)
    }
}
