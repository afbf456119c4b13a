use async_trait::async_trait;
use dashmap::DashMap;
use shipping_types::domain::event::{Event, EventQuery, NewEvent, SortOrder};
use shipping_types::domain::integration::IntegrationConfig;
use shipping_types::domain::platform::PlatformScope;
use shipping_types::domain::transaction::{ShipmentPatch, Transaction};
use shipping_types::domain::user::User;
use shipping_types::ports::config_store::ConfigStore;
use shipping_types::ports::event_store::{EventStore, EventStoreError};
use shipping_types::ports::transaction_store::TransactionStore;
use shipping_types::ports::user_store::UserStore;
use shipping_types::ports::StoreError;
use std::sync::Arc;

type ScopedKey = (PlatformScope, String);

fn key(scope: &PlatformScope, id: &str) -> ScopedKey {
    (scope.clone(), id.to_string())
}

#[derive(Clone, Default)]
pub struct InMemoryConfigStore {
    pub map: Arc<DashMap<PlatformScope, IntegrationConfig>>,
}

impl InMemoryConfigStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, scope: PlatformScope, config: IntegrationConfig) {
        self.map.insert(scope, config);
    }
}

#[async_trait]
impl ConfigStore for InMemoryConfigStore {
    async fn private_config(
        &self,
        scope: &PlatformScope,
    ) -> Result<Option<IntegrationConfig>, StoreError> {
        Ok(self.map.get(scope).map(|r| r.clone()))
    }
}

#[derive(Clone, Default)]
pub struct InMemoryTransactionStore {
    pub map: Arc<DashMap<ScopedKey, Transaction>>,
}

impl InMemoryTransactionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, scope: &PlatformScope, tx: Transaction) {
        self.map.insert(key(scope, &tx.id), tx);
    }
}

#[async_trait]
impl TransactionStore for InMemoryTransactionStore {
    async fn read(
        &self,
        scope: &PlatformScope,
        id: &str,
    ) -> Result<Option<Transaction>, StoreError> {
        Ok(self.map.get(&key(scope, id)).map(|r| r.clone()))
    }

    async fn update(
        &self,
        scope: &PlatformScope,
        id: &str,
        patch: &ShipmentPatch,
    ) -> Result<Option<Transaction>, StoreError> {
        if let Some(mut tx) = self.map.get_mut(&key(scope, id)) {
            patch.apply(&mut tx);
            return Ok(Some(tx.clone()));
        }
        Ok(None)
    }
}

#[derive(Clone, Default)]
pub struct InMemoryUserStore {
    pub map: Arc<DashMap<ScopedKey, User>>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, scope: &PlatformScope, user: User) {
        self.map.insert(key(scope, &user.id), user);
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn read(&self, scope: &PlatformScope, id: &str) -> Result<Option<User>, StoreError> {
        Ok(self.map.get(&key(scope, id)).map(|r| r.clone()))
    }
}

/// Event log partitioned by scope. The uniqueness check and the insert run under the
/// same shard lock, so concurrent duplicates resolve to one insert and one conflict.
#[derive(Clone, Default)]
pub struct InMemoryEventStore {
    pub map: Arc<DashMap<PlatformScope, Vec<Event>>>,
}

impl InMemoryEventStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self, scope: &PlatformScope) -> usize {
        self.map.get(scope).map(|v| v.len()).unwrap_or(0)
    }

    pub fn is_empty(&self, scope: &PlatformScope) -> bool {
        self.len(scope) == 0
    }
}

#[async_trait]
impl EventStore for InMemoryEventStore {
    async fn query(
        &self,
        scope: &PlatformScope,
        query: &EventQuery,
    ) -> Result<Vec<Event>, StoreError> {
        let Some(events) = self.map.get(scope) else {
            return Ok(Vec::new());
        };
        let mut found: Vec<Event> = events
            .iter()
            .filter(|e| e.object_id == query.object_id && e.event_type == query.event_type)
            .cloned()
            .collect();
        found.sort_by_key(|e| e.created_date);
        if query.order == SortOrder::Desc {
            found.reverse();
        }
        found.truncate(query.limit);
        Ok(found)
    }

    async fn create(
        &self,
        scope: &PlatformScope,
        event: NewEvent,
    ) -> Result<Event, EventStoreError> {
        let mut events = self.map.entry(scope.clone()).or_default();
        if events
            .iter()
            .any(|e| e.object_id == event.object_id && e.event_type == event.event_type)
        {
            return Err(EventStoreError::Conflict {
                object_id: event.object_id,
                event_type: event.event_type,
            });
        }
        let stored = event.into_event();
        events.push(stored.clone());
        Ok(stored)
    }
}
