use async_trait::async_trait;

use crate::domain::event::{Event, EventQuery, NewEvent};
use crate::domain::platform::PlatformScope;
use crate::ports::StoreError;

#[derive(thiserror::Error, Debug)]
pub enum EventStoreError {
    /// An event with the same `(platform, env, objectId, type)` is already stored.
    #[error("event {object_id} of type {event_type} already recorded")]
    Conflict {
        object_id: String,
        event_type: String,
    },
    #[error(transparent)]
    Store(#[from] StoreError),
}

#[async_trait]
pub trait EventStore: Send + Sync + 'static {
    async fn query(
        &self,
        scope: &PlatformScope,
        query: &EventQuery,
    ) -> Result<Vec<Event>, StoreError>;

    /// Inserts the event. Must fail with [`EventStoreError::Conflict`] rather than store a
    /// second event with the same `(objectId, type)` in the scope.
    async fn create(&self, scope: &PlatformScope, event: NewEvent)
        -> Result<Event, EventStoreError>;
}
