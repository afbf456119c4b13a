use async_trait::async_trait;

use crate::domain::platform::PlatformScope;
use crate::domain::transaction::{ShipmentPatch, Transaction};
use crate::ports::StoreError;

#[async_trait]
pub trait TransactionStore: Send + Sync + 'static {
    async fn read(&self, scope: &PlatformScope, id: &str)
        -> Result<Option<Transaction>, StoreError>;

    /// Partial update; `Ok(None)` when the transaction does not exist.
    async fn update(
        &self,
        scope: &PlatformScope,
        id: &str,
        patch: &ShipmentPatch,
    ) -> Result<Option<Transaction>, StoreError>;
}
