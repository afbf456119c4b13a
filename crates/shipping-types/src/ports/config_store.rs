use async_trait::async_trait;

use crate::domain::integration::IntegrationConfig;
use crate::domain::platform::PlatformScope;
use crate::ports::StoreError;

#[async_trait]
pub trait ConfigStore: Send + Sync + 'static {
    /// Private integration config; `Ok(None)` when nothing is configured for the scope.
    async fn private_config(
        &self,
        scope: &PlatformScope,
    ) -> Result<Option<IntegrationConfig>, StoreError>;
}
