use async_trait::async_trait;

use crate::domain::platform::PlatformScope;
use crate::domain::user::User;
use crate::ports::StoreError;

#[async_trait]
pub trait UserStore: Send + Sync + 'static {
    async fn read(&self, scope: &PlatformScope, id: &str) -> Result<Option<User>, StoreError>;
}
