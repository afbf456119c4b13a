use serde_json::{json, Value};
use shipping_types::domain::carrier::CarrierCall;
use shipping_types::domain::integration::Credentials;
use shipping_types::domain::platform::PlatformScope;
use shipping_types::ports::carrier_api::{CarrierApi, CarrierError};
use shipping_types::ports::config_store::ConfigStore;
use shipping_types::ports::event_store::EventStore;
use shipping_types::ports::transaction_store::TransactionStore;
use shipping_types::ports::user_store::UserStore;
use std::collections::HashSet;
use std::sync::Arc;

use crate::errors::AppError;

/// Collaborators of the gateway, built once at process start and shared by every call.
pub struct GatewayContext {
    pub config: Arc<dyn ConfigStore>,
    pub transactions: Arc<dyn TransactionStore>,
    pub users: Arc<dyn UserStore>,
    pub events: Arc<dyn EventStore>,
    pub carrier: Arc<dyn CarrierApi>,
    /// Process runs in production; combined with a live platform it hides upstream detail.
    pub production: bool,
}

impl GatewayContext {
    pub fn reveals_details(&self, scope: &PlatformScope) -> bool {
        !(self.production && scope.is_live())
    }

    /// One carrier call. Failures are wrapped with the attempted method name.
    pub async fn call_carrier(
        &self,
        scope: &PlatformScope,
        credentials: &Credentials,
        call: &CarrierCall,
    ) -> Result<Value, AppError> {
        self.carrier
            .invoke(credentials, call)
            .await
            .map_err(|e| self.upstream_error(scope, call.method_name(), e))
    }

    pub fn upstream_error(&self, scope: &PlatformScope, method: &str, err: CarrierError) -> AppError {
        tracing::warn!(platform = %scope, method, error = %err, "ShippyPro error");
        let public = self.reveals_details(scope).then(|| {
            json!({
                "shippyproMethod": method,
                "shippyproError": { "message": err.to_string(), "detail": err.detail() },
            })
        });
        AppError::Upstream {
            method: method.to_string(),
            status: err.status(),
            public,
        }
    }
}

/// Identity of one incoming call; immutable for its lifetime.
#[derive(Debug, Clone)]
pub struct CallerContext {
    pub scope: PlatformScope,
    pub request_id: String,
    pub current_user_id: Option<String>,
    pub permissions: HashSet<String>,
}

impl CallerContext {
    /// Fails with `Forbidden` when the public platform id is malformed.
    pub fn from_public_id(
        public_platform_id: &str,
        request_id: impl Into<String>,
        current_user_id: Option<String>,
        permissions: impl IntoIterator<Item = String>,
    ) -> Result<Self, AppError> {
        let scope = PlatformScope::parse_public_id(public_platform_id)
            .ok_or_else(|| AppError::Forbidden("invalid platform id".into()))?;
        Ok(Self {
            scope,
            request_id: request_id.into(),
            current_user_id,
            permissions: permissions.into_iter().collect(),
        })
    }

    pub fn has_permission(&self, name: &str) -> bool {
        self.permissions.contains(name)
    }
}
