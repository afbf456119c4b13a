//! Loads per-platform credentials and shipping rules. Nothing is cached: every call
//! reads the config store again, since credentials may change between calls.

use shipping_types::domain::integration::{
    CarrierSettings, Credentials, IntegrationConfig, SignatureScheme, DEFAULT_BASE_URI,
};
use shipping_types::domain::platform::PlatformScope;
use shipping_types::ports::config_store::ConfigStore;

use crate::errors::AppError;

#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub credentials: Credentials,
    pub signature_scheme: SignatureScheme,
    pub carrier_settings: CarrierSettings,
}

impl ResolvedConfig {
    /// Configured webhook secret; only present when resolved with [`resolve_for_webhooks`].
    pub fn webhook_secret(&self) -> Option<&str> {
        self.credentials.webhook_secret.as_deref()
    }
}

fn non_empty(v: Option<String>) -> Option<String> {
    v.filter(|s| !s.trim().is_empty())
}

async fn load(store: &dyn ConfigStore, scope: &PlatformScope) -> Result<IntegrationConfig, AppError> {
    Ok(store.private_config(scope).await?.unwrap_or_default())
}

fn into_resolved(
    config: IntegrationConfig,
    require_webhook_secret: bool,
) -> Result<ResolvedConfig, AppError> {
    let api_key = non_empty(config.api_key)
        .ok_or_else(|| AppError::Configuration("ShippyPro API key not configured".into()))?;
    let webhook_secret = non_empty(config.webhook_secret);
    if require_webhook_secret && webhook_secret.is_none() {
        return Err(AppError::Configuration(
            "ShippyPro Webhook secret not configured".into(),
        ));
    }
    Ok(ResolvedConfig {
        credentials: Credentials {
            api_key,
            base_uri: non_empty(config.base_uri).unwrap_or_else(|| DEFAULT_BASE_URI.to_string()),
            webhook_secret,
        },
        signature_scheme: config.signature_scheme,
        carrier_settings: config.carrier_settings,
    })
}

/// Credentials needed to call the carrier API.
pub async fn resolve_for_requests(
    store: &dyn ConfigStore,
    scope: &PlatformScope,
) -> Result<ResolvedConfig, AppError> {
    into_resolved(load(store, scope).await?, false)
}

/// Credentials needed to accept webhooks: API key and webhook secret.
pub async fn resolve_for_webhooks(
    store: &dyn ConfigStore,
    scope: &PlatformScope,
) -> Result<ResolvedConfig, AppError> {
    into_resolved(load(store, scope).await?, true)
}
