use serde::{Deserialize, Serialize};
use shipping_types::domain::event::{EventQuery, WebhookEvent};
use shipping_types::domain::platform::PlatformScope;
use shipping_types::ports::event_store::EventStoreError;
use std::sync::Arc;

use crate::application::config_resolver;
use crate::application::context::GatewayContext;
use crate::application::signature;
use crate::errors::AppError;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct WebhookAck {
    pub success: bool,
}

/// Records inbound carrier events in the platform event log, once per provider event id.
pub struct WebhookService {
    ctx: Arc<GatewayContext>,
}

impl WebhookService {
    pub fn new(ctx: Arc<GatewayContext>) -> Self {
        Self { ctx }
    }

    /// Succeeds for redelivered events too: the provider is expected to send duplicates.
    pub async fn ingest(
        &self,
        request_id: &str,
        public_platform_id: &str,
        signature: Option<&str>,
        raw_body: &[u8],
    ) -> Result<WebhookAck, AppError> {
        tracing::debug!(
            request_id,
            body = %String::from_utf8_lossy(raw_body),
            "ShippyPro webhook event"
        );

        let scope = PlatformScope::parse_public_id(public_platform_id)
            .ok_or_else(|| AppError::Forbidden("invalid platform id".into()))?;

        if raw_body.iter().all(u8::is_ascii_whitespace) {
            return Err(AppError::BadRequest("Event object body expected".into()));
        }

        let config = config_resolver::resolve_for_webhooks(self.ctx.config.as_ref(), &scope).await?;
        let secret = config.webhook_secret().unwrap_or_default();
        if !signature::verify(config.signature_scheme, secret, signature, raw_body) {
            tracing::warn!(platform = %scope, request_id, "webhook signature mismatch");
            return Err(AppError::Forbidden("invalid webhook signature".into()));
        }

        // an unreadable payload is refused like a forged one
        let event = WebhookEvent::parse(raw_body, request_id).map_err(|e| {
            tracing::warn!(platform = %scope, request_id, error = %e, "unreadable webhook payload");
            AppError::Forbidden("invalid webhook payload".into())
        })?;
        let event_type = event.namespaced_type();

        let same_events = self
            .ctx
            .events
            .query(&scope, &EventQuery::latest(&event.id, &event_type))
            .await?;
        if !same_events.is_empty() {
            tracing::debug!(
                platform = %scope,
                object_id = %event.id,
                %event_type,
                "idempotency check: event already recorded"
            );
            return Ok(WebhookAck { success: true });
        }

        let object_id = event.id.clone();
        match self.ctx.events.create(&scope, event.into_new_event()).await {
            Ok(stored) => {
                tracing::info!(
                    platform = %scope,
                    %object_id,
                    %event_type,
                    event_id = %stored.id,
                    "webhook event recorded"
                );
            }
            // a concurrent delivery won the insert
            Err(EventStoreError::Conflict { .. }) => {
                tracing::debug!(platform = %scope, %object_id, %event_type, "event recorded concurrently");
            }
            Err(EventStoreError::Store(e)) => return Err(e.into()),
        }

        Ok(WebhookAck { success: true })
    }
}
