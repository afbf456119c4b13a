mod common;

use async_trait::async_trait;
use common::{integration_config, test_scope, Harness, WEBHOOK_SECRET};
use serde_json::json;
use shipping_hex::application::context::GatewayContext;
use shipping_hex::application::signature::compute_hmac;
use shipping_hex::application::webhook_service::{WebhookAck, WebhookService};
use shipping_hex::errors::AppError;
use shipping_types::domain::event::{Event, EventQuery, NewEvent};
use shipping_types::domain::integration::SignatureScheme;
use shipping_types::domain::platform::{PlatformEnv, PlatformScope};
use shipping_types::ports::event_store::{EventStore, EventStoreError};
use shipping_types::ports::StoreError;
use std::sync::Arc;

const TRACKING_EVENT: &[u8] = br#"{"Event":"TRACKING_UPDATE","EventID":"ev_1","OrderID":555,"Status":"IN_TRANSIT"}"#;

#[tokio::test]
async fn event_is_recorded_once_per_provider_id() {
    let h = Harness::new(false);
    let svc = WebhookService::new(h.ctx.clone());

    for _ in 0..3 {
        let ack = svc
            .ingest("req_1", "e1_test", Some(WEBHOOK_SECRET), TRACKING_EVENT)
            .await
            .unwrap();
        assert_eq!(ack, WebhookAck { success: true });
    }

    assert_eq!(h.events.len(&test_scope()), 1);
    let stored = h
        .events
        .query(&test_scope(), &EventQuery::latest("ev_1", "shippypro_TRACKING_UPDATE"))
        .await
        .unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].emitter_id, "shippypro");
    assert_eq!(stored[0].metadata["Status"], "IN_TRANSIT");
}

#[tokio::test]
async fn same_event_id_with_another_name_is_a_new_event() {
    let h = Harness::new(false);
    let svc = WebhookService::new(h.ctx.clone());

    svc.ingest("req_1", "e1_test", Some(WEBHOOK_SECRET), TRACKING_EVENT)
        .await
        .unwrap();
    let delivered = json!({ "Event": "ORDER_DELIVERED", "EventID": "ev_1" }).to_string();
    svc.ingest("req_2", "e1_test", Some(WEBHOOK_SECRET), delivered.as_bytes())
        .await
        .unwrap();

    assert_eq!(h.events.len(&test_scope()), 2);
}

#[tokio::test]
async fn wrong_signature_leaves_the_event_log_untouched() {
    let h = Harness::new(false);
    let svc = WebhookService::new(h.ctx.clone());

    for signature in [Some("whsec_wrong"), None] {
        let err = svc
            .ingest("req_1", "e1_test", signature, TRACKING_EVENT)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
    }
    assert!(h.events.is_empty(&test_scope()));
}

#[tokio::test]
async fn malformed_platform_id_is_forbidden() {
    let h = Harness::new(false);
    let svc = WebhookService::new(h.ctx.clone());

    let err = svc
        .ingest("req_1", "platform-1", Some(WEBHOOK_SECRET), TRACKING_EVENT)
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::Forbidden(_)));
}

#[tokio::test]
async fn empty_body_is_a_bad_request() {
    let h = Harness::new(false);
    let svc = WebhookService::new(h.ctx.clone());

    for body in [&b""[..], &b"  \n"[..]] {
        let err = svc
            .ingest("req_1", "e1_test", Some(WEBHOOK_SECRET), body)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::BadRequest(ref m) if m == "Event object body expected"));
    }
}

#[tokio::test]
async fn platform_without_webhook_secret_is_a_configuration_error() {
    let h = Harness::new(false);
    let scope = PlatformScope::new("3", PlatformEnv::Test);
    let mut config = integration_config();
    config.webhook_secret = None;
    h.config.insert(scope.clone(), config);
    let svc = WebhookService::new(h.ctx.clone());

    let err = svc
        .ingest("req_1", "e3_test", Some(WEBHOOK_SECRET), TRACKING_EVENT)
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::Configuration(ref m) if m == "ShippyPro Webhook secret not configured"));
    assert!(h.events.is_empty(&scope));
}

#[tokio::test]
async fn events_without_an_id_fall_back_to_the_request_id() {
    let h = Harness::new(false);
    let svc = WebhookService::new(h.ctx.clone());
    let body = json!({ "type": "LABEL_CREATED" }).to_string();

    svc.ingest("req_42", "e1_test", Some(WEBHOOK_SECRET), body.as_bytes())
        .await
        .unwrap();

    let stored = h
        .events
        .query(&test_scope(), &EventQuery::latest("req_42", "shippypro_LABEL_CREATED"))
        .await
        .unwrap();
    assert_eq!(stored.len(), 1);
}

#[tokio::test]
async fn authenticated_but_unreadable_payload_is_forbidden() {
    let h = Harness::new(false);
    let svc = WebhookService::new(h.ctx.clone());

    for body in [&br#"{"EventID":"ev_9"}"#[..], &b"not json"[..], &b"[1,2]"[..]] {
        let err = svc
            .ingest("req_1", "e1_test", Some(WEBHOOK_SECRET), body)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Forbidden(ref m) if m == "invalid webhook payload"));
    }
    assert!(h.events.is_empty(&test_scope()));
}

/// Never reports an existing event; `create` fails the way it is told to.
struct RacingEventStore {
    conflict: bool,
}

#[async_trait]
impl EventStore for RacingEventStore {
    async fn query(&self, _scope: &PlatformScope, _query: &EventQuery) -> Result<Vec<Event>, StoreError> {
        Ok(vec![])
    }

    async fn create(&self, _scope: &PlatformScope, event: NewEvent) -> Result<Event, EventStoreError> {
        if self.conflict {
            Err(EventStoreError::Conflict {
                object_id: event.object_id,
                event_type: event.event_type,
            })
        } else {
            Err(StoreError::Backend("event log unavailable".into()).into())
        }
    }
}

fn with_events(h: &Harness, events: RacingEventStore) -> WebhookService {
    WebhookService::new(Arc::new(GatewayContext {
        config: h.ctx.config.clone(),
        transactions: h.ctx.transactions.clone(),
        users: h.ctx.users.clone(),
        events: Arc::new(events),
        carrier: h.ctx.carrier.clone(),
        production: h.ctx.production,
    }))
}

#[tokio::test]
async fn insert_conflict_counts_as_already_ingested() {
    let h = Harness::new(false);
    let svc = with_events(&h, RacingEventStore { conflict: true });

    let ack = svc
        .ingest("req_1", "e1_test", Some(WEBHOOK_SECRET), TRACKING_EVENT)
        .await
        .unwrap();

    assert_eq!(ack, WebhookAck { success: true });
}

#[tokio::test]
async fn event_log_failure_is_an_internal_error() {
    let h = Harness::new(false);
    let svc = with_events(&h, RacingEventStore { conflict: false });

    let err = svc
        .ingest("req_1", "e1_test", Some(WEBHOOK_SECRET), TRACKING_EVENT)
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::Internal(_)));
    assert_eq!(err.status_code(), 500);
}

#[tokio::test]
async fn hmac_scheme_verifies_the_body_signature() {
    let h = Harness::new(false);
    let scope = PlatformScope::new("2", PlatformEnv::Live);
    let mut config = integration_config();
    config.signature_scheme = SignatureScheme::HmacSha256;
    h.config.insert(scope.clone(), config);
    let svc = WebhookService::new(h.ctx.clone());

    let err = svc
        .ingest("req_1", "e2_live", Some(WEBHOOK_SECRET), TRACKING_EVENT)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));

    let signature = compute_hmac(WEBHOOK_SECRET.as_bytes(), TRACKING_EVENT).unwrap();
    svc.ingest("req_2", "e2_live", Some(&signature), TRACKING_EVENT)
        .await
        .unwrap();
    assert_eq!(h.events.len(&scope), 1);
}
