mod common;

use common::{test_scope, Harness, OWNER, WEBHOOK_SECRET};
use serde::Deserialize;
use serde_json::{json, Value};
use shipping_hex::application::gateway_service::GatewayService;
use shipping_hex::application::webhook_service::WebhookService;
use shipping_hex::inbound::http::{HttpServer, HttpServerConfig, SendRequestBody};
use shipping_types::domain::event::EventQuery;
use shipping_types::ports::event_store::EventStore;

fn find_free_port() -> u16 {
    std::net::TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port()
}

#[derive(Deserialize)]
struct ErrorBody {
    error: String,
    public: Option<Value>,
}

#[tokio::test]
async fn request_and_webhook_over_http() {
    let port = find_free_port();
    let config = HttpServerConfig {
        port: port.to_string(),
    };

    let h = Harness::new(false);
    let server = HttpServer::new(
        GatewayService::new(h.ctx.clone()),
        WebhookService::new(h.ctx.clone()),
        config,
    )
    .await
    .unwrap();

    let addr = format!("http://127.0.0.1:{}", port);
    let handle = tokio::spawn(async move {
        server.run().await.expect("server run");
    });

    // Give the server a moment to start.
    tokio::time::sleep(std::time::Duration::from_millis(50)).await;

    let client = reqwest::Client::new();

    let health = client
        .get(format!("{}/health", addr))
        .send()
        .await
        .unwrap();
    assert_eq!(health.status(), reqwest::StatusCode::OK);

    // owner ships their own transaction
    let res = client
        .post(format!("{}/integrations/shippypro/request", addr))
        .header("x-platform-id", "e1_test")
        .header("x-user-id", OWNER)
        .header("x-request-id", "req_http_1")
        .json(&SendRequestBody {
            method: "Ship".into(),
            args: vec![json!({ "transactionId": "trn_1" })],
        })
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), reqwest::StatusCode::OK);
    let shipped: Value = res.json().await.unwrap();
    assert_eq!(shipped["NewOrderID"], 555);

    // same caller, method outside the allow-list
    let res = client
        .post(format!("{}/integrations/shippypro/request", addr))
        .header("x-platform-id", "e1_test")
        .header("x-user-id", OWNER)
        .json(&json!({ "method": "GetCarriers" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), reqwest::StatusCode::FORBIDDEN);
    assert_eq!(h.carrier.count("GetCarriers"), 0);

    // elevated caller sees upstream detail on a test platform
    h.carrier.respond(
        "GetCarriers",
        Err(shipping_types::ports::carrier_api::CarrierError::Status {
            status: 401,
            body: json!({ "Error": "bad key" }),
        }),
    );
    let res = client
        .post(format!("{}/integrations/shippypro/request", addr))
        .header("x-platform-id", "e1_test")
        .header("x-permissions", "integrations:read_write:all")
        .json(&json!({ "method": "GetCarriers", "args": [{}] }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), reqwest::StatusCode::UNAUTHORIZED);
    let body: ErrorBody = res.json().await.unwrap();
    assert_eq!(body.error, "ShippyPro error");
    assert_eq!(body.public.unwrap()["shippyproMethod"], "GetCarriers");

    // webhook, delivered twice
    for _ in 0..2 {
        let res = client
            .post(format!("{}/integrations/shippypro/webhooks/e1_test", addr))
            .header("shippypro-signature", WEBHOOK_SECRET)
            .body(r#"{"Event":"TRACKING_UPDATE","EventID":"ev_http"}"#)
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), reqwest::StatusCode::OK);
        let ack: Value = res.json().await.unwrap();
        assert_eq!(ack, json!({ "success": true }));
    }
    assert_eq!(h.events.len(&test_scope()), 1);

    let res = client
        .post(format!("{}/integrations/shippypro/webhooks/e1_test", addr))
        .header("shippypro-signature", "nope")
        .body(r#"{"Event":"TRACKING_UPDATE","EventID":"ev_other"}"#)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), reqwest::StatusCode::FORBIDDEN);
    assert_eq!(h.events.len(&test_scope()), 1);

    // no request id from the caller: the one generated at the edge keys the event
    let res = client
        .post(format!("{}/integrations/shippypro/webhooks/e1_test", addr))
        .header("shippypro-signature", WEBHOOK_SECRET)
        .body(r#"{"Event":"LABEL_CREATED"}"#)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), reqwest::StatusCode::OK);
    let generated = res
        .headers()
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .map(String::from)
        .expect("request id echoed back");
    let stored = h
        .events
        .query(&test_scope(), &EventQuery::latest(&generated, "shippypro_LABEL_CREATED"))
        .await
        .unwrap();
    assert_eq!(stored.len(), 1);

    // a caller-supplied id is kept as is
    let res = client
        .get(format!("{}/health", addr))
        .header("x-request-id", "req_from_caller")
        .send()
        .await
        .unwrap();
    assert_eq!(res.headers()["x-request-id"], "req_from_caller");

    handle.abort();
}
