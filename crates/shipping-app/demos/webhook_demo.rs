///  To run :
///  cargo r --example webhook_demo
use serde_json::{json, Value};
use shipping_client::ShippyproClient;
use shipping_hex::application::context::GatewayContext;
use shipping_hex::application::gateway_service::GatewayService;
use shipping_hex::application::webhook_service::WebhookService;
use shipping_hex::inbound::http::{HttpServer, HttpServerConfig};
use shipping_repo::build_repo;
use std::sync::Arc;
use tempfile::tempdir;

fn find_free_port() -> u16 {
    std::net::TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port()
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let port = find_free_port();
    let addr = format!("http://127.0.0.1:{port}");

    // Event log in a temp SQLite file; platform config seeded from fixtures.
    let tmp = tempdir()?;
    let db_url = format!("sqlite://{}", tmp.path().join("events.db").display());
    let fixtures_path = tmp.path().join("fixtures.json");
    std::fs::write(
        &fixtures_path,
        json!({
            "configs": [{
                "publicPlatformId": "e1_test",
                "config": { "apiKey": "sk_demo", "webhookSecret": "whsec_demo" }
            }]
        })
        .to_string(),
    )?;

    let repo = build_repo(Some(&db_url)).await?;
    repo.load_fixtures(&fixtures_path.display().to_string()).await?;

    let ctx = Arc::new(GatewayContext {
        config: Arc::new(repo.config.clone()),
        transactions: Arc::new(repo.transactions.clone()),
        users: Arc::new(repo.users.clone()),
        events: repo.events.clone(),
        carrier: Arc::new(ShippyproClient::new()?),
        production: false,
    });
    let server = HttpServer::new(
        GatewayService::new(ctx.clone()),
        WebhookService::new(ctx),
        HttpServerConfig {
            port: port.to_string(),
        },
    )
    .await?;

    let handle = tokio::spawn(async move {
        server.run().await.expect("server run");
    });
    tokio::time::sleep(std::time::Duration::from_millis(50)).await;

    let client = reqwest::Client::new();
    let event = json!({ "Event": "TRACKING_UPDATE", "EventID": "ev_demo", "Status": "IN_TRANSIT" });

    // The second delivery is acknowledged but not stored again.
    for attempt in 1..=2 {
        let ack: Value = client
            .post(format!("{addr}/integrations/shippypro/webhooks/e1_test"))
            .header("shippypro-signature", "whsec_demo")
            .json(&event)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        println!("delivery {attempt}: {ack}");
    }

    let res = client
        .post(format!("{addr}/integrations/shippypro/webhooks/e1_test"))
        .header("shippypro-signature", "forged")
        .json(&event)
        .send()
        .await?;
    println!("forged delivery: {}", res.status());
    assert_eq!(res.status(), reqwest::StatusCode::FORBIDDEN);

    handle.abort();
    Ok(())
}
