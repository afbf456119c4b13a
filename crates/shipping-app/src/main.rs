use shipping_client::ShippyproClient;
use shipping_hex::application::context::GatewayContext;
use shipping_hex::application::gateway_service::GatewayService;
use shipping_hex::application::webhook_service::WebhookService;
use shipping_hex::config::Config;
use shipping_hex::inbound::http::{HttpServer, HttpServerConfig};
use shipping_repo::{build_repo, Repo};
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env for DATABASE_URL / SERVER_PORT / APP_ENV when present.
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(std::env::var("RUST_LOG").unwrap_or_else(|_| "debug".to_string()))
        .init();

    let config = Config::from_env()?;
    let repo: Repo = build_repo(config.database_url.as_deref()).await?;
    if let Some(path) = config.fixtures_path.as_deref() {
        repo.load_fixtures(path).await?;
        tracing::info!("loaded platform fixtures from {}", path);
    }

    let mut carrier = ShippyproClient::builder();
    if let Some(timeout) = config.carrier_timeout {
        carrier = carrier.with_timeout(timeout);
    }

    let ctx = Arc::new(GatewayContext {
        config: Arc::new(repo.config.clone()),
        transactions: Arc::new(repo.transactions.clone()),
        users: Arc::new(repo.users.clone()),
        events: repo.events.clone(),
        carrier: Arc::new(carrier.build()?),
        production: config.is_production(),
    });
    tracing::info!(app_env = %config.app_env, "gateway context ready");

    let server_cfg = HttpServerConfig {
        port: config.server_port.clone(),
    };

    let http = HttpServer::new(
        GatewayService::new(ctx.clone()),
        WebhookService::new(ctx),
        server_cfg,
    )
    .await?;
    http.run().await
}
