use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{HeaderMap, HeaderName},
    routing::{get, post},
    serve, Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use crate::application::context::CallerContext;
use crate::application::gateway_service::GatewayService;
use crate::application::webhook_service::{WebhookAck, WebhookService};
use crate::errors::AppError;

/// Headers set by the platform's authentication layer in front of this service.
const PLATFORM_ID_HEADER: &str = "x-platform-id";
const REQUEST_ID_HEADER: &str = "x-request-id";
const USER_ID_HEADER: &str = "x-user-id";
const PERMISSIONS_HEADER: &str = "x-permissions";
const SIGNATURE_HEADER: &str = "shippypro-signature";

#[derive(Clone)]
pub struct HttpServerConfig {
    pub port: String,
}

#[derive(Clone)]
struct AppState {
    gateway: Arc<GatewayService>,
    webhooks: Arc<WebhookService>,
}

#[derive(Clone)]
pub struct HttpServer {
    state: AppState,
    pub config: HttpServerConfig,
}

#[derive(Serialize, Deserialize)]
pub struct SendRequestBody {
    pub method: String,
    #[serde(default)]
    pub args: Vec<Value>,
}

fn header<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

fn request_id_header() -> HeaderName {
    HeaderName::from_static(REQUEST_ID_HEADER)
}

/// Request id assigned at the edge; only absent when a handler runs outside the router.
fn request_id(headers: &HeaderMap) -> String {
    header(headers, REQUEST_ID_HEADER)
        .map(String::from)
        .unwrap_or_else(|| Uuid::new_v4().to_string())
}

fn caller_from_headers(headers: &HeaderMap) -> Result<CallerContext, AppError> {
    let public_id = header(headers, PLATFORM_ID_HEADER).unwrap_or_default();
    let permissions = header(headers, PERMISSIONS_HEADER)
        .map(|p| {
            p.split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect::<Vec<_>>()
        })
        .unwrap_or_default();
    CallerContext::from_public_id(
        public_id,
        request_id(headers),
        header(headers, USER_ID_HEADER).map(String::from),
        permissions,
    )
}

impl HttpServer {
    pub async fn new(
        gateway: GatewayService,
        webhooks: WebhookService,
        config: HttpServerConfig,
    ) -> anyhow::Result<Self> {
        Ok(Self {
            state: AppState {
                gateway: Arc::new(gateway),
                webhooks: Arc::new(webhooks),
            },
            config,
        })
    }

    pub async fn run(self) -> anyhow::Result<()> {
        let trace_layer = TraceLayer::new_for_http()
            .make_span_with(|request: &axum::extract::Request<_>| {
                let uri = request.uri().to_string();
                // set by SetRequestIdLayer before this span is created
                let request_id = request
                    .headers()
                    .get(REQUEST_ID_HEADER)
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or_default()
                    .to_string();
                tracing::info_span!(
                    "http_request",
                    %request_id,
                    method = %request.method(),
                    uri
                )
            })
            .on_request(
                |request: &axum::extract::Request<_>, span: &tracing::Span| {
                    tracing::info!(
                        parent: span,
                        method = %request.method(),
                        uri = %request.uri(),
                        "request"
                    );
                },
            )
            .on_response(
                |response: &axum::response::Response, latency: Duration, span: &tracing::Span| {
                    tracing::info!(
                        parent: span,
                        status = %response.status(),
                        latency_ms = %latency.as_millis(),
                        "response"
                    );
                },
            );

        let app = Router::new()
            .route("/health", get(health))
            .route("/integrations/shippypro/request", post(send_request))
            .route(
                "/integrations/shippypro/webhooks/{public_platform_id}",
                post(webhook),
            )
            .layer(PropagateRequestIdLayer::new(request_id_header()))
            .layer(trace_layer)
            .layer(SetRequestIdLayer::new(request_id_header(), MakeRequestUuid))
            .with_state(self.state);

        let addr: SocketAddr = format!("0.0.0.0:{}", self.config.port).parse()?;
        tracing::info!("starting server on {}", addr);
        let listener = tokio::net::TcpListener::bind(addr).await?;
        serve(listener, app.into_make_service()).await?;
        Ok(())
    }
}

async fn health() -> (axum::http::StatusCode, Json<serde_json::Value>) {
    (
        axum::http::StatusCode::OK,
        Json(serde_json::json!({ "status": "ok" })),
    )
}

async fn send_request(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<SendRequestBody>,
) -> Result<Json<Value>, AppError> {
    let caller = caller_from_headers(&headers)?;
    let res = state
        .gateway
        .send_request(&caller, &payload.method, payload.args)
        .await?;
    Ok(Json(res))
}

async fn webhook(
    State(state): State<AppState>,
    Path(public_platform_id): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<WebhookAck>, AppError> {
    let ack = state
        .webhooks
        .ingest(
            &request_id(&headers),
            &public_platform_id,
            header(&headers, SIGNATURE_HEADER),
            &body,
        )
        .await?;
    Ok(Json(ack))
}
