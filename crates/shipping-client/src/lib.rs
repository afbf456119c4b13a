//! ShippyPro carrier API client.
//!
//! Every call is a single `POST` to the credential set's base URI with a
//! `{ "Method": ..., "Params": ... }` body and the API key as the basic-auth
//! username. No retries are attempted: the first failure is classified and returned.

use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde_json::Value;
use shipping_types::domain::carrier::CarrierCall;
use shipping_types::domain::integration::Credentials;
use shipping_types::ports::carrier_api::{CarrierApi, CarrierError};

#[derive(Clone, Default)]
pub struct ShippyproClientBuilder {
    headers: HeaderMap,
    timeout: Option<Duration>,
    client: Option<reqwest::Client>,
}

/// Stateless: credentials travel with each call.
#[derive(Clone)]
pub struct ShippyproClient {
    client: reqwest::Client,
}

impl ShippyproClient {
    pub fn new() -> anyhow::Result<Self> {
        Self::builder().build()
    }

    pub fn builder() -> ShippyproClientBuilder {
        ShippyproClientBuilder::default()
    }

    async fn send(&self, credentials: &Credentials, call: &CarrierCall) -> Result<Value, CarrierError> {
        let body = call
            .to_body()
            .map_err(|e| CarrierError::Decode(format!("cannot encode params: {e}")))?;

        let res = self
            .client
            .post(&credentials.base_uri)
            .basic_auth(&credentials.api_key, Some(""))
            .json(&body)
            .send()
            .await
            .map_err(|e| CarrierError::Transport(e.to_string()))?;

        let status = res.status();
        let text = res
            .text()
            .await
            .map_err(|e| CarrierError::Transport(e.to_string()))?;

        if !status.is_success() {
            let body = serde_json::from_str(&text).unwrap_or(Value::String(text));
            return Err(CarrierError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let value: Value =
            serde_json::from_str(&text).map_err(|e| CarrierError::Decode(e.to_string()))?;

        // the API reports some failures as 200 with an "Error" field
        if let Some(message) = value
            .get("Error")
            .and_then(Value::as_str)
            .filter(|m| !m.trim().is_empty())
        {
            return Err(CarrierError::Rejected {
                message: message.to_string(),
                body: value,
            });
        }
        Ok(value)
    }
}

#[async_trait]
impl CarrierApi for ShippyproClient {
    async fn invoke(&self, credentials: &Credentials, call: &CarrierCall) -> Result<Value, CarrierError> {
        let method = call.method_name();
        tracing::debug!(method, base_uri = %credentials.base_uri, "carrier call");
        let res = self.send(credentials, call).await;
        if let Err(e) = &res {
            tracing::warn!(method, error = %e, "carrier call failed");
        }
        res
    }
}

impl ShippyproClientBuilder {
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_header(
        mut self,
        key: impl AsRef<str>,
        value: impl AsRef<str>,
    ) -> anyhow::Result<Self> {
        let header_name =
            HeaderName::from_bytes(key.as_ref().as_bytes()).context("invalid header name")?;
        let header_value = HeaderValue::from_str(value.as_ref()).context("invalid header value")?;
        self.headers.insert(header_name, header_value);
        Ok(self)
    }

    pub fn with_reqwest_client(mut self, client: reqwest::Client) -> Self {
        self.client = Some(client);
        self
    }

    pub fn build(self) -> anyhow::Result<ShippyproClient> {
        if let Some(client) = self.client {
            return Ok(ShippyproClient { client });
        }

        let mut builder = reqwest::Client::builder();
        if !self.headers.is_empty() {
            builder = builder.default_headers(self.headers);
        }
        if let Some(t) = self.timeout {
            builder = builder.timeout(t);
        }
        let client = builder.build()?;
        Ok(ShippyproClient { client })
    }
}
