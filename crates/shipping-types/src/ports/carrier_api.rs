use async_trait::async_trait;
use serde_json::Value;

use crate::domain::carrier::CarrierCall;
use crate::domain::integration::Credentials;

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum CarrierError {
    #[error("carrier responded with status {status}")]
    Status { status: u16, body: Value },
    #[error("carrier rejected the call: {message}")]
    Rejected { message: String, body: Value },
    #[error("carrier unreachable: {0}")]
    Transport(String),
    #[error("unreadable carrier response: {0}")]
    Decode(String),
}

impl CarrierError {
    /// HTTP status reported by the carrier, when there was one.
    pub fn status(&self) -> Option<u16> {
        match self {
            CarrierError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Raw upstream detail, suitable for non-production error payloads.
    pub fn detail(&self) -> Value {
        match self {
            CarrierError::Status { body, .. } | CarrierError::Rejected { body, .. } => body.clone(),
            CarrierError::Transport(m) | CarrierError::Decode(m) => Value::String(m.clone()),
        }
    }
}

/// Stateless method invoker against the carrier HTTP API: one call, no retries.
#[async_trait]
pub trait CarrierApi: Send + Sync + 'static {
    async fn invoke(&self, credentials: &Credentials, call: &CarrierCall)
        -> Result<Value, CarrierError>;
}
