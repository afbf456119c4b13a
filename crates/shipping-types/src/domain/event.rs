use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Emitter tag recorded on every event this integration writes.
pub const SHIPPYPRO_EMITTER: &str = "shippypro";
/// Prefix keeping provider event names apart from other integrations' event types.
pub const SHIPPYPRO_TYPE_PREFIX: &str = "shippypro_";

/// Record of the platform's event log.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: Uuid,
    #[serde(rename = "type")]
    pub event_type: String,
    pub object_id: String,
    pub emitter_id: String,
    pub metadata: Value,
    pub created_date: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NewEvent {
    #[serde(rename = "type")]
    pub event_type: String,
    pub object_id: String,
    pub emitter_id: String,
    pub metadata: Value,
}

impl NewEvent {
    pub fn into_event(self) -> Event {
        Event {
            id: Uuid::new_v4(),
            event_type: self.event_type,
            object_id: self.object_id,
            emitter_id: self.emitter_id,
            metadata: self.metadata,
            created_date: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    Desc,
}

/// Event log lookup by `(objectId, type)`, ordered by creation date.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct EventQuery {
    pub object_id: String,
    #[serde(rename = "type")]
    pub event_type: String,
    pub limit: usize,
    pub order: SortOrder,
}

impl EventQuery {
    pub fn latest(object_id: impl Into<String>, event_type: impl Into<String>) -> Self {
        Self {
            object_id: object_id.into(),
            event_type: event_type.into(),
            limit: 1,
            order: SortOrder::Desc,
        }
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum WebhookParseError {
    #[error("event body is not valid JSON: {0}")]
    InvalidJson(String),
    #[error("event body must be a JSON object")]
    NotAnObject,
    #[error("event name missing")]
    MissingEventName,
}

/// Inbound carrier webhook, normalized.
#[derive(Debug, Clone, PartialEq)]
pub struct WebhookEvent {
    /// Provider event id, or the inbound request id when the provider sends none.
    pub id: String,
    /// Provider event name, not namespaced.
    pub name: String,
    pub raw: Value,
}

fn field_as_string(raw: &Value, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|k| match raw.get(*k) {
        Some(Value::String(s)) if !s.trim().is_empty() => Some(s.clone()),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

impl WebhookEvent {
    pub fn parse(body: &[u8], fallback_id: &str) -> Result<Self, WebhookParseError> {
        let raw: Value = serde_json::from_slice(body)
            .map_err(|e| WebhookParseError::InvalidJson(e.to_string()))?;
        if !raw.is_object() {
            return Err(WebhookParseError::NotAnObject);
        }
        let name = field_as_string(&raw, &["Event", "type"])
            .ok_or(WebhookParseError::MissingEventName)?;
        let id = field_as_string(&raw, &["EventID", "id"]).unwrap_or_else(|| fallback_id.to_string());
        Ok(Self { id, name, raw })
    }

    pub fn namespaced_type(&self) -> String {
        format!("{SHIPPYPRO_TYPE_PREFIX}{}", self.name)
    }

    pub fn into_new_event(self) -> NewEvent {
        NewEvent {
            event_type: self.namespaced_type(),
            object_id: self.id,
            emitter_id: SHIPPYPRO_EMITTER.to_string(),
            metadata: self.raw,
        }
    }
}
