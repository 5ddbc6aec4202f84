use bytes::Bytes;
use serde_json::{json, Map, Value};

use crate::error::{NoxError, NoxResult};

/// Field removed from every event body before it is forwarded.
pub const SENSITIVE_FIELD: &str = "webhook_url_text";
/// Event name used when the body carries no `status`.
pub const UNKNOWN_EVENT: &str = "unknown";

/// A verified webhook callback.
#[derive(Debug, Clone)]
pub struct WebhookEvent {
    raw: Bytes,
    event: Value,
    data: Map<String, Value>,
}

impl WebhookEvent {
    /// Parse a verified payload.
    ///
    /// The body must be a non-empty JSON object. `webhook_url_text` is
    /// stripped and `status` becomes the event name.
    pub fn parse(raw: Bytes) -> NoxResult<Self> {
        let value: Value = serde_json::from_slice(&raw)
            .map_err(|e| NoxError::invalid_payload(e.to_string()))?;

        let mut data = match value {
            Value::Object(map) if !map.is_empty() => map,
            Value::Object(_) => return Err(NoxError::invalid_payload("empty object")),
            other => {
                return Err(NoxError::invalid_payload(format!(
                    "expected a JSON object, got {}",
                    json_kind(&other)
                )))
            }
        };

        data.remove(SENSITIVE_FIELD);

        let event = match data.get("status") {
            Some(status) if !status.is_null() => status.clone(),
            _ => Value::String(UNKNOWN_EVENT.to_string()),
        };

        Ok(Self { raw, event, data })
    }

    /// Exact bytes as received and verified.
    pub fn raw_payload(&self) -> &[u8] {
        &self.raw
    }

    /// The event's `status`, or `"unknown"`.
    pub fn event(&self) -> &Value {
        &self.event
    }

    pub fn event_name(&self) -> Option<&str> {
        self.event.as_str()
    }

    /// Body without the sensitive field.
    pub fn data(&self) -> &Map<String, Value> {
        &self.data
    }

    /// Normalized result returned to the platform on success.
    pub fn acknowledgement(&self) -> Value {
        json!({
            "message": "Event processed successfully",
            "event": self.event,
            "data": self.data,
        })
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
