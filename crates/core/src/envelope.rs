// Broker response envelope

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Uniform wrapper around every action result.
///
/// The broker has spelled the success flag `success`, `successful` and
/// `successfull` across API versions, sometimes sending more than one; each
/// is kept as its own field so duplicates never fail deserialization.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResponseEnvelope {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub success: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub successful: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub successfull: Option<bool>,
    #[serde(default)]
    pub data: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<Value>,
}

impl ResponseEnvelope {
    pub fn success(data: Value) -> Self {
        Self {
            success: Some(true),
            data,
            ..Default::default()
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: Some(false),
            error: Some(Value::String(message.into())),
            ..Default::default()
        }
    }

    /// Whether the broker reported success. Without any flag, a response
    /// carrying no error counts as successful.
    pub fn is_success(&self) -> bool {
        self.success
            .or(self.successful)
            .or(self.successfull)
            .unwrap_or_else(|| self.error_message().is_none())
    }

    /// Human-readable error reported by the broker, if any.
    pub fn error_message(&self) -> Option<String> {
        self.error.as_ref().and_then(message_of)
    }

    /// Consume the envelope, returning `data` on success or the broker's
    /// message on failure.
    pub fn into_result(self) -> Result<Value, String> {
        if self.is_success() {
            Ok(self.data)
        } else {
            Err(self
                .error_message()
                .unwrap_or_else(|| "action failed without an error message".to_string()))
        }
    }
}

/// Extract an error message from an arbitrary error body.
///
/// Understands `{"error": "..."}`, `{"error": {"message": "..."}}`,
/// `{"message": "..."}` and `{"detail": "..."}`.
pub fn broker_message(body: &Value) -> Option<String> {
    body.get("error")
        .and_then(message_of)
        .or_else(|| body.get("message").and_then(message_of))
        .or_else(|| body.get("detail").and_then(message_of))
}

fn message_of(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) if s.trim().is_empty() => None,
        Value::String(s) => Some(s.clone()),
        Value::Object(map) => map
            .get("message")
            .and_then(message_of)
            .or_else(|| Some(value.to_string())),
        other => Some(other.to_string()),
    }
}
