// Field-level decoding of broker payloads.
//
// Broker responses are loosely shaped JSON. Models are built through `Fields`,
// which reports the entity and the exact field whenever a required value is
// missing or a present value has the wrong type.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

/// A broker payload did not match the expected model.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid {entity} payload: field `{field}` {message}")]
pub struct DecodeError {
    pub entity: &'static str,
    pub field: String,
    pub message: String,
}

impl DecodeError {
    pub fn new(entity: &'static str, field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            entity,
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn missing(entity: &'static str, field: impl Into<String>) -> Self {
        Self::new(entity, field, "is missing")
    }
}

/// A model that can be decoded from the `data` of a broker response.
pub trait Decode: Sized {
    /// Entity name reported in decode errors.
    const ENTITY: &'static str;

    fn decode(value: &Value) -> Result<Self, DecodeError>;

    /// Decode every object in `items`, failing on the first invalid one.
    fn decode_all<'a>(items: impl IntoIterator<Item = &'a Value>) -> Result<Vec<Self>, DecodeError> {
        items.into_iter().map(Self::decode).collect()
    }
}

/// Typed view over one JSON object, tagged with the entity being decoded.
#[derive(Debug, Clone, Copy)]
pub struct Fields<'a> {
    entity: &'static str,
    map: &'a Map<String, Value>,
}

impl<'a> Fields<'a> {
    pub fn of(entity: &'static str, value: &'a Value) -> Result<Self, DecodeError> {
        match value {
            Value::Object(map) => Ok(Self { entity, map }),
            other => Err(DecodeError::new(
                entity,
                "<root>",
                format!("expected an object, got {}", type_name(other)),
            )),
        }
    }

    pub fn entity(&self) -> &'static str {
        self.entity
    }

    /// Present and non-null value of `key`.
    pub fn get(&self, key: &str) -> Option<&'a Value> {
        self.map.get(key).filter(|value| !value.is_null())
    }

    fn mistyped(&self, key: &str, expected: &str, got: &Value) -> DecodeError {
        DecodeError::new(
            self.entity,
            key,
            format!("expected {}, got {}", expected, type_name(got)),
        )
    }

    pub fn required_str(&self, key: &str) -> Result<String, DecodeError> {
        self.optional_str(key)?
            .ok_or_else(|| DecodeError::missing(self.entity, key))
    }

    pub fn optional_str(&self, key: &str) -> Result<Option<String>, DecodeError> {
        match self.get(key) {
            None => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.clone())),
            Some(other) => Err(self.mistyped(key, "a string", other)),
        }
    }

    /// First present string among `keys`, for payloads that rename fields
    /// between API versions.
    pub fn first_str(&self, keys: &[&str]) -> Result<Option<String>, DecodeError> {
        for key in keys {
            if let Some(value) = self.optional_str(key)? {
                return Ok(Some(value));
            }
        }
        Ok(None)
    }

    /// Identifier that may arrive as a JSON string or number.
    pub fn required_id(&self, key: &str) -> Result<String, DecodeError> {
        match self.get(key) {
            None => Err(DecodeError::missing(self.entity, key)),
            Some(Value::String(s)) => Ok(s.clone()),
            Some(Value::Number(n)) => Ok(n.to_string()),
            Some(other) => Err(self.mistyped(key, "a string or number", other)),
        }
    }

    pub fn required_u64(&self, key: &str) -> Result<u64, DecodeError> {
        self.optional_u64(key)?
            .ok_or_else(|| DecodeError::missing(self.entity, key))
    }

    /// Unsigned integer; numeric strings are accepted since some broker
    /// actions stringify ids.
    pub fn optional_u64(&self, key: &str) -> Result<Option<u64>, DecodeError> {
        match self.get(key) {
            None => Ok(None),
            Some(Value::Number(n)) => n
                .as_u64()
                .map(Some)
                .ok_or_else(|| self.mistyped(key, "an unsigned integer", &Value::Number(n.clone()))),
            Some(Value::String(s)) => s
                .parse::<u64>()
                .map(Some)
                .map_err(|_| self.mistyped(key, "an unsigned integer", &Value::String(s.clone()))),
            Some(other) => Err(self.mistyped(key, "an unsigned integer", other)),
        }
    }

    pub fn flag(&self, key: &str) -> Result<bool, DecodeError> {
        match self.get(key) {
            None => Ok(false),
            Some(Value::Bool(b)) => Ok(*b),
            Some(other) => Err(self.mistyped(key, "a boolean", other)),
        }
    }

    pub fn optional_timestamp(&self, key: &str) -> Result<Option<DateTime<Utc>>, DecodeError> {
        match self.optional_str(key)? {
            None => Ok(None),
            Some(raw) => DateTime::parse_from_rfc3339(&raw)
                .map(|ts| Some(ts.with_timezone(&Utc)))
                .map_err(|e| DecodeError::new(self.entity, key, format!("is not an RFC 3339 timestamp: {}", e))),
        }
    }

    pub fn optional_object(&self, key: &str) -> Result<Option<&'a Map<String, Value>>, DecodeError> {
        match self.get(key) {
            None => Ok(None),
            Some(Value::Object(map)) => Ok(Some(map)),
            Some(other) => Err(self.mistyped(key, "an object", other)),
        }
    }

    /// Object-valued field, or an empty map when absent.
    pub fn object_or_empty(&self, key: &str) -> Result<Map<String, Value>, DecodeError> {
        Ok(self.optional_object(key)?.cloned().unwrap_or_default())
    }

    /// Nested object fields, if `key` holds an object. Other shapes yield `None`.
    pub fn nested(&self, key: &str) -> Option<Fields<'a>> {
        match self.get(key) {
            Some(Value::Object(map)) => Some(Fields {
                entity: self.entity,
                map,
            }),
            _ => None,
        }
    }

    /// Deserialize a nested field with serde, attributing failures to `key`.
    pub fn typed<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, DecodeError> {
        match self.get(key) {
            None => Ok(None),
            Some(value) => serde_json::from_value(value.clone())
                .map(Some)
                .map_err(|e| DecodeError::new(self.entity, key, e.to_string())),
        }
    }

    /// String list; object items contribute their `name` (or `slug`).
    pub fn string_list(&self, key: &str) -> Result<Vec<String>, DecodeError> {
        match self.get(key) {
            None => Ok(Vec::new()),
            Some(Value::Array(items)) => Ok(items
                .iter()
                .filter_map(|item| match item {
                    Value::String(s) => Some(s.clone()),
                    Value::Object(map) => map
                        .get("name")
                        .or_else(|| map.get("slug"))
                        .and_then(Value::as_str)
                        .map(str::to_string),
                    _ => None,
                })
                .collect()),
            Some(other) => Err(self.mistyped(key, "an array", other)),
        }
    }

    pub fn raw(&self, key: &str) -> Option<Value> {
        self.get(key).cloned()
    }
}

/// Collect the objects of a list-shaped payload.
///
/// Accepts a bare array, or an object holding the array under the first of
/// `keys` that is present. With `wrap_entity`, an object that carries its own
/// `id` is treated as a single-item list.
pub fn list_items<'a>(value: &'a Value, keys: &[&str], wrap_entity: bool) -> Vec<&'a Value> {
    let items = match value {
        Value::Array(items) => Some(items),
        Value::Object(map) => keys
            .iter()
            .find_map(|key| map.get(*key).and_then(Value::as_array)),
        _ => None,
    };

    match items {
        Some(items) => items.iter().filter(|item| item.is_object()).collect(),
        None if wrap_entity && value.get("id").is_some() => vec![value],
        None => Vec::new(),
    }
}

/// Concatenated `plain_text` of a rich-text array; `None` for anything else
/// or for an empty array.
pub fn plain_text(value: Option<&Value>) -> Option<String> {
    let segments = value?.as_array()?;
    if segments.is_empty() {
        return None;
    }
    Some(
        segments
            .iter()
            .filter_map(|segment| segment.get("plain_text").and_then(Value::as_str))
            .collect(),
    )
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
