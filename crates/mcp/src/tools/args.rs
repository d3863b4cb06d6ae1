// Tool argument deserialization

use anyhow::{bail, Context, Result};
use serde::de::{DeserializeOwned, Error as _};
use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};
use std::str::FromStr;

/// Deserialize the arguments of `tool` into `T`. Absent arguments read as
/// an empty object.
pub fn parse<T: DeserializeOwned>(tool: &str, arguments: Value) -> Result<T> {
    let arguments = match arguments {
        Value::Null => Value::Object(Map::new()),
        Value::Object(map) => Value::Object(map),
        other => bail!("arguments for {} must be an object, got {}", tool, other),
    };
    serde_json::from_value(arguments).with_context(|| format!("Invalid arguments for {}", tool))
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrString {
    Number(u64),
    String(String),
}

fn parse_number<E: serde::de::Error>(raw: NumberOrString) -> Result<u64, E> {
    match raw {
        NumberOrString::Number(n) => Ok(n),
        NumberOrString::String(s) => s
            .trim()
            .parse()
            .map_err(|_| E::custom(format!("expected a non-negative integer, got '{}'", s))),
    }
}

/// Unsigned integer, also accepted as a numeric string.
pub fn number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
    parse_number(NumberOrString::deserialize(deserializer)?)
}

fn object_from(value: Value) -> Result<Option<Map<String, Value>>, String> {
    match value {
        Value::Null => Ok(None),
        Value::Object(map) => Ok(Some(map)),
        Value::String(raw) if raw.trim().is_empty() => Ok(None),
        Value::String(raw) => match serde_json::from_str(&raw) {
            Ok(Value::Object(map)) => Ok(Some(map)),
            _ => Err(format!("expected a JSON object, got '{}'", raw)),
        },
        other => Err(format!("expected a JSON object, got {}", other)),
    }
}

/// JSON object, or a string holding one. Empty strings read as absent.
pub fn opt_json_object<'de, D>(deserializer: D) -> Result<Option<Map<String, Value>>, D::Error>
where
    D: Deserializer<'de>,
{
    object_from(Value::deserialize(deserializer)?).map_err(D::Error::custom)
}

pub fn json_object<'de, D>(deserializer: D) -> Result<Map<String, Value>, D::Error>
where
    D: Deserializer<'de>,
{
    opt_json_object(deserializer)?.ok_or_else(|| D::Error::custom("expected a JSON object"))
}

fn array_from(value: Value) -> Result<Option<Vec<Value>>, String> {
    match value {
        Value::Null => Ok(None),
        Value::Array(items) => Ok(Some(items)),
        Value::String(raw) => match serde_json::from_str(&raw) {
            Ok(Value::Array(items)) => Ok(Some(items)),
            _ => Err(format!("expected a JSON array, got '{}'", raw)),
        },
        other => Err(format!("expected a JSON array, got {}", other)),
    }
}

/// JSON array, or a string holding one.
pub fn opt_json_array<'de, D>(deserializer: D) -> Result<Option<Vec<Value>>, D::Error>
where
    D: Deserializer<'de>,
{
    array_from(Value::deserialize(deserializer)?).map_err(D::Error::custom)
}

pub fn json_array<'de, D>(deserializer: D) -> Result<Vec<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    opt_json_array(deserializer)?.ok_or_else(|| D::Error::custom("expected a JSON array"))
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ListOrString {
    List(Vec<String>),
    String(String),
}

/// Comma-separated string, or an array of strings.
pub fn opt_list<'de, D>(deserializer: D) -> Result<Option<Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<ListOrString>::deserialize(deserializer)? {
        None => None,
        Some(ListOrString::List(items)) => Some(items),
        Some(ListOrString::String(raw)) => Some(
            raw.split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
        ),
    })
}

/// Case-insensitive enum parsed with `FromStr`; empty strings read as absent.
pub fn opt_parsed<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr<Err = String>,
{
    match Option::<String>::deserialize(deserializer)? {
        Some(raw) if !raw.trim().is_empty() => {
            raw.trim().parse().map(Some).map_err(D::Error::custom)
        }
        _ => Ok(None),
    }
}

/// Any deserializable value, with empty strings read as absent.
pub fn blank_as_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(None),
        Value::String(raw) if raw.trim().is_empty() => Ok(None),
        other => serde_json::from_value(other).map(Some).map_err(D::Error::custom),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use composio_sdk::{ConnectionStatus, SearchFilter};
    use serde_json::json;

    #[derive(Debug, Deserialize)]
    struct Sample {
        page_id: String,
        icon: Option<String>,
        #[serde(default, deserialize_with = "opt_json_object")]
        params: Option<Map<String, Value>>,
        #[serde(default, deserialize_with = "opt_list")]
        scopes: Option<Vec<String>>,
        #[serde(default, deserialize_with = "opt_parsed")]
        status: Option<ConnectionStatus>,
        #[serde(default, deserialize_with = "blank_as_none")]
        filter: Option<SearchFilter>,
    }

    #[derive(Debug, Deserialize)]
    struct Meeting {
        #[serde(deserialize_with = "number")]
        meeting_id: u64,
    }

    #[test]
    fn test_required_and_optional_fields() {
        let sample: Sample = parse("t", json!({"page_id": "p1", "icon": null})).unwrap();
        assert_eq!(sample.page_id, "p1");
        assert!(sample.icon.is_none());
        assert!(sample.params.is_none());

        let err = parse::<Sample>("t", json!({})).unwrap_err();
        let rendered = format!("{:#}", err);
        assert!(rendered.starts_with("Invalid arguments for t"));
        assert!(rendered.contains("page_id"));
    }

    #[test]
    fn test_number_accepts_numeric_strings() {
        let meeting: Meeting = parse("t", json!({"meeting_id": "8123456789"})).unwrap();
        assert_eq!(meeting.meeting_id, 8_123_456_789);

        let meeting: Meeting = parse("t", json!({"meeting_id": 42})).unwrap();
        assert_eq!(meeting.meeting_id, 42);

        assert!(parse::<Meeting>("t", json!({"meeting_id": "abc"})).is_err());
    }

    #[test]
    fn test_object_from_json_string() {
        let sample: Sample = parse(
            "t",
            json!({"page_id": "p1", "params": "{\"channel\": \"#general\"}"}),
        )
        .unwrap();
        assert_eq!(sample.params.unwrap()["channel"], "#general");

        let err =
            parse::<Sample>("t", json!({"page_id": "p1", "params": "{not json"})).unwrap_err();
        assert!(format!("{:#}", err).contains("JSON object"));
    }

    #[test]
    fn test_list_from_comma_string_or_array() {
        let sample: Sample =
            parse("t", json!({"page_id": "p1", "scopes": "read, write,,publish"})).unwrap();
        assert_eq!(
            sample.scopes,
            Some(vec!["read".to_string(), "write".to_string(), "publish".to_string()])
        );

        let sample: Sample = parse("t", json!({"page_id": "p1", "scopes": ["repo"]})).unwrap();
        assert_eq!(sample.scopes, Some(vec!["repo".to_string()]));
    }

    #[test]
    fn test_enums() {
        let sample: Sample = parse(
            "t",
            json!({"page_id": "p1", "status": "active", "filter": "database"}),
        )
        .unwrap();
        assert_eq!(sample.status, Some(ConnectionStatus::Active));
        assert_eq!(sample.filter, Some(SearchFilter::Database));

        let sample: Sample = parse("t", json!({"page_id": "p1", "filter": ""})).unwrap();
        assert!(sample.filter.is_none());

        let err = parse::<Sample>("t", json!({"page_id": "p1", "status": "GONE"})).unwrap_err();
        assert!(format!("{:#}", err).contains("unknown connection status"));
    }

    #[test]
    fn test_non_object_arguments_rejected() {
        assert!(parse::<Meeting>("t", json!([1, 2])).is_err());
        assert!(parse::<Sample>("t", Value::Null).is_err());
    }
}
