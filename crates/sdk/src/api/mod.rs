//! Domain and management clients.

pub mod management;
pub mod notion;
pub mod zoom;

pub use management::ManagementClient;
pub use notion::NotionClient;
pub use zoom::ZoomClient;

use crate::error::{ComposioError, ComposioResult};
use composio_core::decode::list_items;
use composio_core::Decode;
use serde::Serialize;
use serde_json::{Map, Value};

/// Decode a single entity from an action's `data`.
pub(crate) fn decode_one<T: Decode>(data: &Value) -> ComposioResult<T> {
    Ok(T::decode(data)?)
}

/// Decode a list-shaped `data`, see [`list_items`].
pub(crate) fn decode_list<T: Decode>(
    data: &Value,
    keys: &[&str],
    wrap_entity: bool,
) -> ComposioResult<Vec<T>> {
    Ok(T::decode_all(list_items(data, keys, wrap_entity))?)
}

/// Start a parameter object with a single entry.
pub(crate) fn params(key: &str, value: impl Into<Value>) -> Map<String, Value> {
    let mut map = Map::new();
    map.insert(key.to_string(), value.into());
    map
}

/// Merge the serialized fields of `payload` into `params`.
pub(crate) fn merge_fields(
    action: &str,
    params: &mut Map<String, Value>,
    payload: &impl Serialize,
) -> ComposioResult<()> {
    match serde_json::to_value(payload) {
        Ok(Value::Object(fields)) => {
            params.extend(fields);
            Ok(())
        }
        Ok(other) => Err(ComposioError::config(format!(
            "parameters for {} must be an object, got {}",
            action, other
        ))),
        Err(e) => Err(ComposioError::config(format!(
            "parameters for {} could not be serialized: {}",
            action, e
        ))),
    }
}
