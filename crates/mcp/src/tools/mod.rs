mod args;
pub mod management;
pub mod notion;
mod registry;
pub mod zoom;

pub use management::{ManagementOp, ManagementTool};
pub use notion::{NotionOp, NotionTool};
pub use registry::{
    json_schema_array, json_schema_boolean, json_schema_enum, json_schema_free_object,
    json_schema_integer, json_schema_object, json_schema_string, Tool, ToolRegistry, ToolTier,
};
pub use zoom::{ZoomOp, ZoomTool};

use crate::protocol::CallToolResult;
use composio_sdk::ComposioResult;
use serde::Serialize;
use tracing::debug;

/// Render an SDK result: pretty JSON on success, a `{kind, message}` error
/// result otherwise.
pub(crate) fn respond<T: Serialize>(result: ComposioResult<T>) -> CallToolResult {
    match result {
        Ok(value) => match serde_json::to_string_pretty(&value) {
            Ok(text) => CallToolResult::text(text),
            Err(e) => CallToolResult::failure("decode", format!("Failed to encode result: {}", e)),
        },
        Err(e) => {
            debug!(kind = %e.kind(), error = %e, "Tool call failed");
            CallToolResult::failure(e.kind().as_str(), e.to_string())
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use composio_sdk::{ActionExecutor, ClientConfig, HttpTransport};
    use serde_json::{json, Value};
    use std::sync::Arc;
    use url::Url;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    pub fn executor_for(server: &MockServer) -> Arc<dyn ActionExecutor> {
        let config = ClientConfig::new(Url::parse(&server.uri()).unwrap(), "ak_test");
        Arc::new(HttpTransport::new(Arc::new(config)).unwrap())
    }

    fn action_path(action: &str) -> String {
        format!("/api/v2/actions/{}/execute", action)
    }

    pub async fn stub_action(server: &MockServer, action: &str, data: Value) {
        Mock::given(method("POST"))
            .and(path(action_path(action)))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"successful": true, "data": data})),
            )
            .mount(server)
            .await;
    }

    pub async fn stub_failure(server: &MockServer, action: &str, error: &str) {
        Mock::given(method("POST"))
            .and(path(action_path(action)))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "successful": false,
                "data": {},
                "error": error
            })))
            .mount(server)
            .await;
    }
}
