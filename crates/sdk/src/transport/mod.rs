//! Transport layer for the Composio SDK.

pub mod http;

pub use http::{HttpTransport, ManagementCall};

use crate::error::ComposioResult;
use async_trait::async_trait;
use serde_json::Value;

/// The two primitives every client is built on.
///
/// Domain and management clients hold an `Arc<dyn ActionExecutor>`, so tests
/// and alternative transports can be swapped in without touching them.
#[async_trait]
pub trait ActionExecutor: Send + Sync {
    /// Run a broker action on behalf of a connected account and return the
    /// envelope's `data`.
    async fn execute_action(
        &self,
        action: &str,
        connected_account_id: &str,
        parameters: Value,
    ) -> ComposioResult<Value>;

    /// Call the versioned management API and return the response body.
    async fn execute_management(&self, call: ManagementCall) -> ComposioResult<Value>;
}
