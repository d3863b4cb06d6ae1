//! HTTP transport layer for the Composio SDK.

use super::ActionExecutor;
use crate::config::ClientConfig;
use crate::error::{ComposioError, ComposioResult};
use async_trait::async_trait;
use composio_core::envelope::broker_message;
use composio_core::ResponseEnvelope;
use reqwest::{header, Client, Method, RequestBuilder};
use serde_json::{json, Map, Value};
use std::sync::Arc;
use tracing::debug;

/// A single call against the management API.
#[derive(Debug, Clone, PartialEq)]
pub struct ManagementCall {
    /// Diagnostic name carried by errors, e.g. `list_connections`.
    pub name: String,
    pub method: Method,
    /// Versioned path such as `/api/v3/connected_accounts`.
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
}

impl ManagementCall {
    fn new(name: impl Into<String>, method: Method, path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
        }
    }

    pub fn get(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self::new(name, Method::GET, path)
    }

    pub fn post(name: impl Into<String>, path: impl Into<String>, body: Value) -> Self {
        let mut call = Self::new(name, Method::POST, path);
        call.body = Some(body);
        call
    }

    pub fn delete(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self::new(name, Method::DELETE, path)
    }

    pub fn with_query(mut self, query: Vec<(String, String)>) -> Self {
        self.query = query;
        self
    }
}

/// HTTP transport for the broker.
///
/// Cloning is cheap: clones share the connection pool, which is released when
/// the last clone is dropped.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    config: Arc<ClientConfig>,
}

impl HttpTransport {
    /// Create a new HTTP transport with the given configuration.
    pub fn new(config: Arc<ClientConfig>) -> ComposioResult<Self> {
        let mut headers = header::HeaderMap::new();

        let mut api_key = header::HeaderValue::from_str(&config.api_key)
            .map_err(|_| ComposioError::config("API key contains invalid header characters"))?;
        api_key.set_sensitive(true);
        headers.insert(header::HeaderName::from_static("x-api-key"), api_key);
        headers.insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/json"),
        );

        let mut builder = Client::builder()
            .default_headers(headers)
            .user_agent(config.user_agent.clone());
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build()?;

        Ok(Self { client, config })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Build a URL for the given path.
    fn build_url(&self, path: &str) -> ComposioResult<url::Url> {
        Ok(self.config.base_url.join(path.trim_start_matches('/'))?)
    }

    /// Send a request and return the parsed body. Non-2xx statuses become
    /// action errors attributed to `context`.
    async fn send(&self, context: &str, request: RequestBuilder) -> ComposioResult<Value> {
        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<Value>(&text)
                .ok()
                .and_then(|body| broker_message(&body))
                .or_else(|| Some(text.trim().to_string()).filter(|t| !t.is_empty()))
                .unwrap_or_else(|| {
                    status
                        .canonical_reason()
                        .unwrap_or("request failed")
                        .to_string()
                });
            debug!(context = %context, status = status.as_u16(), "Broker returned an error status");
            return Err(ComposioError::Action {
                action: context.to_string(),
                message,
                status: Some(status.as_u16()),
            });
        }

        if text.trim().is_empty() {
            return Ok(Value::Object(Map::new()));
        }

        serde_json::from_str(&text).map_err(|e| ComposioError::MalformedResponse {
            context: context.to_string(),
            message: e.to_string(),
        })
    }
}

#[async_trait]
impl ActionExecutor for HttpTransport {
    async fn execute_action(
        &self,
        action: &str,
        connected_account_id: &str,
        parameters: Value,
    ) -> ComposioResult<Value> {
        let url = self.build_url(&format!("api/v2/actions/{}/execute", action))?;
        debug!(url = %url, action = %action, "Executing action");

        let input = match parameters {
            Value::Null => Value::Object(Map::new()),
            other => other,
        };
        let body = json!({
            "connectedAccountId": connected_account_id,
            "input": input,
        });

        let raw = self.send(action, self.client.post(url).json(&body)).await?;
        let envelope: ResponseEnvelope =
            serde_json::from_value(raw).map_err(|e| ComposioError::MalformedResponse {
                context: action.to_string(),
                message: format!("not a response envelope: {}", e),
            })?;

        envelope
            .into_result()
            .map_err(|message| ComposioError::action_failed(action, message))
    }

    async fn execute_management(&self, call: ManagementCall) -> ComposioResult<Value> {
        let url = self.build_url(&call.path)?;
        debug!(url = %url, call = %call.name, method = %call.method, "Management request");

        let mut request = self.client.request(call.method.clone(), url);
        if !call.query.is_empty() {
            request = request.query(&call.query);
        }
        if let Some(ref body) = call.body {
            request = request.json(body);
        }

        self.send(&call.name, request).await
    }
}
