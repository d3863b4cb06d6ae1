//! Management API: toolkits, auth configs and connected accounts.

use super::{decode_list, decode_one};
use crate::error::{ComposioError, ComposioResult};
use crate::transport::{ActionExecutor, ManagementCall};
use composio_core::management::{
    AuthConfig, AuthConfigCreate, ConnectedAccount, ConnectionFilter, ConnectionRequest, Deleted,
    Toolkit, ToolkitTool,
};
use serde_json::{json, Map, Value};
use std::sync::Arc;
use tracing::debug;

const TOOLKITS: &str = "/api/v3/toolkits";
const ACTIONS: &str = "/api/v2/actions";
const AUTH_CONFIGS: &str = "/api/v3/auth_configs";
const CONNECTED_ACCOUNTS: &str = "/api/v3/connected_accounts";

/// Prefix of connected-account ids issued by the v3 API.
const V3_ACCOUNT_PREFIX: &str = "ca_";

/// User id sent when a connection is initiated without one.
pub const DEFAULT_USER_ID: &str = "default";

/// Options for starting a connection.
#[derive(Debug, Clone, PartialEq)]
pub struct ConnectionInit {
    pub auth_config_id: String,
    pub user_id: String,
    pub callback_url: Option<String>,
    /// Extra fields merged into the `connection` object.
    pub config: Option<Map<String, Value>>,
}

impl ConnectionInit {
    pub fn new(auth_config_id: impl Into<String>) -> Self {
        Self {
            auth_config_id: auth_config_id.into(),
            user_id: DEFAULT_USER_ID.to_string(),
            callback_url: None,
            config: None,
        }
    }

    fn body(&self) -> Value {
        let mut connection = Map::new();
        connection.insert("user_id".to_string(), json!(self.user_id));
        if let Some(url) = self.callback_url.as_deref().filter(|u| !u.is_empty()) {
            connection.insert("callback_url".to_string(), json!(url));
        }
        if let Some(ref config) = self.config {
            connection.extend(config.clone());
        }

        json!({
            "auth_config": {"id": self.auth_config_id},
            "connection": connection,
        })
    }
}

/// Client for the broker's management API.
#[derive(Clone)]
pub struct ManagementClient {
    executor: Arc<dyn ActionExecutor>,
}

impl ManagementClient {
    pub fn new(executor: Arc<dyn ActionExecutor>) -> Self {
        Self { executor }
    }

    async fn call(&self, call: ManagementCall) -> ComposioResult<Value> {
        self.executor.execute_management(call).await
    }

    // Toolkits

    pub async fn list_toolkits(&self, search: Option<&str>) -> ComposioResult<Vec<Toolkit>> {
        let mut call = ManagementCall::get("list_toolkits", TOOLKITS);
        if let Some(search) = search.filter(|s| !s.is_empty()) {
            call = call.with_query(vec![("search".to_string(), search.to_string())]);
        }
        let body = self.call(call).await?;
        decode_list(&body, &["items", "toolkits"], false)
    }

    /// Actions available for a toolkit.
    pub async fn get_toolkit_tools(&self, toolkit_slug: &str) -> ComposioResult<Vec<ToolkitTool>> {
        let call = ManagementCall::get("get_toolkit_tools", ACTIONS).with_query(vec![
            ("apps".to_string(), toolkit_slug.to_string()),
            ("limit".to_string(), "100".to_string()),
        ]);
        let body = self.call(call).await?;
        decode_list(&body, &["items", "tools"], false)
    }

    // Auth configs

    pub async fn list_auth_configs(
        &self,
        toolkit_slug: Option<&str>,
    ) -> ComposioResult<Vec<AuthConfig>> {
        let mut call = ManagementCall::get("list_auth_configs", AUTH_CONFIGS);
        if let Some(slug) = toolkit_slug.filter(|s| !s.is_empty()) {
            call = call.with_query(vec![("toolkit_slug".to_string(), slug.to_string())]);
        }
        let body = self.call(call).await?;
        decode_list(&body, &["items", "auth_configs"], false)
    }

    pub async fn get_auth_config(&self, auth_config_id: &str) -> ComposioResult<AuthConfig> {
        let body = self
            .call(ManagementCall::get(
                "get_auth_config",
                format!("{}/{}", AUTH_CONFIGS, auth_config_id),
            ))
            .await?;
        decode_one(&body)
    }

    /// Create an auth config. Fields the broker does not echo back are
    /// filled from the request.
    pub async fn create_auth_config(&self, request: &AuthConfigCreate) -> ComposioResult<AuthConfig> {
        let body = self
            .call(ManagementCall::post(
                "create_auth_config",
                AUTH_CONFIGS,
                request.request_body(),
            ))
            .await?;

        let mut config: AuthConfig = decode_one(&body)?;
        config.toolkit_slug.get_or_insert_with(|| request.toolkit_slug.clone());
        config
            .auth_scheme
            .get_or_insert_with(|| request.auth_scheme.as_str().to_string());
        if config.name.is_none() {
            config.name = request.name.clone();
        }
        Ok(config)
    }

    pub async fn delete_auth_config(&self, auth_config_id: &str) -> ComposioResult<Deleted> {
        let body = self
            .call(ManagementCall::delete(
                "delete_auth_config",
                format!("{}/{}", AUTH_CONFIGS, auth_config_id),
            ))
            .await?;
        Ok(Deleted::new(auth_config_id, body))
    }

    // Connected accounts

    pub async fn list_connections(
        &self,
        filter: &ConnectionFilter,
    ) -> ComposioResult<Vec<ConnectedAccount>> {
        let call =
            ManagementCall::get("list_connections", CONNECTED_ACCOUNTS).with_query(filter.query());
        let body = self.call(call).await?;
        decode_list(&body, &["items", "connected_accounts"], false)
    }

    pub async fn get_connection(&self, connection_id: &str) -> ComposioResult<ConnectedAccount> {
        let body = self
            .call(ManagementCall::get(
                "get_connection",
                format!("{}/{}", CONNECTED_ACCOUNTS, connection_id),
            ))
            .await?;
        decode_one(&body)
    }

    /// Start an OAuth connection; the returned request carries the redirect
    /// URL the user must visit.
    pub async fn initiate_connection(
        &self,
        init: &ConnectionInit,
    ) -> ComposioResult<ConnectionRequest> {
        let body = self
            .call(ManagementCall::post(
                "initiate_connection",
                CONNECTED_ACCOUNTS,
                init.body(),
            ))
            .await?;
        decode_one(&body)
    }

    /// Create a broker-hosted auth link. `config` is not sent.
    pub async fn initiate_connection_link(
        &self,
        init: &ConnectionInit,
    ) -> ComposioResult<ConnectionRequest> {
        let link = ConnectionInit {
            config: None,
            ..init.clone()
        };
        let body = self
            .call(ManagementCall::post(
                "initiate_connection_link",
                format!("{}/link", CONNECTED_ACCOUNTS),
                link.body(),
            ))
            .await?;
        decode_one(&body)
    }

    pub async fn delete_connection(&self, connection_id: &str) -> ComposioResult<Deleted> {
        let body = self
            .call(ManagementCall::delete(
                "delete_connection",
                format!("{}/{}", CONNECTED_ACCOUNTS, connection_id),
            ))
            .await?;
        Ok(Deleted::new(connection_id, body))
    }

    pub async fn refresh_connection(
        &self,
        connection_id: &str,
    ) -> ComposioResult<ConnectedAccount> {
        let mut body = self
            .call(ManagementCall::post(
                "refresh_connection",
                format!("{}/{}/refresh", CONNECTED_ACCOUNTS, connection_id),
                json!({}),
            ))
            .await?;

        if let Value::Object(ref mut map) = body {
            map.entry("id")
                .or_insert_with(|| Value::String(connection_id.to_string()));
        }
        decode_one(&body)
    }

    // Actions

    /// Run any action on any connected account.
    ///
    /// The action endpoint only understands the legacy account UUID, so a v3
    /// `ca_` id is first looked up and replaced by its deprecated UUID.
    pub async fn execute_action(
        &self,
        action: &str,
        connected_account_id: &str,
        parameters: Option<Value>,
    ) -> ComposioResult<Value> {
        let account_id = self.resolve_account_id(connected_account_id).await?;
        self.executor
            .execute_action(
                action,
                &account_id,
                parameters.unwrap_or_else(|| Value::Object(Map::new())),
            )
            .await
    }

    async fn resolve_account_id(&self, connected_account_id: &str) -> ComposioResult<String> {
        if !connected_account_id.starts_with(V3_ACCOUNT_PREFIX) {
            return Ok(connected_account_id.to_string());
        }

        let account = self.get_connection(connected_account_id).await?;
        match account.deprecated_uuid {
            Some(uuid) if !uuid.is_empty() => {
                debug!(id = %connected_account_id, uuid = %uuid, "Resolved v3 connected account");
                Ok(uuid)
            }
            _ => Err(ComposioError::config(format!(
                "cannot resolve connected account {} to a legacy UUID; pass the UUID directly",
                connected_account_id
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::testing::{action_path, executor_for};
    use crate::error::ErrorKind;
    use composio_core::management::{AuthScheme, ConnectionStatus};
    use wiremock::matchers::{body_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> ManagementClient {
        ManagementClient::new(executor_for(server))
    }

    #[tokio::test]
    async fn test_list_toolkits() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path(TOOLKITS))
            .and(query_param("search", "notion"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "items": [
                    {"slug": "notion", "name": "Notion", "meta": {"description": "Docs", "categories": [{"name": "productivity"}]}},
                    {"key": "notion_legacy", "display_name": "Notion (legacy)"}
                ]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let toolkits = client_for(&server)
            .list_toolkits(Some("notion"))
            .await
            .unwrap();

        assert_eq!(toolkits.len(), 2);
        assert_eq!(toolkits[0].description.as_deref(), Some("Docs"));
        assert_eq!(toolkits[1].slug, "notion_legacy");
        assert_eq!(toolkits[1].name, "Notion (legacy)");
    }

    #[tokio::test]
    async fn test_get_toolkit_tools_uses_v2_actions() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path(ACTIONS))
            .and(query_param("apps", "zoom"))
            .and(query_param("limit", "100"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "items": [{"name": "ZOOM_GET_A_MEETING", "display_name": "Get a meeting"}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let tools = client_for(&server).get_toolkit_tools("zoom").await.unwrap();

        assert_eq!(tools[0].action, "ZOOM_GET_A_MEETING");
    }

    #[tokio::test]
    async fn test_create_auth_config_fills_from_request() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(AUTH_CONFIGS))
            .and(body_json(json!({
                "toolkit": {"slug": "notion"},
                "options": {"type": "use_composio_managed_auth", "auth_scheme": "OAUTH2"}
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({
                "auth_config": {"id": "ac_1"}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let mut request = AuthConfigCreate::new("notion");
        request.auth_scheme = AuthScheme::Oauth2;

        let config = client_for(&server)
            .create_auth_config(&request)
            .await
            .unwrap();

        assert_eq!(config.id, "ac_1");
        assert_eq!(config.toolkit_slug.as_deref(), Some("notion"));
        assert_eq!(config.auth_scheme.as_deref(), Some("OAUTH2"));
    }

    #[tokio::test]
    async fn test_list_connections_applies_filter() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path(CONNECTED_ACCOUNTS))
            .and(query_param("toolkit_slug", "zoom"))
            .and(query_param("status", "ACTIVE"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "items": [{
                    "id": "ca_1",
                    "status": "ACTIVE",
                    "toolkit": {"slug": "zoom"},
                    "entity_id": "default",
                    "deprecated": {"uuid": "0f1e2d3c"}
                }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let filter = ConnectionFilter {
            toolkit_slug: Some("zoom".to_string()),
            status: Some(ConnectionStatus::Active),
            user_id: None,
        };
        let accounts = client_for(&server).list_connections(&filter).await.unwrap();

        assert_eq!(accounts.len(), 1);
        assert_eq!(accounts[0].status, ConnectionStatus::Active);
        assert_eq!(accounts[0].toolkit_slug.as_deref(), Some("zoom"));
        assert_eq!(accounts[0].user_id.as_deref(), Some("default"));
        assert_eq!(accounts[0].deprecated_uuid.as_deref(), Some("0f1e2d3c"));
    }

    #[tokio::test]
    async fn test_initiate_connection_body() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(CONNECTED_ACCOUNTS))
            .and(body_json(json!({
                "auth_config": {"id": "ac_1"},
                "connection": {"user_id": "default", "callback_url": "https://app/cb"}
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "connectedAccountId": "ca_9",
                "redirectUrl": "https://auth.example/start"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let mut init = ConnectionInit::new("ac_1");
        init.callback_url = Some("https://app/cb".to_string());

        let request = client_for(&server)
            .initiate_connection(&init)
            .await
            .unwrap();

        assert_eq!(request.id, "ca_9");
        assert_eq!(request.status, ConnectionStatus::Initiated);
        assert_eq!(
            request.redirect_url.as_deref(),
            Some("https://auth.example/start")
        );
    }

    #[tokio::test]
    async fn test_delete_connection_returns_record() {
        let server = MockServer::start().await;

        Mock::given(method("DELETE"))
            .and(path(format!("{}/ca_1", CONNECTED_ACCOUNTS)))
            .respond_with(ResponseTemplate::new(204))
            .mount(&server)
            .await;

        let deleted = client_for(&server).delete_connection("ca_1").await.unwrap();

        assert_eq!(deleted.id, "ca_1");
        assert_eq!(deleted.status, "deleted");
    }

    #[tokio::test]
    async fn test_refresh_connection_defaults_id() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(format!("{}/ca_1/refresh", CONNECTED_ACCOUNTS)))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"status": "INITIATED"})),
            )
            .mount(&server)
            .await;

        let account = client_for(&server).refresh_connection("ca_1").await.unwrap();

        assert_eq!(account.id, "ca_1");
        assert_eq!(account.status, ConnectionStatus::Initiated);
    }

    #[tokio::test]
    async fn test_execute_action_resolves_v3_id() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path(format!("{}/ca_abc", CONNECTED_ACCOUNTS)))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "ca_abc",
                "status": "ACTIVE",
                "deprecated": {"uuid": "9b2c-uuid"}
            })))
            .expect(1)
            .mount(&server)
            .await;

        Mock::given(method("POST"))
            .and(path(action_path("SLACK_SEND_MESSAGE")))
            .and(body_json(json!({
                "connectedAccountId": "9b2c-uuid",
                "input": {"channel": "#general"}
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "successful": true,
                "data": {"ok": true}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let data = client_for(&server)
            .execute_action(
                "SLACK_SEND_MESSAGE",
                "ca_abc",
                Some(json!({"channel": "#general"})),
            )
            .await
            .unwrap();

        assert_eq!(data, json!({"ok": true}));
    }

    #[tokio::test]
    async fn test_execute_action_passes_legacy_id_through() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(action_path("NOTION_LIST_USERS")))
            .and(body_json(json!({"connectedAccountId": "legacy-uuid", "input": {}})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "successful": true,
                "data": []
            })))
            .expect(1)
            .mount(&server)
            .await;

        let data = client_for(&server)
            .execute_action("NOTION_LIST_USERS", "legacy-uuid", None)
            .await
            .unwrap();

        assert_eq!(data, json!([]));
    }

    #[tokio::test]
    async fn test_execute_action_unresolvable_v3_id() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path(format!("{}/ca_new", CONNECTED_ACCOUNTS)))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"id": "ca_new", "status": "ACTIVE"})),
            )
            .mount(&server)
            .await;

        let err = client_for(&server)
            .execute_action("NOTION_LIST_USERS", "ca_new", None)
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Configuration);
        assert!(err.to_string().contains("ca_new"));
    }
}
