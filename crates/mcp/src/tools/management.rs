// Management tools: toolkits, auth configs, connected accounts and raw actions

use super::args::{self, parse};
use super::registry::{
    json_schema_boolean, json_schema_enum, json_schema_object, json_schema_string, Tool, ToolTier,
};
use super::respond;
use crate::protocol::{CallToolResult, ToolSchema};
use anyhow::Result;
use composio_sdk::{
    AuthConfigCreate, AuthScheme, ConnectionFilter, ConnectionInit, ConnectionStatus,
    ManagementClient,
};
use serde::Deserialize;
use serde_json::{json, Map, Value};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManagementOp {
    ListToolkits,
    GetToolkitTools,
    ListAuthConfigs,
    GetAuthConfig,
    CreateAuthConfig,
    DeleteAuthConfig,
    ListConnections,
    GetConnection,
    InitiateConnection,
    InitiateConnectionLink,
    DeleteConnection,
    RefreshConnection,
    ExecuteAction,
}

impl ManagementOp {
    pub const ALL: [ManagementOp; 13] = [
        Self::ListToolkits,
        Self::GetToolkitTools,
        Self::ListAuthConfigs,
        Self::GetAuthConfig,
        Self::CreateAuthConfig,
        Self::DeleteAuthConfig,
        Self::ListConnections,
        Self::GetConnection,
        Self::InitiateConnection,
        Self::InitiateConnectionLink,
        Self::DeleteConnection,
        Self::RefreshConnection,
        Self::ExecuteAction,
    ];

    pub fn tool_name(&self) -> &'static str {
        match self {
            Self::ListToolkits => "composio_list_toolkits",
            Self::GetToolkitTools => "composio_get_toolkit_tools",
            Self::ListAuthConfigs => "composio_list_auth_configs",
            Self::GetAuthConfig => "composio_get_auth_config",
            Self::CreateAuthConfig => "composio_create_auth_config",
            Self::DeleteAuthConfig => "composio_delete_auth_config",
            Self::ListConnections => "composio_list_connections",
            Self::GetConnection => "composio_get_connection",
            Self::InitiateConnection => "composio_initiate_connection",
            Self::InitiateConnectionLink => "composio_initiate_connection_link",
            Self::DeleteConnection => "composio_delete_connection",
            Self::RefreshConnection => "composio_refresh_connection",
            Self::ExecuteAction => "composio_execute_action",
        }
    }

    fn description(&self) -> &'static str {
        match self {
            Self::ListToolkits => "List the apps (toolkits) available on the broker.",
            Self::GetToolkitTools => "List the actions a toolkit provides.",
            Self::ListAuthConfigs => "List auth configs, optionally for one toolkit.",
            Self::GetAuthConfig => "Get one auth config.",
            Self::CreateAuthConfig => "Create an auth config for connecting an app.",
            Self::DeleteAuthConfig => "Delete an auth config.",
            Self::ListConnections => "List connected accounts with optional filters.",
            Self::GetConnection => "Get one connected account.",
            Self::InitiateConnection => {
                "Start an OAuth connection. Open the returned redirect_url in a browser, then check the connection status."
            }
            Self::InitiateConnectionLink => "Create a broker-hosted auth link for connecting an app.",
            Self::DeleteConnection => "Delete a connected account.",
            Self::RefreshConnection => "Refresh the authentication of a connected account.",
            Self::ExecuteAction => "Execute any broker action on a connected account.",
        }
    }

    fn input_schema(&self) -> Value {
        let connection_id = || json_schema_string("Connected account id");
        let auth_config_id = || json_schema_string("Auth config id");
        match self {
            Self::ListToolkits => json_schema_object(
                json!({"search": json_schema_string("Filter toolkits by name")}),
                vec![],
            ),
            Self::GetToolkitTools => json_schema_object(
                json!({"toolkit_slug": json_schema_string("Toolkit slug, e.g. notion")}),
                vec!["toolkit_slug"],
            ),
            Self::ListAuthConfigs => json_schema_object(
                json!({"toolkit_slug": json_schema_string("Only configs for this toolkit")}),
                vec![],
            ),
            Self::GetAuthConfig | Self::DeleteAuthConfig => json_schema_object(
                json!({"auth_config_id": auth_config_id()}),
                vec!["auth_config_id"],
            ),
            Self::CreateAuthConfig => json_schema_object(
                json!({
                    "toolkit_slug": json_schema_string("App to configure, e.g. github"),
                    "auth_scheme": json_schema_enum(
                        &["OAUTH2", "API_KEY", "BEARER_TOKEN", "BASIC"],
                        "Auth method (default OAUTH2)",
                    ),
                    "name": json_schema_string("Display name"),
                    "use_composio_auth": json_schema_boolean("Use the broker's managed OAuth app (default true)"),
                    "scopes": json_schema_string("Comma-separated OAuth scopes, e.g. read,write"),
                }),
                vec!["toolkit_slug"],
            ),
            Self::ListConnections => json_schema_object(
                json!({
                    "toolkit_slug": json_schema_string("Filter by toolkit"),
                    "status": json_schema_enum(
                        &["ACTIVE", "INACTIVE", "PENDING", "INITIATED", "EXPIRED", "FAILED"],
                        "Filter by status",
                    ),
                    "user_id": json_schema_string("Filter by user id"),
                }),
                vec![],
            ),
            Self::GetConnection | Self::DeleteConnection | Self::RefreshConnection => {
                json_schema_object(
                    json!({"connection_id": connection_id()}),
                    vec!["connection_id"],
                )
            }
            Self::InitiateConnection | Self::InitiateConnectionLink => json_schema_object(
                json!({
                    "auth_config_id": auth_config_id(),
                    "user_id": json_schema_string("User identifier (default \"default\")"),
                    "callback_url": json_schema_string("Where to redirect after authentication"),
                }),
                vec!["auth_config_id"],
            ),
            Self::ExecuteAction => json_schema_object(
                json!({
                    "action": json_schema_string("Action id, e.g. GITHUB_CREATE_AN_ISSUE"),
                    "connected_account_id": connection_id(),
                    "params": json_schema_string("JSON object of action input parameters"),
                }),
                vec!["action", "connected_account_id"],
            ),
        }
    }

    fn tier(&self) -> ToolTier {
        match self {
            Self::CreateAuthConfig
            | Self::InitiateConnection
            | Self::InitiateConnectionLink
            | Self::RefreshConnection
            | Self::ExecuteAction => ToolTier::Write,
            Self::DeleteAuthConfig | Self::DeleteConnection => ToolTier::Destructive,
            _ => ToolTier::Read,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ListToolkitsArgs {
    search: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ToolkitArgs {
    toolkit_slug: String,
}

#[derive(Debug, Deserialize)]
struct ListAuthConfigsArgs {
    toolkit_slug: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AuthConfigArgs {
    auth_config_id: String,
}

#[derive(Debug, Deserialize)]
struct CreateAuthConfigArgs {
    toolkit_slug: String,
    #[serde(default, deserialize_with = "args::opt_parsed")]
    auth_scheme: Option<AuthScheme>,
    name: Option<String>,
    use_composio_auth: Option<bool>,
    #[serde(default, deserialize_with = "args::opt_list")]
    scopes: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
struct ListConnectionsArgs {
    toolkit_slug: Option<String>,
    #[serde(default, deserialize_with = "args::opt_parsed")]
    status: Option<ConnectionStatus>,
    user_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ConnectionArgs {
    connection_id: String,
}

#[derive(Debug, Deserialize)]
struct ConnectArgs {
    auth_config_id: String,
    user_id: Option<String>,
    callback_url: Option<String>,
}

impl ConnectArgs {
    fn into_init(self) -> ConnectionInit {
        let mut init = ConnectionInit::new(self.auth_config_id);
        if let Some(user_id) = self.user_id.filter(|u| !u.is_empty()) {
            init.user_id = user_id;
        }
        init.callback_url = self.callback_url;
        init
    }
}

#[derive(Debug, Deserialize)]
struct ExecuteActionArgs {
    action: String,
    connected_account_id: String,
    #[serde(default, deserialize_with = "args::opt_json_object")]
    params: Option<Map<String, Value>>,
}

/// A single management operation.
pub struct ManagementTool {
    client: ManagementClient,
    op: ManagementOp,
}

impl ManagementTool {
    pub fn new(client: ManagementClient, op: ManagementOp) -> Self {
        Self { client, op }
    }

    pub fn all(client: &ManagementClient) -> Vec<Arc<dyn Tool>> {
        ManagementOp::ALL
            .iter()
            .map(|op| Arc::new(Self::new(client.clone(), *op)) as Arc<dyn Tool>)
            .collect()
    }

    async fn run(&self, arguments: Value) -> Result<CallToolResult> {
        let tool = self.op.tool_name();
        let client = &self.client;
        let result = match self.op {
            ManagementOp::ListToolkits => {
                let args: ListToolkitsArgs = parse(tool, arguments)?;
                respond(client.list_toolkits(args.search.as_deref()).await)
            }
            ManagementOp::GetToolkitTools => {
                let args: ToolkitArgs = parse(tool, arguments)?;
                respond(client.get_toolkit_tools(&args.toolkit_slug).await)
            }
            ManagementOp::ListAuthConfigs => {
                let args: ListAuthConfigsArgs = parse(tool, arguments)?;
                respond(client.list_auth_configs(args.toolkit_slug.as_deref()).await)
            }
            ManagementOp::GetAuthConfig => {
                let args: AuthConfigArgs = parse(tool, arguments)?;
                respond(client.get_auth_config(&args.auth_config_id).await)
            }
            ManagementOp::CreateAuthConfig => {
                let args: CreateAuthConfigArgs = parse(tool, arguments)?;
                let mut request = AuthConfigCreate::new(args.toolkit_slug);
                request.auth_scheme = args.auth_scheme.unwrap_or_default();
                request.name = args.name;
                if let Some(managed) = args.use_composio_auth {
                    request.use_composio_auth = managed;
                }
                request.scopes = args.scopes;
                respond(client.create_auth_config(&request).await)
            }
            ManagementOp::DeleteAuthConfig => {
                let args: AuthConfigArgs = parse(tool, arguments)?;
                respond(client.delete_auth_config(&args.auth_config_id).await)
            }
            ManagementOp::ListConnections => {
                let args: ListConnectionsArgs = parse(tool, arguments)?;
                let filter = ConnectionFilter {
                    toolkit_slug: args.toolkit_slug,
                    status: args.status,
                    user_id: args.user_id,
                };
                respond(client.list_connections(&filter).await)
            }
            ManagementOp::GetConnection => {
                let args: ConnectionArgs = parse(tool, arguments)?;
                respond(client.get_connection(&args.connection_id).await)
            }
            ManagementOp::InitiateConnection => {
                let init = parse::<ConnectArgs>(tool, arguments)?.into_init();
                respond(client.initiate_connection(&init).await)
            }
            ManagementOp::InitiateConnectionLink => {
                let init = parse::<ConnectArgs>(tool, arguments)?.into_init();
                respond(client.initiate_connection_link(&init).await)
            }
            ManagementOp::DeleteConnection => {
                let args: ConnectionArgs = parse(tool, arguments)?;
                respond(client.delete_connection(&args.connection_id).await)
            }
            ManagementOp::RefreshConnection => {
                let args: ConnectionArgs = parse(tool, arguments)?;
                respond(client.refresh_connection(&args.connection_id).await)
            }
            ManagementOp::ExecuteAction => {
                let args: ExecuteActionArgs = parse(tool, arguments)?;
                respond(
                    client
                        .execute_action(
                            &args.action,
                            &args.connected_account_id,
                            args.params.map(Value::Object),
                        )
                        .await,
                )
            }
        };
        Ok(result)
    }
}

#[async_trait::async_trait]
impl Tool for ManagementTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: self.op.tool_name().to_string(),
            description: self.op.description().to_string(),
            input_schema: self.op.input_schema(),
            annotations: None,
        }
    }

    async fn execute(&self, arguments: Value) -> Result<CallToolResult> {
        self.run(arguments).await
    }

    fn tier(&self) -> ToolTier {
        self.op.tier()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::testing::executor_for;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn tool(server: &MockServer, op: ManagementOp) -> ManagementTool {
        ManagementTool::new(ManagementClient::new(executor_for(server)), op)
    }

    #[tokio::test]
    async fn test_create_auth_config_splits_scopes() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/v3/auth_configs"))
            .and(body_json(json!({
                "toolkit": {"slug": "github"},
                "options": {
                    "type": "use_composio_managed_auth",
                    "auth_scheme": "OAUTH2",
                    "credentials": {"scopes": ["repo", "read:user"]}
                }
            })))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"auth_config": {"id": "ac_1"}})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let result = tool(&server, ManagementOp::CreateAuthConfig)
            .execute(json!({"toolkit_slug": "github", "scopes": "repo, read:user"}))
            .await
            .unwrap();

        assert!(!result.is_error(), "{:?}", result.first_text());
    }

    #[tokio::test]
    async fn test_execute_action_parses_params_string() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/v2/actions/SLACK_SEND_MESSAGE/execute"))
            .and(body_json(json!({
                "connectedAccountId": "9f1c2d7e-uuid",
                "input": {"channel": "#general", "text": "hi"}
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "successful": true,
                "data": {"ok": true}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let result = tool(&server, ManagementOp::ExecuteAction)
            .execute(json!({
                "action": "SLACK_SEND_MESSAGE",
                "connected_account_id": "9f1c2d7e-uuid",
                "params": "{\"channel\": \"#general\", \"text\": \"hi\"}"
            }))
            .await
            .unwrap();

        let data: Value = serde_json::from_str(result.first_text().unwrap()).unwrap();
        assert_eq!(data, json!({"ok": true}));
    }

    #[tokio::test]
    async fn test_invalid_params_json_rejected() {
        let server = MockServer::start().await;

        let err = tool(&server, ManagementOp::ExecuteAction)
            .execute(json!({
                "action": "SLACK_SEND_MESSAGE",
                "connected_account_id": "uuid",
                "params": "{not json"
            }))
            .await
            .unwrap_err();
        let rendered = format!("{:#}", err);
        assert!(rendered.contains("composio_execute_action"));
        assert!(rendered.contains("JSON object"));
    }

    #[tokio::test]
    async fn test_unknown_status_rejected() {
        let server = MockServer::start().await;

        let err = tool(&server, ManagementOp::ListConnections)
            .execute(json!({"status": "GONE"}))
            .await
            .unwrap_err();
        assert!(format!("{:#}", err).contains("unknown connection status"));
    }
}
