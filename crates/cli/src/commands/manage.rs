use crate::output::{self, Printer};
use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use composio_sdk::{
    AuthConfigCreate, AuthScheme, ConnectionFilter, ConnectionInit, ConnectionStatus,
    ManagementClient,
};
use serde_json::Value;

/// Options shared by `connect` and `connect-link`.
#[derive(Args, Debug)]
pub struct ConnectArgs {
    auth_config_id: String,
    #[arg(long, default_value = "default")]
    user_id: String,
    /// Where to redirect after authentication
    #[arg(long)]
    callback_url: Option<String>,
}

impl ConnectArgs {
    fn init(self) -> ConnectionInit {
        let mut init = ConnectionInit::new(self.auth_config_id);
        init.user_id = self.user_id;
        init.callback_url = self.callback_url;
        init
    }
}

#[derive(Subcommand, Debug)]
pub enum ManageCommand {
    /// List available toolkits
    Toolkits {
        #[arg(long)]
        search: Option<String>,
    },
    /// List the actions of a toolkit
    Tools { toolkit_slug: String },
    /// List auth configs
    AuthConfigs {
        #[arg(long)]
        toolkit: Option<String>,
    },
    /// Show an auth config
    AuthConfig { auth_config_id: String },
    /// Create an auth config
    CreateAuthConfig {
        toolkit_slug: String,
        /// OAUTH2, API_KEY, BEARER_TOKEN or BASIC
        #[arg(long, default_value = "OAUTH2")]
        scheme: AuthScheme,
        #[arg(long)]
        name: Option<String>,
        /// Use your own OAuth app instead of the managed one
        #[arg(long)]
        custom_auth: bool,
        /// Comma-separated OAuth scopes
        #[arg(long, value_delimiter = ',')]
        scopes: Vec<String>,
    },
    /// Delete an auth config
    DeleteAuthConfig { auth_config_id: String },
    /// List connected accounts
    Connections {
        #[arg(long)]
        toolkit: Option<String>,
        #[arg(long)]
        status: Option<ConnectionStatus>,
        #[arg(long)]
        user_id: Option<String>,
    },
    /// Show a connected account
    Connection { connection_id: String },
    /// Start an OAuth connection
    Connect(ConnectArgs),
    /// Create a hosted auth link
    ConnectLink(ConnectArgs),
    /// Delete a connected account
    DeleteConnection { connection_id: String },
    /// Refresh a connected account's authentication
    RefreshConnection { connection_id: String },
    /// Execute any action on a connected account
    Execute {
        action: String,
        connected_account_id: String,
        /// Action input as a JSON object
        #[arg(long)]
        params: Option<String>,
    },
}

pub async fn run(client: &ManagementClient, command: ManageCommand, out: Printer) -> Result<()> {
    match command {
        ManageCommand::Toolkits { search } => out.print_list(
            &client.list_toolkits(search.as_deref()).await?,
            "No toolkits found.",
            output::toolkit_line,
        ),
        ManageCommand::Tools { toolkit_slug } => out.print_list(
            &client.get_toolkit_tools(&toolkit_slug).await?,
            "No tools found.",
            output::tool_line,
        ),
        ManageCommand::AuthConfigs { toolkit } => out.print_list(
            &client.list_auth_configs(toolkit.as_deref()).await?,
            "No auth configs found.",
            output::auth_config,
        ),
        ManageCommand::AuthConfig { auth_config_id } => out.print(
            &client.get_auth_config(&auth_config_id).await?,
            output::auth_config,
        ),
        ManageCommand::CreateAuthConfig {
            toolkit_slug,
            scheme,
            name,
            custom_auth,
            scopes,
        } => {
            let mut request = AuthConfigCreate::new(toolkit_slug);
            request.auth_scheme = scheme;
            request.name = name;
            request.use_composio_auth = !custom_auth;
            request.scopes = Some(scopes).filter(|s| !s.is_empty());
            out.print(&client.create_auth_config(&request).await?, |c| {
                format!("Auth config created:\n{}", output::auth_config(c))
            })
        }
        ManageCommand::DeleteAuthConfig { auth_config_id } => out.print(
            &client.delete_auth_config(&auth_config_id).await?,
            output::deleted,
        ),
        ManageCommand::Connections {
            toolkit,
            status,
            user_id,
        } => {
            let filter = ConnectionFilter {
                toolkit_slug: toolkit,
                status,
                user_id,
            };
            out.print_list(
                &client.list_connections(&filter).await?,
                "No connections found.",
                output::connection,
            )
        }
        ManageCommand::Connection { connection_id } => out.print(
            &client.get_connection(&connection_id).await?,
            output::connection,
        ),
        ManageCommand::Connect(args) => out.print(
            &client.initiate_connection(&args.init()).await?,
            output::connection_request,
        ),
        ManageCommand::ConnectLink(args) => out.print(
            &client.initiate_connection_link(&args.init()).await?,
            output::connection_request,
        ),
        ManageCommand::DeleteConnection { connection_id } => out.print(
            &client.delete_connection(&connection_id).await?,
            output::deleted,
        ),
        ManageCommand::RefreshConnection { connection_id } => out.print(
            &client.refresh_connection(&connection_id).await?,
            output::connection,
        ),
        ManageCommand::Execute {
            action,
            connected_account_id,
            params,
        } => {
            let params = params
                .map(|raw| serde_json::from_str::<Value>(&raw))
                .transpose()
                .context("--params must be a JSON object")?;
            let result = client
                .execute_action(&action, &connected_account_id, params)
                .await?;
            // Results are free-form; both formats print JSON.
            out.print(&result, output::json)
        }
    }
}
