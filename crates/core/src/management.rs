// Composio management records: toolkits, auth configs and connected accounts

use crate::decode::{Decode, DecodeError, Fields};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::fmt;
use std::str::FromStr;

/// A toolkit (app integration) offered by the broker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Toolkit {
    pub slug: String,
    pub name: String,
    pub description: Option<String>,
    pub logo: Option<String>,
    #[serde(default)]
    pub auth_schemes: Vec<String>,
    #[serde(default)]
    pub categories: Vec<String>,
}

impl Decode for Toolkit {
    const ENTITY: &'static str = "Toolkit";

    fn decode(value: &Value) -> Result<Self, DecodeError> {
        let fields = Fields::of(Self::ENTITY, value)?;
        let slug = fields
            .first_str(&["slug", "key"])?
            .ok_or_else(|| DecodeError::missing(Self::ENTITY, "slug"))?;
        let meta = fields.nested("meta");

        Ok(Self {
            name: fields
                .first_str(&["name", "display_name"])?
                .unwrap_or_else(|| slug.clone()),
            slug,
            description: match fields.optional_str("description")? {
                Some(description) => Some(description),
                None => meta.map(|m| m.optional_str("description")).transpose()?.flatten(),
            },
            logo: match fields.optional_str("logo")? {
                Some(logo) => Some(logo),
                None => meta.map(|m| m.optional_str("logo")).transpose()?.flatten(),
            },
            auth_schemes: fields.string_list("auth_schemes")?,
            categories: match meta {
                Some(m) if fields.get("categories").is_none() => m.string_list("categories")?,
                _ => fields.string_list("categories")?,
            },
        })
    }
}

/// An action exposed by a toolkit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolkitTool {
    pub action: String,
    pub display_name: Option<String>,
    pub description: Option<String>,
    pub parameters: Option<Value>,
}

impl Decode for ToolkitTool {
    const ENTITY: &'static str = "ToolkitTool";

    fn decode(value: &Value) -> Result<Self, DecodeError> {
        let fields = Fields::of(Self::ENTITY, value)?;

        Ok(Self {
            action: fields
                .first_str(&["name", "action"])?
                .ok_or_else(|| DecodeError::missing(Self::ENTITY, "name"))?,
            display_name: fields.first_str(&["display_name", "displayName"])?,
            description: fields.optional_str("description")?,
            parameters: fields.raw("parameters"),
        })
    }
}

/// An auth config: the blueprint for connecting one toolkit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthConfig {
    pub id: String,
    pub toolkit_slug: Option<String>,
    pub auth_scheme: Option<String>,
    pub name: Option<String>,
    pub created_at: Option<String>,
    #[serde(default)]
    pub expected_input_fields: Vec<Value>,
}

impl Decode for AuthConfig {
    const ENTITY: &'static str = "AuthConfig";

    fn decode(value: &Value) -> Result<Self, DecodeError> {
        // Creation responses nest the config under `auth_config` and the
        // toolkit beside it.
        let outer = Fields::of(Self::ENTITY, value)?;
        let fields = outer.nested("auth_config").unwrap_or(outer);

        let toolkit_slug = match nested_str(&outer, "toolkit", "slug")? {
            Some(slug) => Some(slug),
            None => fields.first_str(&["toolkit_slug", "app_name"])?,
        };

        Ok(Self {
            id: fields.required_str("id")?,
            toolkit_slug,
            auth_scheme: fields.optional_str("auth_scheme")?,
            name: fields.optional_str("name")?,
            created_at: fields.optional_str("created_at")?,
            expected_input_fields: fields
                .typed::<Vec<Value>>("expected_input_fields")?
                .unwrap_or_default(),
        })
    }
}

/// Lifecycle state of a connected account.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConnectionStatus {
    Active,
    Inactive,
    Pending,
    Initiated,
    Expired,
    Failed,
    #[default]
    #[serde(other)]
    Unknown,
}

impl ConnectionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "ACTIVE",
            Self::Inactive => "INACTIVE",
            Self::Pending => "PENDING",
            Self::Initiated => "INITIATED",
            Self::Expired => "EXPIRED",
            Self::Failed => "FAILED",
            Self::Unknown => "UNKNOWN",
        }
    }

    fn from_wire(raw: &str) -> Self {
        raw.parse().unwrap_or(Self::Unknown)
    }
}

impl fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConnectionStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "ACTIVE" => Ok(Self::Active),
            "INACTIVE" => Ok(Self::Inactive),
            "PENDING" => Ok(Self::Pending),
            "INITIATED" => Ok(Self::Initiated),
            "EXPIRED" => Ok(Self::Expired),
            "FAILED" => Ok(Self::Failed),
            other => Err(format!(
                "unknown connection status '{}', expected ACTIVE, INACTIVE, PENDING, INITIATED, EXPIRED or FAILED",
                other
            )),
        }
    }
}

/// A connected account: one authenticated link between a user and a toolkit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectedAccount {
    pub id: String,
    pub status: ConnectionStatus,
    pub toolkit_slug: Option<String>,
    pub auth_config_id: Option<String>,
    pub user_id: Option<String>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
    /// Pre-v3 UUID, still required by the action execution endpoint.
    pub deprecated_uuid: Option<String>,
}

impl Decode for ConnectedAccount {
    const ENTITY: &'static str = "ConnectedAccount";

    fn decode(value: &Value) -> Result<Self, DecodeError> {
        let fields = Fields::of(Self::ENTITY, value)?;

        let toolkit_slug = match nested_str(&fields, "toolkit", "slug")? {
            Some(slug) => Some(slug),
            None => fields.first_str(&["toolkit_slug", "app_name"])?,
        };
        let auth_config_id = match nested_str(&fields, "auth_config", "id")? {
            Some(id) => Some(id),
            None => fields.optional_str("auth_config_id")?,
        };

        Ok(Self {
            id: fields.required_str("id")?,
            status: fields
                .optional_str("status")?
                .map(|raw| ConnectionStatus::from_wire(&raw))
                .unwrap_or_default(),
            toolkit_slug,
            auth_config_id,
            user_id: fields.first_str(&["user_id", "entity_id"])?,
            created_at: fields.optional_str("created_at")?,
            updated_at: fields.optional_str("updated_at")?,
            deprecated_uuid: nested_str(&fields, "deprecated", "uuid")?,
        })
    }
}

/// Result of starting a connection: where the user must go to finish auth.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectionRequest {
    pub id: String,
    pub status: ConnectionStatus,
    pub redirect_url: Option<String>,
}

impl Decode for ConnectionRequest {
    const ENTITY: &'static str = "ConnectionRequest";

    fn decode(value: &Value) -> Result<Self, DecodeError> {
        let fields = Fields::of(Self::ENTITY, value)?;

        Ok(Self {
            id: fields
                .first_str(&["id", "connectedAccountId", "link_token"])?
                .ok_or_else(|| DecodeError::missing(Self::ENTITY, "id"))?,
            status: fields
                .optional_str("status")?
                .map(|raw| ConnectionStatus::from_wire(&raw))
                .unwrap_or(ConnectionStatus::Initiated),
            redirect_url: fields.first_str(&["redirect_url", "redirectUrl"])?,
        })
    }
}

/// Acknowledgement of a delete call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Deleted {
    pub id: String,
    pub status: String,
    /// Whatever the broker returned alongside the deletion.
    #[serde(default)]
    pub details: Value,
}

impl Deleted {
    pub fn new(id: impl Into<String>, details: Value) -> Self {
        Self {
            id: id.into(),
            status: "deleted".to_string(),
            details,
        }
    }
}

/// Authentication method of an auth config.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuthScheme {
    #[default]
    Oauth2,
    ApiKey,
    BearerToken,
    Basic,
}

impl AuthScheme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Oauth2 => "OAUTH2",
            Self::ApiKey => "API_KEY",
            Self::BearerToken => "BEARER_TOKEN",
            Self::Basic => "BASIC",
        }
    }
}

impl fmt::Display for AuthScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AuthScheme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "OAUTH2" => Ok(Self::Oauth2),
            "API_KEY" => Ok(Self::ApiKey),
            "BEARER_TOKEN" => Ok(Self::BearerToken),
            "BASIC" => Ok(Self::Basic),
            other => Err(format!(
                "unknown auth scheme '{}', expected OAUTH2, API_KEY, BEARER_TOKEN or BASIC",
                other
            )),
        }
    }
}

/// Input for creating an auth config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthConfigCreate {
    pub toolkit_slug: String,
    #[serde(default)]
    pub auth_scheme: AuthScheme,
    #[serde(default)]
    pub name: Option<String>,
    /// Use the broker's managed OAuth app instead of custom credentials.
    #[serde(default = "default_managed_auth")]
    pub use_composio_auth: bool,
    #[serde(default)]
    pub credentials: Option<Map<String, Value>>,
    #[serde(default)]
    pub scopes: Option<Vec<String>>,
}

impl AuthConfigCreate {
    pub fn new(toolkit_slug: impl Into<String>) -> Self {
        Self {
            toolkit_slug: toolkit_slug.into(),
            auth_scheme: AuthScheme::default(),
            name: None,
            use_composio_auth: default_managed_auth(),
            credentials: None,
            scopes: None,
        }
    }

    /// Request body for `POST /api/v3/auth_configs`. Scopes are merged into
    /// the credentials object.
    pub fn request_body(&self) -> Value {
        let mut options = Map::new();
        options.insert(
            "type".to_string(),
            json!(if self.use_composio_auth {
                "use_composio_managed_auth"
            } else {
                "use_custom_auth"
            }),
        );
        options.insert("auth_scheme".to_string(), json!(self.auth_scheme.as_str()));
        if let Some(name) = self.name.as_deref().filter(|n| !n.is_empty()) {
            options.insert("name".to_string(), json!(name));
        }

        let mut credentials = self.credentials.clone().unwrap_or_default();
        if let Some(scopes) = self.scopes.as_ref().filter(|s| !s.is_empty()) {
            credentials.insert("scopes".to_string(), json!(scopes));
        }
        if !credentials.is_empty() {
            options.insert("credentials".to_string(), Value::Object(credentials));
        }

        json!({
            "toolkit": {"slug": self.toolkit_slug},
            "options": options,
        })
    }
}

/// Filters for listing connected accounts.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConnectionFilter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub toolkit_slug: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<ConnectionStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
}

impl ConnectionFilter {
    pub fn query(&self) -> Vec<(String, String)> {
        let mut query = Vec::new();
        if let Some(slug) = self.toolkit_slug.as_ref().filter(|s| !s.is_empty()) {
            query.push(("toolkit_slug".to_string(), slug.clone()));
        }
        if let Some(status) = self.status {
            query.push(("status".to_string(), status.as_str().to_string()));
        }
        if let Some(user_id) = self.user_id.as_ref().filter(|s| !s.is_empty()) {
            query.push(("user_id".to_string(), user_id.clone()));
        }
        query
    }
}

fn default_managed_auth() -> bool {
    true
}

fn nested_str(fields: &Fields<'_>, key: &str, inner: &str) -> Result<Option<String>, DecodeError> {
    match fields.nested(key) {
        Some(nested) => nested.optional_str(inner),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toolkit_fallback_keys() {
        let toolkit = Toolkit::decode(&json!({
            "key": "github",
            "display_name": "GitHub",
            "meta": {"description": "Code hosting", "categories": [{"name": "dev"}]}
        }))
        .unwrap();

        assert_eq!(toolkit.slug, "github");
        assert_eq!(toolkit.name, "GitHub");
        assert_eq!(toolkit.description.as_deref(), Some("Code hosting"));
        assert_eq!(toolkit.categories, vec!["dev"]);
    }

    #[test]
    fn test_toolkit_requires_slug() {
        let err = Toolkit::decode(&json!({"name": "Nameless"})).unwrap_err();
        assert_eq!(err.field, "slug");
    }

    #[test]
    fn test_tool_display_name_variants() {
        let tool = ToolkitTool::decode(&json!({
            "name": "GITHUB_STAR_A_REPOSITORY",
            "displayName": "Star a repository",
            "parameters": {"type": "object"}
        }))
        .unwrap();

        assert_eq!(tool.action, "GITHUB_STAR_A_REPOSITORY");
        assert_eq!(tool.display_name.as_deref(), Some("Star a repository"));
        assert!(tool.parameters.is_some());
    }

    #[test]
    fn test_auth_config_nested_create_response() {
        let config = AuthConfig::decode(&json!({
            "toolkit": {"slug": "notion"},
            "auth_config": {"id": "ac_1", "auth_scheme": "OAUTH2"}
        }))
        .unwrap();

        assert_eq!(config.id, "ac_1");
        assert_eq!(config.toolkit_slug.as_deref(), Some("notion"));
        assert_eq!(config.auth_scheme.as_deref(), Some("OAUTH2"));
    }

    #[test]
    fn test_connected_account_v3_shape() {
        let account = ConnectedAccount::decode(&json!({
            "id": "ca_123",
            "status": "ACTIVE",
            "toolkit": {"slug": "zoom"},
            "auth_config": {"id": "ac_9"},
            "user_id": "default",
            "deprecated": {"uuid": "8f1c-uuid"}
        }))
        .unwrap();

        assert_eq!(account.status, ConnectionStatus::Active);
        assert_eq!(account.toolkit_slug.as_deref(), Some("zoom"));
        assert_eq!(account.auth_config_id.as_deref(), Some("ac_9"));
        assert_eq!(account.deprecated_uuid.as_deref(), Some("8f1c-uuid"));
    }

    #[test]
    fn test_connected_account_legacy_shape() {
        let account = ConnectedAccount::decode(&json!({
            "id": "legacy",
            "status": "SOMETHING_NEW",
            "app_name": "notion",
            "auth_config_id": "ac_2",
            "entity_id": "user-7"
        }))
        .unwrap();

        assert_eq!(account.status, ConnectionStatus::Unknown);
        assert_eq!(account.toolkit_slug.as_deref(), Some("notion"));
        assert_eq!(account.user_id.as_deref(), Some("user-7"));
        assert_eq!(account.deprecated_uuid, None);
    }

    #[test]
    fn test_connection_request_camel_case() {
        let request = ConnectionRequest::decode(&json!({
            "connectedAccountId": "ca_new",
            "redirectUrl": "https://auth.example/start"
        }))
        .unwrap();

        assert_eq!(request.id, "ca_new");
        assert_eq!(request.status, ConnectionStatus::Initiated);
        assert_eq!(request.redirect_url.as_deref(), Some("https://auth.example/start"));
    }

    #[test]
    fn test_auth_config_create_body() {
        let mut request = AuthConfigCreate::new("instagram");
        request.name = Some("IG".to_string());
        request.scopes = Some(vec!["read".to_string(), "publish".to_string()]);

        assert_eq!(
            request.request_body(),
            json!({
                "toolkit": {"slug": "instagram"},
                "options": {
                    "type": "use_composio_managed_auth",
                    "auth_scheme": "OAUTH2",
                    "name": "IG",
                    "credentials": {"scopes": ["read", "publish"]}
                }
            })
        );
    }

    #[test]
    fn test_custom_auth_body_keeps_credentials() {
        let mut credentials = Map::new();
        credentials.insert("client_id".to_string(), json!("cid"));
        let request = AuthConfigCreate {
            use_composio_auth: false,
            credentials: Some(credentials),
            ..AuthConfigCreate::new("github")
        };

        let body = request.request_body();
        assert_eq!(body["options"]["type"], "use_custom_auth");
        assert_eq!(body["options"]["credentials"], json!({"client_id": "cid"}));
    }

    #[test]
    fn test_connection_filter_query() {
        let filter = ConnectionFilter {
            toolkit_slug: Some("zoom".to_string()),
            status: Some(ConnectionStatus::Expired),
            user_id: None,
        };

        assert_eq!(
            filter.query(),
            vec![
                ("toolkit_slug".to_string(), "zoom".to_string()),
                ("status".to_string(), "EXPIRED".to_string()),
            ]
        );
    }

    #[test]
    fn test_status_and_scheme_parsing() {
        assert_eq!("active".parse::<ConnectionStatus>().unwrap(), ConnectionStatus::Active);
        assert!("gone".parse::<ConnectionStatus>().is_err());
        assert_eq!("api_key".parse::<AuthScheme>().unwrap(), AuthScheme::ApiKey);
    }
}
