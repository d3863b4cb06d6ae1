//! # Composio SDK
//!
//! Typed Rust client for the Composio integration broker, with Notion, Zoom
//! and management clients.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use composio_sdk::{ComposioClient, ComposioResult};
//!
//! #[tokio::main]
//! async fn main() -> ComposioResult<()> {
//!     // COMPOSIO_API_KEY and NOTION_CONNECTED_ACCOUNT_ID, or a secret store
//!     let client = ComposioClient::from_env().await?;
//!
//!     let me = client.notion()?.get_current_user().await?;
//!     println!("Connected as {}", me.name.unwrap_or(me.id));
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Explicit credentials
//!
//! ```rust,no_run
//! use composio_sdk::{ComposioClient, CredentialBundle, Domain, MeetingCreate};
//!
//! # async fn example() -> composio_sdk::ComposioResult<()> {
//! let credentials = CredentialBundle::new("ak_your_key")
//!     .with_connected_account(Domain::Zoom, "ca_zoom_account");
//!
//! let client = ComposioClient::builder().credentials(credentials).build()?;
//! let meeting = client
//!     .zoom()?
//!     .create_meeting(&MeetingCreate::new("Demo", "2026-02-15T10:00:00"))
//!     .await?;
//! println!("Join at {:?}", meeting.join_url);
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod client;
pub mod config;
pub mod credentials;
pub mod error;
pub mod secrets;
pub mod transport;

pub use api::{ManagementClient, NotionClient, ZoomClient};
pub use client::{ComposioClient, ComposioClientBuilder};
pub use config::ClientConfig;
pub use credentials::{CredentialBundle, CredentialLoader, Domain};
pub use error::{ComposioError, ComposioResult, ErrorKind};
pub use secrets::{FileSecretStore, SecretStore, VaultSecretStore};
pub use transport::{ActionExecutor, HttpTransport, ManagementCall};

// Re-export core types for convenience
pub use composio_core::{
    management::{
        AuthConfig, AuthConfigCreate, AuthScheme, ConnectedAccount, ConnectionFilter,
        ConnectionRequest, ConnectionStatus, Deleted, Toolkit, ToolkitTool,
    },
    notion::{
        Block, Comment, CreatePage, Database, DatabaseQuery, DatabaseRow, DatabaseSchemaUpdate,
        ObjectType, Page, PageUpdate, ParentType, SearchFilter, SearchResult, User,
    },
    zoom::{
        AutoRecording, Meeting, MeetingCreate, MeetingListType, MeetingSummary, MeetingUpdate,
        Participant, Recording, RecordingFile, Registrant,
    },
    DecodeError, ResponseEnvelope,
};
pub use api::management::ConnectionInit;
