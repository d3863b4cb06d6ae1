use crate::output::{self, Printer};
use anyhow::{Context, Result};
use clap::{Subcommand, ValueEnum};
use composio_sdk::{CreatePage, DatabaseQuery, NotionClient, ParentType, SearchFilter};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SearchKind {
    Page,
    Database,
}

impl From<SearchKind> for SearchFilter {
    fn from(kind: SearchKind) -> Self {
        match kind {
            SearchKind::Page => SearchFilter::Page,
            SearchKind::Database => SearchFilter::Database,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum NotionCommand {
    /// Show the bot user of the connected account
    Me,
    /// List workspace users
    Users,
    /// Show one user
    User { user_id: String },
    /// Search pages and databases
    Search {
        #[arg(default_value = "")]
        query: String,
        /// Only return this object type
        #[arg(long = "type", value_enum)]
        kind: Option<SearchKind>,
        #[arg(long, default_value_t = 100)]
        limit: u32,
    },
    /// Search pages by title
    Pages {
        #[arg(default_value = "")]
        query: String,
    },
    /// Show page metadata
    Page { page_id: String },
    /// Create a page
    CreatePage {
        parent_id: String,
        title: String,
        /// Emoji icon
        #[arg(long)]
        icon: Option<String>,
        /// The parent is a database rather than a page
        #[arg(long)]
        database: bool,
    },
    /// Archive a page
    ArchivePage {
        page_id: String,
        /// Restore instead of archiving
        #[arg(long)]
        restore: bool,
    },
    /// Duplicate a page
    DuplicatePage { page_id: String },
    /// List the child blocks of a page or block
    Blocks {
        block_id: String,
        #[arg(long, default_value_t = 100)]
        page_size: u32,
    },
    /// Show a database and its properties
    Database { database_id: String },
    /// Query database rows
    Query {
        database_id: String,
        /// Notion filter object as JSON
        #[arg(long)]
        filter: Option<String>,
        #[arg(long, default_value_t = 100)]
        page_size: u32,
    },
    /// List comments on a page or block
    Comments { block_id: String },
}

pub async fn run(client: &NotionClient, command: NotionCommand, out: Printer) -> Result<()> {
    match command {
        NotionCommand::Me => out.print(&client.get_current_user().await?, |u| {
            format!("Bot: {}", output::user(u))
        }),
        NotionCommand::Users => {
            out.print_list(&client.list_users().await?, "No users found.", output::user_line)
        }
        NotionCommand::User { user_id } => {
            out.print(&client.get_user(&user_id).await?, output::user)
        }
        NotionCommand::Search { query, kind, limit } => {
            let results = client
                .search_workspace(&query, kind.map(Into::into), limit)
                .await?;
            out.print_list(&results, "No results found.", output::search_result)
        }
        NotionCommand::Pages { query } => out.print_list(
            &client.search_pages(&query).await?,
            "No pages found.",
            output::page_line,
        ),
        NotionCommand::Page { page_id } => {
            out.print(&client.get_page(&page_id).await?, output::page)
        }
        NotionCommand::CreatePage {
            parent_id,
            title,
            icon,
            database,
        } => {
            let mut request = CreatePage::new(parent_id, title);
            request.icon = icon;
            if database {
                request.parent_type = ParentType::DatabaseId;
            }
            out.print(&client.create_page(&request).await?, |p| {
                format!("Page created.\n{}", output::page(p))
            })
        }
        NotionCommand::ArchivePage { page_id, restore } => out.print(
            &client.archive_page(&page_id, !restore).await?,
            output::page,
        ),
        NotionCommand::DuplicatePage { page_id } => {
            out.print(&client.duplicate_page(&page_id).await?, |p| {
                format!("Page duplicated.\n{}", output::page(p))
            })
        }
        NotionCommand::Blocks {
            block_id,
            page_size,
        } => out.print_list(
            &client.get_block_children(&block_id, None, page_size).await?,
            "No blocks found.",
            output::block_line,
        ),
        NotionCommand::Database { database_id } => {
            out.print(&client.get_database(&database_id).await?, output::database)
        }
        NotionCommand::Query {
            database_id,
            filter,
            page_size,
        } => {
            let filter = filter
                .map(|raw| serde_json::from_str::<Value>(&raw))
                .transpose()
                .context("--filter must be a JSON object")?;
            let query = DatabaseQuery {
                filter,
                page_size,
                ..Default::default()
            };
            let rows = client.query_database(&database_id, &query).await?;
            out.print(rows.as_slice(), output::rows)
        }
        NotionCommand::Comments { block_id } => out.print_list(
            &client.get_comments(&block_id).await?,
            "No comments found.",
            output::comment_line,
        ),
    }
}
