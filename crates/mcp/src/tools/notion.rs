// Notion tools: one MCP tool per NotionClient operation

use super::args::{self, parse};
use super::registry::{
    json_schema_array, json_schema_boolean, json_schema_enum, json_schema_free_object,
    json_schema_integer, json_schema_object, json_schema_string, Tool, ToolTier,
};
use super::respond;
use crate::protocol::{CallToolResult, ToolSchema};
use anyhow::Result;
use composio_sdk::{
    CreatePage, DatabaseQuery, DatabaseSchemaUpdate, NotionClient, PageUpdate, SearchFilter,
};
use serde::Deserialize;
use serde_json::{json, Map, Value};
use std::sync::Arc;

/// Every Notion operation exposed as a tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotionOp {
    CreatePage,
    GetPage,
    UpdatePage,
    ArchivePage,
    DuplicatePage,
    SearchPages,
    GetPageProperty,
    AddContentBlocks,
    AppendComplexBlocks,
    GetBlock,
    GetBlockChildren,
    UpdateBlock,
    DeleteBlock,
    CreateDatabase,
    GetDatabase,
    QueryDatabase,
    CreateDatabaseRow,
    GetDatabaseRow,
    UpdateDatabaseRow,
    UpdateDatabaseSchema,
    GetDatabaseProperty,
    CreateComment,
    GetComments,
    GetComment,
    GetCurrentUser,
    GetUser,
    ListUsers,
    SearchWorkspace,
}

impl NotionOp {
    pub const ALL: [NotionOp; 28] = [
        Self::CreatePage,
        Self::GetPage,
        Self::UpdatePage,
        Self::ArchivePage,
        Self::DuplicatePage,
        Self::SearchPages,
        Self::GetPageProperty,
        Self::AddContentBlocks,
        Self::AppendComplexBlocks,
        Self::GetBlock,
        Self::GetBlockChildren,
        Self::UpdateBlock,
        Self::DeleteBlock,
        Self::CreateDatabase,
        Self::GetDatabase,
        Self::QueryDatabase,
        Self::CreateDatabaseRow,
        Self::GetDatabaseRow,
        Self::UpdateDatabaseRow,
        Self::UpdateDatabaseSchema,
        Self::GetDatabaseProperty,
        Self::CreateComment,
        Self::GetComments,
        Self::GetComment,
        Self::GetCurrentUser,
        Self::GetUser,
        Self::ListUsers,
        Self::SearchWorkspace,
    ];

    pub fn tool_name(&self) -> &'static str {
        match self {
            Self::CreatePage => "notion_create_page",
            Self::GetPage => "notion_get_page",
            Self::UpdatePage => "notion_update_page",
            Self::ArchivePage => "notion_archive_page",
            Self::DuplicatePage => "notion_duplicate_page",
            Self::SearchPages => "notion_search_pages",
            Self::GetPageProperty => "notion_get_page_property",
            Self::AddContentBlocks => "notion_add_content_blocks",
            Self::AppendComplexBlocks => "notion_append_complex_blocks",
            Self::GetBlock => "notion_get_block",
            Self::GetBlockChildren => "notion_get_block_children",
            Self::UpdateBlock => "notion_update_block",
            Self::DeleteBlock => "notion_delete_block",
            Self::CreateDatabase => "notion_create_database",
            Self::GetDatabase => "notion_get_database",
            Self::QueryDatabase => "notion_query_database",
            Self::CreateDatabaseRow => "notion_create_database_row",
            Self::GetDatabaseRow => "notion_get_database_row",
            Self::UpdateDatabaseRow => "notion_update_database_row",
            Self::UpdateDatabaseSchema => "notion_update_database_schema",
            Self::GetDatabaseProperty => "notion_get_database_property",
            Self::CreateComment => "notion_create_comment",
            Self::GetComments => "notion_get_comments",
            Self::GetComment => "notion_get_comment",
            Self::GetCurrentUser => "notion_get_current_user",
            Self::GetUser => "notion_get_user",
            Self::ListUsers => "notion_list_users",
            Self::SearchWorkspace => "notion_search_workspace",
        }
    }

    fn description(&self) -> &'static str {
        match self {
            Self::CreatePage => "Create a Notion page under a parent page or database.",
            Self::GetPage => "Get a Notion page's metadata by id.",
            Self::UpdatePage => "Update a page's title, icon, cover, properties or archived flag.",
            Self::ArchivePage => "Archive a page, or restore it with archived=false.",
            Self::DuplicatePage => "Duplicate a page with its content.",
            Self::SearchPages => "Search pages by title. An empty query lists all accessible pages.",
            Self::GetPageProperty => "Get one property value of a page.",
            Self::AddContentBlocks => {
                "Append simplified blocks, e.g. {\"type\": \"paragraph\", \"text\": \"Hi\"}, to a page."
            }
            Self::AppendComplexBlocks => "Append blocks in the full Notion block format.",
            Self::GetBlock => "Get a block's metadata.",
            Self::GetBlockChildren => "List the child blocks of a block or page.",
            Self::UpdateBlock => "Update a block's content.",
            Self::DeleteBlock => "Delete (archive) a block.",
            Self::CreateDatabase => "Create a database under a parent page.",
            Self::GetDatabase => "Get a database and its schema.",
            Self::QueryDatabase => "Query a database's rows with optional filter and sorts.",
            Self::CreateDatabaseRow => "Insert a row into a database.",
            Self::GetDatabaseRow => "Get one database row.",
            Self::UpdateDatabaseRow => "Update a database row's properties or archive it.",
            Self::UpdateDatabaseSchema => "Change a database's title, description or properties.",
            Self::GetDatabaseProperty => "Get one property definition of a database.",
            Self::CreateComment => {
                "Comment on a page, or reply in a discussion when discussion_id is given."
            }
            Self::GetComments => "List the comments on a block or page.",
            Self::GetComment => "Get one comment by id.",
            Self::GetCurrentUser => "Get the bot user of the connected Notion account.",
            Self::GetUser => "Get a workspace user by id.",
            Self::ListUsers => "List the users of the workspace.",
            Self::SearchWorkspace => "Search pages and databases across the workspace.",
        }
    }

    fn input_schema(&self) -> Value {
        match self {
            Self::CreatePage => json_schema_object(
                json!({
                    "parent_id": json_schema_string("Parent page or database id"),
                    "title": json_schema_string("Page title"),
                    "parent_type": json_schema_enum(&["page_id", "database_id"], "Kind of parent (default page_id)"),
                    "icon": json_schema_string("Emoji icon"),
                    "cover": json_schema_string("Cover image URL"),
                }),
                vec!["parent_id", "title"],
            ),
            Self::GetPage | Self::DuplicatePage => json_schema_object(
                json!({"page_id": json_schema_string("Page id")}),
                vec!["page_id"],
            ),
            Self::UpdatePage => json_schema_object(
                json!({
                    "page_id": json_schema_string("Page id"),
                    "title": json_schema_string("New title"),
                    "icon": json_schema_string("New emoji icon"),
                    "cover": json_schema_string("New cover image URL"),
                    "archived": json_schema_boolean("Archive or restore the page"),
                    "properties": json_schema_free_object("Property values to set"),
                }),
                vec!["page_id"],
            ),
            Self::ArchivePage => json_schema_object(
                json!({
                    "page_id": json_schema_string("Page id"),
                    "archived": json_schema_boolean("true to archive (default), false to restore"),
                }),
                vec!["page_id"],
            ),
            Self::SearchPages => json_schema_object(
                json!({"query": json_schema_string("Title text to search for")}),
                vec![],
            ),
            Self::GetPageProperty => json_schema_object(
                json!({
                    "page_id": json_schema_string("Page id"),
                    "property_id": json_schema_string("Property id"),
                }),
                vec!["page_id", "property_id"],
            ),
            Self::AddContentBlocks => json_schema_object(
                json!({
                    "page_id": json_schema_string("Page id"),
                    "blocks": json_schema_array(json!({"type": "object"}), "Simplified blocks"),
                }),
                vec!["page_id", "blocks"],
            ),
            Self::AppendComplexBlocks => json_schema_object(
                json!({
                    "block_id": json_schema_string("Parent block or page id"),
                    "children": json_schema_array(json!({"type": "object"}), "Notion block objects"),
                }),
                vec!["block_id", "children"],
            ),
            Self::GetBlock | Self::DeleteBlock | Self::GetComments => json_schema_object(
                json!({"block_id": json_schema_string("Block or page id")}),
                vec!["block_id"],
            ),
            Self::GetBlockChildren => json_schema_object(
                json!({
                    "block_id": json_schema_string("Block or page id"),
                    "start_cursor": json_schema_string("Pagination cursor"),
                    "page_size": json_schema_integer("Maximum blocks to return (default 100)"),
                }),
                vec!["block_id"],
            ),
            Self::UpdateBlock => json_schema_object(
                json!({
                    "block_id": json_schema_string("Block id"),
                    "fields": json_schema_free_object("Block fields to update"),
                }),
                vec!["block_id", "fields"],
            ),
            Self::CreateDatabase => json_schema_object(
                json!({
                    "parent_id": json_schema_string("Parent page id"),
                    "title": json_schema_string("Database title"),
                    "properties": json_schema_free_object("Property schema"),
                }),
                vec!["parent_id", "title", "properties"],
            ),
            Self::GetDatabase => json_schema_object(
                json!({"database_id": json_schema_string("Database id")}),
                vec!["database_id"],
            ),
            Self::QueryDatabase => json_schema_object(
                json!({
                    "database_id": json_schema_string("Database id"),
                    "filter": json_schema_free_object("Notion filter object"),
                    "sorts": json_schema_array(json!({"type": "object"}), "Sort objects"),
                    "page_size": json_schema_integer("Maximum rows to return (default 100)"),
                    "start_cursor": json_schema_string("Pagination cursor"),
                }),
                vec!["database_id"],
            ),
            Self::CreateDatabaseRow => json_schema_object(
                json!({
                    "database_id": json_schema_string("Database id"),
                    "properties": json_schema_free_object("Property values of the row"),
                }),
                vec!["database_id", "properties"],
            ),
            Self::GetDatabaseRow => json_schema_object(
                json!({"row_id": json_schema_string("Row (page) id")}),
                vec!["row_id"],
            ),
            Self::UpdateDatabaseRow => json_schema_object(
                json!({
                    "row_id": json_schema_string("Row (page) id"),
                    "properties": json_schema_free_object("Property values to set"),
                    "archived": json_schema_boolean("Archive or restore the row"),
                }),
                vec!["row_id"],
            ),
            Self::UpdateDatabaseSchema => json_schema_object(
                json!({
                    "database_id": json_schema_string("Database id"),
                    "title": json_schema_string("New title"),
                    "description": json_schema_string("New description"),
                    "properties": json_schema_free_object("Property definitions to change"),
                }),
                vec!["database_id"],
            ),
            Self::GetDatabaseProperty => json_schema_object(
                json!({
                    "database_id": json_schema_string("Database id"),
                    "property_id": json_schema_string("Property id"),
                }),
                vec!["database_id", "property_id"],
            ),
            Self::CreateComment => json_schema_object(
                json!({
                    "parent_id": json_schema_string("Page id to comment on"),
                    "rich_text": json_schema_string("Comment text"),
                    "discussion_id": json_schema_string("Discussion to reply in"),
                }),
                vec!["parent_id", "rich_text"],
            ),
            Self::GetComment => json_schema_object(
                json!({"comment_id": json_schema_string("Comment id")}),
                vec!["comment_id"],
            ),
            Self::GetCurrentUser | Self::ListUsers => json_schema_object(json!({}), vec![]),
            Self::GetUser => json_schema_object(
                json!({"user_id": json_schema_string("User id")}),
                vec!["user_id"],
            ),
            Self::SearchWorkspace => json_schema_object(
                json!({
                    "query": json_schema_string("Text to search for"),
                    "filter": json_schema_enum(&["page", "database"], "Only return this object type"),
                    "page_size": json_schema_integer("Maximum results (default 100)"),
                }),
                vec![],
            ),
        }
    }

    fn tier(&self) -> ToolTier {
        match self {
            Self::CreatePage
            | Self::UpdatePage
            | Self::DuplicatePage
            | Self::AddContentBlocks
            | Self::AppendComplexBlocks
            | Self::UpdateBlock
            | Self::CreateDatabase
            | Self::CreateDatabaseRow
            | Self::UpdateDatabaseRow
            | Self::UpdateDatabaseSchema
            | Self::CreateComment => ToolTier::Write,
            Self::ArchivePage | Self::DeleteBlock => ToolTier::Destructive,
            _ => ToolTier::Read,
        }
    }
}

const DEFAULT_PAGE_SIZE: u32 = 100;

#[derive(Debug, Deserialize)]
struct PageArgs {
    page_id: String,
}

#[derive(Debug, Deserialize)]
struct UpdatePageArgs {
    page_id: String,
    title: Option<String>,
    icon: Option<String>,
    cover: Option<String>,
    archived: Option<bool>,
    #[serde(default, deserialize_with = "args::opt_json_object")]
    properties: Option<Map<String, Value>>,
}

#[derive(Debug, Deserialize)]
struct ArchivePageArgs {
    page_id: String,
    archived: Option<bool>,
}

#[derive(Debug, Deserialize)]
struct SearchPagesArgs {
    query: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PagePropertyArgs {
    page_id: String,
    property_id: String,
}

#[derive(Debug, Deserialize)]
struct AddContentBlocksArgs {
    page_id: String,
    #[serde(deserialize_with = "args::json_array")]
    blocks: Vec<Value>,
}

#[derive(Debug, Deserialize)]
struct AppendBlocksArgs {
    block_id: String,
    #[serde(deserialize_with = "args::json_array")]
    children: Vec<Value>,
}

#[derive(Debug, Deserialize)]
struct BlockArgs {
    block_id: String,
}

#[derive(Debug, Deserialize)]
struct BlockChildrenArgs {
    block_id: String,
    start_cursor: Option<String>,
    page_size: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct UpdateBlockArgs {
    block_id: String,
    #[serde(deserialize_with = "args::json_object")]
    fields: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
struct CreateDatabaseArgs {
    parent_id: String,
    title: String,
    #[serde(deserialize_with = "args::json_object")]
    properties: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
struct DatabaseArgs {
    database_id: String,
}

#[derive(Debug, Deserialize)]
struct QueryDatabaseArgs {
    database_id: String,
    #[serde(default, deserialize_with = "args::opt_json_object")]
    filter: Option<Map<String, Value>>,
    #[serde(default, deserialize_with = "args::opt_json_array")]
    sorts: Option<Vec<Value>>,
    page_size: Option<u32>,
    start_cursor: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CreateRowArgs {
    database_id: String,
    #[serde(deserialize_with = "args::json_object")]
    properties: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
struct RowArgs {
    row_id: String,
}

#[derive(Debug, Deserialize)]
struct UpdateRowArgs {
    row_id: String,
    #[serde(default, deserialize_with = "args::opt_json_object")]
    properties: Option<Map<String, Value>>,
    archived: Option<bool>,
}

#[derive(Debug, Deserialize)]
struct UpdateSchemaArgs {
    database_id: String,
    title: Option<String>,
    description: Option<String>,
    #[serde(default, deserialize_with = "args::opt_json_object")]
    properties: Option<Map<String, Value>>,
}

#[derive(Debug, Deserialize)]
struct DatabasePropertyArgs {
    database_id: String,
    property_id: String,
}

#[derive(Debug, Deserialize)]
struct CreateCommentArgs {
    parent_id: String,
    rich_text: String,
    discussion_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CommentArgs {
    comment_id: String,
}

#[derive(Debug, Deserialize)]
struct UserArgs {
    user_id: String,
}

#[derive(Debug, Deserialize)]
struct SearchWorkspaceArgs {
    query: Option<String>,
    #[serde(default, deserialize_with = "args::blank_as_none")]
    filter: Option<SearchFilter>,
    page_size: Option<u32>,
}

/// A single Notion operation bound to a client.
pub struct NotionTool {
    client: NotionClient,
    op: NotionOp,
}

impl NotionTool {
    pub fn new(client: NotionClient, op: NotionOp) -> Self {
        Self { client, op }
    }

    /// One tool per operation, all sharing `client`.
    pub fn all(client: &NotionClient) -> Vec<Arc<dyn Tool>> {
        NotionOp::ALL
            .iter()
            .map(|op| Arc::new(Self::new(client.clone(), *op)) as Arc<dyn Tool>)
            .collect()
    }

    async fn run(&self, arguments: Value) -> Result<CallToolResult> {
        let tool = self.op.tool_name();
        let client = &self.client;
        let result = match self.op {
            NotionOp::CreatePage => {
                let request: CreatePage = parse(tool, arguments)?;
                respond(client.create_page(&request).await)
            }
            NotionOp::GetPage => {
                let args: PageArgs = parse(tool, arguments)?;
                respond(client.get_page(&args.page_id).await)
            }
            NotionOp::UpdatePage => {
                let args: UpdatePageArgs = parse(tool, arguments)?;
                let update = PageUpdate {
                    title: args.title,
                    icon: args.icon,
                    cover: args.cover,
                    archived: args.archived,
                    properties: args.properties,
                };
                respond(client.update_page(&args.page_id, &update).await)
            }
            NotionOp::ArchivePage => {
                let args: ArchivePageArgs = parse(tool, arguments)?;
                respond(
                    client
                        .archive_page(&args.page_id, args.archived.unwrap_or(true))
                        .await,
                )
            }
            NotionOp::DuplicatePage => {
                let args: PageArgs = parse(tool, arguments)?;
                respond(client.duplicate_page(&args.page_id).await)
            }
            NotionOp::SearchPages => {
                let args: SearchPagesArgs = parse(tool, arguments)?;
                respond(client.search_pages(&args.query.unwrap_or_default()).await)
            }
            NotionOp::GetPageProperty => {
                let args: PagePropertyArgs = parse(tool, arguments)?;
                respond(
                    client
                        .get_page_property(&args.page_id, &args.property_id)
                        .await,
                )
            }
            NotionOp::AddContentBlocks => {
                let args: AddContentBlocksArgs = parse(tool, arguments)?;
                respond(client.add_content_blocks(&args.page_id, args.blocks).await)
            }
            NotionOp::AppendComplexBlocks => {
                let args: AppendBlocksArgs = parse(tool, arguments)?;
                respond(
                    client
                        .append_complex_blocks(&args.block_id, args.children)
                        .await,
                )
            }
            NotionOp::GetBlock => {
                let args: BlockArgs = parse(tool, arguments)?;
                respond(client.get_block(&args.block_id).await)
            }
            NotionOp::GetBlockChildren => {
                let args: BlockChildrenArgs = parse(tool, arguments)?;
                respond(
                    client
                        .get_block_children(
                            &args.block_id,
                            args.start_cursor.as_deref(),
                            args.page_size.unwrap_or(DEFAULT_PAGE_SIZE),
                        )
                        .await,
                )
            }
            NotionOp::UpdateBlock => {
                let args: UpdateBlockArgs = parse(tool, arguments)?;
                respond(client.update_block(&args.block_id, args.fields).await)
            }
            NotionOp::DeleteBlock => {
                let args: BlockArgs = parse(tool, arguments)?;
                respond(client.delete_block(&args.block_id).await)
            }
            NotionOp::CreateDatabase => {
                let args: CreateDatabaseArgs = parse(tool, arguments)?;
                respond(
                    client
                        .create_database(&args.parent_id, &args.title, args.properties)
                        .await,
                )
            }
            NotionOp::GetDatabase => {
                let args: DatabaseArgs = parse(tool, arguments)?;
                respond(client.get_database(&args.database_id).await)
            }
            NotionOp::QueryDatabase => {
                let args: QueryDatabaseArgs = parse(tool, arguments)?;
                let query = DatabaseQuery {
                    filter: args.filter.map(Value::Object),
                    sorts: args.sorts,
                    page_size: args.page_size.unwrap_or(DEFAULT_PAGE_SIZE),
                    start_cursor: args.start_cursor,
                };
                respond(client.query_database(&args.database_id, &query).await)
            }
            NotionOp::CreateDatabaseRow => {
                let args: CreateRowArgs = parse(tool, arguments)?;
                respond(
                    client
                        .create_database_row(&args.database_id, args.properties)
                        .await,
                )
            }
            NotionOp::GetDatabaseRow => {
                let args: RowArgs = parse(tool, arguments)?;
                respond(client.get_database_row(&args.row_id).await)
            }
            NotionOp::UpdateDatabaseRow => {
                let args: UpdateRowArgs = parse(tool, arguments)?;
                respond(
                    client
                        .update_database_row(&args.row_id, args.properties, args.archived)
                        .await,
                )
            }
            NotionOp::UpdateDatabaseSchema => {
                let args: UpdateSchemaArgs = parse(tool, arguments)?;
                let update = DatabaseSchemaUpdate {
                    title: args.title,
                    description: args.description,
                    properties: args.properties,
                };
                respond(
                    client
                        .update_database_schema(&args.database_id, &update)
                        .await,
                )
            }
            NotionOp::GetDatabaseProperty => {
                let args: DatabasePropertyArgs = parse(tool, arguments)?;
                respond(
                    client
                        .get_database_property(&args.database_id, &args.property_id)
                        .await,
                )
            }
            NotionOp::CreateComment => {
                let args: CreateCommentArgs = parse(tool, arguments)?;
                respond(
                    client
                        .create_comment(
                            &args.parent_id,
                            &args.rich_text,
                            args.discussion_id.as_deref(),
                        )
                        .await,
                )
            }
            NotionOp::GetComments => {
                let args: BlockArgs = parse(tool, arguments)?;
                respond(client.get_comments(&args.block_id).await)
            }
            NotionOp::GetComment => {
                let args: CommentArgs = parse(tool, arguments)?;
                respond(client.get_comment(&args.comment_id).await)
            }
            NotionOp::GetCurrentUser => respond(client.get_current_user().await),
            NotionOp::GetUser => {
                let args: UserArgs = parse(tool, arguments)?;
                respond(client.get_user(&args.user_id).await)
            }
            NotionOp::ListUsers => respond(client.list_users().await),
            NotionOp::SearchWorkspace => {
                let args: SearchWorkspaceArgs = parse(tool, arguments)?;
                respond(
                    client
                        .search_workspace(
                            &args.query.unwrap_or_default(),
                            args.filter,
                            args.page_size.unwrap_or(DEFAULT_PAGE_SIZE),
                        )
                        .await,
                )
            }
        };
        Ok(result)
    }
}

#[async_trait::async_trait]
impl Tool for NotionTool {
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
    use crate::tools::testing::{executor_for, stub_action};
    use std::collections::HashSet;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_tool_names_unique_and_prefixed() {
        let names: HashSet<_> = NotionOp::ALL.iter().map(|op| op.tool_name()).collect();
        assert_eq!(names.len(), 28);
        assert!(names.iter().all(|name| name.starts_with("notion_")));
    }

    #[test]
    fn test_required_arguments_listed_in_schema() {
        let schema = NotionOp::CreateComment.input_schema();
        assert_eq!(schema["required"], json!(["parent_id", "rich_text"]));
        assert_eq!(NotionOp::DeleteBlock.tier(), ToolTier::Destructive);
        assert_eq!(NotionOp::SearchWorkspace.tier(), ToolTier::Read);
    }

    #[tokio::test]
    async fn test_create_page_tool() {
        let server = MockServer::start().await;
        stub_action(
            &server,
            "NOTION_CREATE_NOTION_PAGE",
            json!({"id": "page-new", "url": "https://notion.so/page-new"}),
        )
        .await;

        let tool = NotionTool::new(
            NotionClient::new(executor_for(&server), "ca-notion"),
            NotionOp::CreatePage,
        );
        let result = tool
            .execute(json!({"parent_id": "parent-1", "title": "Meeting notes"}))
            .await
            .unwrap();

        assert!(!result.is_error());
        let page: Value = serde_json::from_str(result.first_text().unwrap()).unwrap();
        assert_eq!(page["id"], "page-new");
    }

    #[tokio::test]
    async fn test_missing_argument_is_err() {
        let server = MockServer::start().await;
        let tool = NotionTool::new(
            NotionClient::new(executor_for(&server), "ca-notion"),
            NotionOp::GetPage,
        );

        let err = tool.execute(json!({})).await.unwrap_err();
        let rendered = format!("{:#}", err);
        assert!(rendered.contains("notion_get_page"));
        assert!(rendered.contains("page_id"));
    }

    #[tokio::test]
    async fn test_unknown_filter_rejected() {
        let server = MockServer::start().await;
        let tool = NotionTool::new(
            NotionClient::new(executor_for(&server), "ca-notion"),
            NotionOp::SearchWorkspace,
        );

        assert!(tool.execute(json!({"filter": "block"})).await.is_err());
    }

    #[tokio::test]
    async fn test_create_page_in_database() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/v2/actions/NOTION_CREATE_NOTION_PAGE/execute"))
            .and(body_json(json!({
                "connectedAccountId": "ca-notion",
                "input": {"parent_id": "db1", "title": "Standup", "parent_type": "database_id"}
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "successful": true,
                "data": {"id": "page-new"}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let tool = NotionTool::new(
            NotionClient::new(executor_for(&server), "ca-notion"),
            NotionOp::CreatePage,
        );
        let result = tool
            .execute(json!({"parent_id": "db1", "title": "Standup", "parent_type": "database_id"}))
            .await
            .unwrap();
        assert!(!result.is_error(), "{:?}", result.first_text());

        let err = tool
            .execute(json!({"parent_id": "db1", "title": "x", "parent_type": "workspace"}))
            .await
            .unwrap_err();
        assert!(format!("{:#}", err).contains("workspace"));
    }

    #[tokio::test]
    async fn test_update_block_fields_cannot_retarget_block() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/v2/actions/NOTION_UPDATE_BLOCK/execute"))
            .and(body_json(json!({
                "connectedAccountId": "ca-notion",
                "input": {"block_id": "b1", "to_do": {"checked": true}}
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "successful": true,
                "data": {"id": "b1", "type": "to_do"}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let tool = NotionTool::new(
            NotionClient::new(executor_for(&server), "ca-notion"),
            NotionOp::UpdateBlock,
        );
        let result = tool
            .execute(json!({
                "block_id": "b1",
                "fields": "{\"block_id\": \"other\", \"to_do\": {\"checked\": true}}"
            }))
            .await
            .unwrap();

        assert!(!result.is_error(), "{:?}", result.first_text());
    }
}
