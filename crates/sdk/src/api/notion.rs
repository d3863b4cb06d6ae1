//! Notion actions.

use super::{decode_list, decode_one, merge_fields, params};
use crate::error::ComposioResult;
use crate::transport::ActionExecutor;
use composio_core::notion::{
    Block, Comment, CreatePage, Database, DatabaseQuery, DatabaseRow, DatabaseSchemaUpdate, Page,
    PageUpdate, SearchFilter, SearchResult, User,
};
use serde_json::{Map, Value};
use std::sync::Arc;

/// Broker action ids used by [`NotionClient`].
pub mod actions {
    pub const CREATE_PAGE: &str = "NOTION_CREATE_NOTION_PAGE";
    pub const FETCH_BLOCK_METADATA: &str = "NOTION_FETCH_BLOCK_METADATA";
    pub const UPDATE_PAGE: &str = "NOTION_UPDATE_PAGE";
    pub const ARCHIVE_PAGE: &str = "NOTION_ARCHIVE_NOTION_PAGE";
    pub const DUPLICATE_PAGE: &str = "NOTION_DUPLICATE_PAGE";
    pub const SEARCH_PAGES: &str = "NOTION_SEARCH_NOTION_PAGE";
    pub const GET_PAGE_PROPERTY: &str = "NOTION_GET_PAGE_PROPERTY_ACTION";
    pub const ADD_CONTENT_BLOCKS: &str = "NOTION_ADD_MULTIPLE_PAGE_CONTENT";
    pub const APPEND_BLOCK_CHILDREN: &str = "NOTION_APPEND_BLOCK_CHILDREN";
    pub const FETCH_BLOCK_CONTENTS: &str = "NOTION_FETCH_BLOCK_CONTENTS";
    pub const UPDATE_BLOCK: &str = "NOTION_UPDATE_BLOCK";
    pub const DELETE_BLOCK: &str = "NOTION_DELETE_BLOCK";
    pub const CREATE_DATABASE: &str = "NOTION_CREATE_DATABASE";
    pub const FETCH_DATABASE: &str = "NOTION_FETCH_DATABASE";
    pub const QUERY_DATABASE: &str = "NOTION_QUERY_DATABASE";
    pub const INSERT_ROW: &str = "NOTION_INSERT_ROW_DATABASE";
    pub const FETCH_ROW: &str = "NOTION_FETCH_ROW";
    pub const UPDATE_ROW: &str = "NOTION_UPDATE_ROW_DATABASE";
    pub const UPDATE_SCHEMA: &str = "NOTION_UPDATE_SCHEMA_DATABASE";
    pub const GET_DATABASE_PROPERTY: &str = "NOTION_RETRIEVE_DATABASE_PROPERTY";
    pub const CREATE_COMMENT: &str = "NOTION_CREATE_COMMENT";
    pub const FETCH_COMMENTS: &str = "NOTION_FETCH_COMMENTS";
    pub const RETRIEVE_COMMENT: &str = "NOTION_RETRIEVE_COMMENT";
    pub const GET_ABOUT_ME: &str = "NOTION_GET_ABOUT_ME";
    pub const GET_ABOUT_USER: &str = "NOTION_GET_ABOUT_USER";
    pub const LIST_USERS: &str = "NOTION_LIST_USERS";
    pub const FETCH_DATA: &str = "NOTION_FETCH_DATA";
}

const RESULTS: &[&str] = &["results"];

/// Notion client bound to one connected account.
#[derive(Clone)]
pub struct NotionClient {
    executor: Arc<dyn ActionExecutor>,
    connected_account_id: String,
}

impl NotionClient {
    pub fn new(executor: Arc<dyn ActionExecutor>, connected_account_id: impl Into<String>) -> Self {
        Self {
            executor,
            connected_account_id: connected_account_id.into(),
        }
    }

    pub fn connected_account_id(&self) -> &str {
        &self.connected_account_id
    }

    async fn execute(&self, action: &str, params: Map<String, Value>) -> ComposioResult<Value> {
        self.executor
            .execute_action(action, &self.connected_account_id, Value::Object(params))
            .await
    }

    // Pages

    pub async fn create_page(&self, request: &CreatePage) -> ComposioResult<Page> {
        let mut p = Map::new();
        merge_fields(actions::CREATE_PAGE, &mut p, request)?;
        let data = self.execute(actions::CREATE_PAGE, p).await?;
        decode_one(&data)
    }

    /// Page metadata. Pages are blocks, so this reads block metadata.
    pub async fn get_page(&self, page_id: &str) -> ComposioResult<Page> {
        let data = self
            .execute(actions::FETCH_BLOCK_METADATA, params("block_id", page_id))
            .await?;
        decode_one(&data)
    }

    pub async fn update_page(&self, page_id: &str, update: &PageUpdate) -> ComposioResult<Page> {
        let mut p = params("page_id", page_id);
        merge_fields(actions::UPDATE_PAGE, &mut p, update)?;
        let data = self.execute(actions::UPDATE_PAGE, p).await?;
        decode_one(&data)
    }

    /// Archive a page, or restore it with `archived = false`.
    pub async fn archive_page(&self, page_id: &str, archived: bool) -> ComposioResult<Page> {
        let mut p = params("page_id", page_id);
        p.insert("archived".to_string(), Value::Bool(archived));
        let data = self.execute(actions::ARCHIVE_PAGE, p).await?;
        decode_one(&data)
    }

    pub async fn duplicate_page(&self, page_id: &str) -> ComposioResult<Page> {
        let data = self
            .execute(actions::DUPLICATE_PAGE, params("page_id", page_id))
            .await?;
        decode_one(&data)
    }

    /// Search pages by title; an empty query lists every accessible page.
    pub async fn search_pages(&self, query: &str) -> ComposioResult<Vec<Page>> {
        let data = self
            .execute(actions::SEARCH_PAGES, params("query", query))
            .await?;
        decode_list(&data, RESULTS, true)
    }

    pub async fn get_page_property(
        &self,
        page_id: &str,
        property_id: &str,
    ) -> ComposioResult<Value> {
        let mut p = params("page_id", page_id);
        p.insert("property_id".to_string(), property_id.into());
        self.execute(actions::GET_PAGE_PROPERTY, p).await
    }

    // Blocks

    /// Append simplified blocks such as `{"type": "paragraph", "text": "Hi"}`.
    pub async fn add_content_blocks(
        &self,
        page_id: &str,
        blocks: Vec<Value>,
    ) -> ComposioResult<Value> {
        let mut p = params("page_id", page_id);
        p.insert("blocks".to_string(), Value::Array(blocks));
        self.execute(actions::ADD_CONTENT_BLOCKS, p).await
    }

    /// Append blocks in the full Notion block structure.
    pub async fn append_complex_blocks(
        &self,
        block_id: &str,
        children: Vec<Value>,
    ) -> ComposioResult<Value> {
        let mut p = params("block_id", block_id);
        p.insert("children".to_string(), Value::Array(children));
        self.execute(actions::APPEND_BLOCK_CHILDREN, p).await
    }

    pub async fn get_block(&self, block_id: &str) -> ComposioResult<Block> {
        let data = self
            .execute(actions::FETCH_BLOCK_METADATA, params("block_id", block_id))
            .await?;
        decode_one(&data)
    }

    pub async fn get_block_children(
        &self,
        block_id: &str,
        start_cursor: Option<&str>,
        page_size: u32,
    ) -> ComposioResult<Vec<Block>> {
        let mut p = params("block_id", block_id);
        p.insert("page_size".to_string(), page_size.into());
        if let Some(cursor) = start_cursor {
            p.insert("start_cursor".to_string(), cursor.into());
        }
        let data = self.execute(actions::FETCH_BLOCK_CONTENTS, p).await?;
        decode_list(&data, RESULTS, true)
    }

    /// Update a block; `fields` is passed through next to `block_id`, which
    /// always names `block_id` even if `fields` carries one.
    pub async fn update_block(
        &self,
        block_id: &str,
        fields: Map<String, Value>,
    ) -> ComposioResult<Block> {
        let mut p = fields;
        p.insert("block_id".to_string(), block_id.into());
        let data = self.execute(actions::UPDATE_BLOCK, p).await?;
        decode_one(&data)
    }

    pub async fn delete_block(&self, block_id: &str) -> ComposioResult<Value> {
        self.execute(actions::DELETE_BLOCK, params("block_id", block_id))
            .await
    }

    // Databases

    pub async fn create_database(
        &self,
        parent_id: &str,
        title: &str,
        properties: Map<String, Value>,
    ) -> ComposioResult<Database> {
        let mut p = params("parent_id", parent_id);
        p.insert("title".to_string(), title.into());
        p.insert("properties".to_string(), Value::Object(properties));
        let data = self.execute(actions::CREATE_DATABASE, p).await?;
        decode_one(&data)
    }

    pub async fn get_database(&self, database_id: &str) -> ComposioResult<Database> {
        let data = self
            .execute(actions::FETCH_DATABASE, params("database_id", database_id))
            .await?;
        decode_one(&data)
    }

    pub async fn query_database(
        &self,
        database_id: &str,
        query: &DatabaseQuery,
    ) -> ComposioResult<Vec<DatabaseRow>> {
        let mut p = params("database_id", database_id);
        merge_fields(actions::QUERY_DATABASE, &mut p, query)?;
        let data = self.execute(actions::QUERY_DATABASE, p).await?;
        decode_list(&data, RESULTS, true)
    }

    pub async fn create_database_row(
        &self,
        database_id: &str,
        properties: Map<String, Value>,
    ) -> ComposioResult<DatabaseRow> {
        let mut p = params("database_id", database_id);
        p.insert("properties".to_string(), Value::Object(properties));
        let data = self.execute(actions::INSERT_ROW, p).await?;
        decode_one(&data)
    }

    pub async fn get_database_row(&self, row_id: &str) -> ComposioResult<DatabaseRow> {
        let data = self
            .execute(actions::FETCH_ROW, params("row_id", row_id))
            .await?;
        decode_one(&data)
    }

    pub async fn update_database_row(
        &self,
        row_id: &str,
        properties: Option<Map<String, Value>>,
        archived: Option<bool>,
    ) -> ComposioResult<DatabaseRow> {
        let mut p = params("row_id", row_id);
        if let Some(properties) = properties {
            p.insert("properties".to_string(), Value::Object(properties));
        }
        if let Some(archived) = archived {
            p.insert("archived".to_string(), Value::Bool(archived));
        }
        let data = self.execute(actions::UPDATE_ROW, p).await?;
        decode_one(&data)
    }

    pub async fn update_database_schema(
        &self,
        database_id: &str,
        update: &DatabaseSchemaUpdate,
    ) -> ComposioResult<Database> {
        let mut p = params("database_id", database_id);
        merge_fields(actions::UPDATE_SCHEMA, &mut p, update)?;
        let data = self.execute(actions::UPDATE_SCHEMA, p).await?;
        decode_one(&data)
    }

    pub async fn get_database_property(
        &self,
        database_id: &str,
        property_id: &str,
    ) -> ComposioResult<Value> {
        let mut p = params("database_id", database_id);
        p.insert("property_id".to_string(), property_id.into());
        self.execute(actions::GET_DATABASE_PROPERTY, p).await
    }

    // Comments

    /// Comment on a page, or reply in a discussion when `discussion_id` is
    /// given (the parent is then not sent).
    pub async fn create_comment(
        &self,
        parent_id: &str,
        rich_text: &str,
        discussion_id: Option<&str>,
    ) -> ComposioResult<Comment> {
        let mut p = params("rich_text", rich_text);
        match discussion_id.filter(|id| !id.is_empty()) {
            Some(discussion) => p.insert("discussion_id".to_string(), discussion.into()),
            None => p.insert("parent_id".to_string(), parent_id.into()),
        };
        let data = self.execute(actions::CREATE_COMMENT, p).await?;
        decode_one(&data)
    }

    pub async fn get_comments(&self, block_id: &str) -> ComposioResult<Vec<Comment>> {
        let data = self
            .execute(actions::FETCH_COMMENTS, params("block_id", block_id))
            .await?;
        decode_list(&data, RESULTS, true)
    }

    pub async fn get_comment(&self, comment_id: &str) -> ComposioResult<Comment> {
        let data = self
            .execute(actions::RETRIEVE_COMMENT, params("comment_id", comment_id))
            .await?;
        decode_one(&data)
    }

    // Users

    /// The bot user behind the connected account.
    pub async fn get_current_user(&self) -> ComposioResult<User> {
        let data = self.execute(actions::GET_ABOUT_ME, Map::new()).await?;
        decode_one(&data)
    }

    pub async fn get_user(&self, user_id: &str) -> ComposioResult<User> {
        let data = self
            .execute(actions::GET_ABOUT_USER, params("user_id", user_id))
            .await?;
        decode_one(&data)
    }

    pub async fn list_users(&self) -> ComposioResult<Vec<User>> {
        let data = self.execute(actions::LIST_USERS, Map::new()).await?;
        decode_list(&data, RESULTS, true)
    }

    // Search

    /// Search pages and databases across the workspace.
    pub async fn search_workspace(
        &self,
        query: &str,
        filter: Option<SearchFilter>,
        page_size: u32,
    ) -> ComposioResult<Vec<SearchResult>> {
        let mut p = params("page_size", page_size);
        if !query.is_empty() {
            p.insert("query".to_string(), query.into());
        }
        let scope = match filter {
            Some(SearchFilter::Page) => "get_pages",
            Some(SearchFilter::Database) => "get_databases",
            None => "get_all",
        };
        p.insert(scope.to_string(), Value::Bool(true));

        let data = self.execute(actions::FETCH_DATA, p).await?;
        decode_list(&data, &["results", "values"], false)
    }
}
