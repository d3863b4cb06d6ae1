// Notion records and request payloads

use crate::decode::{plain_text, Decode, DecodeError, Fields};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Notion page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page {
    pub id: String,
    pub url: Option<String>,
    pub title: Option<String>,
    pub icon: Option<String>,
    pub cover: Option<String>,
    pub parent_id: Option<String>,
    pub parent_type: Option<String>,
    #[serde(default)]
    pub archived: bool,
    pub created_time: Option<DateTime<Utc>>,
    pub last_edited_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub properties: Map<String, Value>,
}

impl Decode for Page {
    const ENTITY: &'static str = "Page";

    fn decode(value: &Value) -> Result<Self, DecodeError> {
        let fields = Fields::of(Self::ENTITY, value)?;
        let properties = fields.object_or_empty("properties")?;
        let (parent_type, parent_id) = parent_of(&fields)?;

        Ok(Self {
            id: fields.required_str("id")?,
            url: fields.optional_str("url")?,
            title: title_property(&properties),
            icon: emoji_of(&fields),
            cover: fields
                .nested("cover")
                .and_then(|cover| cover.nested("external"))
                .and_then(|external| external.get("url"))
                .and_then(Value::as_str)
                .map(str::to_string),
            parent_id,
            parent_type,
            archived: fields.flag("archived")?,
            created_time: fields.optional_timestamp("created_time")?,
            last_edited_time: fields.optional_timestamp("last_edited_time")?,
            properties,
        })
    }
}

/// Notion block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    pub id: String,
    #[serde(rename = "type")]
    pub block_type: String,
    #[serde(default)]
    pub has_children: bool,
    #[serde(default)]
    pub archived: bool,
    pub created_time: Option<DateTime<Utc>>,
    pub last_edited_time: Option<DateTime<Utc>>,
    pub parent_id: Option<String>,
    /// Type-specific payload, e.g. the `paragraph` object of a paragraph block.
    pub content: Option<Value>,
}

impl Decode for Block {
    const ENTITY: &'static str = "Block";

    fn decode(value: &Value) -> Result<Self, DecodeError> {
        let fields = Fields::of(Self::ENTITY, value)?;
        let block_type = fields
            .optional_str("type")?
            .unwrap_or_else(|| "unknown".to_string());
        let (_, parent_id) = parent_of(&fields)?;

        Ok(Self {
            id: fields.required_str("id")?,
            content: fields.raw(&block_type),
            block_type,
            has_children: fields.flag("has_children")?,
            archived: fields.flag("archived")?,
            created_time: fields.optional_timestamp("created_time")?,
            last_edited_time: fields.optional_timestamp("last_edited_time")?,
            parent_id,
        })
    }
}

/// Notion database.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Database {
    pub id: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub url: Option<String>,
    pub icon: Option<String>,
    pub parent_id: Option<String>,
    #[serde(default)]
    pub archived: bool,
    pub created_time: Option<DateTime<Utc>>,
    pub last_edited_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub properties: Map<String, Value>,
}

impl Decode for Database {
    const ENTITY: &'static str = "Database";

    fn decode(value: &Value) -> Result<Self, DecodeError> {
        let fields = Fields::of(Self::ENTITY, value)?;
        let (_, parent_id) = parent_of(&fields)?;

        Ok(Self {
            id: fields.required_str("id")?,
            title: plain_text(fields.get("title")),
            description: plain_text(fields.get("description")),
            url: fields.optional_str("url")?,
            icon: emoji_of(&fields),
            parent_id,
            archived: fields.flag("archived")?,
            created_time: fields.optional_timestamp("created_time")?,
            last_edited_time: fields.optional_timestamp("last_edited_time")?,
            properties: fields.object_or_empty("properties")?,
        })
    }
}

/// A row (page) in a Notion database.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatabaseRow {
    pub id: String,
    pub url: Option<String>,
    #[serde(default)]
    pub properties: Map<String, Value>,
    pub created_time: Option<DateTime<Utc>>,
    pub last_edited_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub archived: bool,
}

impl DatabaseRow {
    /// Plain text of the row's title property.
    pub fn title(&self) -> Option<String> {
        title_property(&self.properties)
    }
}

impl Decode for DatabaseRow {
    const ENTITY: &'static str = "DatabaseRow";

    fn decode(value: &Value) -> Result<Self, DecodeError> {
        let fields = Fields::of(Self::ENTITY, value)?;

        Ok(Self {
            id: fields.required_str("id")?,
            url: fields.optional_str("url")?,
            properties: fields.object_or_empty("properties")?,
            created_time: fields.optional_timestamp("created_time")?,
            last_edited_time: fields.optional_timestamp("last_edited_time")?,
            archived: fields.flag("archived")?,
        })
    }
}

/// Notion comment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub id: String,
    pub discussion_id: Option<String>,
    pub parent_id: Option<String>,
    pub rich_text: Option<Value>,
    pub created_time: Option<DateTime<Utc>>,
    pub created_by: Option<Value>,
}

impl Comment {
    pub fn text(&self) -> Option<String> {
        plain_text(self.rich_text.as_ref())
    }
}

impl Decode for Comment {
    const ENTITY: &'static str = "Comment";

    fn decode(value: &Value) -> Result<Self, DecodeError> {
        let fields = Fields::of(Self::ENTITY, value)?;

        Ok(Self {
            id: fields.required_str("id")?,
            discussion_id: fields.optional_str("discussion_id")?,
            parent_id: fields
                .nested("parent")
                .map(|parent| parent.optional_str("page_id"))
                .transpose()?
                .flatten(),
            rich_text: fields.raw("rich_text"),
            created_time: fields.optional_timestamp("created_time")?,
            created_by: fields.raw("created_by"),
        })
    }
}

/// Notion user (person or bot).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    #[serde(rename = "type")]
    pub user_type: Option<String>,
    pub name: Option<String>,
    pub avatar_url: Option<String>,
    pub email: Option<String>,
}

impl Decode for User {
    const ENTITY: &'static str = "User";

    fn decode(value: &Value) -> Result<Self, DecodeError> {
        let fields = Fields::of(Self::ENTITY, value)?;

        Ok(Self {
            id: fields.required_str("id")?,
            user_type: fields.optional_str("type")?,
            name: fields.optional_str("name")?,
            avatar_url: fields.optional_str("avatar_url")?,
            email: fields
                .nested("person")
                .map(|person| person.optional_str("email"))
                .transpose()?
                .flatten(),
        })
    }
}

/// Kind of object returned by a workspace search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectType {
    Page,
    Database,
}

/// Workspace search hit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub id: String,
    pub object_type: ObjectType,
    pub title: Option<String>,
    pub url: Option<String>,
    pub parent_id: Option<String>,
    pub last_edited_time: Option<DateTime<Utc>>,
}

impl Decode for SearchResult {
    const ENTITY: &'static str = "SearchResult";

    fn decode(value: &Value) -> Result<Self, DecodeError> {
        let fields = Fields::of(Self::ENTITY, value)?;
        let object_type = match fields.optional_str("object")?.as_deref() {
            None | Some("page") => ObjectType::Page,
            Some("database") => ObjectType::Database,
            Some(other) => {
                return Err(DecodeError::new(
                    Self::ENTITY,
                    "object",
                    format!("has unsupported value {:?}, expected \"page\" or \"database\"", other),
                ))
            }
        };
        let title = match object_type {
            ObjectType::Database => plain_text(fields.get("title")),
            ObjectType::Page => title_property(&fields.object_or_empty("properties")?),
        };
        let (_, parent_id) = parent_of(&fields)?;

        Ok(Self {
            id: fields.required_str("id")?,
            object_type,
            title,
            url: fields.optional_str("url")?,
            parent_id,
            last_edited_time: fields.optional_timestamp("last_edited_time")?,
        })
    }
}

/// Where a new page is created.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParentType {
    #[default]
    PageId,
    DatabaseId,
}

/// Restricts a workspace search to one object type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchFilter {
    Page,
    Database,
}

/// Parameters of `NOTION_CREATE_NOTION_PAGE`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreatePage {
    pub parent_id: String,
    pub title: String,
    #[serde(default)]
    pub parent_type: ParentType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cover: Option<String>,
}

impl CreatePage {
    pub fn new(parent_id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            parent_id: parent_id.into(),
            title: title.into(),
            parent_type: ParentType::PageId,
            icon: None,
            cover: None,
        }
    }
}

/// Fields to change on a page; `None` leaves the field untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PageUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cover: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub archived: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties: Option<Map<String, Value>>,
}

/// Parameters of `NOTION_QUERY_DATABASE` besides the database id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatabaseQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sorts: Option<Vec<Value>>,
    #[serde(default = "default_page_size")]
    pub page_size: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_cursor: Option<String>,
}

impl Default for DatabaseQuery {
    fn default() -> Self {
        Self {
            filter: None,
            sorts: None,
            page_size: default_page_size(),
            start_cursor: None,
        }
    }
}

/// Fields to change on a database schema.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DatabaseSchemaUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties: Option<Map<String, Value>>,
}

pub fn default_page_size() -> u32 {
    100
}

/// Plain text of the first property whose `type` is `title`.
pub fn title_property(properties: &Map<String, Value>) -> Option<String> {
    properties
        .values()
        .find(|prop| prop.get("type").and_then(Value::as_str) == Some("title"))
        .and_then(|prop| plain_text(prop.get("title")))
}

/// `(parent.type, parent[parent.type])`; the id is only kept when it is a string.
fn parent_of(fields: &Fields<'_>) -> Result<(Option<String>, Option<String>), DecodeError> {
    let Some(parent) = fields.nested("parent") else {
        return Ok((None, None));
    };
    let parent_type = parent.optional_str("type")?;
    let parent_id = parent_type
        .as_deref()
        .and_then(|kind| parent.get(kind))
        .and_then(Value::as_str)
        .map(str::to_string);
    Ok((parent_type, parent_id))
}

fn emoji_of(fields: &Fields<'_>) -> Option<String> {
    fields
        .nested("icon")
        .and_then(|icon| icon.get("emoji"))
        .and_then(Value::as_str)
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn page_payload() -> Value {
        json!({
            "object": "page",
            "id": "pg_1",
            "url": "https://www.notion.so/pg_1",
            "icon": {"type": "emoji", "emoji": "📝"},
            "cover": {"type": "external", "external": {"url": "https://img/cover.png"}},
            "parent": {"type": "database_id", "database_id": "db_9"},
            "archived": false,
            "created_time": "2024-05-01T09:00:00.000Z",
            "last_edited_time": "2024-05-02T10:15:00.000Z",
            "properties": {
                "Status": {"id": "s", "type": "select", "select": {"name": "Open"}},
                "Name": {"id": "title", "type": "title", "title": [
                    {"plain_text": "Weekly "}, {"plain_text": "Sync"}
                ]}
            }
        })
    }

    #[test]
    fn test_decode_page() {
        let page = Page::decode(&page_payload()).unwrap();

        assert_eq!(page.id, "pg_1");
        assert_eq!(page.title.as_deref(), Some("Weekly Sync"));
        assert_eq!(page.icon.as_deref(), Some("📝"));
        assert_eq!(page.cover.as_deref(), Some("https://img/cover.png"));
        assert_eq!(page.parent_type.as_deref(), Some("database_id"));
        assert_eq!(page.parent_id.as_deref(), Some("db_9"));
        assert!(!page.archived);
        assert!(page.created_time.is_some());
        assert_eq!(page.properties.len(), 2);
    }

    #[test]
    fn test_decode_page_missing_id() {
        let mut payload = page_payload();
        payload.as_object_mut().unwrap().remove("id");

        let err = Page::decode(&payload).unwrap_err();
        assert_eq!(err.entity, "Page");
        assert_eq!(err.field, "id");
    }

    #[test]
    fn test_workspace_parent_has_no_id() {
        let page = Page::decode(&json!({
            "id": "pg_2",
            "parent": {"type": "workspace", "workspace": true}
        }))
        .unwrap();

        assert_eq!(page.parent_type.as_deref(), Some("workspace"));
        assert_eq!(page.parent_id, None);
        assert_eq!(page.title, None);
    }

    #[test]
    fn test_decode_block_content() {
        let block = Block::decode(&json!({
            "id": "blk_1",
            "type": "paragraph",
            "has_children": true,
            "parent": {"type": "page_id", "page_id": "pg_1"},
            "paragraph": {"rich_text": [{"plain_text": "hello"}]}
        }))
        .unwrap();

        assert_eq!(block.block_type, "paragraph");
        assert!(block.has_children);
        assert_eq!(block.parent_id.as_deref(), Some("pg_1"));
        assert_eq!(
            block.content,
            Some(json!({"rich_text": [{"plain_text": "hello"}]}))
        );
    }

    #[test]
    fn test_decode_database() {
        let db = Database::decode(&json!({
            "id": "db_1",
            "title": [{"plain_text": "Tasks"}],
            "description": [],
            "parent": {"type": "page_id", "page_id": "pg_root"},
            "properties": {"Name": {"type": "title"}}
        }))
        .unwrap();

        assert_eq!(db.title.as_deref(), Some("Tasks"));
        assert_eq!(db.description, None);
        assert_eq!(db.parent_id.as_deref(), Some("pg_root"));
        assert!(db.properties.contains_key("Name"));
    }

    #[test]
    fn test_row_title() {
        let row = DatabaseRow::decode(&json!({
            "id": "row_1",
            "properties": {"Task": {"type": "title", "title": [{"plain_text": "Ship it"}]}}
        }))
        .unwrap();

        assert_eq!(row.title().as_deref(), Some("Ship it"));
    }

    #[test]
    fn test_decode_comment() {
        let comment = Comment::decode(&json!({
            "id": "cm_1",
            "discussion_id": "d_1",
            "parent": {"type": "page_id", "page_id": "pg_1"},
            "rich_text": [{"plain_text": "LGTM"}],
            "created_by": {"object": "user", "id": "u1"}
        }))
        .unwrap();

        assert_eq!(comment.parent_id.as_deref(), Some("pg_1"));
        assert_eq!(comment.text().as_deref(), Some("LGTM"));
        assert_eq!(comment.created_by, Some(json!({"object": "user", "id": "u1"})));
    }

    #[test]
    fn test_decode_user() {
        let user = User::decode(&json!({
            "id": "u1",
            "type": "person",
            "name": "Alice",
            "person": {"email": "alice@example.com"}
        }))
        .unwrap();

        assert_eq!(user.user_type.as_deref(), Some("person"));
        assert_eq!(user.email.as_deref(), Some("alice@example.com"));
    }

    #[test]
    fn test_decode_search_results() {
        let db = SearchResult::decode(&json!({
            "object": "database",
            "id": "db_1",
            "title": [{"plain_text": "Roadmap"}]
        }))
        .unwrap();
        assert_eq!(db.object_type, ObjectType::Database);
        assert_eq!(db.title.as_deref(), Some("Roadmap"));

        let page = SearchResult::decode(&page_payload()).unwrap();
        assert_eq!(page.object_type, ObjectType::Page);
        assert_eq!(page.title.as_deref(), Some("Weekly Sync"));

        let err = SearchResult::decode(&json!({"object": "block", "id": "b"})).unwrap_err();
        assert_eq!(err.field, "object");
    }

    #[test]
    fn test_create_page_serialization() {
        let mut request = CreatePage::new("pg_parent", "Notes");
        request.icon = Some("🚀".to_string());

        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({
                "parent_id": "pg_parent",
                "title": "Notes",
                "parent_type": "page_id",
                "icon": "🚀"
            })
        );
    }

    #[test]
    fn test_page_update_omits_unset_fields() {
        let update = PageUpdate {
            archived: Some(true),
            ..Default::default()
        };
        assert_eq!(serde_json::to_value(&update).unwrap(), json!({"archived": true}));
    }
}
