use super::format_date;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow)]
pub struct ContentTypeRow {
    pub id: i64,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow)]
pub struct CategoryRow {
    pub id: i64,
    pub name: String,
    pub img_url: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow)]
pub struct VideoRow {
    pub id: i64,
    pub url: String,
    pub name: String,
    pub description: String,
    pub img_url: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow)]
pub struct AccountRow {
    pub id: i64,
    pub username: String,
    pub content_type_id: Option<i64>,
    pub content_type_name: Option<String>,
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentType {
    pub id: i64,
    pub name: String,
    pub created_at: String,
}

impl From<ContentTypeRow> for ContentType {
    fn from(row: ContentTypeRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            created_at: format_date(&row.created_at),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct ContentTypeRef {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    pub name: String,
    pub img_url: String,
    pub content_types: Vec<ContentTypeRef>,
    pub created_at: String,
}

impl Category {
    pub fn from_row(row: CategoryRow, content_types: Vec<ContentTypeRef>) -> Self {
        Self {
            id: row.id,
            name: row.name,
            img_url: row.img_url,
            content_types,
            created_at: format_date(&row.created_at),
        }
    }

    pub fn content_type_ids(&self) -> Vec<i64> {
        self.content_types.iter().map(|ct| ct.id).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct CategoryRef {
    pub id: i64,
    pub name: String,
    pub img_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Video {
    pub id: i64,
    pub url: String,
    pub name: String,
    pub description: String,
    pub img_url: String,
    pub categories: Vec<CategoryRef>,
    pub created_at: String,
}

impl Video {
    pub fn from_row(row: VideoRow, categories: Vec<CategoryRef>) -> Self {
        Self {
            id: row.id,
            url: row.url,
            name: row.name,
            description: row.description,
            img_url: row.img_url,
            categories,
            created_at: format_date(&row.created_at),
        }
    }

    pub fn category_ids(&self) -> Vec<i64> {
        self.categories.iter().map(|c| c.id).collect()
    }
}

/// Account view; the stored password never leaves the store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub id: i64,
    pub username: String,
    pub content_type: Option<ContentTypeRef>,
    pub is_admin: bool,
    pub created_at: String,
}

impl From<AccountRow> for Account {
    fn from(row: AccountRow) -> Self {
        let content_type = match (row.content_type_id, row.content_type_name) {
            (Some(id), Some(name)) => Some(ContentTypeRef { id, name }),
            _ => None,
        };
        Self {
            id: row.id,
            username: row.username,
            content_type,
            is_admin: row.is_admin,
            created_at: format_date(&row.created_at),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CategoryInput {
    pub name: String,
    pub img_url: String,
    pub content_type_ids: Vec<i64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VideoInput {
    pub url: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub img_url: String,
    pub category_ids: Vec<i64>,
}

/// Plaintext password, hashed before storage; on update an empty password keeps the current one
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct AccountInput {
    pub username: String,
    pub content_type_id: i64,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub is_admin: bool,
}

impl std::fmt::Debug for AccountInput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccountInput")
            .field("username", &self.username)
            .field("content_type_id", &self.content_type_id)
            .field("password", &"[REDACTED]")
            .field("is_admin", &self.is_admin)
            .finish()
    }
}
