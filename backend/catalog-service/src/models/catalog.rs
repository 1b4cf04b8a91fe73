use super::ContentTypeRef;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Where a read was served from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataSource {
    Cache,
    Database,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountContentType {
    pub username: String,
    pub content_type: ContentTypeRef,
}

#[derive(Debug, Clone, FromRow)]
pub struct CatalogVideoRow {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub url: String,
    pub img_url: String,
    pub category: Option<String>,
}

/// Client-facing category with an absolute image link
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogCategory {
    pub id: i64,
    pub name: String,
    pub img_url: String,
}

/// Client-facing video with absolute media links
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogVideo {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub url: String,
    pub img_url: String,
    pub category: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Feedback {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub telegram: Option<String>,
    pub message: String,
}
