//! Client-facing read queries and feedback intake

use crate::error::{store_err, CatalogError, Entity, Result};
use crate::models::{AccountContentType, CatalogVideoRow, CategoryRef, ContentTypeRef, Feedback};
use sqlx::{FromRow, PgPool};

#[derive(Debug, FromRow)]
struct AccountTypeRow {
    username: String,
    content_type_id: i64,
    content_type_name: String,
}

async fn content_type_exists(pool: &PgPool, op: &'static str, id: i64) -> Result<()> {
    let exists: bool = sqlx::query_scalar(
        "SELECT EXISTS(SELECT 1 FROM content_types WHERE id = $1 AND deleted IS NOT TRUE)",
    )
    .bind(id)
    .fetch_one(pool)
    .await
    .map_err(store_err(op, Entity::ContentType))?;

    if !exists {
        return Err(CatalogError::not_found(Entity::ContentType, id));
    }
    Ok(())
}

async fn category_exists(pool: &PgPool, op: &'static str, id: i64) -> Result<()> {
    let exists: bool = sqlx::query_scalar(
        "SELECT EXISTS(SELECT 1 FROM categories WHERE id = $1 AND deleted IS NOT TRUE)",
    )
    .bind(id)
    .fetch_one(pool)
    .await
    .map_err(store_err(op, Entity::Category))?;

    if !exists {
        return Err(CatalogError::not_found(Entity::Category, id));
    }
    Ok(())
}

pub async fn account_content_type(pool: &PgPool, username: &str) -> Result<AccountContentType> {
    let row = sqlx::query_as::<_, AccountTypeRow>(
        r#"
        SELECT a.username, ct.id AS content_type_id, ct.name AS content_type_name
        FROM accounts a
        JOIN content_types ct ON ct.id = a.content_type_id
        WHERE a.username = $1 AND a.deleted IS NOT TRUE AND ct.deleted IS NOT TRUE
        "#,
    )
    .bind(username)
    .fetch_optional(pool)
    .await
    .map_err(store_err("account_content_type", Entity::Account))?
    .ok_or_else(|| CatalogError::not_found(Entity::Account, username))?;

    Ok(AccountContentType {
        username: row.username,
        content_type: ContentTypeRef {
            id: row.content_type_id,
            name: row.content_type_name,
        },
    })
}

pub async fn categories_by_type(pool: &PgPool, content_type_id: i64) -> Result<Vec<CategoryRef>> {
    const OP: &str = "categories_by_type";

    content_type_exists(pool, OP, content_type_id).await?;

    sqlx::query_as::<_, CategoryRef>(
        r#"
        SELECT c.id, c.name, c.img_url
        FROM categories c
        JOIN category_content_types cct ON cct.category_id = c.id
        WHERE cct.content_type_id = $1 AND c.deleted IS NOT TRUE
        ORDER BY c.id
        "#,
    )
    .bind(content_type_id)
    .fetch_all(pool)
    .await
    .map_err(store_err(OP, Entity::Category))
}

pub async fn catalog_video(pool: &PgPool, id: i64) -> Result<CatalogVideoRow> {
    sqlx::query_as::<_, CatalogVideoRow>(
        r#"
        SELECT v.id, v.name, v.description, v.url, v.img_url,
               (SELECT c.name
                FROM video_categories vc
                JOIN categories c ON c.id = vc.category_id
                WHERE vc.video_id = v.id AND c.deleted IS NOT TRUE
                ORDER BY c.id
                LIMIT 1) AS category
        FROM videos v
        WHERE v.id = $1 AND v.deleted IS NOT TRUE
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await
    .map_err(store_err("catalog_video", Entity::Video))?
    .ok_or_else(|| CatalogError::not_found(Entity::Video, id))
}

pub async fn videos_by_category_and_type(
    pool: &PgPool,
    content_type_id: i64,
    category_id: i64,
) -> Result<Vec<CatalogVideoRow>> {
    const OP: &str = "videos_by_category_and_type";

    content_type_exists(pool, OP, content_type_id).await?;
    category_exists(pool, OP, category_id).await?;

    sqlx::query_as::<_, CatalogVideoRow>(
        r#"
        SELECT v.id, v.name, v.description, v.url, v.img_url, c.name AS category
        FROM videos v
        JOIN video_categories vc ON vc.video_id = v.id
        JOIN categories c ON c.id = vc.category_id
        JOIN category_content_types cct ON cct.category_id = c.id
        WHERE c.id = $2 AND cct.content_type_id = $1
          AND v.deleted IS NOT TRUE AND c.deleted IS NOT TRUE
        ORDER BY v.id
        "#,
    )
    .bind(content_type_id)
    .bind(category_id)
    .fetch_all(pool)
    .await
    .map_err(store_err(OP, Entity::Video))
}

pub async fn insert_feedback(pool: &PgPool, feedback: &Feedback) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO feedback (username, email, telegram, message)
        VALUES ($1, $2, $3, $4)
        "#,
    )
    .bind(&feedback.username)
    .bind(&feedback.email)
    .bind(&feedback.telegram)
    .bind(&feedback.message)
    .execute(pool)
    .await
    .map_err(store_err("insert_feedback", Entity::Feedback))?;

    Ok(())
}
