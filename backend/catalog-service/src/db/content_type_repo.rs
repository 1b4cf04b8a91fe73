use super::associations::{self, Tx};
use crate::error::{store_err, CatalogError, Entity, Result};
use crate::models::{ContentType, ContentTypeRow};
use sqlx::PgPool;
use tracing::debug;

/// Lock a live content type row for the rest of the transaction
async fn lock_content_type(tx: &mut Tx<'_>, op: &'static str, id: i64) -> Result<()> {
    let locked: Option<i64> = sqlx::query_scalar(
        "SELECT id FROM content_types WHERE id = $1 AND deleted IS NOT TRUE FOR UPDATE",
    )
    .bind(id)
    .fetch_optional(&mut **tx)
    .await
    .map_err(store_err(op, Entity::ContentType))?;

    locked
        .map(|_| ())
        .ok_or_else(|| CatalogError::not_found(Entity::ContentType, id))
}

pub async fn add_content_type(pool: &PgPool, name: &str) -> Result<ContentType> {
    let row = sqlx::query_as::<_, ContentTypeRow>(
        r#"
        INSERT INTO content_types (name)
        VALUES ($1)
        RETURNING id, name, created_at
        "#,
    )
    .bind(name)
    .fetch_one(pool)
    .await
    .map_err(store_err("add_content_type", Entity::ContentType))?;

    Ok(row.into())
}

pub async fn get_content_type(pool: &PgPool, id: i64) -> Result<ContentType> {
    let row = sqlx::query_as::<_, ContentTypeRow>(
        r#"
        SELECT id, name, created_at
        FROM content_types
        WHERE id = $1 AND deleted IS NOT TRUE
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await
    .map_err(store_err("get_content_type", Entity::ContentType))?;

    row.map(ContentType::from)
        .ok_or_else(|| CatalogError::not_found(Entity::ContentType, id))
}

pub async fn list_content_types(pool: &PgPool) -> Result<Vec<ContentType>> {
    let rows = sqlx::query_as::<_, ContentTypeRow>(
        r#"
        SELECT id, name, created_at
        FROM content_types
        WHERE deleted IS NOT TRUE
        ORDER BY id
        "#,
    )
    .fetch_all(pool)
    .await
    .map_err(store_err("list_content_types", Entity::ContentType))?;

    Ok(rows.into_iter().map(ContentType::from).collect())
}

/// Single guarded statement, no children to touch
pub async fn update_content_type(pool: &PgPool, id: i64, name: &str) -> Result<ContentType> {
    let row = sqlx::query_as::<_, ContentTypeRow>(
        r#"
        UPDATE content_types
        SET name = $2
        WHERE id = $1 AND deleted IS NOT TRUE
        RETURNING id, name, created_at
        "#,
    )
    .bind(id)
    .bind(name)
    .fetch_optional(pool)
    .await
    .map_err(store_err("update_content_type", Entity::ContentType))?;

    row.map(ContentType::from)
        .ok_or_else(|| CatalogError::not_found(Entity::ContentType, id))
}

/// Remove category links, then soft-delete, in one transaction
pub async fn delete_content_type(pool: &PgPool, id: i64) -> Result<()> {
    const OP: &str = "delete_content_type";

    let mut tx = pool.begin().await.map_err(store_err(OP, Entity::ContentType))?;

    lock_content_type(&mut tx, OP, id).await?;
    let unlinked = associations::unlink_content_type_categories(&mut tx, OP, id).await?;

    let result = sqlx::query(
        "UPDATE content_types SET deleted = TRUE WHERE id = $1 AND deleted IS NOT TRUE",
    )
    .bind(id)
    .execute(&mut *tx)
    .await
    .map_err(store_err(OP, Entity::ContentType))?;

    if result.rows_affected() == 0 {
        return Err(CatalogError::not_found(Entity::ContentType, id));
    }

    tx.commit().await.map_err(store_err(OP, Entity::ContentType))?;

    debug!(content_type_id = id, unlinked, "Content type soft-deleted");
    Ok(())
}
