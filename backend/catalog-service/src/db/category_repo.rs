use super::associations::{self, Tx};
use crate::error::{store_err, CatalogError, Entity, Result};
use crate::models::{Category, CategoryInput, CategoryRow, ContentTypeRef};
use sqlx::{FromRow, PgExecutor, PgPool};
use std::collections::HashMap;
use tracing::debug;

#[derive(Debug, FromRow)]
struct CategoryTypeLink {
    category_id: i64,
    id: i64,
    name: String,
}

/// Lock a live category row so concurrent association rewrites serialize
async fn lock_category(tx: &mut Tx<'_>, op: &'static str, id: i64) -> Result<()> {
    let locked: Option<i64> = sqlx::query_scalar(
        "SELECT id FROM categories WHERE id = $1 AND deleted IS NOT TRUE FOR UPDATE",
    )
    .bind(id)
    .fetch_optional(&mut **tx)
    .await
    .map_err(store_err(op, Entity::Category))?;

    locked
        .map(|_| ())
        .ok_or_else(|| CatalogError::not_found(Entity::Category, id))
}

async fn content_types_of<'e, E: PgExecutor<'e>>(
    executor: E,
    op: &'static str,
    category_id: i64,
) -> Result<Vec<ContentTypeRef>> {
    sqlx::query_as::<_, ContentTypeRef>(
        r#"
        SELECT ct.id, ct.name
        FROM category_content_types cct
        JOIN content_types ct ON ct.id = cct.content_type_id
        WHERE cct.category_id = $1 AND ct.deleted IS NOT TRUE
        ORDER BY ct.id
        "#,
    )
    .bind(category_id)
    .fetch_all(executor)
    .await
    .map_err(store_err(op, Entity::Category))
}

pub async fn add_category(pool: &PgPool, input: &CategoryInput) -> Result<Category> {
    const OP: &str = "add_category";

    let mut tx = pool.begin().await.map_err(store_err(OP, Entity::Category))?;

    associations::lock_live_content_types(&mut tx, OP, &input.content_type_ids).await?;

    let row = sqlx::query_as::<_, CategoryRow>(
        r#"
        INSERT INTO categories (name, img_url)
        VALUES ($1, $2)
        RETURNING id, name, img_url, created_at
        "#,
    )
    .bind(&input.name)
    .bind(&input.img_url)
    .fetch_one(&mut *tx)
    .await
    .map_err(store_err(OP, Entity::Category))?;

    associations::link_category_content_types(&mut tx, OP, row.id, &input.content_type_ids)
        .await?;
    let content_types = content_types_of(&mut *tx, OP, row.id).await?;

    tx.commit().await.map_err(store_err(OP, Entity::Category))?;

    Ok(Category::from_row(row, content_types))
}

pub async fn get_category(pool: &PgPool, id: i64) -> Result<Category> {
    const OP: &str = "get_category";

    let row = sqlx::query_as::<_, CategoryRow>(
        r#"
        SELECT id, name, img_url, created_at
        FROM categories
        WHERE id = $1 AND deleted IS NOT TRUE
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await
    .map_err(store_err(OP, Entity::Category))?
    .ok_or_else(|| CatalogError::not_found(Entity::Category, id))?;

    let content_types = content_types_of(pool, OP, id).await?;
    Ok(Category::from_row(row, content_types))
}

pub async fn list_categories(pool: &PgPool) -> Result<Vec<Category>> {
    const OP: &str = "list_categories";

    let rows = sqlx::query_as::<_, CategoryRow>(
        r#"
        SELECT id, name, img_url, created_at
        FROM categories
        WHERE deleted IS NOT TRUE
        ORDER BY id
        "#,
    )
    .fetch_all(pool)
    .await
    .map_err(store_err(OP, Entity::Category))?;

    let links = sqlx::query_as::<_, CategoryTypeLink>(
        r#"
        SELECT cct.category_id, ct.id, ct.name
        FROM category_content_types cct
        JOIN content_types ct ON ct.id = cct.content_type_id
        JOIN categories c ON c.id = cct.category_id
        WHERE c.deleted IS NOT TRUE AND ct.deleted IS NOT TRUE
        ORDER BY cct.category_id, ct.id
        "#,
    )
    .fetch_all(pool)
    .await
    .map_err(store_err(OP, Entity::Category))?;

    let mut by_category: HashMap<i64, Vec<ContentTypeRef>> = HashMap::new();
    for link in links {
        by_category
            .entry(link.category_id)
            .or_default()
            .push(ContentTypeRef {
                id: link.id,
                name: link.name,
            });
    }

    Ok(rows
        .into_iter()
        .map(|row| {
            let content_types = by_category.remove(&row.id).unwrap_or_default();
            Category::from_row(row, content_types)
        })
        .collect())
}

/// Full replace: the stored association set becomes exactly `input.content_type_ids`
pub async fn update_category(pool: &PgPool, id: i64, input: &CategoryInput) -> Result<Category> {
    const OP: &str = "update_category";

    let mut tx = pool.begin().await.map_err(store_err(OP, Entity::Category))?;

    lock_category(&mut tx, OP, id).await?;
    associations::lock_live_content_types(&mut tx, OP, &input.content_type_ids).await?;

    let row = sqlx::query_as::<_, CategoryRow>(
        r#"
        UPDATE categories
        SET name = $2, img_url = $3
        WHERE id = $1 AND deleted IS NOT TRUE
        RETURNING id, name, img_url, created_at
        "#,
    )
    .bind(id)
    .bind(&input.name)
    .bind(&input.img_url)
    .fetch_optional(&mut *tx)
    .await
    .map_err(store_err(OP, Entity::Category))?
    .ok_or_else(|| CatalogError::not_found(Entity::Category, id))?;

    associations::unlink_category_content_types(&mut tx, OP, id).await?;
    associations::link_category_content_types(&mut tx, OP, id, &input.content_type_ids).await?;
    let content_types = content_types_of(&mut *tx, OP, id).await?;

    tx.commit().await.map_err(store_err(OP, Entity::Category))?;

    Ok(Category::from_row(row, content_types))
}

/// Drop both association sets, then soft-delete, in one transaction
pub async fn delete_category(pool: &PgPool, id: i64) -> Result<()> {
    const OP: &str = "delete_category";

    let mut tx = pool.begin().await.map_err(store_err(OP, Entity::Category))?;

    lock_category(&mut tx, OP, id).await?;
    let type_links = associations::unlink_category_content_types(&mut tx, OP, id).await?;
    let video_links = associations::unlink_category_videos(&mut tx, OP, id).await?;

    let result = sqlx::query(
        "UPDATE categories SET deleted = TRUE WHERE id = $1 AND deleted IS NOT TRUE",
    )
    .bind(id)
    .execute(&mut *tx)
    .await
    .map_err(store_err(OP, Entity::Category))?;

    if result.rows_affected() == 0 {
        return Err(CatalogError::not_found(Entity::Category, id));
    }

    tx.commit().await.map_err(store_err(OP, Entity::Category))?;

    debug!(category_id = id, type_links, video_links, "Category soft-deleted");
    Ok(())
}
