//! Association-table statements shared by the entity repositories
//!
//! All of these run inside the caller's transaction.

use crate::error::{store_err, CatalogError, Entity, Result};
use sqlx::{Postgres, Transaction};

pub(crate) type Tx<'a> = Transaction<'a, Postgres>;

fn first_missing(requested: &[i64], live: &[i64]) -> Option<i64> {
    requested.iter().copied().find(|id| !live.contains(id))
}

/// Share-lock the requested content types; fail on the first one that is missing or deleted
pub(crate) async fn lock_live_content_types(
    tx: &mut Tx<'_>,
    op: &'static str,
    ids: &[i64],
) -> Result<()> {
    let live: Vec<i64> = sqlx::query_scalar(
        r#"
        SELECT id FROM content_types
        WHERE id = ANY($1) AND deleted IS NOT TRUE
        FOR SHARE
        "#,
    )
    .bind(ids)
    .fetch_all(&mut **tx)
    .await
    .map_err(store_err(op, Entity::ContentType))?;

    match first_missing(ids, &live) {
        Some(id) => Err(CatalogError::not_found(Entity::ContentType, id)),
        None => Ok(()),
    }
}

/// Share-lock the requested categories; fail on the first one that is missing or deleted
pub(crate) async fn lock_live_categories(
    tx: &mut Tx<'_>,
    op: &'static str,
    ids: &[i64],
) -> Result<()> {
    let live: Vec<i64> = sqlx::query_scalar(
        r#"
        SELECT id FROM categories
        WHERE id = ANY($1) AND deleted IS NOT TRUE
        FOR SHARE
        "#,
    )
    .bind(ids)
    .fetch_all(&mut **tx)
    .await
    .map_err(store_err(op, Entity::Category))?;

    match first_missing(ids, &live) {
        Some(id) => Err(CatalogError::not_found(Entity::Category, id)),
        None => Ok(()),
    }
}

pub(crate) async fn link_category_content_types(
    tx: &mut Tx<'_>,
    op: &'static str,
    category_id: i64,
    content_type_ids: &[i64],
) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO category_content_types (category_id, content_type_id)
        SELECT $1, t.id FROM UNNEST($2::BIGINT[]) AS t(id)
        ON CONFLICT DO NOTHING
        "#,
    )
    .bind(category_id)
    .bind(content_type_ids)
    .execute(&mut **tx)
    .await
    .map_err(store_err(op, Entity::Category))?;

    Ok(())
}

pub(crate) async fn unlink_category_content_types(
    tx: &mut Tx<'_>,
    op: &'static str,
    category_id: i64,
) -> Result<u64> {
    let result = sqlx::query("DELETE FROM category_content_types WHERE category_id = $1")
        .bind(category_id)
        .execute(&mut **tx)
        .await
        .map_err(store_err(op, Entity::Category))?;

    Ok(result.rows_affected())
}

pub(crate) async fn unlink_content_type_categories(
    tx: &mut Tx<'_>,
    op: &'static str,
    content_type_id: i64,
) -> Result<u64> {
    let result = sqlx::query("DELETE FROM category_content_types WHERE content_type_id = $1")
        .bind(content_type_id)
        .execute(&mut **tx)
        .await
        .map_err(store_err(op, Entity::ContentType))?;

    Ok(result.rows_affected())
}

pub(crate) async fn link_video_categories(
    tx: &mut Tx<'_>,
    op: &'static str,
    video_id: i64,
    category_ids: &[i64],
) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO video_categories (video_id, category_id)
        SELECT $1, c.id FROM UNNEST($2::BIGINT[]) AS c(id)
        ON CONFLICT (video_id, category_id) DO NOTHING
        "#,
    )
    .bind(video_id)
    .bind(category_ids)
    .execute(&mut **tx)
    .await
    .map_err(store_err(op, Entity::Video))?;

    Ok(())
}

pub(crate) async fn unlink_video_categories(
    tx: &mut Tx<'_>,
    op: &'static str,
    video_id: i64,
) -> Result<u64> {
    let result = sqlx::query("DELETE FROM video_categories WHERE video_id = $1")
        .bind(video_id)
        .execute(&mut **tx)
        .await
        .map_err(store_err(op, Entity::Video))?;

    Ok(result.rows_affected())
}

pub(crate) async fn unlink_category_videos(
    tx: &mut Tx<'_>,
    op: &'static str,
    category_id: i64,
) -> Result<u64> {
    let result = sqlx::query("DELETE FROM video_categories WHERE category_id = $1")
        .bind(category_id)
        .execute(&mut **tx)
        .await
        .map_err(store_err(op, Entity::Category))?;

    Ok(result.rows_affected())
}
