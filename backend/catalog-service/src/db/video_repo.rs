use super::associations::{self, Tx};
use crate::error::{store_err, CatalogError, Entity, Result};
use crate::models::{CategoryRef, Video, VideoInput, VideoRow};
use sqlx::{FromRow, PgExecutor, PgPool};
use std::collections::HashMap;
use tracing::debug;

#[derive(Debug, FromRow)]
struct VideoCategoryLink {
    video_id: i64,
    id: i64,
    name: String,
    img_url: String,
}

async fn lock_video(tx: &mut Tx<'_>, op: &'static str, id: i64) -> Result<()> {
    let locked: Option<i64> = sqlx::query_scalar(
        "SELECT id FROM videos WHERE id = $1 AND deleted IS NOT TRUE FOR UPDATE",
    )
    .bind(id)
    .fetch_optional(&mut **tx)
    .await
    .map_err(store_err(op, Entity::Video))?;

    locked
        .map(|_| ())
        .ok_or_else(|| CatalogError::not_found(Entity::Video, id))
}

async fn categories_of<'e, E: PgExecutor<'e>>(
    executor: E,
    op: &'static str,
    video_id: i64,
) -> Result<Vec<CategoryRef>> {
    sqlx::query_as::<_, CategoryRef>(
        r#"
        SELECT c.id, c.name, c.img_url
        FROM video_categories vc
        JOIN categories c ON c.id = vc.category_id
        WHERE vc.video_id = $1 AND c.deleted IS NOT TRUE
        ORDER BY c.id
        "#,
    )
    .bind(video_id)
    .fetch_all(executor)
    .await
    .map_err(store_err(op, Entity::Video))
}

pub async fn add_video(pool: &PgPool, input: &VideoInput) -> Result<Video> {
    const OP: &str = "add_video";

    let mut tx = pool.begin().await.map_err(store_err(OP, Entity::Video))?;

    associations::lock_live_categories(&mut tx, OP, &input.category_ids).await?;

    let row = sqlx::query_as::<_, VideoRow>(
        r#"
        INSERT INTO videos (url, name, description, img_url)
        VALUES ($1, $2, $3, $4)
        RETURNING id, url, name, description, img_url, created_at
        "#,
    )
    .bind(&input.url)
    .bind(&input.name)
    .bind(&input.description)
    .bind(&input.img_url)
    .fetch_one(&mut *tx)
    .await
    .map_err(store_err(OP, Entity::Video))?;

    associations::link_video_categories(&mut tx, OP, row.id, &input.category_ids).await?;
    let categories = categories_of(&mut *tx, OP, row.id).await?;

    tx.commit().await.map_err(store_err(OP, Entity::Video))?;

    Ok(Video::from_row(row, categories))
}

pub async fn get_video(pool: &PgPool, id: i64) -> Result<Video> {
    const OP: &str = "get_video";

    let row = sqlx::query_as::<_, VideoRow>(
        r#"
        SELECT id, url, name, description, img_url, created_at
        FROM videos
        WHERE id = $1 AND deleted IS NOT TRUE
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await
    .map_err(store_err(OP, Entity::Video))?
    .ok_or_else(|| CatalogError::not_found(Entity::Video, id))?;

    let categories = categories_of(pool, OP, id).await?;
    Ok(Video::from_row(row, categories))
}

pub async fn list_videos(pool: &PgPool) -> Result<Vec<Video>> {
    const OP: &str = "list_videos";

    let rows = sqlx::query_as::<_, VideoRow>(
        r#"
        SELECT id, url, name, description, img_url, created_at
        FROM videos
        WHERE deleted IS NOT TRUE
        ORDER BY id
        "#,
    )
    .fetch_all(pool)
    .await
    .map_err(store_err(OP, Entity::Video))?;

    let links = sqlx::query_as::<_, VideoCategoryLink>(
        r#"
        SELECT vc.video_id, c.id, c.name, c.img_url
        FROM video_categories vc
        JOIN categories c ON c.id = vc.category_id
        JOIN videos v ON v.id = vc.video_id
        WHERE v.deleted IS NOT TRUE AND c.deleted IS NOT TRUE
        ORDER BY vc.video_id, c.id
        "#,
    )
    .fetch_all(pool)
    .await
    .map_err(store_err(OP, Entity::Video))?;

    let mut by_video: HashMap<i64, Vec<CategoryRef>> = HashMap::new();
    for link in links {
        by_video.entry(link.video_id).or_default().push(CategoryRef {
            id: link.id,
            name: link.name,
            img_url: link.img_url,
        });
    }

    Ok(rows
        .into_iter()
        .map(|row| {
            let categories = by_video.remove(&row.id).unwrap_or_default();
            Video::from_row(row, categories)
        })
        .collect())
}

/// Full replace of the video's fields and category set
pub async fn update_video(pool: &PgPool, id: i64, input: &VideoInput) -> Result<Video> {
    const OP: &str = "update_video";

    let mut tx = pool.begin().await.map_err(store_err(OP, Entity::Video))?;

    lock_video(&mut tx, OP, id).await?;
    associations::lock_live_categories(&mut tx, OP, &input.category_ids).await?;

    let row = sqlx::query_as::<_, VideoRow>(
        r#"
        UPDATE videos
        SET url = $2, name = $3, description = $4, img_url = $5
        WHERE id = $1 AND deleted IS NOT TRUE
        RETURNING id, url, name, description, img_url, created_at
        "#,
    )
    .bind(id)
    .bind(&input.url)
    .bind(&input.name)
    .bind(&input.description)
    .bind(&input.img_url)
    .fetch_optional(&mut *tx)
    .await
    .map_err(store_err(OP, Entity::Video))?
    .ok_or_else(|| CatalogError::not_found(Entity::Video, id))?;

    associations::unlink_video_categories(&mut tx, OP, id).await?;
    associations::link_video_categories(&mut tx, OP, id, &input.category_ids).await?;
    let categories = categories_of(&mut *tx, OP, id).await?;

    tx.commit().await.map_err(store_err(OP, Entity::Video))?;

    Ok(Video::from_row(row, categories))
}

pub async fn delete_video(pool: &PgPool, id: i64) -> Result<()> {
    const OP: &str = "delete_video";

    let mut tx = pool.begin().await.map_err(store_err(OP, Entity::Video))?;

    lock_video(&mut tx, OP, id).await?;
    let unlinked = associations::unlink_video_categories(&mut tx, OP, id).await?;

    let result =
        sqlx::query("UPDATE videos SET deleted = TRUE WHERE id = $1 AND deleted IS NOT TRUE")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(store_err(OP, Entity::Video))?;

    if result.rows_affected() == 0 {
        return Err(CatalogError::not_found(Entity::Video, id));
    }

    tx.commit().await.map_err(store_err(OP, Entity::Video))?;

    debug!(video_id = id, unlinked, "Video soft-deleted");
    Ok(())
}

/// Add links without touching existing ones; duplicates are ignored
pub async fn add_video_categories(pool: &PgPool, video_id: i64, category_ids: &[i64]) -> Result<()> {
    const OP: &str = "add_video_categories";

    let mut tx = pool.begin().await.map_err(store_err(OP, Entity::Video))?;

    lock_video(&mut tx, OP, video_id).await?;
    associations::lock_live_categories(&mut tx, OP, category_ids).await?;
    associations::link_video_categories(&mut tx, OP, video_id, category_ids).await?;

    tx.commit().await.map_err(store_err(OP, Entity::Video))?;
    Ok(())
}

pub async fn delete_video_categories(pool: &PgPool, video_id: i64) -> Result<u64> {
    const OP: &str = "delete_video_categories";

    let mut tx = pool.begin().await.map_err(store_err(OP, Entity::Video))?;

    lock_video(&mut tx, OP, video_id).await?;
    let unlinked = associations::unlink_video_categories(&mut tx, OP, video_id).await?;

    tx.commit().await.map_err(store_err(OP, Entity::Video))?;
    Ok(unlinked)
}
