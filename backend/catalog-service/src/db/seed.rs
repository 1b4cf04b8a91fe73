//! Idempotent bootstrap data: the admin content type and the first admin account

use crate::config::AdminConfig;
use crate::error::{store_err, Entity, Result};
use crate::security::hash_password;
use crate::validation;
use sqlx::PgPool;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeedOutcome {
    pub content_type_id: i64,
    pub content_type_created: bool,
    pub admin_created: bool,
}

pub async fn ensure_admin(pool: &PgPool, admin: &AdminConfig) -> Result<SeedOutcome> {
    const OP: &str = "ensure_admin";

    validation::validate_content_type(&admin.content_type)?;
    validation::validate_account(&admin.username, 1, &admin.password, true)?;

    let mut tx = pool.begin().await.map_err(store_err(OP, Entity::ContentType))?;

    let existing: Option<i64> = sqlx::query_scalar(
        "SELECT id FROM content_types WHERE name = $1 AND deleted IS NOT TRUE",
    )
    .bind(&admin.content_type)
    .fetch_optional(&mut *tx)
    .await
    .map_err(store_err(OP, Entity::ContentType))?;

    let (content_type_id, content_type_created) = match existing {
        Some(id) => (id, false),
        None => {
            let id: i64 =
                sqlx::query_scalar("INSERT INTO content_types (name) VALUES ($1) RETURNING id")
                    .bind(&admin.content_type)
                    .fetch_one(&mut *tx)
                    .await
                    .map_err(store_err(OP, Entity::ContentType))?;
            (id, true)
        }
    };

    let admin_exists: bool = sqlx::query_scalar(
        "SELECT EXISTS(SELECT 1 FROM accounts WHERE username = $1 AND deleted IS NOT TRUE)",
    )
    .bind(&admin.username)
    .fetch_one(&mut *tx)
    .await
    .map_err(store_err(OP, Entity::Account))?;

    if !admin_exists {
        sqlx::query(
            r#"
            INSERT INTO accounts (username, content_type_id, password, admin)
            VALUES ($1, $2, $3, TRUE)
            "#,
        )
        .bind(&admin.username)
        .bind(content_type_id)
        .bind(hash_password(&admin.password))
        .execute(&mut *tx)
        .await
        .map_err(store_err(OP, Entity::Account))?;
    }

    tx.commit().await.map_err(store_err(OP, Entity::Account))?;

    info!(
        username = %admin.username,
        content_type_id,
        content_type_created,
        admin_created = !admin_exists,
        "Admin bootstrap data ensured"
    );

    Ok(SeedOutcome {
        content_type_id,
        content_type_created,
        admin_created: !admin_exists,
    })
}
