use super::associations;
use crate::error::{store_err, CatalogError, Entity, Result, ValidationError};
use crate::models::{Account, AccountInput, AccountRow};
use sqlx::{FromRow, PgPool};

#[derive(Debug, FromRow)]
struct UpdatedAccountRow {
    #[sqlx(flatten)]
    account: AccountRow,
    password_missing: bool,
}

pub async fn add_account(pool: &PgPool, input: &AccountInput) -> Result<Account> {
    const OP: &str = "add_account";

    let mut tx = pool.begin().await.map_err(store_err(OP, Entity::Account))?;

    associations::lock_live_content_types(&mut tx, OP, &[input.content_type_id]).await?;

    let row = sqlx::query_as::<_, AccountRow>(
        r#"
        INSERT INTO accounts (username, content_type_id, password, admin)
        VALUES ($1, $2, $3, $4)
        RETURNING id, username, content_type_id,
                  (SELECT name FROM content_types WHERE id = $2) AS content_type_name,
                  admin AS is_admin, created_at
        "#,
    )
    .bind(&input.username)
    .bind(input.content_type_id)
    .bind(&input.password)
    .bind(input.is_admin)
    .fetch_one(&mut *tx)
    .await
    .map_err(store_err(OP, Entity::Account))?;

    tx.commit().await.map_err(store_err(OP, Entity::Account))?;

    Ok(row.into())
}

pub async fn get_account(pool: &PgPool, id: i64) -> Result<Account> {
    let row = sqlx::query_as::<_, AccountRow>(
        r#"
        SELECT a.id, a.username, a.content_type_id, ct.name AS content_type_name,
               a.admin AS is_admin, a.created_at
        FROM accounts a
        LEFT JOIN content_types ct ON ct.id = a.content_type_id AND ct.deleted IS NOT TRUE
        WHERE a.id = $1 AND a.deleted IS NOT TRUE
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await
    .map_err(store_err("get_account", Entity::Account))?;

    row.map(Account::from)
        .ok_or_else(|| CatalogError::not_found(Entity::Account, id))
}

pub async fn list_accounts(pool: &PgPool) -> Result<Vec<Account>> {
    let rows = sqlx::query_as::<_, AccountRow>(
        r#"
        SELECT a.id, a.username, a.content_type_id, ct.name AS content_type_name,
               a.admin AS is_admin, a.created_at
        FROM accounts a
        LEFT JOIN content_types ct ON ct.id = a.content_type_id AND ct.deleted IS NOT TRUE
        WHERE a.deleted IS NOT TRUE
        ORDER BY a.id
        "#,
    )
    .fetch_all(pool)
    .await
    .map_err(store_err("list_accounts", Entity::Account))?;

    Ok(rows.into_iter().map(Account::from).collect())
}

/// An empty `input.password` keeps the stored one
pub async fn update_account(pool: &PgPool, id: i64, input: &AccountInput) -> Result<Account> {
    const OP: &str = "update_account";

    let mut tx = pool.begin().await.map_err(store_err(OP, Entity::Account))?;

    associations::lock_live_content_types(&mut tx, OP, &[input.content_type_id]).await?;

    let updated = sqlx::query_as::<_, UpdatedAccountRow>(
        r#"
        UPDATE accounts
        SET username = $2,
            content_type_id = $3,
            password = CASE WHEN $4 = '' THEN password ELSE $4 END,
            admin = $5
        WHERE id = $1 AND deleted IS NOT TRUE
        RETURNING id, username, content_type_id,
                  (SELECT name FROM content_types WHERE id = $3) AS content_type_name,
                  admin AS is_admin, created_at,
                  password = '' AS password_missing
        "#,
    )
    .bind(id)
    .bind(&input.username)
    .bind(input.content_type_id)
    .bind(&input.password)
    .bind(input.is_admin)
    .fetch_optional(&mut *tx)
    .await
    .map_err(store_err(OP, Entity::Account))?
    .ok_or_else(|| CatalogError::not_found(Entity::Account, id))?;

    // Admin accounts always carry a password
    if updated.account.is_admin && updated.password_missing {
        return Err(ValidationError::EmptyPasswordForAdmin.into());
    }

    tx.commit().await.map_err(store_err(OP, Entity::Account))?;

    Ok(updated.account.into())
}

pub async fn delete_account(pool: &PgPool, id: i64) -> Result<()> {
    let result =
        sqlx::query("UPDATE accounts SET deleted = TRUE WHERE id = $1 AND deleted IS NOT TRUE")
            .bind(id)
            .execute(pool)
            .await
            .map_err(store_err("delete_account", Entity::Account))?;

    if result.rows_affected() == 0 {
        return Err(CatalogError::not_found(Entity::Account, id));
    }
    Ok(())
}

pub async fn find_admin(pool: &PgPool, username: &str, password_hash: &str) -> Result<Account> {
    let row = sqlx::query_as::<_, AccountRow>(
        r#"
        SELECT a.id, a.username, a.content_type_id, ct.name AS content_type_name,
               a.admin AS is_admin, a.created_at
        FROM accounts a
        LEFT JOIN content_types ct ON ct.id = a.content_type_id AND ct.deleted IS NOT TRUE
        WHERE a.username = $1 AND a.password = $2
          AND a.admin = TRUE AND a.deleted IS NOT TRUE
        "#,
    )
    .bind(username)
    .bind(password_hash)
    .fetch_optional(pool)
    .await
    .map_err(store_err("find_admin", Entity::Account))?;

    row.map(Account::from)
        .ok_or_else(|| CatalogError::not_found(Entity::Account, username))
}
