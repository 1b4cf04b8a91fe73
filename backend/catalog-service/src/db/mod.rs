//! Relational store
//!
//! `AdminStore` covers the transactional admin writes, `CatalogStore` the
//! client-facing reads. `PgStore` implements both over a `PgPool` by delegating
//! to the per-entity repository functions; services only see the traits.
//!
//! Every multi-statement write runs in one transaction. Association rewrites
//! first take `FOR UPDATE` on the parent row and `FOR SHARE` on the targets,
//! so concurrent full-replace updates of the same parent serialize.

pub mod account_repo;
mod associations;
pub mod catalog_repo;
pub mod category_repo;
pub mod content_type_repo;
pub mod seed;
pub mod video_repo;

use crate::error::Result;
use crate::models::{
    Account, AccountContentType, AccountInput, CatalogVideoRow, Category, CategoryInput,
    CategoryRef, ContentType, Feedback, Video, VideoInput,
};
use async_trait::async_trait;
use sqlx::migrate::Migrator;
use sqlx::PgPool;

/// Schema migrations embedded at compile time
pub static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

#[async_trait]
pub trait AdminStore: Send + Sync {
    async fn add_content_type(&self, name: &str) -> Result<ContentType>;
    async fn get_content_type(&self, id: i64) -> Result<ContentType>;
    async fn list_content_types(&self) -> Result<Vec<ContentType>>;
    async fn update_content_type(&self, id: i64, name: &str) -> Result<ContentType>;
    async fn delete_content_type(&self, id: i64) -> Result<()>;

    async fn add_category(&self, input: &CategoryInput) -> Result<Category>;
    async fn get_category(&self, id: i64) -> Result<Category>;
    async fn list_categories(&self) -> Result<Vec<Category>>;
    async fn update_category(&self, id: i64, input: &CategoryInput) -> Result<Category>;
    async fn delete_category(&self, id: i64) -> Result<()>;

    async fn add_video(&self, input: &VideoInput) -> Result<Video>;
    async fn get_video(&self, id: i64) -> Result<Video>;
    async fn list_videos(&self) -> Result<Vec<Video>>;
    async fn update_video(&self, id: i64, input: &VideoInput) -> Result<Video>;
    async fn delete_video(&self, id: i64) -> Result<()>;
    async fn add_video_categories(&self, video_id: i64, category_ids: &[i64]) -> Result<()>;
    /// Returns how many links were removed
    async fn delete_video_categories(&self, video_id: i64) -> Result<u64>;

    async fn add_account(&self, input: &AccountInput) -> Result<Account>;
    async fn get_account(&self, id: i64) -> Result<Account>;
    async fn list_accounts(&self) -> Result<Vec<Account>>;
    async fn update_account(&self, id: i64, input: &AccountInput) -> Result<Account>;
    async fn delete_account(&self, id: i64) -> Result<()>;
    async fn find_admin(&self, username: &str, password_hash: &str) -> Result<Account>;
}

#[async_trait]
pub trait CatalogStore: Send + Sync {
    async fn account_content_type(&self, username: &str) -> Result<AccountContentType>;
    async fn categories_by_type(&self, content_type_id: i64) -> Result<Vec<CategoryRef>>;
    async fn catalog_video(&self, id: i64) -> Result<CatalogVideoRow>;
    async fn videos_by_category_and_type(
        &self,
        content_type_id: i64,
        category_id: i64,
    ) -> Result<Vec<CatalogVideoRow>>;
    async fn insert_feedback(&self, feedback: &Feedback) -> Result<()>;
}

/// PostgreSQL-backed store
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl AdminStore for PgStore {
    async fn add_content_type(&self, name: &str) -> Result<ContentType> {
        content_type_repo::add_content_type(&self.pool, name).await
    }

    async fn get_content_type(&self, id: i64) -> Result<ContentType> {
        content_type_repo::get_content_type(&self.pool, id).await
    }

    async fn list_content_types(&self) -> Result<Vec<ContentType>> {
        content_type_repo::list_content_types(&self.pool).await
    }

    async fn update_content_type(&self, id: i64, name: &str) -> Result<ContentType> {
        content_type_repo::update_content_type(&self.pool, id, name).await
    }

    async fn delete_content_type(&self, id: i64) -> Result<()> {
        content_type_repo::delete_content_type(&self.pool, id).await
    }

    async fn add_category(&self, input: &CategoryInput) -> Result<Category> {
        category_repo::add_category(&self.pool, input).await
    }

    async fn get_category(&self, id: i64) -> Result<Category> {
        category_repo::get_category(&self.pool, id).await
    }

    async fn list_categories(&self) -> Result<Vec<Category>> {
        category_repo::list_categories(&self.pool).await
    }

    async fn update_category(&self, id: i64, input: &CategoryInput) -> Result<Category> {
        category_repo::update_category(&self.pool, id, input).await
    }

    async fn delete_category(&self, id: i64) -> Result<()> {
        category_repo::delete_category(&self.pool, id).await
    }

    async fn add_video(&self, input: &VideoInput) -> Result<Video> {
        video_repo::add_video(&self.pool, input).await
    }

    async fn get_video(&self, id: i64) -> Result<Video> {
        video_repo::get_video(&self.pool, id).await
    }

    async fn list_videos(&self) -> Result<Vec<Video>> {
        video_repo::list_videos(&self.pool).await
    }

    async fn update_video(&self, id: i64, input: &VideoInput) -> Result<Video> {
        video_repo::update_video(&self.pool, id, input).await
    }

    async fn delete_video(&self, id: i64) -> Result<()> {
        video_repo::delete_video(&self.pool, id).await
    }

    async fn add_video_categories(&self, video_id: i64, category_ids: &[i64]) -> Result<()> {
        video_repo::add_video_categories(&self.pool, video_id, category_ids).await
    }

    async fn delete_video_categories(&self, video_id: i64) -> Result<u64> {
        video_repo::delete_video_categories(&self.pool, video_id).await
    }

    async fn add_account(&self, input: &AccountInput) -> Result<Account> {
        account_repo::add_account(&self.pool, input).await
    }

    async fn get_account(&self, id: i64) -> Result<Account> {
        account_repo::get_account(&self.pool, id).await
    }

    async fn list_accounts(&self) -> Result<Vec<Account>> {
        account_repo::list_accounts(&self.pool).await
    }

    async fn update_account(&self, id: i64, input: &AccountInput) -> Result<Account> {
        account_repo::update_account(&self.pool, id, input).await
    }

    async fn delete_account(&self, id: i64) -> Result<()> {
        account_repo::delete_account(&self.pool, id).await
    }

    async fn find_admin(&self, username: &str, password_hash: &str) -> Result<Account> {
        account_repo::find_admin(&self.pool, username, password_hash).await
    }
}

#[async_trait]
impl CatalogStore for PgStore {
    async fn account_content_type(&self, username: &str) -> Result<AccountContentType> {
        catalog_repo::account_content_type(&self.pool, username).await
    }

    async fn categories_by_type(&self, content_type_id: i64) -> Result<Vec<CategoryRef>> {
        catalog_repo::categories_by_type(&self.pool, content_type_id).await
    }

    async fn catalog_video(&self, id: i64) -> Result<CatalogVideoRow> {
        catalog_repo::catalog_video(&self.pool, id).await
    }

    async fn videos_by_category_and_type(
        &self,
        content_type_id: i64,
        category_id: i64,
    ) -> Result<Vec<CatalogVideoRow>> {
        catalog_repo::videos_by_category_and_type(&self.pool, content_type_id, category_id).await
    }

    async fn insert_feedback(&self, feedback: &Feedback) -> Result<()> {
        catalog_repo::insert_feedback(&self.pool, feedback).await
    }
}
