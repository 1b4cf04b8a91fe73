use crate::cache::{keys, CatalogCache};
use crate::config::MediaConfig;
use crate::db::CatalogStore;
use crate::error::{CatalogError, Result, ValidationError};
use crate::models::{
    AccountContentType, CatalogCategory, CatalogVideo, CatalogVideoRow, CategoryRef, DataSource,
    Feedback,
};
use crate::validation;
use serde::{de::DeserializeOwned, Serialize};
use std::future::Future;
use std::sync::Arc;
use tracing::{debug, error, info};

/// Client-facing reads, served from the view cache when possible
///
/// Misses fall through to the store and repopulate the cache. Cache trouble
/// never fails a read; store errors do.
pub struct CatalogService {
    store: Arc<dyn CatalogStore>,
    cache: Option<CatalogCache>,
    media: MediaConfig,
}

impl CatalogService {
    pub fn new(store: Arc<dyn CatalogStore>, media: MediaConfig) -> Self {
        Self {
            store,
            cache: None,
            media,
        }
    }

    pub fn with_cache(store: Arc<dyn CatalogStore>, cache: CatalogCache, media: MediaConfig) -> Self {
        Self {
            store,
            cache: Some(cache),
            media,
        }
    }

    async fn read_through<T, F, Fut>(&self, key: String, load: F) -> Result<(T, DataSource)>
    where
        T: Serialize + DeserializeOwned + Sync,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        if let Some(cache) = &self.cache {
            if let Some(value) = cache.get::<T>(&key).await {
                return Ok((value, DataSource::Cache));
            }
        }

        let value = load().await.map_err(|e| {
            if let CatalogError::Internal { .. } = &e {
                error!(key = %key, error = %e, "Catalog read failed");
            }
            e
        })?;

        if let Some(cache) = &self.cache {
            cache.put(&key, &value).await;
        }
        debug!(key = %key, "Served from database");
        Ok((value, DataSource::Database))
    }

    fn category_view(&self, category: CategoryRef) -> CatalogCategory {
        CatalogCategory {
            id: category.id,
            name: category.name,
            img_url: self.media.image_url(&category.img_url),
        }
    }

    fn video_view(&self, row: CatalogVideoRow) -> CatalogVideo {
        CatalogVideo {
            id: row.id,
            name: row.name,
            description: row.description,
            url: self.media.video_url(&row.url),
            img_url: self.media.image_url(&row.img_url),
            category: row.category,
        }
    }

    /// Content type assigned to a live account
    pub async fn account_content_type(
        &self,
        username: &str,
    ) -> Result<(AccountContentType, DataSource)> {
        if username.trim().is_empty() {
            return Err(ValidationError::EmptyUsername.into());
        }

        self.read_through(keys::account(username), || {
            self.store.account_content_type(username)
        })
        .await
    }

    /// Live categories linked to a content type, ordered by id
    pub async fn categories_by_type(
        &self,
        content_type_id: i64,
    ) -> Result<(Vec<CatalogCategory>, DataSource)> {
        validation::validate_id(content_type_id)?;

        self.read_through(keys::categories_by_type(content_type_id), || async {
            let categories = self.store.categories_by_type(content_type_id).await?;
            Ok(categories
                .into_iter()
                .map(|c| self.category_view(c))
                .collect())
        })
        .await
    }

    pub async fn video(&self, id: i64) -> Result<(CatalogVideo, DataSource)> {
        validation::validate_id(id)?;

        self.read_through(keys::video(id), || async {
            let row = self.store.catalog_video(id).await?;
            Ok(self.video_view(row))
        })
        .await
    }

    /// Live videos in a category, restricted to categories linked to the content type
    pub async fn videos_by_category_and_type(
        &self,
        content_type_id: i64,
        category_id: i64,
    ) -> Result<(Vec<CatalogVideo>, DataSource)> {
        validation::validate_id(content_type_id)?;
        validation::validate_id(category_id)?;

        self.read_through(
            keys::videos_by_category_and_type(content_type_id, category_id),
            || async {
                let rows = self
                    .store
                    .videos_by_category_and_type(content_type_id, category_id)
                    .await?;
                Ok(rows.into_iter().map(|r| self.video_view(r)).collect())
            },
        )
        .await
    }

    pub async fn submit_feedback(&self, feedback: Feedback) -> Result<()> {
        validation::validate_feedback(&feedback)?;

        self.store.insert_feedback(&feedback).await.map_err(|e| {
            error!(error = %e, "Failed to store feedback");
            e
        })?;

        info!(
            has_email = feedback.email.is_some(),
            has_telegram = feedback.telegram.is_some(),
            "Feedback received"
        );
        Ok(())
    }
}
