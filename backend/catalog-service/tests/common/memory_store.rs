//! In-memory catalog store
//!
//! Mirrors the PostgreSQL store: soft deletes, live-only uniqueness, association
//! cleanup on delete, and every write applied whole or not at all. A single
//! mutex stands in for transactions.

use anyhow::anyhow;
use async_trait::async_trait;
use catalog_service::error::{CatalogError, Entity, Result, ValidationError};
use catalog_service::models::{
    Account, AccountContentType, AccountInput, AccountRow, CatalogVideoRow, Category,
    CategoryInput, CategoryRef, CategoryRow, ContentType, ContentTypeRef, Feedback, Video,
    VideoInput, VideoRow,
};
use catalog_service::{AdminStore, CatalogStore};
use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

#[derive(Clone)]
struct ContentTypeRecord {
    name: String,
    deleted: bool,
    created_at: DateTime<Utc>,
}

#[derive(Clone)]
struct CategoryRecord {
    name: String,
    img_url: String,
    deleted: bool,
    created_at: DateTime<Utc>,
}

#[derive(Clone)]
struct VideoRecord {
    url: String,
    name: String,
    description: String,
    img_url: String,
    deleted: bool,
    created_at: DateTime<Utc>,
}

#[derive(Clone)]
struct AccountRecord {
    username: String,
    content_type_id: Option<i64>,
    password: String,
    admin: bool,
    deleted: bool,
    created_at: DateTime<Utc>,
}

#[derive(Default)]
struct State {
    next_id: i64,
    content_types: BTreeMap<i64, ContentTypeRecord>,
    categories: BTreeMap<i64, CategoryRecord>,
    videos: BTreeMap<i64, VideoRecord>,
    accounts: BTreeMap<i64, AccountRecord>,
    /// (category_id, content_type_id)
    category_types: BTreeSet<(i64, i64)>,
    /// (video_id, category_id)
    video_categories: BTreeSet<(i64, i64)>,
    feedback: Vec<Feedback>,
}

impl State {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn live_content_type(&self, id: i64) -> Option<&ContentTypeRecord> {
        self.content_types.get(&id).filter(|r| !r.deleted)
    }

    fn live_category(&self, id: i64) -> Option<&CategoryRecord> {
        self.categories.get(&id).filter(|r| !r.deleted)
    }

    fn live_video(&self, id: i64) -> Option<&VideoRecord> {
        self.videos.get(&id).filter(|r| !r.deleted)
    }

    fn live_account(&self, id: i64) -> Option<&AccountRecord> {
        self.accounts.get(&id).filter(|r| !r.deleted)
    }

    fn require_content_types(&self, ids: &[i64]) -> Result<()> {
        match ids.iter().find(|id| self.live_content_type(**id).is_none()) {
            Some(id) => Err(CatalogError::not_found(Entity::ContentType, id)),
            None => Ok(()),
        }
    }

    fn require_categories(&self, ids: &[i64]) -> Result<()> {
        match ids.iter().find(|id| self.live_category(**id).is_none()) {
            Some(id) => Err(CatalogError::not_found(Entity::Category, id)),
            None => Ok(()),
        }
    }

    fn content_type_name_taken(&self, name: &str, except: Option<i64>) -> bool {
        self.content_types
            .iter()
            .any(|(id, r)| !r.deleted && r.name == name && Some(*id) != except)
    }

    fn category_name_taken(&self, name: &str, except: Option<i64>) -> bool {
        self.categories
            .iter()
            .any(|(id, r)| !r.deleted && r.name == name && Some(*id) != except)
    }

    fn username_taken(&self, username: &str, except: Option<i64>) -> bool {
        self.accounts
            .iter()
            .any(|(id, r)| !r.deleted && r.username == username && Some(*id) != except)
    }

    fn content_type_view(&self, id: i64) -> Option<ContentType> {
        self.live_content_type(id).map(|r| {
            ContentType::from(catalog_service::models::ContentTypeRow {
                id,
                name: r.name.clone(),
                created_at: r.created_at,
            })
        })
    }

    fn category_view(&self, id: i64) -> Option<Category> {
        let record = self.live_category(id)?;
        let content_types = self
            .category_types
            .iter()
            .filter(|(category_id, _)| *category_id == id)
            .filter_map(|(_, type_id)| {
                self.live_content_type(*type_id).map(|t| ContentTypeRef {
                    id: *type_id,
                    name: t.name.clone(),
                })
            })
            .collect();
        let row = CategoryRow {
            id,
            name: record.name.clone(),
            img_url: record.img_url.clone(),
            created_at: record.created_at,
        };
        Some(Category::from_row(row, content_types))
    }

    fn category_refs_of_video(&self, video_id: i64) -> Vec<CategoryRef> {
        self.video_categories
            .iter()
            .filter(|(v, _)| *v == video_id)
            .filter_map(|(_, category_id)| {
                self.live_category(*category_id).map(|c| CategoryRef {
                    id: *category_id,
                    name: c.name.clone(),
                    img_url: c.img_url.clone(),
                })
            })
            .collect()
    }

    fn video_view(&self, id: i64) -> Option<Video> {
        let record = self.live_video(id)?;
        let row = VideoRow {
            id,
            url: record.url.clone(),
            name: record.name.clone(),
            description: record.description.clone(),
            img_url: record.img_url.clone(),
            created_at: record.created_at,
        };
        Some(Video::from_row(row, self.category_refs_of_video(id)))
    }

    fn account_view(&self, id: i64) -> Option<Account> {
        let record = self.live_account(id)?;
        let content_type_name = record
            .content_type_id
            .and_then(|type_id| self.live_content_type(type_id))
            .map(|t| t.name.clone());
        Some(Account::from(AccountRow {
            id,
            username: record.username.clone(),
            content_type_id: record.content_type_id,
            content_type_name,
            is_admin: record.admin,
            created_at: record.created_at,
        }))
    }

    fn catalog_video_row(&self, id: i64, category: Option<String>) -> Option<CatalogVideoRow> {
        self.live_video(id).map(|v| CatalogVideoRow {
            id,
            name: v.name.clone(),
            description: v.description.clone(),
            url: v.url.clone(),
            img_url: v.img_url.clone(),
            category,
        })
    }
}

fn conflict(entity: Entity, constraint: &str) -> CatalogError {
    CatalogError::Conflict {
        entity,
        constraint: constraint.to_string(),
    }
}

/// Store double with call counting and failure injection
#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<State>,
    calls: AtomicUsize,
    fail_writes: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of store operations invoked so far
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Make every following operation fail with an internal error
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub fn live_accounts_named(&self, username: &str) -> usize {
        let state = self.state.lock().unwrap();
        state
            .accounts
            .values()
            .filter(|a| !a.deleted && a.username == username)
            .count()
    }

    pub fn stored_password(&self, id: i64) -> Option<String> {
        let state = self.state.lock().unwrap();
        state.accounts.get(&id).map(|a| a.password.clone())
    }

    pub fn video_links(&self, video_id: i64) -> Vec<i64> {
        let state = self.state.lock().unwrap();
        state
            .video_categories
            .iter()
            .filter(|(v, _)| *v == video_id)
            .map(|(_, c)| *c)
            .collect()
    }

    pub fn category_links(&self, category_id: i64) -> Vec<i64> {
        let state = self.state.lock().unwrap();
        state
            .category_types
            .iter()
            .filter(|(c, _)| *c == category_id)
            .map(|(_, t)| *t)
            .collect()
    }

    pub fn feedback_count(&self) -> usize {
        self.state.lock().unwrap().feedback.len()
    }

    fn enter(&self, op: &'static str) -> Result<std::sync::MutexGuard<'_, State>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(CatalogError::internal(op, anyhow!("connection reset by peer")));
        }
        Ok(self.state.lock().unwrap())
    }
}

#[async_trait]
impl AdminStore for MemoryStore {
    async fn add_content_type(&self, name: &str) -> Result<ContentType> {
        let mut state = self.enter("add_content_type")?;
        if state.content_type_name_taken(name, None) {
            return Err(conflict(Entity::ContentType, "uq_content_types_name_live"));
        }
        let id = state.next_id();
        state.content_types.insert(
            id,
            ContentTypeRecord {
                name: name.to_string(),
                deleted: false,
                created_at: Utc::now(),
            },
        );
        Ok(state.content_type_view(id).unwrap())
    }

    async fn get_content_type(&self, id: i64) -> Result<ContentType> {
        let state = self.enter("get_content_type")?;
        state
            .content_type_view(id)
            .ok_or_else(|| CatalogError::not_found(Entity::ContentType, id))
    }

    async fn list_content_types(&self) -> Result<Vec<ContentType>> {
        let state = self.enter("list_content_types")?;
        Ok(state
            .content_types
            .keys()
            .filter_map(|id| state.content_type_view(*id))
            .collect())
    }

    async fn update_content_type(&self, id: i64, name: &str) -> Result<ContentType> {
        let mut state = self.enter("update_content_type")?;
        if state.live_content_type(id).is_none() {
            return Err(CatalogError::not_found(Entity::ContentType, id));
        }
        if state.content_type_name_taken(name, Some(id)) {
            return Err(conflict(Entity::ContentType, "uq_content_types_name_live"));
        }
        if let Some(record) = state.content_types.get_mut(&id) {
            record.name = name.to_string();
        }
        Ok(state.content_type_view(id).unwrap())
    }

    async fn delete_content_type(&self, id: i64) -> Result<()> {
        let mut state = self.enter("delete_content_type")?;
        if state.live_content_type(id).is_none() {
            return Err(CatalogError::not_found(Entity::ContentType, id));
        }
        state.category_types.retain(|(_, t)| *t != id);
        if let Some(record) = state.content_types.get_mut(&id) {
            record.deleted = true;
        }
        Ok(())
    }

    async fn add_category(&self, input: &CategoryInput) -> Result<Category> {
        let mut state = self.enter("add_category")?;
        state.require_content_types(&input.content_type_ids)?;
        if state.category_name_taken(&input.name, None) {
            return Err(conflict(Entity::Category, "uq_categories_name_live"));
        }
        let id = state.next_id();
        state.categories.insert(
            id,
            CategoryRecord {
                name: input.name.clone(),
                img_url: input.img_url.clone(),
                deleted: false,
                created_at: Utc::now(),
            },
        );
        for type_id in &input.content_type_ids {
            state.category_types.insert((id, *type_id));
        }
        Ok(state.category_view(id).unwrap())
    }

    async fn get_category(&self, id: i64) -> Result<Category> {
        let state = self.enter("get_category")?;
        state
            .category_view(id)
            .ok_or_else(|| CatalogError::not_found(Entity::Category, id))
    }

    async fn list_categories(&self) -> Result<Vec<Category>> {
        let state = self.enter("list_categories")?;
        Ok(state
            .categories
            .keys()
            .filter_map(|id| state.category_view(*id))
            .collect())
    }

    async fn update_category(&self, id: i64, input: &CategoryInput) -> Result<Category> {
        let mut state = self.enter("update_category")?;
        if state.live_category(id).is_none() {
            return Err(CatalogError::not_found(Entity::Category, id));
        }
        state.require_content_types(&input.content_type_ids)?;
        if state.category_name_taken(&input.name, Some(id)) {
            return Err(conflict(Entity::Category, "uq_categories_name_live"));
        }
        if let Some(record) = state.categories.get_mut(&id) {
            record.name = input.name.clone();
            record.img_url = input.img_url.clone();
        }
        state.category_types.retain(|(c, _)| *c != id);
        for type_id in &input.content_type_ids {
            state.category_types.insert((id, *type_id));
        }
        Ok(state.category_view(id).unwrap())
    }

    async fn delete_category(&self, id: i64) -> Result<()> {
        let mut state = self.enter("delete_category")?;
        if state.live_category(id).is_none() {
            return Err(CatalogError::not_found(Entity::Category, id));
        }
        state.category_types.retain(|(c, _)| *c != id);
        state.video_categories.retain(|(_, c)| *c != id);
        if let Some(record) = state.categories.get_mut(&id) {
            record.deleted = true;
        }
        Ok(())
    }

    async fn add_video(&self, input: &VideoInput) -> Result<Video> {
        let mut state = self.enter("add_video")?;
        state.require_categories(&input.category_ids)?;
        let id = state.next_id();
        state.videos.insert(
            id,
            VideoRecord {
                url: input.url.clone(),
                name: input.name.clone(),
                description: input.description.clone(),
                img_url: input.img_url.clone(),
                deleted: false,
                created_at: Utc::now(),
            },
        );
        for category_id in &input.category_ids {
            state.video_categories.insert((id, *category_id));
        }
        Ok(state.video_view(id).unwrap())
    }

    async fn get_video(&self, id: i64) -> Result<Video> {
        let state = self.enter("get_video")?;
        state
            .video_view(id)
            .ok_or_else(|| CatalogError::not_found(Entity::Video, id))
    }

    async fn list_videos(&self) -> Result<Vec<Video>> {
        let state = self.enter("list_videos")?;
        Ok(state
            .videos
            .keys()
            .filter_map(|id| state.video_view(*id))
            .collect())
    }

    async fn update_video(&self, id: i64, input: &VideoInput) -> Result<Video> {
        let mut state = self.enter("update_video")?;
        if state.live_video(id).is_none() {
            return Err(CatalogError::not_found(Entity::Video, id));
        }
        state.require_categories(&input.category_ids)?;
        if let Some(record) = state.videos.get_mut(&id) {
            record.url = input.url.clone();
            record.name = input.name.clone();
            record.description = input.description.clone();
            record.img_url = input.img_url.clone();
        }
        state.video_categories.retain(|(v, _)| *v != id);
        for category_id in &input.category_ids {
            state.video_categories.insert((id, *category_id));
        }
        Ok(state.video_view(id).unwrap())
    }

    async fn delete_video(&self, id: i64) -> Result<()> {
        let mut state = self.enter("delete_video")?;
        if state.live_video(id).is_none() {
            return Err(CatalogError::not_found(Entity::Video, id));
        }
        state.video_categories.retain(|(v, _)| *v != id);
        if let Some(record) = state.videos.get_mut(&id) {
            record.deleted = true;
        }
        Ok(())
    }

    async fn add_video_categories(&self, video_id: i64, category_ids: &[i64]) -> Result<()> {
        let mut state = self.enter("add_video_categories")?;
        if state.live_video(video_id).is_none() {
            return Err(CatalogError::not_found(Entity::Video, video_id));
        }
        state.require_categories(category_ids)?;
        for category_id in category_ids {
            state.video_categories.insert((video_id, *category_id));
        }
        Ok(())
    }

    async fn delete_video_categories(&self, video_id: i64) -> Result<u64> {
        let mut state = self.enter("delete_video_categories")?;
        if state.live_video(video_id).is_none() {
            return Err(CatalogError::not_found(Entity::Video, video_id));
        }
        let before = state.video_categories.len();
        state.video_categories.retain(|(v, _)| *v != video_id);
        Ok((before - state.video_categories.len()) as u64)
    }

    async fn add_account(&self, input: &AccountInput) -> Result<Account> {
        let mut state = self.enter("add_account")?;
        state.require_content_types(&[input.content_type_id])?;
        if state.username_taken(&input.username, None) {
            return Err(conflict(Entity::Account, "uq_accounts_username_live"));
        }
        let id = state.next_id();
        state.accounts.insert(
            id,
            AccountRecord {
                username: input.username.clone(),
                content_type_id: Some(input.content_type_id),
                password: input.password.clone(),
                admin: input.is_admin,
                deleted: false,
                created_at: Utc::now(),
            },
        );
        Ok(state.account_view(id).unwrap())
    }

    async fn get_account(&self, id: i64) -> Result<Account> {
        let state = self.enter("get_account")?;
        state
            .account_view(id)
            .ok_or_else(|| CatalogError::not_found(Entity::Account, id))
    }

    async fn list_accounts(&self) -> Result<Vec<Account>> {
        let state = self.enter("list_accounts")?;
        Ok(state
            .accounts
            .keys()
            .filter_map(|id| state.account_view(*id))
            .collect())
    }

    async fn update_account(&self, id: i64, input: &AccountInput) -> Result<Account> {
        let mut state = self.enter("update_account")?;
        state.require_content_types(&[input.content_type_id])?;
        let current = state
            .live_account(id)
            .cloned()
            .ok_or_else(|| CatalogError::not_found(Entity::Account, id))?;
        if state.username_taken(&input.username, Some(id)) {
            return Err(conflict(Entity::Account, "uq_accounts_username_live"));
        }

        let password = if input.password.is_empty() {
            current.password
        } else {
            input.password.clone()
        };
        if input.is_admin && password.is_empty() {
            return Err(ValidationError::EmptyPasswordForAdmin.into());
        }

        state.accounts.insert(
            id,
            AccountRecord {
                username: input.username.clone(),
                content_type_id: Some(input.content_type_id),
                password,
                admin: input.is_admin,
                ..current
            },
        );
        Ok(state.account_view(id).unwrap())
    }

    async fn delete_account(&self, id: i64) -> Result<()> {
        let mut state = self.enter("delete_account")?;
        match state.accounts.get_mut(&id) {
            Some(record) if !record.deleted => {
                record.deleted = true;
                Ok(())
            }
            _ => Err(CatalogError::not_found(Entity::Account, id)),
        }
    }

    async fn find_admin(&self, username: &str, password_hash: &str) -> Result<Account> {
        let state = self.enter("find_admin")?;
        let id = state
            .accounts
            .iter()
            .find(|(_, a)| {
                !a.deleted && a.admin && a.username == username && a.password == password_hash
            })
            .map(|(id, _)| *id)
            .ok_or_else(|| CatalogError::not_found(Entity::Account, username))?;
        Ok(state.account_view(id).unwrap())
    }
}

#[async_trait]
impl CatalogStore for MemoryStore {
    async fn account_content_type(&self, username: &str) -> Result<AccountContentType> {
        let state = self.enter("account_content_type")?;
        state
            .accounts
            .values()
            .filter(|a| !a.deleted && a.username == username)
            .find_map(|a| {
                let type_id = a.content_type_id?;
                state.live_content_type(type_id).map(|t| AccountContentType {
                    username: a.username.clone(),
                    content_type: ContentTypeRef {
                        id: type_id,
                        name: t.name.clone(),
                    },
                })
            })
            .ok_or_else(|| CatalogError::not_found(Entity::Account, username))
    }

    async fn categories_by_type(&self, content_type_id: i64) -> Result<Vec<CategoryRef>> {
        let state = self.enter("categories_by_type")?;
        state.require_content_types(&[content_type_id])?;
        Ok(state
            .category_types
            .iter()
            .filter(|(_, t)| *t == content_type_id)
            .filter_map(|(category_id, _)| {
                state.live_category(*category_id).map(|c| CategoryRef {
                    id: *category_id,
                    name: c.name.clone(),
                    img_url: c.img_url.clone(),
                })
            })
            .collect())
    }

    async fn catalog_video(&self, id: i64) -> Result<CatalogVideoRow> {
        let state = self.enter("catalog_video")?;
        let category = state
            .category_refs_of_video(id)
            .into_iter()
            .next()
            .map(|c| c.name);
        state
            .catalog_video_row(id, category)
            .ok_or_else(|| CatalogError::not_found(Entity::Video, id))
    }

    async fn videos_by_category_and_type(
        &self,
        content_type_id: i64,
        category_id: i64,
    ) -> Result<Vec<CatalogVideoRow>> {
        let state = self.enter("videos_by_category_and_type")?;
        state.require_content_types(&[content_type_id])?;
        state.require_categories(&[category_id])?;

        if !state.category_types.contains(&(category_id, content_type_id)) {
            return Ok(Vec::new());
        }
        let category = state.live_category(category_id).map(|c| c.name.clone());
        let mut rows: Vec<CatalogVideoRow> = state
            .video_categories
            .iter()
            .filter(|(_, c)| *c == category_id)
            .filter_map(|(video_id, _)| state.catalog_video_row(*video_id, category.clone()))
            .collect();
        rows.sort_by_key(|r| r.id);
        Ok(rows)
    }

    async fn insert_feedback(&self, feedback: &Feedback) -> Result<()> {
        let mut state = self.enter("insert_feedback")?;
        state.feedback.push(feedback.clone());
        Ok(())
    }
}
