//! Shared test doubles for catalog-service integration tests

#![allow(dead_code)]

pub mod memory_cache;
pub mod memory_store;
pub mod recording_dispatcher;

use catalog_service::config::MediaConfig;
use catalog_service::models::{AccountInput, CategoryInput, VideoInput};

pub fn media() -> MediaConfig {
    MediaConfig {
        base_url: "https://cdn.example.com".to_string(),
    }
}

pub fn category_input(name: &str, content_type_ids: &[i64]) -> CategoryInput {
    CategoryInput {
        name: name.to_string(),
        img_url: format!("{}.jpg", name.to_lowercase().replace(' ', "_")),
        content_type_ids: content_type_ids.to_vec(),
    }
}

pub fn video_input(name: &str, category_ids: &[i64]) -> VideoInput {
    let file = name.to_lowercase().replace(' ', "_");
    VideoInput {
        url: format!("{}.mp4", file),
        name: name.to_string(),
        description: format!("{} session", name),
        img_url: format!("{}.jpg", file),
        category_ids: category_ids.to_vec(),
    }
}

pub fn account_input(username: &str, content_type_id: i64) -> AccountInput {
    AccountInput {
        username: username.to_string(),
        content_type_id,
        password: String::new(),
        is_admin: false,
    }
}
