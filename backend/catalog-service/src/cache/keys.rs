//! Read-view cache keys
//!
//! Every key lives under one invalidation namespace, so a namespace scan
//! evicts all views built from that part of the catalog.

use cache_invalidation::{build_cache_key, Namespace};

/// Content type of an account, by username
pub fn account(username: &str) -> String {
    build_cache_key(Namespace::Accounts, &[username])
}

pub fn categories_by_type(content_type_id: i64) -> String {
    build_cache_key(Namespace::Categories, &["type", &content_type_id.to_string()])
}

pub fn video(id: i64) -> String {
    build_cache_key(Namespace::Videos, &["item", &id.to_string()])
}

pub fn videos_by_category_and_type(content_type_id: i64, category_id: i64) -> String {
    build_cache_key(
        Namespace::Videos,
        &["list", &content_type_id.to_string(), &category_id.to_string()],
    )
}
