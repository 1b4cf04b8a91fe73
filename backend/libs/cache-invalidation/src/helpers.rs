//! Helper functions for cache key management

use crate::{InvalidationError, Namespace, Result, CACHE_VERSION};

/// Build a versioned cache key under a namespace
///
/// # Example
///
/// ```
/// use cache_invalidation::{build_cache_key, Namespace};
///
/// let key = build_cache_key(Namespace::Videos, &["item", "42"]);
/// assert_eq!(key, "v1:videos:item:42");
///
/// let key = build_cache_key(Namespace::Accounts, &["alice"]);
/// assert_eq!(key, "v1:accounts:alice");
/// ```
pub fn build_cache_key(namespace: Namespace, parts: &[&str]) -> String {
    let mut key = namespace.prefix();
    for part in parts {
        key.push(':');
        key.push_str(part);
    }
    key
}

/// Resolve the namespace a cache key belongs to
///
/// # Example
///
/// ```
/// use cache_invalidation::{parse_namespace, Namespace};
///
/// let namespace = parse_namespace("v1:categories:type:3").unwrap();
/// assert_eq!(namespace, Namespace::Categories);
///
/// assert!(parse_namespace("v2:categories:type:3").is_err());
/// ```
pub fn parse_namespace(key: &str) -> Result<Namespace> {
    let mut parts = key.splitn(3, ':');

    match (parts.next(), parts.next()) {
        (Some(version), Some(namespace)) if version == CACHE_VERSION => namespace.parse(),
        _ => Err(InvalidationError::InvalidKey(format!(
            "{}. Expected format: {}:<namespace>:<id>",
            key, CACHE_VERSION
        ))),
    }
}

/// Check whether a key falls under a namespace's scan pattern
pub fn key_in_namespace(key: &str, namespace: Namespace) -> bool {
    key.strip_prefix(&namespace.prefix())
        .map(|rest| rest.starts_with(':'))
        .unwrap_or(false)
}
