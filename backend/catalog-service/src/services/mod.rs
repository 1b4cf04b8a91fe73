//! Business logic layer
//!
//! `AdminService` runs every admin write as validate, transactional store write,
//! then post-commit cache invalidation. `CatalogService` serves the client-facing
//! reads through the cache.

mod accounts;
mod admin;
mod catalog;
mod categories;
mod content_types;
mod videos;

pub use admin::AdminService;
pub use catalog::CatalogService;
