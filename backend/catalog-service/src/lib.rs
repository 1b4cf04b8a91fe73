//! Catalog Service
//!
//! Backend core of a video catalog: content types, categories, videos and
//! accounts, edited by administrators and read by clients.
//!
//! Admin writes go through [`services::AdminService`], which validates input,
//! applies the change in one database transaction and then evicts cached read
//! views in the background. Client reads go through
//! [`services::CatalogService`], a read-through layer over the same store.

pub mod app;
pub mod cache;
pub mod config;
pub mod db;
pub mod error;
pub mod logging;
pub mod models;
pub mod security;
pub mod services;
pub mod validation;

pub use config::Config;
pub use db::{AdminStore, CatalogStore, PgStore};
pub use error::{CatalogError, Entity, Result, ValidationError};
pub use services::{AdminService, CatalogService};
