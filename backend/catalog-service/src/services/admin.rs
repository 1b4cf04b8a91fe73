use crate::db::AdminStore;
use crate::error::CatalogError;
use cache_invalidation::{InvalidationDispatcher, Namespace};
use std::sync::Arc;
use tracing::{error, warn};

/// Orchestrates admin writes: validate, write, invalidate
///
/// Validation failures never reach the store. Store failures are returned as-is
/// and skip invalidation. After a successful write, invalidation of every read
/// namespace is handed to the dispatcher and not awaited.
pub struct AdminService {
    store: Arc<dyn AdminStore>,
    invalidation: Option<Arc<dyn InvalidationDispatcher>>,
}

impl AdminService {
    /// Service without a cache to keep coherent
    pub fn new(store: Arc<dyn AdminStore>) -> Self {
        Self {
            store,
            invalidation: None,
        }
    }

    pub fn with_invalidation(
        store: Arc<dyn AdminStore>,
        invalidation: Arc<dyn InvalidationDispatcher>,
    ) -> Self {
        Self {
            store,
            invalidation: Some(invalidation),
        }
    }

    pub(super) fn store(&self) -> &dyn AdminStore {
        self.store.as_ref()
    }

    /// Every cached view may embed any entity, so all namespaces are evicted
    pub(super) fn invalidate(&self, op: &'static str) {
        if let Some(dispatcher) = &self.invalidation {
            dispatcher.dispatch(op, &Namespace::ALL);
        }
    }
}

/// Log a failed store call and hand the error back unchanged
pub(super) fn log_failure(op: &'static str, entity_id: Option<i64>, err: CatalogError) -> CatalogError {
    match &err {
        CatalogError::Internal { .. } => {
            error!(op = %op, entity_id = ?entity_id, error = %err, "Catalog store operation failed");
        }
        CatalogError::Conflict { .. } => {
            warn!(op = %op, entity_id = ?entity_id, error = %err, "Catalog write conflicted");
        }
        CatalogError::Validation(_) | CatalogError::NotFound { .. } => {}
    }
    err
}
