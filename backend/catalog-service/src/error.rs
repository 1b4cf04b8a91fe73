/// Error types for Catalog Service
///
/// Every operation returns one closed `CatalogError`, so callers branch on the
/// kind of failure instead of comparing messages. `status_code` gives the HTTP
/// equivalent for whatever transport sits on top.
use std::fmt;
use thiserror::Error;

/// Result type for catalog-service operations
pub type Result<T> = std::result::Result<T, CatalogError>;

/// Catalog entity an error refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entity {
    ContentType,
    Category,
    Video,
    Account,
    Feedback,
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Entity::ContentType => "content type",
            Entity::Category => "category",
            Entity::Video => "video",
            Entity::Account => "account",
            Entity::Feedback => "feedback",
        };
        f.write_str(name)
    }
}

/// Caller-fixable input problems, checked before any store access
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("name is required")]
    EmptyName,

    #[error("image reference is required")]
    EmptyImageReference,

    #[error("video reference is required")]
    EmptyUrl,

    #[error("at least one association is required")]
    EmptyAssociationSet,

    #[error("{field} must look like name.ext")]
    InvalidFileFormat { field: &'static str },

    #[error("{field} contains forbidden characters")]
    SuspiciousContent { field: &'static str },

    #[error("username is required")]
    EmptyUsername,

    #[error("content type is required")]
    MissingContentType,

    #[error("admin accounts require a password")]
    EmptyPasswordForAdmin,

    #[error("id must be a positive integer")]
    InvalidId,

    #[error("message is required")]
    EmptyMessage,

    #[error("email or telegram contact is required")]
    MissingContact,

    #[error("invalid email format")]
    InvalidEmail,

    #[error("invalid telegram username")]
    InvalidTelegram,
}

/// Catalog error kinds
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Not found: {entity} {key}")]
    NotFound { entity: Entity, key: String },

    #[error("Conflict: {entity} violates {constraint}")]
    Conflict { entity: Entity, constraint: String },

    #[error("Internal error in {op}: {source}")]
    Internal {
        op: &'static str,
        #[source]
        source: anyhow::Error,
    },
}

impl CatalogError {
    pub fn not_found(entity: Entity, key: impl ToString) -> Self {
        CatalogError::NotFound {
            entity,
            key: key.to_string(),
        }
    }

    pub fn internal(op: &'static str, source: impl Into<anyhow::Error>) -> Self {
        CatalogError::Internal {
            op,
            source: source.into(),
        }
    }

    /// Classify a database failure raised while running `op` against `entity`
    pub fn from_store(op: &'static str, entity: Entity, err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            if db_err.is_unique_violation() {
                return CatalogError::Conflict {
                    entity,
                    constraint: db_err.constraint().unwrap_or("unique").to_string(),
                };
            }
        }
        CatalogError::internal(op, err)
    }

    /// HTTP status equivalent
    pub fn status_code(&self) -> u16 {
        match self {
            CatalogError::Validation(_) => 400,
            CatalogError::NotFound { .. } => 404,
            CatalogError::Conflict { .. } => 409,
            CatalogError::Internal { .. } => 500,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, CatalogError::NotFound { .. })
    }
}

/// `map_err` adapter binding the operation name and entity
pub(crate) fn store_err(op: &'static str, entity: Entity) -> impl Fn(sqlx::Error) -> CatalogError {
    move |err| CatalogError::from_store(op, entity, err)
}
