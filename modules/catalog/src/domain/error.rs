use http::StatusCode;
use thiserror::Error;

use cinekit_query::{ConfigError, Problem, QueryError};

use crate::entities::Entity;
use crate::domain::ports::StorageError;

/// Catalog domain failures.
///
/// Query and config errors keep their own types so the serving layer can
/// distinguish client-fixable 4xx problems from startup faults. Storage
/// failures pass through unmodified; this layer never retries.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error(transparent)]
    Query(#[from] QueryError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("no {entity} found for id '{id}'")]
    NotFound { entity: Entity, id: String },

    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl DomainError {
    pub fn not_found(entity: Entity, id: impl Into<String>) -> Self {
        DomainError::NotFound {
            entity,
            id: id.into(),
        }
    }
}

impl From<DomainError> for Problem {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::Query(e) => e.into(),
            DomainError::Config(e) => e.into(),
            DomainError::NotFound { .. } => {
                Problem::new(StatusCode::NOT_FOUND, "Not Found", err.to_string())
                    .with_code("catalog.not_found")
            }
            DomainError::Storage(_) => Problem::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Storage Failure",
                err.to_string(),
            )
            .with_code("catalog.storage"),
        }
    }
}
