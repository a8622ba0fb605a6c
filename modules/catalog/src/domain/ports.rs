//! Collaborator ports of the catalog domain.

use async_trait::async_trait;
use thiserror::Error;

use cinekit_query::{Filter, PageRequest};

use crate::entities::Entity;

/// Catalog documents are schemaless JSON values; the query layer only
/// ever addresses them through spec-validated dot paths.
pub type Document = serde_json::Value;

/// Opaque persistence failure, passed through to the caller unmodified.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("storage error: {0}")]
pub struct StorageError(pub String);

impl StorageError {
    pub fn new(message: impl Into<String>) -> Self {
        StorageError(message.into())
    }
}

/// Persistence collaborator.
///
/// Runs the compiled filter with the given pagination and returns the
/// page of documents plus the total match count. Execution is the only
/// suspension point in the request path; dropping the returned future
/// cancels the request-scoped work.
#[async_trait]
pub trait Storage: Send + Sync {
    async fn query(
        &self,
        entity: Entity,
        filter: &Filter,
        page: &PageRequest,
    ) -> Result<(Vec<Document>, u64), StorageError>;
}
