//! Generic find service shared by every catalog entity.
//!
//! One handling function parameterized by the entity identifier and the
//! storage collaborator replaces any per-entity controller hierarchy.
//! Per-request state never outlives the request; the registry is the only
//! shared structure and is immutable after construction.

use std::sync::Arc;

use tracing::{debug, instrument};

use cinekit_query::{
    Page, QueryDocEntry, QueryLimits, RawQuery, SpecRegistry, cache, compile, docs, extract,
    project, validate,
};

use crate::domain::error::DomainError;
use crate::domain::ports::{Document, Storage};
use crate::entities::Entity;

pub struct CatalogService<S: Storage> {
    registry: Arc<SpecRegistry>,
    storage: Arc<S>,
    limits: QueryLimits,
}

impl<S: Storage> CatalogService<S> {
    pub fn new(registry: Arc<SpecRegistry>, storage: Arc<S>, limits: QueryLimits) -> Self {
        Self {
            registry,
            storage,
            limits,
        }
    }

    /// List entity documents matching a raw client query.
    ///
    /// Validation and compilation failures short-circuit before storage is
    /// touched; pagination input is normalized, never rejected.
    ///
    /// # Errors
    ///
    /// [`DomainError::Query`] for invalid field keys or values,
    /// [`DomainError::Storage`] when the collaborator fails.
    #[instrument(skip(self, raw), fields(entity = %entity))]
    pub async fn find_many(
        &self,
        entity: Entity,
        raw: &RawQuery,
    ) -> Result<Page<Document>, DomainError> {
        let spec = self.registry.lookup(entity.name())?;
        let validated = validate(spec, raw)?;
        let filter = compile(spec, &validated)?;
        let page_request = extract(spec, raw, &self.limits);

        let cache_key = cache::canonical_key(&filter, &page_request);
        debug!(%cache_key, clauses = filter.all_of.len(), "query compiled");

        let (mut documents, total) = self.storage.query(entity, &filter, &page_request).await?;
        project::apply(spec, &mut documents);

        debug!(total, returned = documents.len(), "query executed");
        Ok(Page::assemble(documents, total, &page_request))
    }

    /// Fetch a single document by its primary or alternate id.
    ///
    /// # Errors
    ///
    /// [`DomainError::NotFound`] when the id matches nothing. An empty
    /// listing is a valid result; a missing single resource is not.
    #[instrument(skip(self), fields(entity = %entity, id = %id))]
    pub async fn find_one(&self, entity: Entity, id: &str) -> Result<Document, DomainError> {
        let spec = self.registry.lookup(entity.name())?;
        let id_key = spec
            .primary_id_key()
            .ok_or_else(|| DomainError::not_found(entity, id))?;

        let raw = RawQuery::from_pairs([(id_key.to_owned(), id.to_owned()), ("limit".to_owned(), "1".to_owned())]);
        let validated = validate(spec, &raw)?;
        let filter = compile(spec, &validated)?;
        let page_request = extract(spec, &raw, &self.limits);

        let (mut documents, _) = self.storage.query(entity, &filter, &page_request).await?;
        project::apply(spec, &mut documents);

        documents
            .into_iter()
            .next()
            .ok_or_else(|| DomainError::not_found(entity, id))
    }

    /// Query parameter documentation for one entity, derived from the same
    /// spec that validates requests.
    ///
    /// # Errors
    ///
    /// [`DomainError::Config`] if the entity has no registered spec.
    pub fn query_docs(&self, entity: Entity) -> Result<Vec<QueryDocEntry>, DomainError> {
        let spec = self.registry.lookup(entity.name())?;
        Ok(docs::describe(spec))
    }

    #[must_use]
    pub fn limits(&self) -> &QueryLimits {
        &self.limits
    }
}
