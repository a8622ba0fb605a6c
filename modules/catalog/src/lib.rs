//! Multi-entity catalog service built on the CineKit query layer.
//!
//! Registers the field specs for the movie, person, review, season and
//! image entities and exposes one generic find service parameterized by a
//! storage collaborator. No HTTP routing lives here; the serving layer
//! calls [`domain::service::CatalogService`] and renders the results.

pub mod domain;
pub mod entities;
pub mod infra;

pub use domain::error::DomainError;
pub use domain::ports::{Document, Storage, StorageError};
pub use domain::service::CatalogService;
pub use entities::{Entity, build_registry};
pub use infra::storage::memory::MemoryStorage;
