//! Declarative query compilation for the CineKit data service.
//!
//! Raw dot-notation query parameters from untrusted clients are validated
//! against a per-entity field spec, compiled into a typed predicate tree,
//! and paired with normalized pagination. The same spec drives the
//! generated query documentation, so the documented contract can never
//! drift from the enforced one.

pub mod cache;
pub mod docs;
pub mod errors;
pub mod filter;
pub mod page;
pub mod pagination;
pub mod parse;
pub mod problem;
pub mod project;
pub mod spec;

pub use cache::canonical_key;
pub use docs::{QueryDocEntry, describe};
pub use errors::{ConfigError, QueryError};
pub use filter::{Clause, Filter, Leaf, Predicate, Scalar, compile};
pub use page::Page;
pub use pagination::{PageRequest, QueryLimits, extract};
pub use parse::{RawQuery, ValidatedQuery, validate};
pub use problem::{Problem, ValidationViolation};
pub use spec::{EntityFieldSpec, FieldKind, SpecBuilder, SpecRegistry};

/// Sort direction for listing endpoints.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum SortDir {
    #[default]
    #[serde(rename = "asc")]
    Asc,
    #[serde(rename = "desc")]
    Desc,
}

impl SortDir {
    /// Reverse the sort direction (Asc <-> Desc).
    #[must_use]
    pub fn reverse(self) -> Self {
        match self {
            SortDir::Asc => SortDir::Desc,
            SortDir::Desc => SortDir::Asc,
        }
    }

    /// Parse the wire tokens accepted by listing endpoints.
    ///
    /// Besides `asc`/`desc`, the numeric aliases `1`/`-1` from the legacy
    /// wire format are recognized. Anything else falls back to ascending;
    /// sort tokens are normalized, never rejected.
    #[must_use]
    pub fn from_token(token: &str) -> Self {
        match token.trim() {
            "desc" | "-1" => SortDir::Desc,
            _ => SortDir::Asc,
        }
    }
}

impl std::fmt::Display for SortDir {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SortDir::Asc => write!(f, "asc"),
            SortDir::Desc => write!(f, "desc"),
        }
    }
}
