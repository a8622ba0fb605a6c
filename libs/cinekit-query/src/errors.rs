use thiserror::Error;

use crate::spec::FieldKind;

/// Registry construction and lookup failures.
///
/// These are startup-time errors: a service that references an entity with
/// no registered spec, or registers an ambiguous spec, must fail to boot
/// rather than degrade per request.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("no field spec registered for entity '{0}'")]
    UnknownEntity(String),

    #[error("entity '{0}' registered twice")]
    DuplicateEntity(String),

    /// A field may belong to at most one of the id/regex/date/number sets,
    /// since set membership alone decides the predicate kind.
    #[error("field '{field}' of entity '{entity}' is registered in more than one search set")]
    AmbiguousField { entity: String, field: String },

    #[error("alternate id pattern for '{key}' of entity '{entity}' is not a valid regex")]
    InvalidIdPattern { entity: String, key: String },

    #[error("alternate id pattern refers to '{key}' which is not an id key of entity '{entity}'")]
    UnmatchedIdPattern { entity: String, key: String },
}

/// Per-request query failures. Client-fixable; each variant names the
/// offending field.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum QueryError {
    #[error("unknown query field '{field}' for entity '{entity}'")]
    UnknownField { entity: String, field: String },

    #[error("field '{field}' expects a {expected} value, got '{got}'")]
    TypeMismatch {
        field: String,
        expected: FieldKind,
        got: String,
    },

    #[error("malformed query string: {0}")]
    MalformedQueryString(String),
}

impl QueryError {
    pub(crate) fn type_mismatch(field: &str, expected: FieldKind, got: &str) -> Self {
        QueryError::TypeMismatch {
            field: field.to_owned(),
            expected,
            got: got.to_owned(),
        }
    }
}
