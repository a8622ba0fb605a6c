//! Raw query decoding and field validation.
//!
//! A [`RawQuery`] is the decoded form of an HTTP query string: an ordered
//! multimap that preserves repeated keys as multiple values. Validation
//! strips the pagination/sort control keys and checks every remaining key
//! against the entity's queryable union, rejecting anything else before
//! the compiler ever sees it.

use crate::errors::QueryError;
use crate::spec::EntityFieldSpec;

/// Pagination and sort keys handled by the extractor, not the compiler.
pub const CONTROL_KEYS: &[&str] = &["page", "limit", "sortField", "sortType"];

/// Decoded request query: ordered key/value pairs, repeated keys kept.
#[derive(Clone, Debug, Default)]
pub struct RawQuery {
    pairs: Vec<(String, String)>,
}

impl RawQuery {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            pairs: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Decode a percent-encoded query string.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::MalformedQueryString`] if the input is not
    /// valid `application/x-www-form-urlencoded` data.
    pub fn decode(query_string: &str) -> Result<Self, QueryError> {
        let pairs: Vec<(String, String)> = serde_urlencoded::from_str(query_string)
            .map_err(|e| QueryError::MalformedQueryString(e.to_string()))?;
        Ok(Self { pairs })
    }

    pub fn append(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.pairs.push((key.into(), value.into()));
    }

    /// First value for a key, if any.
    #[must_use]
    pub fn first(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn pairs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

/// A query whose every field key passed the entity allow-list.
///
/// Values for one key stay grouped in arrival order; the compiler ORs them.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ValidatedQuery {
    fields: Vec<(String, Vec<String>)>,
}

impl ValidatedQuery {
    pub fn fields(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Validate a raw query against the entity spec.
///
/// Control keys are skipped; all other keys must belong to the union of
/// the find-all allow list and the id/regex/date/number search sets.
///
/// # Errors
///
/// Returns [`QueryError::UnknownField`] naming the first offending key.
pub fn validate(spec: &EntityFieldSpec, raw: &RawQuery) -> Result<ValidatedQuery, QueryError> {
    let mut fields: Vec<(String, Vec<String>)> = Vec::new();
    for (key, value) in raw.pairs() {
        if CONTROL_KEYS.contains(&key) {
            continue;
        }
        if spec.kind_of(key).is_none() {
            return Err(QueryError::UnknownField {
                entity: spec.name().to_owned(),
                field: key.to_owned(),
            });
        }
        match fields.iter_mut().find(|(k, _)| k == key) {
            Some((_, values)) => values.push(value.to_owned()),
            None => fields.push((key.to_owned(), vec![value.to_owned()])),
        }
    }
    Ok(ValidatedQuery { fields })
}
