//! In-memory storage adapter.
//!
//! Evaluates compiled filters directly over JSON documents. Backs the
//! integration tests and local demos; the production deployment swaps in
//! a document-store adapter behind the same [`Storage`] port.

use std::cmp::Ordering;
use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate};
use regex::RegexBuilder;
use serde_json::Value;

use cinekit_query::filter::{Filter, Leaf, Predicate, Scalar};
use cinekit_query::{PageRequest, SortDir, project};

use crate::domain::ports::{Document, Storage, StorageError};
use crate::entities::Entity;

/// Fixture-friendly storage holding documents per entity.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    collections: HashMap<Entity, Vec<Document>>,
}

impl MemoryStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, entity: Entity, doc: Document) {
        self.collections.entry(entity).or_default().push(doc);
    }

    #[must_use]
    pub fn with_documents(mut self, entity: Entity, docs: Vec<Document>) -> Self {
        self.collections.entry(entity).or_default().extend(docs);
        self
    }
}

#[async_trait]
impl Storage for MemoryStorage {
    async fn query(
        &self,
        entity: Entity,
        filter: &Filter,
        page: &PageRequest,
    ) -> Result<(Vec<Document>, u64), StorageError> {
        let empty = Vec::new();
        let collection = self.collections.get(&entity).unwrap_or(&empty);

        let mut matched: Vec<&Document> =
            collection.iter().filter(|doc| matches(doc, filter)).collect();
        let total = matched.len() as u64;

        matched.sort_by(|a, b| {
            let ord = compare_at(a, b, &page.sort_field);
            match page.sort_dir {
                SortDir::Asc => ord,
                SortDir::Desc => ord.reverse(),
            }
        });

        let docs = matched
            .into_iter()
            .skip(usize::try_from(page.offset()).unwrap_or(usize::MAX))
            .take(usize::try_from(page.limit).unwrap_or(usize::MAX))
            .cloned()
            .collect();

        Ok((docs, total))
    }
}

/// Whether a document satisfies the whole predicate tree.
#[must_use]
pub fn matches(doc: &Document, filter: &Filter) -> bool {
    filter
        .all_of
        .iter()
        .all(|clause| clause.any_of.iter().any(|leaf| leaf_matches(doc, leaf)))
}

fn leaf_matches(doc: &Document, leaf: &Leaf) -> bool {
    let values = project::collect(doc, &leaf.path);
    match &leaf.predicate {
        Predicate::Exists => values.iter().any(|v| !v.is_null()),
        Predicate::Missing => !values.iter().any(|v| !v.is_null()),
        Predicate::Eq(scalar) => values.iter().any(|v| scalar_eq(scalar, v)),
        Predicate::Between { lo, hi } => values.iter().any(|v| in_range(lo, hi, v)),
        Predicate::Matches { pattern } => {
            let Ok(re) = RegexBuilder::new(pattern).case_insensitive(true).build() else {
                return false;
            };
            values
                .iter()
                .any(|v| v.as_str().is_some_and(|s| re.is_match(s)))
        }
    }
}

fn scalar_eq(scalar: &Scalar, value: &Value) -> bool {
    match scalar {
        Scalar::Number(n) => value.as_f64().is_some_and(|x| x == *n),
        Scalar::Str(s) => value.as_str() == Some(s.as_str()),
        Scalar::Date(d) => value_date(value) == Some(*d),
    }
}

fn in_range(lo: &Scalar, hi: &Scalar, value: &Value) -> bool {
    match (lo, hi) {
        (Scalar::Number(lo), Scalar::Number(hi)) => {
            value.as_f64().is_some_and(|x| *lo <= x && x <= *hi)
        }
        // Day-granular comparison keeps both endpoint days inclusive even
        // for datetime-valued documents.
        (Scalar::Date(lo), Scalar::Date(hi)) => {
            value_date(value).is_some_and(|d| *lo <= d && d <= *hi)
        }
        _ => false,
    }
}

fn value_date(value: &Value) -> Option<NaiveDate> {
    let s = value.as_str()?;
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.date_naive());
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()
}

fn compare_at(a: &Document, b: &Document, path: &str) -> Ordering {
    let va = project::collect(a, path).into_iter().next();
    let vb = project::collect(b, path).into_iter().next();
    match (va, vb) {
        (Some(x), Some(y)) => compare_values(x, y),
        // Documents without the sort field go last.
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

fn compare_values(a: &Value, b: &Value) -> Ordering {
    if let (Some(x), Some(y)) = (a.as_f64(), b.as_f64()) {
        return x.partial_cmp(&y).unwrap_or(Ordering::Equal);
    }
    if let (Some(x), Some(y)) = (a.as_str(), b.as_str()) {
        return x.cmp(y);
    }
    Ordering::Equal
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn leaf(path: &str, predicate: Predicate) -> Filter {
        Filter {
            all_of: vec![cinekit_query::filter::Clause {
                any_of: vec![Leaf {
                    path: path.to_owned(),
                    predicate,
                }],
            }],
        }
    }

    #[test]
    fn match_all_accepts_everything() {
        assert!(matches(&json!({"id": 1}), &Filter::match_all()));
        assert!(matches(&json!({}), &Filter::match_all()));
    }

    #[test]
    fn numeric_range_includes_both_endpoints() {
        let filter = leaf(
            "year",
            Predicate::Between {
                lo: Scalar::Number(1995.0),
                hi: Scalar::Number(2000.0),
            },
        );
        assert!(matches(&json!({"year": 1995}), &filter));
        assert!(matches(&json!({"year": 2000}), &filter));
        assert!(!matches(&json!({"year": 1994}), &filter));
        assert!(!matches(&json!({"year": 2001}), &filter));
        assert!(!matches(&json!({}), &filter));
    }

    #[test]
    fn date_range_is_day_inclusive_for_datetimes() {
        let filter = leaf(
            "premiere.world",
            Predicate::Between {
                lo: Scalar::Date(NaiveDate::from_ymd_opt(2020, 1, 1).unwrap()),
                hi: Scalar::Date(NaiveDate::from_ymd_opt(2020, 12, 31).unwrap()),
            },
        );
        let doc = |s: &str| json!({"premiere": {"world": s}});
        assert!(matches(&doc("2020-01-01T00:00:00Z"), &filter));
        assert!(matches(&doc("2020-12-31T23:59:00Z"), &filter));
        assert!(matches(&doc("2020-06-15"), &filter));
        assert!(!matches(&doc("2019-12-31T23:59:00Z"), &filter));
        assert!(!matches(&doc("2021-01-01T00:00:00Z"), &filter));
    }

    #[test]
    fn partial_match_is_case_insensitive() {
        let filter = leaf(
            "name",
            Predicate::Matches {
                pattern: regex::escape("матрица"),
            },
        );
        assert!(matches(&json!({"name": "Матрица"}), &filter));
    }

    #[test]
    fn exists_and_missing_respect_nulls() {
        let exists = leaf("logo", Predicate::Exists);
        let missing = leaf("logo", Predicate::Missing);
        assert!(matches(&json!({"logo": "url"}), &exists));
        assert!(!matches(&json!({"logo": null}), &exists));
        assert!(!matches(&json!({}), &exists));
        assert!(matches(&json!({"logo": null}), &missing));
        assert!(matches(&json!({}), &missing));
        assert!(!matches(&json!({"logo": "url"}), &missing));
    }

    #[test]
    fn array_paths_match_any_element() {
        let filter = leaf(
            "persons.name",
            Predicate::Matches {
                pattern: regex::escape("reeves"),
            },
        );
        let doc = json!({"persons": [{"name": "Carrie-Anne Moss"}, {"name": "Keanu Reeves"}]});
        assert!(matches(&doc, &filter));
    }
}
