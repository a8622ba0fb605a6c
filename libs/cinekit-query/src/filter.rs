//! Compilation of validated query values into typed filter predicates.
//!
//! Each field's predicate kind comes from its spec membership alone; the
//! raw value is only ever parsed into the shape that kind requires, never
//! sniffed. Values repeated under one key combine with OR, clauses for
//! distinct keys combine with AND.

use chrono::NaiveDate;

use crate::errors::QueryError;
use crate::spec::{EntityFieldSpec, FieldKind};

/// Wire format for date-searchable fields.
pub const DATE_FORMAT: &str = "%d.%m.%Y";

/// Reserved literal matching documents where the field is present.
pub const EXISTS_LITERAL: &str = "!null";
/// Reserved literal matching documents where the field is absent.
pub const MISSING_LITERAL: &str = "null";

/// A typed comparison operand.
#[derive(Clone, Debug, PartialEq)]
pub enum Scalar {
    Number(f64),
    Str(String),
    Date(NaiveDate),
}

impl std::fmt::Display for Scalar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Scalar::Number(n) => write!(f, "{n}"),
            Scalar::Str(s) => write!(f, "{s:?}"),
            Scalar::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
        }
    }
}

/// Single-field predicate.
#[derive(Clone, Debug, PartialEq)]
pub enum Predicate {
    /// Exact equality.
    Eq(Scalar),
    /// Inclusive range; both endpoints are part of the match set.
    Between { lo: Scalar, hi: Scalar },
    /// Case-insensitive partial match. The pattern is already escaped, so
    /// user input can never act as pattern syntax.
    Matches { pattern: String },
    /// Field is present and non-null.
    Exists,
    /// Field is absent or null.
    Missing,
}

/// A predicate bound to the document path it applies to.
///
/// The path usually equals the queried key; for id fields it may be
/// retargeted to an alternate external id key.
#[derive(Clone, Debug, PartialEq)]
pub struct Leaf {
    pub path: String,
    pub predicate: Predicate,
}

/// OR-combination of the leaves produced by one queried key.
#[derive(Clone, Debug, PartialEq)]
pub struct Clause {
    pub any_of: Vec<Leaf>,
}

/// AND-combination of clauses; empty means match-all.
#[derive(Clone, Debug, Default, PartialEq)]
#[must_use]
pub struct Filter {
    pub all_of: Vec<Clause>,
}

impl Filter {
    /// The identity filter: matches every document of the entity.
    pub fn match_all() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn is_match_all(&self) -> bool {
        self.all_of.is_empty()
    }
}

/// Compile a validated query into a [`Filter`].
///
/// # Errors
///
/// Returns [`QueryError::TypeMismatch`] when a value does not parse as the
/// shape its field kind requires, naming the field and the expected shape.
pub fn compile(
    spec: &EntityFieldSpec,
    validated: &crate::parse::ValidatedQuery,
) -> Result<Filter, QueryError> {
    let mut all_of = Vec::new();
    for (path, values) in validated.fields() {
        // Membership was checked during validation.
        let kind = spec.kind_of(path).unwrap_or(FieldKind::String);
        let mut any_of = Vec::with_capacity(values.len());
        for value in values {
            any_of.push(compile_value(spec, path, kind, value)?);
        }
        all_of.push(Clause { any_of });
    }
    Ok(Filter { all_of })
}

fn compile_value(
    spec: &EntityFieldSpec,
    path: &str,
    kind: FieldKind,
    value: &str,
) -> Result<Leaf, QueryError> {
    // The null literals override the registered kind for every field.
    match value {
        EXISTS_LITERAL => {
            return Ok(Leaf {
                path: path.to_owned(),
                predicate: Predicate::Exists,
            });
        }
        MISSING_LITERAL => {
            return Ok(Leaf {
                path: path.to_owned(),
                predicate: Predicate::Missing,
            });
        }
        _ => {}
    }

    let predicate = match kind {
        FieldKind::Id => return compile_id(spec, path, value),
        FieldKind::Number => compile_number(path, value)?,
        FieldKind::Date => compile_date(path, value)?,
        FieldKind::Regex => Predicate::Matches {
            pattern: regex::escape(value),
        },
        FieldKind::String => Predicate::Eq(Scalar::Str(value.to_owned())),
    };
    Ok(Leaf {
        path: path.to_owned(),
        predicate,
    })
}

fn compile_id(spec: &EntityFieldSpec, path: &str, value: &str) -> Result<Leaf, QueryError> {
    // Values shaped like a recognized external id target the alternate key.
    if let Some(alt) = spec.alt_id_patterns().iter().find(|m| m.matches(value)) {
        return Ok(Leaf {
            path: alt.key.clone(),
            predicate: Predicate::Eq(Scalar::Str(value.to_owned())),
        });
    }
    // An id is always exact equality, even when the value contains a dash.
    match parse_number(value) {
        Some(n) => Ok(Leaf {
            path: path.to_owned(),
            predicate: Predicate::Eq(Scalar::Number(n)),
        }),
        None => Err(QueryError::type_mismatch(path, FieldKind::Id, value)),
    }
}

fn compile_number(path: &str, value: &str) -> Result<Predicate, QueryError> {
    if let Some((a, b)) = split_range(value) {
        if let (Some(lo), Some(hi)) = (parse_number(a), parse_number(b)) {
            return Ok(Predicate::Between {
                lo: Scalar::Number(lo),
                hi: Scalar::Number(hi),
            });
        }
    }
    match parse_number(value) {
        Some(n) => Ok(Predicate::Eq(Scalar::Number(n))),
        None => Err(QueryError::type_mismatch(path, FieldKind::Number, value)),
    }
}

fn compile_date(path: &str, value: &str) -> Result<Predicate, QueryError> {
    let parse = |s: &str| NaiveDate::parse_from_str(s, DATE_FORMAT).ok();
    if let Some((a, b)) = split_range(value) {
        if let (Some(lo), Some(hi)) = (parse(a), parse(b)) {
            return Ok(Predicate::Between {
                lo: Scalar::Date(lo),
                hi: Scalar::Date(hi),
            });
        }
    }
    // A single day is the inclusive range covering that day.
    match parse(value) {
        Some(day) => Ok(Predicate::Between {
            lo: Scalar::Date(day),
            hi: Scalar::Date(day),
        }),
        None => Err(QueryError::type_mismatch(path, FieldKind::Date, value)),
    }
}

/// Split `a-b` into endpoints. A leading dash is a sign, not a separator,
/// so negative single values fall through to the single-value path.
fn split_range(value: &str) -> Option<(&str, &str)> {
    let (a, b) = value.split_once('-')?;
    if a.is_empty() || b.is_empty() {
        return None;
    }
    Some((a, b))
}

fn parse_number(value: &str) -> Option<f64> {
    let n: f64 = value.trim().parse().ok()?;
    n.is_finite().then_some(n)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::{RawQuery, validate};
    use crate::spec::EntityFieldSpec;

    fn spec() -> EntityFieldSpec {
        EntityFieldSpec::builder("movie")
            .allow_fields_find_all(&["id", "name", "type", "year", "rating"])
            .id_keys(&["id", "externalId.imdb"])
            .alt_id_pattern("externalId.imdb", r"^tt\d+$")
            .regex_search_keys(&["name", "description"])
            .date_search_keys(&["premiere.world"])
            .number_search_keys(&["year", "rating.kp"])
            .build()
            .unwrap()
    }

    fn compile_one(key: &str, value: &str) -> Result<Filter, QueryError> {
        let raw = RawQuery::from_pairs([(key, value)]);
        let validated = validate(&spec(), &raw)?;
        compile(&spec(), &validated)
    }

    fn single_leaf(filter: &Filter) -> &Leaf {
        assert_eq!(filter.all_of.len(), 1);
        assert_eq!(filter.all_of[0].any_of.len(), 1);
        &filter.all_of[0].any_of[0]
    }

    #[test]
    fn empty_query_compiles_to_match_all() {
        let validated = validate(&spec(), &RawQuery::new()).unwrap();
        let filter = compile(&spec(), &validated).unwrap();
        assert!(filter.is_match_all());
        assert_eq!(filter, Filter::match_all());
    }

    #[test]
    fn number_range_is_inclusive_between() {
        let filter = compile_one("year", "1995-2000").unwrap();
        assert_eq!(
            single_leaf(&filter).predicate,
            Predicate::Between {
                lo: Scalar::Number(1995.0),
                hi: Scalar::Number(2000.0),
            }
        );
    }

    #[test]
    fn fractional_range_endpoints_parse() {
        let filter = compile_one("rating.kp", "7.5-10").unwrap();
        assert_eq!(
            single_leaf(&filter).predicate,
            Predicate::Between {
                lo: Scalar::Number(7.5),
                hi: Scalar::Number(10.0),
            }
        );
    }

    #[test]
    fn single_number_is_equality() {
        let filter = compile_one("year", "2020").unwrap();
        assert_eq!(
            single_leaf(&filter).predicate,
            Predicate::Eq(Scalar::Number(2020.0))
        );
    }

    #[test]
    fn non_numeric_value_on_number_field_is_a_type_mismatch() {
        let err = compile_one("year", "nineteen").unwrap_err();
        assert!(matches!(
            err,
            QueryError::TypeMismatch { ref field, expected: FieldKind::Number, .. }
                if field == "year"
        ));
    }

    #[test]
    fn numeric_id_is_exact_match_never_a_range() {
        let filter = compile_one("id", "666").unwrap();
        let leaf = single_leaf(&filter);
        assert_eq!(leaf.path, "id");
        assert_eq!(leaf.predicate, Predicate::Eq(Scalar::Number(666.0)));
    }

    #[test]
    fn external_id_shape_retargets_the_alternate_key() {
        let filter = compile_one("id", "tt0111161").unwrap();
        let leaf = single_leaf(&filter);
        assert_eq!(leaf.path, "externalId.imdb");
        assert_eq!(
            leaf.predicate,
            Predicate::Eq(Scalar::Str("tt0111161".to_owned()))
        );
    }

    #[test]
    fn date_range_covers_both_endpoint_days() {
        let filter = compile_one("premiere.world", "01.01.2020-31.12.2020").unwrap();
        assert_eq!(
            single_leaf(&filter).predicate,
            Predicate::Between {
                lo: Scalar::Date(NaiveDate::from_ymd_opt(2020, 1, 1).unwrap()),
                hi: Scalar::Date(NaiveDate::from_ymd_opt(2020, 12, 31).unwrap()),
            }
        );
    }

    #[test]
    fn single_date_is_a_one_day_range() {
        let filter = compile_one("premiere.world", "15.06.2021").unwrap();
        let day = NaiveDate::from_ymd_opt(2021, 6, 15).unwrap();
        assert_eq!(
            single_leaf(&filter).predicate,
            Predicate::Between {
                lo: Scalar::Date(day),
                hi: Scalar::Date(day),
            }
        );
    }

    #[test]
    fn malformed_date_is_a_type_mismatch() {
        let err = compile_one("premiere.world", "2020-01-01").unwrap_err();
        assert!(matches!(
            err,
            QueryError::TypeMismatch { expected: FieldKind::Date, .. }
        ));
    }

    #[test]
    fn regex_input_is_escaped() {
        let filter = compile_one("name", "2001: A Space Odyssey (1968)?").unwrap();
        let Predicate::Matches { pattern } = &single_leaf(&filter).predicate else {
            panic!("expected a partial-match predicate");
        };
        assert!(pattern.contains(r"\(1968\)"));
        assert!(pattern.ends_with(r"\?"));
    }

    #[test]
    fn plain_allow_listed_field_is_exact_string_match() {
        let filter = compile_one("type", "tv-series").unwrap();
        assert_eq!(
            single_leaf(&filter).predicate,
            Predicate::Eq(Scalar::Str("tv-series".to_owned()))
        );
    }

    #[test]
    fn null_literals_override_the_registered_kind() {
        for field in ["year", "premiere.world", "name", "type", "id"] {
            let filter = compile_one(field, "!null").unwrap();
            assert_eq!(single_leaf(&filter).predicate, Predicate::Exists);
            let filter = compile_one(field, "null").unwrap();
            assert_eq!(single_leaf(&filter).predicate, Predicate::Missing);
        }
    }

    #[test]
    fn repeated_values_or_within_one_clause() {
        let raw = RawQuery::from_pairs([("year", "1999"), ("year", "2003"), ("name", "matrix")]);
        let validated = validate(&spec(), &raw).unwrap();
        let filter = compile(&spec(), &validated).unwrap();
        assert_eq!(filter.all_of.len(), 2);
        assert_eq!(filter.all_of[0].any_of.len(), 2);
        assert_eq!(filter.all_of[1].any_of.len(), 1);
    }

    #[test]
    fn negative_single_number_is_not_a_range() {
        let filter = compile_one("year", "-1").unwrap();
        assert_eq!(
            single_leaf(&filter).predicate,
            Predicate::Eq(Scalar::Number(-1.0))
        );
    }
}
