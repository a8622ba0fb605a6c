//! Per-entity declarative field configuration.
//!
//! An [`EntityFieldSpec`] is the single source of truth for what a client
//! may query on one entity and how each field's raw value is interpreted.
//! Specs are collected into a [`SpecRegistry`] once at process start and
//! never mutated afterwards, so concurrent readers need no locking.

use std::collections::HashMap;
use std::fmt;

use regex::Regex;

use crate::errors::ConfigError;

/// How a registered field interprets raw query values.
///
/// The kind is decided solely by spec membership, never by sniffing the
/// stored data or the raw value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    /// Exact match against the primary id, with optional retargeting to an
    /// alternate external id when the value shape matches.
    Id,
    /// Single number or inclusive `a-b` range.
    Number,
    /// Single `dd.mm.yyyy` day or inclusive day range.
    Date,
    /// Case-insensitive partial match with the input escaped.
    Regex,
    /// Allow-listed field with no registered search kind: exact string
    /// equality.
    String,
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldKind::Id => write!(f, "id"),
            FieldKind::Number => write!(f, "number"),
            FieldKind::Date => write!(f, "date"),
            FieldKind::Regex => write!(f, "regex"),
            FieldKind::String => write!(f, "string"),
        }
    }
}

/// Shape matcher for one alternate external id key.
///
/// When a value sent for the primary id matches `pattern`, the compiled
/// predicate targets `key` instead (e.g. `tt0111161` -> `externalId.imdb`).
#[derive(Clone, Debug)]
pub struct AltIdPattern {
    pub key: String,
    pub(crate) pattern: Regex,
}

impl AltIdPattern {
    #[must_use]
    pub fn matches(&self, value: &str) -> bool {
        self.pattern.is_match(value)
    }
}

/// Immutable field configuration for one entity.
#[derive(Clone, Debug)]
pub struct EntityFieldSpec {
    name: String,
    allow_fields_find_all: Vec<String>,
    id_keys: Vec<String>,
    regex_search_keys: Vec<String>,
    date_search_keys: Vec<String>,
    number_search_keys: Vec<String>,
    excluded_values_fields: Vec<String>,
    blacklist_fields: Vec<String>,
    alt_id_patterns: Vec<AltIdPattern>,
}

impl EntityFieldSpec {
    /// Start building a spec for the named entity.
    pub fn builder(name: impl Into<String>) -> SpecBuilder {
        SpecBuilder {
            name: name.into(),
            allow_fields_find_all: Vec::new(),
            id_keys: Vec::new(),
            regex_search_keys: Vec::new(),
            date_search_keys: Vec::new(),
            number_search_keys: Vec::new(),
            excluded_values_fields: Vec::new(),
            blacklist_fields: Vec::new(),
            alt_id_patterns: Vec::new(),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn allow_fields_find_all(&self) -> &[String] {
        &self.allow_fields_find_all
    }

    /// First id key is the primary identifier, the rest are alternates.
    #[must_use]
    pub fn primary_id_key(&self) -> Option<&str> {
        self.id_keys.first().map(String::as_str)
    }

    #[must_use]
    pub fn id_keys(&self) -> &[String] {
        &self.id_keys
    }

    #[must_use]
    pub fn excluded_values_fields(&self) -> &[String] {
        &self.excluded_values_fields
    }

    #[must_use]
    pub fn blacklist_fields(&self) -> &[String] {
        &self.blacklist_fields
    }

    #[must_use]
    pub fn alt_id_patterns(&self) -> &[AltIdPattern] {
        &self.alt_id_patterns
    }

    /// Predicate kind for a field path, or `None` if the field is outside
    /// the queryable union and must be rejected.
    #[must_use]
    pub fn kind_of(&self, path: &str) -> Option<FieldKind> {
        let has = |set: &[String]| set.iter().any(|f| f == path);
        if has(&self.id_keys) {
            Some(FieldKind::Id)
        } else if has(&self.number_search_keys) {
            Some(FieldKind::Number)
        } else if has(&self.date_search_keys) {
            Some(FieldKind::Date)
        } else if has(&self.regex_search_keys) {
            Some(FieldKind::Regex)
        } else if has(&self.allow_fields_find_all) {
            Some(FieldKind::String)
        } else {
            None
        }
    }

    /// Listing sort fields must come from the find-all allow list.
    #[must_use]
    pub fn allows_sort(&self, path: &str) -> bool {
        self.allow_fields_find_all.iter().any(|f| f == path)
    }

    /// Sort fallback when the requested sort field is absent or invalid.
    #[must_use]
    pub fn default_sort_field(&self) -> &str {
        self.primary_id_key()
            .or_else(|| self.allow_fields_find_all.first().map(String::as_str))
            .unwrap_or("id")
    }

    /// Every queryable field path in declaration order, deduplicated.
    pub fn queryable_fields(&self) -> impl Iterator<Item = &str> {
        let mut seen: Vec<&str> = Vec::new();
        self.allow_fields_find_all
            .iter()
            .chain(&self.id_keys)
            .chain(&self.regex_search_keys)
            .chain(&self.date_search_keys)
            .chain(&self.number_search_keys)
            .map(String::as_str)
            .filter(move |path| {
                if seen.contains(path) {
                    false
                } else {
                    seen.push(*path);
                    true
                }
            })
    }
}

/// Consuming builder for [`EntityFieldSpec`].
#[must_use]
pub struct SpecBuilder {
    name: String,
    allow_fields_find_all: Vec<String>,
    id_keys: Vec<String>,
    regex_search_keys: Vec<String>,
    date_search_keys: Vec<String>,
    number_search_keys: Vec<String>,
    excluded_values_fields: Vec<String>,
    blacklist_fields: Vec<String>,
    alt_id_patterns: Vec<(String, String)>,
}

fn owned(fields: &[&str]) -> Vec<String> {
    fields.iter().map(|f| (*f).to_owned()).collect()
}

impl SpecBuilder {
    pub fn allow_fields_find_all(mut self, fields: &[&str]) -> Self {
        self.allow_fields_find_all = owned(fields);
        self
    }

    pub fn id_keys(mut self, fields: &[&str]) -> Self {
        self.id_keys = owned(fields);
        self
    }

    pub fn regex_search_keys(mut self, fields: &[&str]) -> Self {
        self.regex_search_keys = owned(fields);
        self
    }

    pub fn date_search_keys(mut self, fields: &[&str]) -> Self {
        self.date_search_keys = owned(fields);
        self
    }

    pub fn number_search_keys(mut self, fields: &[&str]) -> Self {
        self.number_search_keys = owned(fields);
        self
    }

    pub fn excluded_values_fields(mut self, fields: &[&str]) -> Self {
        self.excluded_values_fields = owned(fields);
        self
    }

    pub fn blacklist_fields(mut self, fields: &[&str]) -> Self {
        self.blacklist_fields = owned(fields);
        self
    }

    /// Declare the value shape that retargets an id lookup to `key`.
    pub fn alt_id_pattern(mut self, key: &str, pattern: &str) -> Self {
        self.alt_id_patterns.push((key.to_owned(), pattern.to_owned()));
        self
    }

    /// Finish the spec, enforcing mutual exclusivity of the search sets.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::AmbiguousField`] if a field appears in more
    /// than one of the id/regex/date/number sets,
    /// [`ConfigError::InvalidIdPattern`] if an alternate id pattern is not
    /// a valid regex, and [`ConfigError::UnmatchedIdPattern`] if a pattern
    /// refers to a key missing from `id_keys`.
    pub fn build(self) -> Result<EntityFieldSpec, ConfigError> {
        let sets: [&[String]; 4] = [
            &self.id_keys,
            &self.regex_search_keys,
            &self.date_search_keys,
            &self.number_search_keys,
        ];
        for (i, set) in sets.iter().enumerate() {
            for field in *set {
                let elsewhere = sets
                    .iter()
                    .enumerate()
                    .any(|(j, other)| j != i && other.contains(field));
                if elsewhere {
                    return Err(ConfigError::AmbiguousField {
                        entity: self.name,
                        field: field.clone(),
                    });
                }
            }
        }

        let mut alt_id_patterns = Vec::with_capacity(self.alt_id_patterns.len());
        for (key, pattern) in self.alt_id_patterns {
            if !self.id_keys.contains(&key) {
                return Err(ConfigError::UnmatchedIdPattern {
                    entity: self.name,
                    key,
                });
            }
            let pattern = Regex::new(&pattern).map_err(|_| ConfigError::InvalidIdPattern {
                entity: self.name.clone(),
                key: key.clone(),
            })?;
            alt_id_patterns.push(AltIdPattern { key, pattern });
        }

        Ok(EntityFieldSpec {
            name: self.name,
            allow_fields_find_all: self.allow_fields_find_all,
            id_keys: self.id_keys,
            regex_search_keys: self.regex_search_keys,
            date_search_keys: self.date_search_keys,
            number_search_keys: self.number_search_keys,
            excluded_values_fields: self.excluded_values_fields,
            blacklist_fields: self.blacklist_fields,
            alt_id_patterns,
        })
    }
}

/// Process-wide registry of entity field specs.
///
/// Loaded once at startup; read-only afterwards.
#[derive(Clone, Debug, Default)]
pub struct SpecRegistry {
    specs: HashMap<String, EntityFieldSpec>,
}

impl SpecRegistry {
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder { specs: Vec::new() }
    }

    /// Look up the spec for an entity, case-insensitively.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnknownEntity`] when no spec is registered.
    /// That is a configuration fault of the caller, not of the request.
    pub fn lookup(&self, entity: &str) -> Result<&EntityFieldSpec, ConfigError> {
        self.specs
            .get(&entity.to_ascii_lowercase())
            .ok_or_else(|| ConfigError::UnknownEntity(entity.to_owned()))
    }

    pub fn entities(&self) -> impl Iterator<Item = &EntityFieldSpec> {
        self.specs.values()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.specs.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }
}

/// Collects specs and validates the set as a whole.
#[must_use]
pub struct RegistryBuilder {
    specs: Vec<EntityFieldSpec>,
}

impl RegistryBuilder {
    pub fn register(mut self, spec: EntityFieldSpec) -> Self {
        self.specs.push(spec);
        self
    }

    /// # Errors
    ///
    /// Returns [`ConfigError::DuplicateEntity`] if two specs share a name
    /// (case-insensitively).
    pub fn build(self) -> Result<SpecRegistry, ConfigError> {
        let mut specs = HashMap::with_capacity(self.specs.len());
        for spec in self.specs {
            let key = spec.name().to_ascii_lowercase();
            if specs.contains_key(&key) {
                return Err(ConfigError::DuplicateEntity(key));
            }
            specs.insert(key, spec);
        }
        Ok(SpecRegistry { specs })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn movie_like() -> SpecBuilder {
        EntityFieldSpec::builder("movie")
            .allow_fields_find_all(&["id", "name", "year", "rating"])
            .id_keys(&["id", "externalId.imdb"])
            .alt_id_pattern("externalId.imdb", r"^tt\d+$")
            .regex_search_keys(&["name", "description"])
            .date_search_keys(&["premiere.world"])
            .number_search_keys(&["year", "rating.kp"])
    }

    #[test]
    fn kind_is_decided_by_membership() {
        let spec = movie_like().build().unwrap();
        assert_eq!(spec.kind_of("id"), Some(FieldKind::Id));
        assert_eq!(spec.kind_of("year"), Some(FieldKind::Number));
        assert_eq!(spec.kind_of("premiere.world"), Some(FieldKind::Date));
        assert_eq!(spec.kind_of("description"), Some(FieldKind::Regex));
        assert_eq!(spec.kind_of("rating"), Some(FieldKind::String));
        assert_eq!(spec.kind_of("secret"), None);
    }

    #[test]
    fn ambiguous_field_is_a_config_error() {
        let err = movie_like()
            .date_search_keys(&["premiere.world", "year"])
            .build()
            .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::AmbiguousField { ref field, .. } if field == "year"
        ));
    }

    #[test]
    fn alt_pattern_must_refer_to_an_id_key() {
        let err = movie_like()
            .alt_id_pattern("externalId.tmdb", r"^\d+$")
            .build()
            .unwrap_err();
        assert!(matches!(err, ConfigError::UnmatchedIdPattern { .. }));
    }

    #[test]
    fn lookup_is_case_insensitive() {
        let registry = SpecRegistry::builder()
            .register(movie_like().build().unwrap())
            .build()
            .unwrap();
        assert!(registry.lookup("Movie").is_ok());
        assert!(registry.lookup("MOVIE").is_ok());
        assert!(matches!(
            registry.lookup("studio"),
            Err(ConfigError::UnknownEntity(ref name)) if name == "studio"
        ));
    }

    #[test]
    fn queryable_fields_are_deduplicated_in_order() {
        let spec = movie_like().build().unwrap();
        let fields: Vec<&str> = spec.queryable_fields().collect();
        assert_eq!(
            fields,
            [
                "id",
                "name",
                "year",
                "rating",
                "externalId.imdb",
                "description",
                "premiere.world",
                "rating.kp",
            ]
        );
    }
}
