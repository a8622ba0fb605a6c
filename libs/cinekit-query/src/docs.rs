//! Query parameter documentation derived from the entity field spec.
//!
//! The generator walks the same spec the validator enforces, one entry per
//! queryable field, so the published parameter docs cannot drift from the
//! accepted query surface. Runs once at startup or documentation build
//! time, never per request.

use serde::Serialize;

use crate::spec::{EntityFieldSpec, FieldKind};

/// One documented query parameter.
#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct QueryDocEntry {
    pub name: String,
    pub kind: FieldKind,
    pub example: &'static str,
    pub shape: &'static str,
}

fn example_for(kind: FieldKind) -> &'static str {
    match kind {
        FieldKind::Id => "666",
        FieldKind::Number => "1-10",
        FieldKind::Date => "01.01.2020-31.12.2020",
        FieldKind::Regex => "matrix",
        FieldKind::String => "tv-series",
    }
}

fn shape_for(kind: FieldKind) -> &'static str {
    match kind {
        FieldKind::Id => "exact id, or an external id by its shape",
        FieldKind::Number => "a number N, or an inclusive range A-B",
        FieldKind::Date => "dd.mm.yyyy, or a range dd.mm.yyyy-dd.mm.yyyy",
        FieldKind::Regex => "substring, matched case-insensitively",
        FieldKind::String => "exact string value",
    }
}

/// Emit one entry for every queryable field of the entity.
#[must_use]
pub fn describe(spec: &EntityFieldSpec) -> Vec<QueryDocEntry> {
    spec.queryable_fields()
        .map(|name| {
            // Queryable fields always have a kind.
            let kind = spec.kind_of(name).unwrap_or(FieldKind::String);
            QueryDocEntry {
                name: name.to_owned(),
                kind,
                example: example_for(kind),
                shape: shape_for(kind),
            }
        })
        .collect()
}

/// Render entries as a markdown table for the generated API docs.
#[must_use]
pub fn to_markdown(entity: &str, entries: &[QueryDocEntry]) -> String {
    let mut out = format!("### `{entity}` query parameters\n\n");
    out.push_str("| field | type | accepts | example |\n");
    out.push_str("| --- | --- | --- | --- |\n");
    for entry in entries {
        out.push_str(&format!(
            "| `{}` | {} | {} | `{}` |\n",
            entry.name, entry.kind, entry.shape, entry.example
        ));
    }
    out.push_str("\nAll fields accept the literals `!null` (present) and `null` (absent).\n");
    out
}
