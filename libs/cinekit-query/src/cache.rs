//! Canonical cache keys for compiled queries.
//!
//! A response cache in front of this layer is keyed by the compiled
//! filter plus pagination. The key must not depend on the order in which
//! the client sent its query parameters, so the canonical form sorts
//! clauses and their OR-branches before hashing.

use sha2::{Digest, Sha256};

use crate::filter::{Filter, Predicate};
use crate::pagination::PageRequest;

/// Order-independent textual form of a compiled query.
#[must_use]
pub fn canonical_form(filter: &Filter, page: &PageRequest) -> String {
    let mut clauses: Vec<String> = filter
        .all_of
        .iter()
        .map(|clause| {
            let mut branches: Vec<String> = clause
                .any_of
                .iter()
                .map(|leaf| format!("{}={}", leaf.path, render(&leaf.predicate)))
                .collect();
            branches.sort_unstable();
            branches.join("|")
        })
        .collect();
    clauses.sort_unstable();
    format!(
        "{};page={};limit={};sort={} {}",
        clauses.join("&"),
        page.page,
        page.limit,
        page.sort_field,
        page.sort_dir,
    )
}

/// Short hex digest of the canonical form, suitable as a cache key.
#[must_use]
pub fn canonical_key(filter: &Filter, page: &PageRequest) -> String {
    let digest = Sha256::digest(canonical_form(filter, page).as_bytes());
    hex::encode(digest)[..16].to_owned()
}

fn render(predicate: &Predicate) -> String {
    match predicate {
        Predicate::Eq(value) => format!("eq:{value}"),
        Predicate::Between { lo, hi } => format!("between:{lo}..{hi}"),
        Predicate::Matches { pattern } => format!("match:{pattern}"),
        Predicate::Exists => "exists".to_owned(),
        Predicate::Missing => "missing".to_owned(),
    }
}
