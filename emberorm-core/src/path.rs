//! Field references and dotted-path canonicalization.
//!
//! Filter and order clauses key their field by a canonical dotted path
//! string. Callers can supply that path either as a raw string (used
//! verbatim) or through [`FieldPath`], a chainable segment recorder that
//! makes nested paths explicit at the call site instead of hiding them in a
//! string literal.

use std::fmt;

/// A chainable field-path builder that records segment names.
///
/// Segments are joined with `.` to form the canonical path the executor
/// sees, so `FieldPath::new("profile").field("age")` and the raw string
/// `"profile.age"` produce identical clause keys.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldPath {
    segments: Vec<String>,
}

impl FieldPath {
    /// Starts a path at the given top-level field.
    pub fn new(segment: impl Into<String>) -> Self {
        Self { segments: vec![segment.into()] }
    }

    /// Appends a nested field segment to the path.
    pub fn field(mut self, segment: impl Into<String>) -> Self {
        self.segments.push(segment.into());
        self
    }

    /// Returns the canonical dotted form of this path.
    pub fn dotted(&self) -> String {
        self.segments.join(".")
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.dotted())
    }
}

/// A field reference accepted by the query builder.
///
/// Raw strings pass through verbatim; [`FieldPath`] values canonicalize to
/// their dotted form. The two variants are distinguishable on purpose:
/// duplicate-order tracking keys raw strings by their text but collapses
/// every path-builder reference to the empty key (see
/// [`QueryBuilder::order_by_ascending`](crate::query::QueryBuilder::order_by_ascending)).
#[derive(Debug, Clone)]
pub enum FieldRef {
    /// A literal dotted path string.
    Raw(String),
    /// A typed path-builder reference.
    Path(FieldPath),
}

impl FieldRef {
    /// Resolves this reference into the canonical dotted path used as a
    /// clause's field key.
    pub fn resolve(&self) -> String {
        match self {
            FieldRef::Raw(path) => path.clone(),
            FieldRef::Path(path) => path.dotted(),
        }
    }

    /// Returns the key used for duplicate-order bookkeeping.
    ///
    /// Path-builder references always collapse to the empty string, so
    /// duplicate detection is only exercised for raw string references.
    pub(crate) fn order_key(&self) -> String {
        match self {
            FieldRef::Raw(path) => path.clone(),
            FieldRef::Path(_) => String::new(),
        }
    }
}

impl From<&str> for FieldRef {
    fn from(path: &str) -> Self {
        FieldRef::Raw(path.to_string())
    }
}

impl From<String> for FieldRef {
    fn from(path: String) -> Self {
        FieldRef::Raw(path)
    }
}

impl From<FieldPath> for FieldRef {
    fn from(path: FieldPath) -> Self {
        FieldRef::Path(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn path_builder_joins_segments_with_dots() {
        let path = FieldPath::new("profile")
            .field("address")
            .field("city");

        assert_eq!(path.dotted(), "profile.address.city");
        assert_eq!(path.to_string(), "profile.address.city");
    }

    #[test]
    fn raw_and_built_references_resolve_identically() {
        let raw = FieldRef::from("profile.age");
        let built = FieldRef::from(FieldPath::new("profile").field("age"));

        assert_eq!(raw.resolve(), built.resolve());
    }

    #[test]
    fn order_key_collapses_built_paths() {
        assert_eq!(FieldRef::from("name").order_key(), "name");
        assert_eq!(FieldRef::from(FieldPath::new("name")).order_key(), "");
    }
}
