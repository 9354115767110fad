//! Clause evaluation for in-memory document filtering.
//!
//! This module evaluates a query expression's accumulated clause list
//! against BSON documents, with dotted-path traversal into nested
//! documents. Clauses combine with implicit logical AND.

use bson::{Bson, datetime::DateTime};
use std::{cmp::Ordering, collections::HashMap};

use emberorm_core::query::{FilterOperator, OrderBy, OrderDirection, QueryClause};

/// Type-erased, comparable representation of BSON values.
///
/// Wraps BSON values and provides the comparison operations clause
/// evaluation needs. All integer and float types normalize to f64.
#[derive(Debug)]
pub(crate) enum Comparable<'a> {
    /// Null value
    Null,
    /// Boolean value
    Bool(bool),
    /// Numeric value (all integers and floats normalized to f64)
    Number(f64),
    /// DateTime value
    DateTime(DateTime),
    /// String value
    String(&'a str),
    /// Array of comparable values
    Array(Vec<Comparable<'a>>),
    /// Map/Object of comparable values
    Map(HashMap<&'a str, Comparable<'a>>),
}

impl<'a> From<&'a Bson> for Comparable<'a> {
    fn from(bson: &'a Bson) -> Self {
        match bson {
            Bson::Null => Comparable::Null,
            Bson::Boolean(value) => Comparable::Bool(*value),
            Bson::Int32(value) => Comparable::Number(*value as f64),
            Bson::Int64(value) => Comparable::Number(*value as f64),
            Bson::Double(value) => Comparable::Number(*value),
            Bson::DateTime(value) => Comparable::DateTime(*value),
            Bson::String(value) => Comparable::String(value),
            Bson::Array(arr) => Comparable::Array(
                arr.iter()
                    .map(Comparable::from)
                    .collect::<Vec<_>>(),
            ),
            Bson::Document(doc) => Comparable::Map(
                doc.iter()
                    .map(|(k, v)| (k.as_str(), Comparable::from(v)))
                    .collect::<HashMap<_, _>>(),
            ),
            _ => Comparable::Null, // Other types are not comparable
        }
    }
}

impl<'a> PartialEq for Comparable<'a> {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Comparable::Null, Comparable::Null) => true,
            (Comparable::Bool(a), Comparable::Bool(b)) => a == b,
            (Comparable::Number(a), Comparable::Number(b)) => a == b,
            (Comparable::DateTime(a), Comparable::DateTime(b)) => a == b,
            (Comparable::String(a), Comparable::String(b)) => a == b,
            (Comparable::Array(a), Comparable::Array(b)) => a == b,
            (Comparable::Map(a), Comparable::Map(b)) => a == b,
            _ => false,
        }
    }
}

impl<'a> PartialOrd for Comparable<'a> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Comparable::Bool(a), Comparable::Bool(b)) => a.partial_cmp(b),
            (Comparable::Number(a), Comparable::Number(b)) => a.partial_cmp(b),
            (Comparable::DateTime(a), Comparable::DateTime(b)) => a.partial_cmp(b),
            (Comparable::String(a), Comparable::String(b)) => a.partial_cmp(b),
            _ => None,
        }
    }
}

/// Walks a dotted path into nested documents.
///
/// Returns `None` when any segment is missing or hits a non-document value
/// before the path ends.
pub(crate) fn lookup_path<'a>(document: &'a Bson, path: &str) -> Option<&'a Bson> {
    let mut current = document;

    for segment in path.split('.') {
        current = current.as_document()?.get(segment)?;
    }

    Some(current)
}

/// Evaluates filter clauses against one document.
pub(crate) struct ClauseEvaluator<'a> {
    document: &'a Bson,
}

impl<'a> ClauseEvaluator<'a> {
    pub fn new(document: &'a Bson) -> Self {
        Self { document }
    }

    /// Returns whether the document satisfies every clause (implicit AND).
    pub fn matches_all(&self, clauses: &[QueryClause]) -> bool {
        clauses
            .iter()
            .all(|clause| self.matches(clause))
    }

    /// Returns whether the document satisfies one clause. A document whose
    /// field is missing never matches, regardless of operator.
    pub fn matches(&self, clause: &QueryClause) -> bool {
        let Some(field_value) = lookup_path(self.document, &clause.path) else {
            return false;
        };

        match clause.operator {
            FilterOperator::Equal => {
                Comparable::from(field_value) == Comparable::from(&clause.value)
            }
            FilterOperator::NotEqual => {
                Comparable::from(field_value) != Comparable::from(&clause.value)
            }
            FilterOperator::GreaterThan
            | FilterOperator::GreaterThanEqual
            | FilterOperator::LessThan
            | FilterOperator::LessThanEqual => {
                match Comparable::from(field_value).partial_cmp(&Comparable::from(&clause.value)) {
                    Some(ordering) => match clause.operator {
                        FilterOperator::GreaterThan => ordering == Ordering::Greater,
                        FilterOperator::GreaterThanEqual => ordering != Ordering::Less,
                        FilterOperator::LessThan => ordering == Ordering::Less,
                        FilterOperator::LessThanEqual => ordering != Ordering::Greater,
                        _ => unreachable!(),
                    },
                    None => false,
                }
            }
            FilterOperator::ArrayContains => match Comparable::from(field_value) {
                Comparable::Array(array) => array
                    .iter()
                    .any(|item| item == &Comparable::from(&clause.value)),
                _ => false,
            },
            FilterOperator::ArrayContainsAny => {
                match (Comparable::from(field_value), Comparable::from(&clause.value)) {
                    (Comparable::Array(array), Comparable::Array(values)) => values
                        .iter()
                        .any(|value| array.iter().any(|item| item == value)),
                    (Comparable::Array(array), single) => {
                        array.iter().any(|item| item == &single)
                    }
                    _ => false,
                }
            }
            FilterOperator::In => match Comparable::from(&clause.value) {
                Comparable::Array(values) => {
                    let field = Comparable::from(field_value);
                    values.iter().any(|value| value == &field)
                }
                single => Comparable::from(field_value) == single,
            },
            FilterOperator::NotIn => match Comparable::from(&clause.value) {
                Comparable::Array(values) => {
                    let field = Comparable::from(field_value);
                    !values.iter().any(|value| value == &field)
                }
                single => Comparable::from(field_value) != single,
            },
        }
    }
}

/// Orders two documents by the given order specification.
///
/// Values that do not compare (mixed types, missing fields) sort as equal.
pub(crate) fn compare_documents(a: &Bson, b: &Bson, order: &OrderBy) -> Ordering {
    let left = lookup_path(a, &order.path)
        .map(Comparable::from)
        .unwrap_or(Comparable::Null);
    let right = lookup_path(b, &order.path)
        .map(Comparable::from)
        .unwrap_or(Comparable::Null);

    match order.direction {
        OrderDirection::Ascending => left.partial_cmp(&right).unwrap_or(Ordering::Equal),
        OrderDirection::Descending => right.partial_cmp(&left).unwrap_or(Ordering::Equal),
    }
}
