//! Query clause model and the fluent query builder.
//!
//! This module provides the chainable expression accumulator at the heart of
//! the mapping layer. A [`QueryBuilder`] records filter clauses, an optional
//! limit, an optional order specification, and an optional custom-query
//! escape hatch, then delegates execution to a [`QueryExecutor`].
//!
//! # Query Building
//!
//! ```ignore
//! use emberorm::query::QueryBuilder;
//!
//! let admins = QueryBuilder::<User, _>::new(&executor)
//!     .where_equal_to("role", "admin")
//!     .where_greater_than("age", 18)
//!     .order_by_descending("age")?
//!     .limit(20)?
//!     .find()
//!     .await?;
//! ```
//!
//! A builder is a disposable, single-use accumulator: one instance produces
//! one logical query and is consumed by its terminal operation. Clauses are
//! never deduplicated or merged, and values are never validated against the
//! entity's declared field types; validation is limited to the backing
//! store's structural limits (set-membership cardinality, one-shot clauses)
//! and is raised synchronously at the offending call.

use bson::Bson;
use std::collections::HashSet;
use std::marker::PhantomData;

use crate::{
    entity::Entity,
    error::{OrmError, OrmResult},
    executor::{CustomQueryFn, QueryExecutor},
    path::FieldRef,
};

/// Maximum number of values accepted by the set-membership operators
/// (`where_in`, `where_not_in`, `where_array_contains_any`), matching a
/// common structural limit of hosted document databases.
pub const MAX_SET_MEMBERSHIP_VALUES: usize = 10;

/// Field comparison operators for filter clauses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOperator {
    /// Equal to (exact match).
    Equal,
    /// Not equal to.
    NotEqual,
    /// Greater than.
    GreaterThan,
    /// Greater than or equal to.
    GreaterThanEqual,
    /// Less than.
    LessThan,
    /// Less than or equal to.
    LessThanEqual,
    /// Array field contains the value.
    ArrayContains,
    /// Array field contains any of the values.
    ArrayContainsAny,
    /// Field value is one of the values.
    In,
    /// Field value is none of the values.
    NotIn,
}

impl FilterOperator {
    /// Returns the builder method name for this operator, used in
    /// validation error messages.
    pub fn name(&self) -> &'static str {
        match self {
            FilterOperator::Equal => "where_equal_to",
            FilterOperator::NotEqual => "where_not_equal_to",
            FilterOperator::GreaterThan => "where_greater_than",
            FilterOperator::GreaterThanEqual => "where_greater_or_equal",
            FilterOperator::LessThan => "where_less_than",
            FilterOperator::LessThanEqual => "where_less_or_equal",
            FilterOperator::ArrayContains => "where_array_contains",
            FilterOperator::ArrayContainsAny => "where_array_contains_any",
            FilterOperator::In => "where_in",
            FilterOperator::NotIn => "where_not_in",
        }
    }
}

/// One filter condition in a query expression.
///
/// Immutable once appended. Multiple clauses combine with implicit logical
/// AND; append order is preserved for executor translation.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryClause {
    /// Canonical dotted path of the filtered field.
    pub path: String,
    /// The comparison operator.
    pub operator: FilterOperator,
    /// The comparison value; an array for set-membership operators.
    pub value: Bson,
}

/// Sort direction for an order specification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderDirection {
    /// Ascending order (A to Z, 0 to 9, earliest to latest).
    Ascending,
    /// Descending order (Z to A, 9 to 0, latest to earliest).
    Descending,
}

/// Order specification for query results. At most one per builder.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderBy {
    /// Canonical dotted path of the ordered field.
    pub path: String,
    /// The sort direction.
    pub direction: OrderDirection,
}

/// A chainable query expression bound to an executor.
///
/// Each `where_*` method appends one [`QueryClause`] and returns the builder
/// for further chaining. The set-membership methods validate cardinality
/// before appending; `limit`, `order_by_*`, and `custom_query` carry
/// one-shot guards. The terminal operations [`find`](Self::find) and
/// [`find_one`](Self::find_one) consume the builder and hand its state to
/// the executor.
pub struct QueryBuilder<'a, T, E>
where
    T: Entity,
    E: QueryExecutor<T> + ?Sized,
{
    executor: &'a E,
    clauses: Vec<QueryClause>,
    limit: Option<usize>,
    order_by: Option<OrderBy>,
    custom_query: Option<CustomQueryFn>,
    order_by_fields: HashSet<String>,
    _entity: PhantomData<fn() -> T>,
}

impl<T, E> std::fmt::Debug for QueryBuilder<'_, T, E>
where
    T: Entity,
    E: QueryExecutor<T> + ?Sized,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryBuilder")
            .field("clauses", &self.clauses)
            .field("limit", &self.limit)
            .field("order_by", &self.order_by)
            .field("custom_query", &self.custom_query.as_ref().map(|_| ".."))
            .field("order_by_fields", &self.order_by_fields)
            .finish_non_exhaustive()
    }
}

impl<'a, T, E> QueryBuilder<'a, T, E>
where
    T: Entity,
    E: QueryExecutor<T> + ?Sized,
{
    /// Creates an empty query expression bound to the given executor.
    pub fn new(executor: &'a E) -> Self {
        Self {
            executor,
            clauses: Vec::new(),
            limit: None,
            order_by: None,
            custom_query: None,
            order_by_fields: HashSet::new(),
            _entity: PhantomData,
        }
    }

    fn push(
        mut self,
        field: impl Into<FieldRef>,
        operator: FilterOperator,
        value: impl Into<Bson>,
    ) -> Self {
        self.clauses.push(QueryClause {
            path: field.into().resolve(),
            operator,
            value: value.into(),
        });
        self
    }

    fn push_set(
        self,
        field: impl Into<FieldRef>,
        operator: FilterOperator,
        values: impl IntoIterator<Item = impl Into<Bson>>,
    ) -> OrmResult<Self> {
        let values: Vec<Bson> = values
            .into_iter()
            .map(Into::into)
            .collect();

        if values.len() > MAX_SET_MEMBERSHIP_VALUES {
            return Err(OrmError::InvalidArgument(format!(
                "{} supports up to {} values, {} were provided",
                operator.name(),
                MAX_SET_MEMBERSHIP_VALUES,
                values.len(),
            )));
        }

        Ok(self.push(field, operator, Bson::Array(values)))
    }

    /// Appends an equality clause.
    pub fn where_equal_to(self, field: impl Into<FieldRef>, value: impl Into<Bson>) -> Self {
        self.push(field, FilterOperator::Equal, value)
    }

    /// Appends a not-equal clause.
    pub fn where_not_equal_to(self, field: impl Into<FieldRef>, value: impl Into<Bson>) -> Self {
        self.push(field, FilterOperator::NotEqual, value)
    }

    /// Appends a greater-than clause.
    pub fn where_greater_than(self, field: impl Into<FieldRef>, value: impl Into<Bson>) -> Self {
        self.push(field, FilterOperator::GreaterThan, value)
    }

    /// Appends a greater-than-or-equal clause.
    pub fn where_greater_or_equal(self, field: impl Into<FieldRef>, value: impl Into<Bson>) -> Self {
        self.push(field, FilterOperator::GreaterThanEqual, value)
    }

    /// Appends a less-than clause.
    pub fn where_less_than(self, field: impl Into<FieldRef>, value: impl Into<Bson>) -> Self {
        self.push(field, FilterOperator::LessThan, value)
    }

    /// Appends a less-than-or-equal clause.
    pub fn where_less_or_equal(self, field: impl Into<FieldRef>, value: impl Into<Bson>) -> Self {
        self.push(field, FilterOperator::LessThanEqual, value)
    }

    /// Appends an array-membership clause matching documents whose array
    /// field contains the value.
    pub fn where_array_contains(self, field: impl Into<FieldRef>, value: impl Into<Bson>) -> Self {
        self.push(field, FilterOperator::ArrayContains, value)
    }

    /// Appends a clause matching documents whose array field contains any of
    /// the given values.
    ///
    /// # Errors
    ///
    /// Fails with [`OrmError::InvalidArgument`] before appending if more than
    /// [`MAX_SET_MEMBERSHIP_VALUES`] values are supplied.
    pub fn where_array_contains_any(
        self,
        field: impl Into<FieldRef>,
        values: impl IntoIterator<Item = impl Into<Bson>>,
    ) -> OrmResult<Self> {
        self.push_set(field, FilterOperator::ArrayContainsAny, values)
    }

    /// Appends a clause matching documents whose field value is one of the
    /// given values.
    ///
    /// # Errors
    ///
    /// Fails with [`OrmError::InvalidArgument`] before appending if more than
    /// [`MAX_SET_MEMBERSHIP_VALUES`] values are supplied.
    pub fn where_in(
        self,
        field: impl Into<FieldRef>,
        values: impl IntoIterator<Item = impl Into<Bson>>,
    ) -> OrmResult<Self> {
        self.push_set(field, FilterOperator::In, values)
    }

    /// Appends a clause matching documents whose field value is none of the
    /// given values.
    ///
    /// # Errors
    ///
    /// Fails with [`OrmError::InvalidArgument`] before appending if more than
    /// [`MAX_SET_MEMBERSHIP_VALUES`] values are supplied.
    pub fn where_not_in(
        self,
        field: impl Into<FieldRef>,
        values: impl IntoIterator<Item = impl Into<Bson>>,
    ) -> OrmResult<Self> {
        self.push_set(field, FilterOperator::NotIn, values)
    }

    /// Records the result cap for this query expression.
    ///
    /// # Errors
    ///
    /// Fails with [`OrmError::InvalidState`] if a limit was already recorded
    /// on this builder.
    pub fn limit(mut self, limit: usize) -> OrmResult<Self> {
        if self.limit.is_some() {
            return Err(OrmError::InvalidState(
                "a limit function cannot be called more than once in the same query expression"
                    .to_string(),
            ));
        }

        self.limit = Some(limit);
        Ok(self)
    }

    // Duplicate detection keys raw string references by their text and every
    // path-builder reference by the empty string, and only non-empty keys are
    // ever tracked. Consequences that callers observe and depend on: a second
    // order_by with a *different* string field silently overwrites the order
    // spec while both names stay tracked, a repeat of an already-tracked
    // string field fails, and path-builder references never fail. Kept
    // bug-for-bug; do not "fix".
    fn order_by(mut self, field: FieldRef, direction: OrderDirection) -> OrmResult<Self> {
        let field_key = field.order_key();
        let already_ordered_by_field = self.order_by_fields.contains(&field_key);

        if self.order_by.is_some() && already_ordered_by_field {
            return Err(OrmError::InvalidState(
                "an orderBy function cannot be called more than once in the same query expression"
                    .to_string(),
            ));
        }

        if !already_ordered_by_field && !field_key.is_empty() {
            self.order_by_fields.insert(field_key);
        }

        self.order_by = Some(OrderBy { path: field.resolve(), direction });

        Ok(self)
    }

    /// Records an ascending order specification, overwriting any previous one.
    ///
    /// # Errors
    ///
    /// Fails with [`OrmError::InvalidState`] when an order specification
    /// already exists and the same string field was already used for
    /// ordering.
    pub fn order_by_ascending(self, field: impl Into<FieldRef>) -> OrmResult<Self> {
        self.order_by(field.into(), OrderDirection::Ascending)
    }

    /// Records a descending order specification, overwriting any previous one.
    ///
    /// # Errors
    ///
    /// Fails with [`OrmError::InvalidState`] when an order specification
    /// already exists and the same string field was already used for
    /// ordering.
    pub fn order_by_descending(self, field: impl Into<FieldRef>) -> OrmResult<Self> {
        self.order_by(field.into(), OrderDirection::Descending)
    }

    /// Registers an opaque custom-query predicate the executor applies in
    /// addition to the structured clauses.
    ///
    /// # Errors
    ///
    /// Fails with [`OrmError::InvalidState`] if a custom query was already
    /// registered on this builder.
    pub fn custom_query(
        mut self,
        func: impl Fn(&Bson) -> bool + Send + Sync + 'static,
    ) -> OrmResult<Self> {
        if self.custom_query.is_some() {
            return Err(OrmError::InvalidState(
                "only one custom query can be used per query expression".to_string(),
            ));
        }

        self.custom_query = Some(std::sync::Arc::new(func));
        Ok(self)
    }

    /// Returns the clauses accumulated so far, in append order.
    pub fn clauses(&self) -> &[QueryClause] {
        &self.clauses
    }

    /// Executes the query and returns the full result sequence.
    ///
    /// The accumulated clause list, limit, and order specification are
    /// forwarded to the executor unmodified.
    pub async fn find(self) -> OrmResult<Vec<T>> {
        self.executor
            .execute(self.clauses, self.limit, self.order_by, false, self.custom_query)
            .await
    }

    /// Executes the query and returns the first result, or `None` when the
    /// result sequence is empty. An empty result is not an error.
    pub async fn find_one(self) -> OrmResult<Option<T>> {
        let mut results = self
            .executor
            .execute(self.clauses, self.limit, self.order_by, true, self.custom_query)
            .await?;

        if results.is_empty() {
            Ok(None)
        } else {
            Ok(Some(results.remove(0)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path::FieldPath;
    use async_trait::async_trait;
    use futures::executor::block_on;
    use serde::{Deserialize, Serialize};
    use std::sync::Mutex;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Band {
        id: String,
        name: String,
        formed: i32,
    }

    impl Entity for Band {
        fn id(&self) -> &str {
            &self.id
        }

        fn collection_name() -> &'static str {
            "bands"
        }
    }

    fn band(id: &str, name: &str, formed: i32) -> Band {
        Band { id: id.to_string(), name: name.to_string(), formed }
    }

    #[derive(Debug)]
    struct Captured {
        clauses: Vec<QueryClause>,
        limit: Option<usize>,
        order_by: Option<OrderBy>,
        single: bool,
        has_custom_query: bool,
    }

    #[derive(Default)]
    struct RecordingExecutor {
        results: Vec<Band>,
        captured: Mutex<Option<Captured>>,
    }

    impl RecordingExecutor {
        fn returning(results: Vec<Band>) -> Self {
            Self { results, captured: Mutex::new(None) }
        }

        fn captured(&self) -> Captured {
            self.captured
                .lock()
                .unwrap()
                .take()
                .expect("executor was never invoked")
        }
    }

    fn query(executor: &RecordingExecutor) -> QueryBuilder<'_, Band, RecordingExecutor> {
        QueryBuilder::new(executor)
    }

    #[async_trait]
    impl QueryExecutor<Band> for RecordingExecutor {
        async fn execute(
            &self,
            clauses: Vec<QueryClause>,
            limit: Option<usize>,
            order_by: Option<OrderBy>,
            single: bool,
            custom_query: Option<CustomQueryFn>,
        ) -> OrmResult<Vec<Band>> {
            *self.captured.lock().unwrap() = Some(Captured {
                clauses,
                limit,
                order_by,
                single,
                has_custom_query: custom_query.is_some(),
            });

            Ok(self.results.clone())
        }
    }

    #[test]
    fn where_calls_append_clauses_in_call_order() {
        let executor = RecordingExecutor::default();
        let builder = query(&executor)
            .where_equal_to("name", "Pink Floyd")
            .where_not_equal_to("name", "Genesis")
            .where_greater_than("formed", 1960)
            .where_greater_or_equal("formed", 1965)
            .where_less_than("formed", 1980)
            .where_less_or_equal("formed", 1979)
            .where_array_contains("genres", "progressive");

        let operators: Vec<FilterOperator> = builder
            .clauses()
            .iter()
            .map(|clause| clause.operator)
            .collect();

        assert_eq!(
            operators,
            vec![
                FilterOperator::Equal,
                FilterOperator::NotEqual,
                FilterOperator::GreaterThan,
                FilterOperator::GreaterThanEqual,
                FilterOperator::LessThan,
                FilterOperator::LessThanEqual,
                FilterOperator::ArrayContains,
            ]
        );
        assert_eq!(builder.clauses().len(), 7);
        assert_eq!(builder.clauses()[0].path, "name");
        assert_eq!(builder.clauses()[0].value, Bson::String("Pink Floyd".to_string()));
    }

    #[test]
    fn duplicate_clauses_are_never_merged() {
        let executor = RecordingExecutor::default();
        let builder = query(&executor)
            .where_equal_to("name", "Pink Floyd")
            .where_equal_to("name", "Pink Floyd");

        assert_eq!(builder.clauses().len(), 2);
        assert_eq!(builder.clauses()[0], builder.clauses()[1]);
    }

    #[test]
    fn set_membership_accepts_up_to_ten_values() {
        let executor = RecordingExecutor::default();
        let builder = query(&executor)
            .where_in("formed", (0..10).collect::<Vec<i32>>())
            .unwrap();

        assert_eq!(builder.clauses().len(), 1);
        assert_eq!(builder.clauses()[0].operator, FilterOperator::In);
    }

    #[test]
    fn set_membership_rejects_eleven_values() {
        let executor = RecordingExecutor::default();
        let result = query(&executor).where_in("formed", (0..11).collect::<Vec<i32>>());

        match result {
            Err(OrmError::InvalidArgument(message)) => {
                assert!(message.contains("where_in"));
                assert!(message.contains("10"));
                assert!(message.contains("11"));
            }
            other => panic!("expected InvalidArgument, got {other:?}"),
        }

        let result = query(&executor)
            .where_array_contains_any("genres", vec!["rock"; 11]);
        assert!(matches!(result, Err(OrmError::InvalidArgument(_))));

        let result = query(&executor).where_not_in("name", vec!["x"; 11]);
        assert!(matches!(result, Err(OrmError::InvalidArgument(_))));
    }

    #[test]
    fn limit_is_one_shot() {
        let executor = RecordingExecutor::default();
        let result = query(&executor)
            .where_equal_to("name", "Yes")
            .limit(5)
            .unwrap()
            .where_greater_than("formed", 1960)
            .limit(10);

        assert!(matches!(result, Err(OrmError::InvalidState(_))));
    }

    #[test]
    fn custom_query_is_one_shot() {
        let executor = RecordingExecutor::default();
        let result = query(&executor)
            .custom_query(|_| true)
            .unwrap()
            .custom_query(|_| false);

        match result {
            Err(OrmError::InvalidState(message)) => {
                assert!(message.contains("only one custom query"));
            }
            other => panic!("expected InvalidState, got {other:?}"),
        }
    }

    #[test]
    fn repeated_string_order_field_fails() {
        let executor = RecordingExecutor::default();
        let result = query(&executor)
            .order_by_ascending("name")
            .unwrap()
            .order_by_ascending("name");

        assert!(matches!(result, Err(OrmError::InvalidState(_))));
    }

    #[test]
    fn differing_string_order_fields_overwrite_without_error() {
        let executor = RecordingExecutor::returning(vec![]);
        let builder = query(&executor)
            .order_by_ascending("name")
            .unwrap()
            .order_by_descending("formed")
            .unwrap();

        block_on(builder.find()).unwrap();
        let captured = executor.captured();

        // Only the second call is effective; the first field stays tracked.
        assert_eq!(
            captured.order_by,
            Some(OrderBy {
                path: "formed".to_string(),
                direction: OrderDirection::Descending,
            })
        );
    }

    #[test]
    fn overwritten_order_field_still_counts_as_used() {
        let executor = RecordingExecutor::default();
        let result = query(&executor)
            .order_by_ascending("name")
            .unwrap()
            .order_by_descending("formed")
            .unwrap()
            .order_by_ascending("name");

        // "name" was tracked by the first call even though "formed" overwrote
        // the effective order, so reusing it fails.
        assert!(matches!(result, Err(OrmError::InvalidState(_))));
    }

    #[test]
    fn path_builder_order_references_never_trip_the_guard() {
        let executor = RecordingExecutor::returning(vec![]);
        let builder = query(&executor)
            .order_by_ascending(FieldPath::new("name"))
            .unwrap()
            .order_by_descending(FieldPath::new("formed"))
            .unwrap();

        block_on(builder.find()).unwrap();
        let captured = executor.captured();

        assert_eq!(
            captured.order_by,
            Some(OrderBy {
                path: "formed".to_string(),
                direction: OrderDirection::Descending,
            })
        );
    }

    #[test]
    fn find_forwards_accumulated_state_unmodified() {
        let executor = RecordingExecutor::returning(vec![band("1", "Rush", 1968)]);
        let builder = query(&executor)
            .where_equal_to("name", "Rush")
            .where_in("formed", vec![1968, 1969])
            .unwrap()
            .order_by_ascending("formed")
            .unwrap()
            .limit(3)
            .unwrap();

        let expected_clauses = builder.clauses().to_vec();
        let results = block_on(builder.find()).unwrap();
        let captured = executor.captured();

        assert_eq!(results, vec![band("1", "Rush", 1968)]);
        assert_eq!(captured.clauses, expected_clauses);
        assert_eq!(captured.limit, Some(3));
        assert_eq!(
            captured.order_by,
            Some(OrderBy {
                path: "formed".to_string(),
                direction: OrderDirection::Ascending,
            })
        );
        assert!(!captured.single);
        assert!(!captured.has_custom_query);
    }

    #[test]
    fn find_one_requests_a_single_result() {
        let executor = RecordingExecutor::returning(vec![
            band("1", "Rush", 1968),
            band("2", "Yes", 1968),
        ]);
        let result = block_on(
            query(&executor)
                .where_equal_to("formed", 1968)
                .find_one(),
        )
        .unwrap();

        assert_eq!(result, Some(band("1", "Rush", 1968)));
        assert!(executor.captured().single);
    }

    #[test]
    fn find_one_on_empty_sequence_yields_none() {
        let executor = RecordingExecutor::returning(vec![]);
        let result = block_on(query(&executor).find_one()).unwrap();

        assert_eq!(result, None);
    }

    #[test]
    fn custom_query_is_forwarded_to_the_executor() {
        let executor = RecordingExecutor::returning(vec![]);
        let builder = query(&executor)
            .custom_query(|doc| doc.as_document().is_some())
            .unwrap();

        block_on(builder.find()).unwrap();
        assert!(executor.captured().has_custom_query);
    }

    #[test]
    fn string_and_path_builder_references_produce_identical_clause_keys() {
        let executor = RecordingExecutor::default();
        let builder = query(&executor)
            .where_equal_to("profile.age", 30)
            .where_equal_to(FieldPath::new("profile").field("age"), 30);

        assert_eq!(builder.clauses()[0], builder.clauses()[1]);
    }
}
