//! Entity repositories: the caller-facing handle for querying a collection.
//!
//! A repository binds an entity type to a collection path and an executor.
//! All querying goes through [`QueryBuilder`]; the repository contributes no
//! query logic of its own, only fresh disposable builders and chaining
//! starters that mirror the builder surface.

use bson::Bson;
use std::marker::PhantomData;

use crate::{
    entity::Entity,
    error::OrmResult,
    executor::QueryExecutor,
    path::FieldRef,
    query::QueryBuilder,
};

/// A collection-bound repository handle.
///
/// Owns its executor; every query starter produces a fresh single-use
/// [`QueryBuilder`] borrowing it, so concurrent query chains never share
/// builder state.
pub struct Repository<T, E>
where
    T: Entity,
    E: QueryExecutor<T>,
{
    path: String,
    executor: E,
    _entity: PhantomData<fn() -> T>,
}

impl<T, E> Repository<T, E>
where
    T: Entity,
    E: QueryExecutor<T>,
{
    /// Creates a repository over the given collection path and executor.
    pub fn new(path: impl Into<String>, executor: E) -> Self {
        Self {
            path: path.into(),
            executor,
            _entity: PhantomData,
        }
    }

    /// Returns the collection path this repository reads from.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Starts a fresh, empty query expression.
    pub fn query(&self) -> QueryBuilder<'_, T, E> {
        QueryBuilder::new(&self.executor)
    }

    /// Fetches every entity in the collection.
    pub async fn find(&self) -> OrmResult<Vec<T>> {
        self.query().find().await
    }

    /// Fetches the first entity in the collection, or `None` when it is
    /// empty.
    pub async fn find_one(&self) -> OrmResult<Option<T>> {
        self.query().find_one().await
    }

    /// Starts a query with an equality clause.
    pub fn where_equal_to(
        &self,
        field: impl Into<FieldRef>,
        value: impl Into<Bson>,
    ) -> QueryBuilder<'_, T, E> {
        self.query().where_equal_to(field, value)
    }

    /// Starts a query with a not-equal clause.
    pub fn where_not_equal_to(
        &self,
        field: impl Into<FieldRef>,
        value: impl Into<Bson>,
    ) -> QueryBuilder<'_, T, E> {
        self.query().where_not_equal_to(field, value)
    }

    /// Starts a query with a greater-than clause.
    pub fn where_greater_than(
        &self,
        field: impl Into<FieldRef>,
        value: impl Into<Bson>,
    ) -> QueryBuilder<'_, T, E> {
        self.query().where_greater_than(field, value)
    }

    /// Starts a query with a greater-than-or-equal clause.
    pub fn where_greater_or_equal(
        &self,
        field: impl Into<FieldRef>,
        value: impl Into<Bson>,
    ) -> QueryBuilder<'_, T, E> {
        self.query().where_greater_or_equal(field, value)
    }

    /// Starts a query with a less-than clause.
    pub fn where_less_than(
        &self,
        field: impl Into<FieldRef>,
        value: impl Into<Bson>,
    ) -> QueryBuilder<'_, T, E> {
        self.query().where_less_than(field, value)
    }

    /// Starts a query with a less-than-or-equal clause.
    pub fn where_less_or_equal(
        &self,
        field: impl Into<FieldRef>,
        value: impl Into<Bson>,
    ) -> QueryBuilder<'_, T, E> {
        self.query().where_less_or_equal(field, value)
    }

    /// Starts a query with an array-contains clause.
    pub fn where_array_contains(
        &self,
        field: impl Into<FieldRef>,
        value: impl Into<Bson>,
    ) -> QueryBuilder<'_, T, E> {
        self.query().where_array_contains(field, value)
    }

    /// Starts a query with an array-contains-any clause.
    ///
    /// # Errors
    ///
    /// Fails like
    /// [`QueryBuilder::where_array_contains_any`] when more than ten values
    /// are supplied.
    pub fn where_array_contains_any(
        &self,
        field: impl Into<FieldRef>,
        values: impl IntoIterator<Item = impl Into<Bson>>,
    ) -> OrmResult<QueryBuilder<'_, T, E>> {
        self.query().where_array_contains_any(field, values)
    }

    /// Starts a query with an in clause.
    ///
    /// # Errors
    ///
    /// Fails like [`QueryBuilder::where_in`] when more than ten values are
    /// supplied.
    pub fn where_in(
        &self,
        field: impl Into<FieldRef>,
        values: impl IntoIterator<Item = impl Into<Bson>>,
    ) -> OrmResult<QueryBuilder<'_, T, E>> {
        self.query().where_in(field, values)
    }

    /// Starts a query with a not-in clause.
    ///
    /// # Errors
    ///
    /// Fails like [`QueryBuilder::where_not_in`] when more than ten values
    /// are supplied.
    pub fn where_not_in(
        &self,
        field: impl Into<FieldRef>,
        values: impl IntoIterator<Item = impl Into<Bson>>,
    ) -> OrmResult<QueryBuilder<'_, T, E>> {
        self.query().where_not_in(field, values)
    }
}
