//! The pluggable query-execution boundary.
//!
//! The query builder accumulates clauses but never touches the backing
//! store; it hands its state to a [`QueryExecutor`], which performs the
//! actual read. Implementations decide what a read means: a live collection
//! scan, a transactional snapshot read, or a translation into a remote
//! database's native query API.

use async_trait::async_trait;
use bson::Bson;
use std::sync::Arc;

use crate::{
    entity::Entity,
    error::OrmResult,
    query::{OrderBy, QueryClause},
};

/// An opaque escape-hatch predicate over raw documents.
///
/// The builder enforces single registration but never interprets the
/// function; the executor applies it in addition to the structured clauses,
/// letting callers express conditions the clause model cannot.
pub type CustomQueryFn = Arc<dyn Fn(&Bson) -> bool + Send + Sync>;

/// Consumes a builder's accumulated state and performs the fetch.
///
/// `single` signals that the caller only wants the first result
/// (`find_one`); executors are free to cap the read at one document.
/// Executor errors propagate unmodified through the awaited terminal call.
#[async_trait]
pub trait QueryExecutor<T: Entity>: Send + Sync {
    async fn execute(
        &self,
        clauses: Vec<QueryClause>,
        limit: Option<usize>,
        order_by: Option<OrderBy>,
        single: bool,
        custom_query: Option<CustomQueryFn>,
    ) -> OrmResult<Vec<T>>;
}

#[async_trait]
impl<T, E> QueryExecutor<T> for &E
where
    T: Entity,
    E: QueryExecutor<T>,
{
    async fn execute(
        &self,
        clauses: Vec<QueryClause>,
        limit: Option<usize>,
        order_by: Option<OrderBy>,
        single: bool,
        custom_query: Option<CustomQueryFn>,
    ) -> OrmResult<Vec<T>> {
        (*self)
            .execute(clauses, limit, order_by, single, custom_query)
            .await
    }
}
