//! Live-read query executor over the in-memory store.

use async_trait::async_trait;
use bson::Bson;
use std::marker::PhantomData;

use emberorm_core::{
    entity::{Entity, EntityExt},
    error::OrmResult,
    executor::{CustomQueryFn, QueryExecutor},
    query::{OrderBy, QueryClause},
};

use crate::{
    evaluator::{ClauseEvaluator, compare_documents},
    store::{CollectionMap, InMemoryStore},
};

/// Executes query expressions against the current state of one collection.
///
/// Each execution reads the collection afresh, so results reflect writes
/// made between queries. For reads pinned to a transaction's view, see
/// [`SnapshotExecutor`](crate::transaction::SnapshotExecutor).
#[derive(Debug, Clone)]
pub struct CollectionExecutor<T: Entity> {
    store: InMemoryStore,
    path: String,
    _entity: PhantomData<fn() -> T>,
}

impl<T: Entity> CollectionExecutor<T> {
    /// Creates an executor over the collection at `path`.
    pub fn new(store: InMemoryStore, path: impl Into<String>) -> Self {
        Self {
            store,
            path: path.into(),
            _entity: PhantomData,
        }
    }

    /// Returns the collection path this executor reads from.
    pub fn path(&self) -> &str {
        &self.path
    }
}

#[async_trait]
impl<T: Entity> QueryExecutor<T> for CollectionExecutor<T> {
    async fn execute(
        &self,
        clauses: Vec<QueryClause>,
        limit: Option<usize>,
        order_by: Option<OrderBy>,
        single: bool,
        custom_query: Option<CustomQueryFn>,
    ) -> OrmResult<Vec<T>> {
        let collection = self.store.snapshot_of(&self.path).await;
        run_query(collection, clauses, limit, order_by, single, custom_query)
    }
}

/// Runs one accumulated query expression against a collection snapshot:
/// filter, custom-query predicate, sort, cap, deserialize.
pub(crate) fn run_query<T: Entity>(
    collection: CollectionMap,
    clauses: Vec<QueryClause>,
    limit: Option<usize>,
    order_by: Option<OrderBy>,
    single: bool,
    custom_query: Option<CustomQueryFn>,
) -> OrmResult<Vec<T>> {
    let mut documents: Vec<(String, Bson)> = collection
        .into_iter()
        .filter(|(_, document)| {
            ClauseEvaluator::new(document).matches_all(&clauses)
        })
        .collect();

    if let Some(predicate) = custom_query {
        documents.retain(|(_, document)| predicate(document));
    }

    match &order_by {
        Some(order) => documents.sort_by(|a, b| compare_documents(&a.1, &b.1, order)),
        // Document-ID order keeps unordered reads deterministic.
        None => documents.sort_by(|a, b| a.0.cmp(&b.0)),
    }

    let cap = if single { 1 } else { limit.unwrap_or(usize::MAX) };
    documents.truncate(cap);

    documents
        .into_iter()
        .map(|(_, document)| T::from_bson(document))
        .collect()
}
