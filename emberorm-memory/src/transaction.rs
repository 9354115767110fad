//! Transactional snapshot reads over the in-memory store.

use async_trait::async_trait;
use std::{marker::PhantomData, sync::Arc};

use emberorm_core::{
    entity::Entity,
    error::OrmResult,
    executor::{CustomQueryFn, QueryExecutor},
    query::{OrderBy, QueryClause},
    transaction::TransactionHandle,
};

use crate::{executor::run_query, store::StoreMap};

/// A transaction over the in-memory store.
///
/// Captures the entire store state when the transaction begins; every
/// executor it produces reads that frozen view, so repeated reads within
/// one transaction are mutually consistent and blind to concurrent writes.
#[derive(Debug, Clone)]
pub struct InMemoryTransaction {
    snapshot: Arc<StoreMap>,
}

impl InMemoryTransaction {
    pub(crate) fn new(snapshot: Arc<StoreMap>) -> Self {
        Self { snapshot }
    }
}

impl TransactionHandle for InMemoryTransaction {
    type Executor<T: Entity> = SnapshotExecutor<T>;

    fn executor_for<T: Entity>(&self, path: &str) -> SnapshotExecutor<T> {
        SnapshotExecutor {
            snapshot: self.snapshot.clone(),
            path: path.to_string(),
            _entity: PhantomData,
        }
    }
}

/// Executes query expressions against a transaction's frozen store view.
#[derive(Debug, Clone)]
pub struct SnapshotExecutor<T: Entity> {
    snapshot: Arc<StoreMap>,
    path: String,
    _entity: PhantomData<fn() -> T>,
}

#[async_trait]
impl<T: Entity> QueryExecutor<T> for SnapshotExecutor<T> {
    async fn execute(
        &self,
        clauses: Vec<QueryClause>,
        limit: Option<usize>,
        order_by: Option<OrderBy>,
        single: bool,
        custom_query: Option<CustomQueryFn>,
    ) -> OrmResult<Vec<T>> {
        let collection = self
            .snapshot
            .get(&self.path)
            .cloned()
            .unwrap_or_default();

        run_query(collection, clauses, limit, order_by, single, custom_query)
    }
}
