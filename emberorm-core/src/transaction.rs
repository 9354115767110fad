//! Transaction-scoped repository access.
//!
//! A [`Transaction`] hands out repositories whose reads all go through one
//! in-flight transaction handle. It contributes no query logic: repositories
//! obtained here expose the same [`QueryBuilder`](crate::query::QueryBuilder)
//! surface, backed by the handle's transactional executor. A shared
//! [`ReferenceStore`] deduplicates collection references so repeated lookups
//! of the same path within one transaction reuse the same reference.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::{
    entity::Entity,
    error::{OrmError, OrmResult},
    executor::QueryExecutor,
    registry::MetadataRegistry,
    repository::Repository,
};

/// A resolved reference to one collection path within a transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionReference {
    path: String,
}

impl CollectionReference {
    /// Returns the collection path this reference points at.
    pub fn path(&self) -> &str {
        &self.path
    }
}

/// Shared per-transaction store of resolved collection references.
///
/// Cloning shares the underlying map, so every repository produced by one
/// transaction observes the same references.
#[derive(Debug, Default, Clone)]
pub struct ReferenceStore {
    references: Arc<Mutex<HashMap<String, Arc<CollectionReference>>>>,
}

impl ReferenceStore {
    /// Creates an empty reference store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the reference for `path`, creating it on first lookup.
    pub fn obtain(&self, path: &str) -> Arc<CollectionReference> {
        // A poisoned lock still holds a structurally valid map; recover it.
        let mut references = self
            .references
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        references
            .entry(path.to_string())
            .or_insert_with(|| Arc::new(CollectionReference { path: path.to_string() }))
            .clone()
    }

    /// Returns the number of distinct paths resolved so far.
    pub fn len(&self) -> usize {
        self.references
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }

    /// Returns whether no paths have been resolved yet.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Produces per-collection executors bound to one in-flight transaction.
///
/// Backends implement this for their transaction type; the returned
/// executors must serve every read from the same transactional view.
pub trait TransactionHandle {
    /// The transactional executor type produced for an entity collection.
    type Executor<T: Entity>: QueryExecutor<T>;

    /// Returns an executor reading the given collection path through this
    /// transaction.
    fn executor_for<T: Entity>(&self, path: &str) -> Self::Executor<T>;
}

/// Repository access scoped to one in-flight transaction.
pub struct Transaction<'a, H: TransactionHandle> {
    handle: &'a H,
    registry: &'a MetadataRegistry,
    references: ReferenceStore,
}

impl<'a, H: TransactionHandle> Transaction<'a, H> {
    /// Binds a transaction handle to the registry.
    ///
    /// # Errors
    ///
    /// Fails with [`OrmError::NotInitialized`] when the global database
    /// connection has not been initialized yet.
    pub fn new(handle: &'a H, registry: &'a MetadataRegistry) -> OrmResult<Self> {
        if !registry.is_initialized() {
            return Err(OrmError::NotInitialized);
        }

        Ok(Self {
            handle,
            registry,
            references: ReferenceStore::new(),
        })
    }

    /// Returns a repository for a registered root collection, bound to this
    /// transaction.
    pub fn get_repository<T: Entity>(&self) -> OrmResult<Repository<T, H::Executor<T>>> {
        let path = self.registry.resolve_collection_path::<T>()?;
        self.repository_at(&path)
    }

    /// Returns a repository for an explicit collection path, bound to this
    /// transaction. Used for sub-collections, whose path depends on a parent
    /// document.
    pub fn get_repository_at<T: Entity>(
        &self,
        path: &str,
    ) -> OrmResult<Repository<T, H::Executor<T>>> {
        self.repository_at(path)
    }

    fn repository_at<T: Entity>(&self, path: &str) -> OrmResult<Repository<T, H::Executor<T>>> {
        let reference = self.references.obtain(path);
        let executor = self
            .handle
            .executor_for::<T>(reference.path());

        Ok(Repository::new(reference.path(), executor))
    }

    /// Returns the shared reference store backing this transaction.
    pub fn references(&self) -> &ReferenceStore {
        &self.references
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::CustomQueryFn;
    use crate::query::{OrderBy, QueryClause};
    use async_trait::async_trait;
    use serde::{Deserialize, Serialize};
    use std::marker::PhantomData;

    #[derive(Debug, Clone, Serialize, Deserialize)]
    struct Venue {
        id: String,
        name: String,
    }

    impl Entity for Venue {
        fn id(&self) -> &str {
            &self.id
        }

        fn collection_name() -> &'static str {
            "venues"
        }
    }

    struct NullExecutor<T>(PhantomData<fn() -> T>);

    #[async_trait]
    impl<T: Entity> QueryExecutor<T> for NullExecutor<T> {
        async fn execute(
            &self,
            _clauses: Vec<QueryClause>,
            _limit: Option<usize>,
            _order_by: Option<OrderBy>,
            _single: bool,
            _custom_query: Option<CustomQueryFn>,
        ) -> OrmResult<Vec<T>> {
            Ok(Vec::new())
        }
    }

    struct NullHandle;

    impl TransactionHandle for NullHandle {
        type Executor<T: Entity> = NullExecutor<T>;

        fn executor_for<T: Entity>(&self, _path: &str) -> NullExecutor<T> {
            NullExecutor(PhantomData)
        }
    }

    #[test]
    fn fails_before_the_connection_is_initialized() {
        let registry = MetadataRegistry::new();
        let handle = NullHandle;

        assert!(matches!(
            Transaction::new(&handle, &registry),
            Err(OrmError::NotInitialized)
        ));
    }

    #[test]
    fn repeated_lookups_reuse_one_collection_reference() {
        let registry = MetadataRegistry::new();
        registry.register_collection::<Venue>();
        registry.set_initialized();

        let handle = NullHandle;
        let transaction = Transaction::new(&handle, &registry).unwrap();

        let first = transaction.get_repository::<Venue>().unwrap();
        let second = transaction.get_repository::<Venue>().unwrap();

        assert_eq!(first.path(), "venues");
        assert_eq!(second.path(), "venues");
        assert_eq!(transaction.references().len(), 1);
    }

    #[test]
    fn distinct_paths_track_distinct_references() {
        let registry = MetadataRegistry::new();
        registry.register_collection::<Venue>();
        registry.set_initialized();

        let handle = NullHandle;
        let transaction = Transaction::new(&handle, &registry).unwrap();

        transaction.get_repository::<Venue>().unwrap();
        transaction
            .get_repository_at::<Venue>("festivals/glastonbury/venues")
            .unwrap();

        assert_eq!(transaction.references().len(), 2);
    }

    #[test]
    fn reference_store_hands_out_the_same_arc_per_path() {
        let store = ReferenceStore::new();
        let a = store.obtain("venues");
        let b = store.obtain("venues");

        assert!(Arc::ptr_eq(&a, &b));
        assert!(!store.is_empty());
    }
}
