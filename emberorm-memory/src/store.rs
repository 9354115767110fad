//! In-memory document storage for the mapping layer.
//!
//! This module provides a simple backing store that keeps documents as BSON
//! values in HashMaps behind an async-aware read-write lock. It exists to
//! seed fixtures, serve live executors, and hand out transactional
//! snapshots.

use bson::Bson;
use mea::rwlock::RwLock;
use std::{collections::HashMap, sync::Arc};

use emberorm_core::{
    entity::{Entity, EntityExt},
    error::{OrmError, OrmResult},
    registry::MetadataRegistry,
    repository::Repository,
};

use crate::{executor::CollectionExecutor, transaction::InMemoryTransaction};

pub(crate) type CollectionMap = HashMap<String, Bson>;
pub(crate) type StoreMap = HashMap<String, CollectionMap>;

/// Thread-safe in-memory document store.
///
/// Cloning shares the underlying data: all clones of one instance observe
/// the same collections. Queries scan whole collections (no indexing), which
/// is fine for the development and testing workloads this backend targets.
///
/// # Example
///
/// ```ignore
/// use emberorm_memory::InMemoryStore;
///
/// let store = InMemoryStore::new();
/// store.insert("users", vec![user]).await?;
/// let repository = store.repository::<User>(&registry)?;
/// ```
#[derive(Default, Clone, Debug)]
pub struct InMemoryStore {
    /// collection_path -> (document_id -> document)
    store: Arc<RwLock<StoreMap>>,
}

impl InMemoryStore {
    /// Creates a new empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts entities into the collection at `path`, serializing each to
    /// BSON and keying it by its document ID.
    ///
    /// # Errors
    ///
    /// Fails on serialization errors or when a document with the same ID
    /// already exists in the collection.
    pub async fn insert<T: Entity>(&self, path: &str, entities: Vec<T>) -> OrmResult<()> {
        let mut documents = Vec::with_capacity(entities.len());

        for entity in entities {
            documents.push((entity.id().to_string(), entity.to_bson()?));
        }

        self.insert_documents(path, documents).await
    }

    /// Inserts raw `(id, document)` pairs into the collection at `path`,
    /// creating the collection if it does not exist.
    ///
    /// # Errors
    ///
    /// Fails when a document with the same ID already exists.
    pub async fn insert_documents(
        &self,
        path: &str,
        documents: Vec<(String, Bson)>,
    ) -> OrmResult<()> {
        let mut store = self.store.write().await;
        let collection = store
            .entry(path.to_string())
            .or_default();

        for (id, document) in documents {
            if collection.contains_key(&id) {
                return Err(OrmError::Backend(format!(
                    "document {id} already exists in collection {path}"
                )));
            }

            collection.insert(id, document);
        }

        Ok(())
    }

    /// Deletes one document from the collection at `path`.
    ///
    /// # Errors
    ///
    /// Fails when the collection or the document does not exist.
    pub async fn delete(&self, path: &str, id: &str) -> OrmResult<()> {
        let mut store = self.store.write().await;
        let collection = store
            .get_mut(path)
            .ok_or_else(|| OrmError::Backend(format!("collection not found: {path}")))?;

        if collection.remove(id).is_none() {
            return Err(OrmError::Backend(format!(
                "document not found {id} in collection {path}"
            )));
        }

        Ok(())
    }

    /// Lists the paths of all collections in the store.
    pub async fn list_collections(&self) -> Vec<String> {
        self.store
            .read()
            .await
            .keys()
            .cloned()
            .collect()
    }

    /// Returns a clone of the collection at `path`, or an empty map when the
    /// collection does not exist.
    pub(crate) async fn snapshot_of(&self, path: &str) -> CollectionMap {
        self.store
            .read()
            .await
            .get(path)
            .cloned()
            .unwrap_or_default()
    }

    /// Begins a transaction by snapshotting the entire store. Every read
    /// issued through the returned handle observes this one consistent view,
    /// regardless of later writes to the live store.
    pub async fn begin_transaction(&self) -> InMemoryTransaction {
        InMemoryTransaction::new(Arc::new(self.store.read().await.clone()))
    }

    /// Returns a live-read executor over the collection at `path`.
    pub fn executor<T: Entity>(&self, path: impl Into<String>) -> CollectionExecutor<T> {
        CollectionExecutor::new(self.clone(), path)
    }

    /// Returns a repository for a registered root collection, backed by a
    /// live-read executor.
    ///
    /// # Errors
    ///
    /// Fails when `T` is not registered as a root collection.
    pub fn repository<T: Entity>(
        &self,
        registry: &MetadataRegistry,
    ) -> OrmResult<Repository<T, CollectionExecutor<T>>> {
        let path = registry.resolve_collection_path::<T>()?;
        Ok(self.repository_at(&path))
    }

    /// Returns a repository for an explicit collection path, backed by a
    /// live-read executor.
    pub fn repository_at<T: Entity>(&self, path: &str) -> Repository<T, CollectionExecutor<T>> {
        Repository::new(path, self.executor(path))
    }
}
