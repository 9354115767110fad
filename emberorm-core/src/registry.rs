//! Metadata registry mapping entity types to collection descriptors.
//!
//! Decorator-style registration is replaced by an explicit registry object
//! populated during application startup. The registry is a type-keyed side
//! table: each registered entity type maps to a [`CollectionDescriptor`]
//! recording its collection name and optional parent linkage, and the query
//! layer only ever consumes the resolved path strings.

use std::any::{TypeId, type_name};
use std::collections::HashMap;
use std::sync::{
    RwLock,
    atomic::{AtomicBool, Ordering},
};

use crate::{
    entity::Entity,
    error::{OrmError, OrmResult},
};

/// Describes how an entity type maps onto the backing store.
#[derive(Debug, Clone)]
pub struct CollectionDescriptor {
    /// The collection name, taken from [`Entity::collection_name`].
    pub name: String,
    /// The parent entity type for sub-collections; `None` for root
    /// collections.
    pub parent: Option<TypeId>,
    /// The entity's type name, kept for diagnostics.
    pub entity_type: &'static str,
}

/// Type-keyed registry of collection descriptors plus the global
/// connection-initialization flag consumed by transaction-scoped access.
///
/// Registration happens once during startup; lookups are read-mostly.
#[derive(Debug, Default)]
pub struct MetadataRegistry {
    collections: RwLock<HashMap<TypeId, CollectionDescriptor>>,
    initialized: AtomicBool,
}

impl MetadataRegistry {
    /// Creates an empty registry with no collections and an uninitialized
    /// connection flag.
    pub fn new() -> Self {
        Self::default()
    }

    fn insert(&self, type_id: TypeId, descriptor: CollectionDescriptor) {
        // A poisoned lock still holds a structurally valid map; recover it.
        let mut collections = self
            .collections
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        collections.insert(type_id, descriptor);
    }

    fn descriptor_of(&self, type_id: TypeId) -> Option<CollectionDescriptor> {
        let collections = self
            .collections
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        collections.get(&type_id).cloned()
    }

    /// Registers `T` as a root collection named after
    /// [`Entity::collection_name`].
    pub fn register_collection<T: Entity>(&self) {
        self.insert(
            TypeId::of::<T>(),
            CollectionDescriptor {
                name: T::collection_name().to_string(),
                parent: None,
                entity_type: type_name::<T>(),
            },
        );
    }

    /// Registers `T` as a sub-collection nested under documents of `P`.
    pub fn register_subcollection<P: Entity, T: Entity>(&self) {
        self.insert(
            TypeId::of::<T>(),
            CollectionDescriptor {
                name: T::collection_name().to_string(),
                parent: Some(TypeId::of::<P>()),
                entity_type: type_name::<T>(),
            },
        );
    }

    /// Resolves the collection path for a registered root collection.
    ///
    /// # Errors
    ///
    /// Fails with [`OrmError::NotRegistered`] for unregistered types and
    /// with [`OrmError::InvalidArgument`] for sub-collections, which need a
    /// parent document path (see
    /// [`resolve_subcollection_path`](Self::resolve_subcollection_path)).
    pub fn resolve_collection_path<T: Entity>(&self) -> OrmResult<String> {
        let descriptor = self
            .descriptor_of(TypeId::of::<T>())
            .ok_or_else(|| OrmError::NotRegistered(type_name::<T>().to_string()))?;

        if descriptor.parent.is_some() {
            return Err(OrmError::InvalidArgument(format!(
                "{} is a sub-collection and requires a parent document path",
                descriptor.entity_type,
            )));
        }

        Ok(descriptor.name)
    }

    /// Resolves the collection path for a registered sub-collection nested
    /// under the given parent document path.
    ///
    /// # Errors
    ///
    /// Fails with [`OrmError::NotRegistered`] for unregistered types and
    /// with [`OrmError::InvalidArgument`] when `T` is a root collection.
    pub fn resolve_subcollection_path<T: Entity>(
        &self,
        parent_document_path: &str,
    ) -> OrmResult<String> {
        let descriptor = self
            .descriptor_of(TypeId::of::<T>())
            .ok_or_else(|| OrmError::NotRegistered(type_name::<T>().to_string()))?;

        if descriptor.parent.is_none() {
            return Err(OrmError::InvalidArgument(format!(
                "{} is a root collection, not a sub-collection",
                descriptor.entity_type,
            )));
        }

        Ok(format!("{parent_document_path}/{}", descriptor.name))
    }

    /// Marks the global database connection as initialized.
    pub fn set_initialized(&self) {
        self.initialized.store(true, Ordering::Release);
    }

    /// Returns whether the global database connection has been initialized.
    pub fn is_initialized(&self) -> bool {
        self.initialized.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Clone, Serialize, Deserialize)]
    struct Album {
        id: String,
        title: String,
    }

    impl Entity for Album {
        fn id(&self) -> &str {
            &self.id
        }

        fn collection_name() -> &'static str {
            "albums"
        }
    }

    #[derive(Debug, Clone, Serialize, Deserialize)]
    struct Track {
        id: String,
        title: String,
    }

    impl Entity for Track {
        fn id(&self) -> &str {
            &self.id
        }

        fn collection_name() -> &'static str {
            "tracks"
        }
    }

    #[test]
    fn resolves_root_collection_paths() {
        let registry = MetadataRegistry::new();
        registry.register_collection::<Album>();

        assert_eq!(
            registry
                .resolve_collection_path::<Album>()
                .unwrap(),
            "albums"
        );
    }

    #[test]
    fn resolves_subcollection_paths_under_a_parent_document() {
        let registry = MetadataRegistry::new();
        registry.register_collection::<Album>();
        registry.register_subcollection::<Album, Track>();

        assert_eq!(
            registry
                .resolve_subcollection_path::<Track>("albums/moving-pictures")
                .unwrap(),
            "albums/moving-pictures/tracks"
        );
    }

    #[test]
    fn subcollections_cannot_resolve_without_a_parent_path() {
        let registry = MetadataRegistry::new();
        registry.register_subcollection::<Album, Track>();

        assert!(matches!(
            registry.resolve_collection_path::<Track>(),
            Err(OrmError::InvalidArgument(_))
        ));
    }

    #[test]
    fn unregistered_types_fail_resolution() {
        let registry = MetadataRegistry::new();

        assert!(matches!(
            registry.resolve_collection_path::<Album>(),
            Err(OrmError::NotRegistered(_))
        ));
    }

    #[test]
    fn initialization_flag_starts_unset() {
        let registry = MetadataRegistry::new();

        assert!(!registry.is_initialized());
        registry.set_initialized();
        assert!(registry.is_initialized());
    }
}
