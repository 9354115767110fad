//! Main emberorm crate providing a unified interface for document mapping.
//!
//! This crate is the primary entry point for users of the emberorm framework.
//! It re-exports the core types and functionality from various sub-crates and
//! provides convenient access to the available storage backends.
//!
//! # Features
//!
//! - **Type-safe entities** - Define your data structures with Serde and map them safely
//! - **Fluent queries** - Chainable, validating query builder over typed repositories
//! - **Collection registry** - Programmatic registration of root and nested collections
//! - **Transactions** - Repeated reads within one transaction observe a consistent view
//!
//! # Quick Start
//!
//! ```ignore
//! use emberorm::{prelude::*, memory::InMemoryStore};
//! use serde::{Serialize, Deserialize};
//!
//! #[derive(Debug, Clone, Serialize, Deserialize)]
//! pub struct User {
//!     pub id: String,
//!     pub name: String,
//!     pub age: i64,
//! }
//!
//! impl Entity for User {
//!     fn id(&self) -> &str { &self.id }
//!     fn collection_name() -> &'static str { "users" }
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let registry = MetadataRegistry::new();
//!     registry.register_collection::<User>();
//!     registry.set_initialized();
//!
//!     let store = InMemoryStore::new();
//!     store.insert("users", vec![
//!         User { id: "1".to_string(), name: "Alice".to_string(), age: 34 },
//!         User { id: "2".to_string(), name: "Bob".to_string(), age: 27 },
//!     ]).await?;
//!
//!     let users = store.repository::<User>(&registry)?;
//!
//!     let adults = users
//!         .where_greater_or_equal("age", 30)
//!         .order_by_ascending("name")?
//!         .find()
//!         .await?;
//!
//!     let alice = users
//!         .where_equal_to("name", "Alice")
//!         .find_one()
//!         .await?;
//!
//!     println!("{adults:?} {alice:?}");
//!     Ok(())
//! }
//! ```
//!
//! # Transactions
//!
//! ```ignore
//! use emberorm::{prelude::*, memory::InMemoryStore};
//!
//! # async fn example(store: InMemoryStore, registry: MetadataRegistry) -> OrmResult<()> {
//! let handle = store.begin_transaction().await;
//! let transaction = Transaction::new(&handle, &registry)?;
//!
//! let users = transaction.get_repository::<User>()?;
//! let snapshot_view = users.find().await?;
//! # Ok(())
//! # }
//! ```
//!
//! # Backends
//!
//! - [`memory`] - Fast in-memory storage for development and testing

pub mod prelude;

pub use emberorm_core::{entity, error, executor, path, query, registry, repository, transaction};

// Re-export BSON types for convenience
pub use bson;

/// In-memory storage backend implementations.
pub mod memory {
    pub use emberorm_memory::{
        CollectionExecutor, InMemoryStore, InMemoryTransaction, SnapshotExecutor,
    };
}
