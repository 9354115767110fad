//! In-memory backend for emberorm.
//!
//! This crate provides a thread-safe, in-memory backing store together with
//! two executor implementations: a live collection reader and a
//! transactional snapshot reader. It exercises the full clause model and is
//! the backend of choice for development and testing.
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
//!
//!     let store = InMemoryStore::new();
//!     store.insert("users", vec![User {
//!         id: "1".to_string(),
//!         name: "Alice".to_string(),
//!     }]).await?;
//!
//!     let users = store.repository::<User>(&registry)?;
//!     let alice = users.where_equal_to("name", "Alice").find_one().await?;
//!
//!     Ok(())
//! }
//! ```

extern crate self as emberorm_memory;

pub mod evaluator;
pub mod executor;
pub mod store;
pub mod transaction;

pub use executor::CollectionExecutor;
pub use store::InMemoryStore;
pub use transaction::{InMemoryTransaction, SnapshotExecutor};
