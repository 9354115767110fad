//! Convenient re-exports of commonly used types from emberorm.
//!
//! Import this prelude module to quickly access the most frequently used types
//! and traits without needing to import from multiple sub-modules:
//!
//! ```ignore
//! use emberorm::prelude::*;
//! ```
//!
//! This provides access to:
//! - Entity traits and serialization helpers
//! - The query builder, clause model, and executor trait
//! - Field path construction
//! - Repositories, the collection registry, and transactions
//! - Error types

pub use emberorm_core::{
    entity::{Entity, EntityExt},
    error::{OrmError, OrmResult},
    executor::{CustomQueryFn, QueryExecutor},
    path::{FieldPath, FieldRef},
    query::{FilterOperator, OrderBy, OrderDirection, QueryBuilder, QueryClause},
    registry::{CollectionDescriptor, MetadataRegistry},
    repository::Repository,
    transaction::{CollectionReference, ReferenceStore, Transaction, TransactionHandle},
};
