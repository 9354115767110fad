//! Error types and result types for ORM operations.
//!
//! This module provides error handling for query construction, registry
//! lookups, and executor-backed reads. Use [`OrmResult<T>`] as the return type
//! for fallible operations.

use bson::error::Error as BsonError;
use serde_json::Error as SerdeJsonError;
use thiserror::Error;

/// Represents all possible errors raised by the object-mapping layer.
///
/// Builder validation errors (`InvalidArgument`, `InvalidState`) are raised
/// synchronously at the offending call. Executor-originated failures surface
/// as `Backend` and propagate unmodified through the awaited terminal call.
#[derive(Error, Debug)]
pub enum OrmError {
    /// A builder argument violated a structural limit of the backing store,
    /// such as a set-membership value sequence longer than ten elements.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
    /// A one-shot builder clause (limit, orderBy, custom query) was used more
    /// than once in the same query expression.
    #[error("Invalid state: {0}")]
    InvalidState(String),
    /// Transaction-scoped repository access was requested before the global
    /// database connection was initialized.
    #[error("The database connection must be initialized first")]
    NotInitialized,
    /// The entity type has no entry in the metadata registry.
    #[error("Entity type is not registered as a collection: {0}")]
    NotRegistered(String),
    /// Serialization/deserialization error when converting between entity and
    /// document formats (BSON, JSON).
    #[error("Serialization error: {0}")]
    Serialization(String),
    /// An error surfaced by the query executor or the underlying store.
    #[error("Backend error: {0}")]
    Backend(String),
}

/// A specialized `Result` type for ORM operations.
pub type OrmResult<T> = Result<T, OrmError>;

impl From<BsonError> for OrmError {
    fn from(err: BsonError) -> Self {
        OrmError::Serialization(err.to_string())
    }
}

impl From<SerdeJsonError> for OrmError {
    fn from(err: SerdeJsonError) -> Self {
        OrmError::Serialization(err.to_string())
    }
}
