//! Core traits for entity representation and serialization.
//!
//! This module provides the fundamental trait every mapped type must
//! implement, plus conversion utilities between entity and document formats
//! (BSON, JSON).

use bson::{Bson, de::deserialize_from_bson, ser::serialize_to_bson};
use serde::{Deserialize, Serialize};
use serde_json::{Value, from_value, to_value};

use crate::error::OrmResult;

/// Core trait that all types mapped to a document collection must implement.
///
/// Every entity carries a string document ID and names the collection it
/// belongs to. The collection name is what the metadata registry resolves
/// when building collection paths.
///
/// # Example
///
/// ```ignore
/// use emberorm::entity::Entity;
/// use serde::{Serialize, Deserialize};
///
/// #[derive(Debug, Clone, Serialize, Deserialize)]
/// pub struct User {
///     pub id: String,
///     pub name: String,
/// }
///
/// impl Entity for User {
///     fn id(&self) -> &str {
///         &self.id
///     }
///
///     fn collection_name() -> &'static str {
///         "users"
///     }
/// }
/// ```
pub trait Entity: Serialize + for<'de> Deserialize<'de> + Send + Sync + Clone + 'static {
    /// Returns this entity's document ID.
    fn id(&self) -> &str;

    /// Returns the name of the collection this entity belongs to.
    ///
    /// This should be a static, lowercase identifier (e.g., "users").
    fn collection_name() -> &'static str;
}

/// Extension trait providing serialization utilities for entities.
///
/// Automatically implemented for all types that implement [`Entity`].
pub trait EntityExt: Entity {
    /// Converts this entity to a BSON value for storage.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    fn to_bson(&self) -> OrmResult<Bson>;

    /// Creates an entity from a BSON value.
    ///
    /// # Errors
    ///
    /// Returns an error if deserialization fails or the structure is invalid.
    fn from_bson(bson: Bson) -> OrmResult<Self>;

    /// Converts this entity to a JSON value.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    fn to_json(&self) -> OrmResult<Value>;

    /// Creates an entity from a JSON value.
    ///
    /// # Errors
    ///
    /// Returns an error if deserialization fails or the structure is invalid.
    fn from_json(value: Value) -> OrmResult<Self>;
}

impl<T: Entity> EntityExt for T {
    fn to_bson(&self) -> OrmResult<Bson> {
        Ok(serialize_to_bson(self)?)
    }

    fn from_bson(bson: Bson) -> OrmResult<Self> {
        Ok(deserialize_from_bson(bson)?)
    }

    fn to_json(&self) -> OrmResult<Value> {
        Ok(to_value(self)?)
    }

    fn from_json(value: Value) -> OrmResult<Self> {
        Ok(from_value(value)?)
    }
}
