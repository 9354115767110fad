//! An object-mapping layer that lets application code declare types as
//! document collections and query them through a fluent builder.
//!
//! This crate is the core of the emberorm project and provides:
//!
//! - **Entity traits** ([`entity`]) - Core traits for defining and serializing entities
//! - **Field paths** ([`path`]) - Dotted-path canonicalization for field references
//! - **Query building** ([`query`]) - The chainable clause accumulator with local validation
//! - **Execution boundary** ([`executor`]) - The pluggable executor trait queries delegate to
//! - **Metadata registry** ([`registry`]) - Explicit type-to-collection registration
//! - **Repositories** ([`repository`]) - Collection-bound query handles
//! - **Transactions** ([`transaction`]) - Transaction-scoped repository access
//! - **Error handling** ([`error`]) - Error and result types
//!
//! # Example
//!
//! ```ignore
//! use emberorm_core::entity::Entity;
//! use serde::{Serialize, Deserialize};
//!
//! #[derive(Debug, Clone, Serialize, Deserialize)]
//! pub struct User {
//!     pub id: String,
//!     pub name: String,
//! }
//!
//! impl Entity for User {
//!     fn id(&self) -> &str {
//!         &self.id
//!     }
//!
//!     fn collection_name() -> &'static str {
//!         "users"
//!     }
//! }
//! ```

extern crate self as emberorm_core;

pub mod entity;
pub mod error;
pub mod executor;
pub mod path;
pub mod query;
pub mod registry;
pub mod repository;
pub mod transaction;
