//! The collection abstraction consumed by the consumption layer.
//!
//! The synchronized persistence engine is an external collaborator; this
//! module specifies its seam: an async, queryable document collection per
//! entity type, keyed by string id, storing JSON documents that carry their
//! own variant discriminators.

use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

use crate::error::StoreResult;
use crate::query::DocumentQuery;

/// A persistent, queryable collection of JSON documents keyed by id.
///
/// Implementations must be safe for concurrent use from one account's
/// cooperative task; cross-document atomicity is explicitly *not* part of
/// the contract (the consumption layer compensates explicitly where it
/// needs multi-document consistency).
#[async_trait]
pub trait Collection: Send + Sync {
    /// Inserts a new document. Fails with `DuplicateDocument` if the id is
    /// already present.
    async fn insert(&self, id: &str, document: Value) -> StoreResult<()>;

    /// Reads a document by id.
    async fn get(&self, id: &str) -> StoreResult<Option<Value>>;

    /// Replaces an existing document. Fails with `DocumentNotFound` if the
    /// id is absent.
    async fn update(&self, id: &str, document: Value) -> StoreResult<()>;

    /// Deletes a document by id. Returns whether a document was removed.
    async fn delete(&self, id: &str) -> StoreResult<bool>;

    /// Returns all documents matching the query, in stable id order.
    async fn find(&self, query: &DocumentQuery) -> StoreResult<Vec<Value>>;

    /// Returns the first document matching the query, in stable id order.
    async fn find_one(&self, query: &DocumentQuery) -> StoreResult<Option<Value>>;
}

/// A database handing out named collections.
///
/// Collections are created lazily on first access; asking twice for the
/// same name returns handles onto the same underlying collection.
#[async_trait]
pub trait Database: Send + Sync {
    /// Returns the collection with the given name.
    async fn collection(&self, name: &str) -> Arc<dyn Collection>;
}
