//! In-memory store backend.
//!
//! Implements the collection boundary over `tokio::sync::RwLock` and
//! `BTreeMap`. Used by tests and by default wiring until a synchronized
//! persistence engine is attached. BTreeMap keys give `find` a
//! deterministic id order.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::collection::{Collection, Database};
use crate::error::{StoreError, StoreResult};
use crate::query::DocumentQuery;

/// An in-memory document collection.
#[derive(Debug, Default)]
pub struct MemoryCollection {
    documents: RwLock<BTreeMap<String, Value>>,
}

impl MemoryCollection {
    /// Creates an empty collection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored documents.
    pub async fn len(&self) -> usize {
        self.documents.read().await.len()
    }

    /// Whether the collection is empty.
    pub async fn is_empty(&self) -> bool {
        self.documents.read().await.is_empty()
    }
}

#[async_trait]
impl Collection for MemoryCollection {
    async fn insert(&self, id: &str, document: Value) -> StoreResult<()> {
        let mut documents = self.documents.write().await;
        if documents.contains_key(id) {
            return Err(StoreError::DuplicateDocument(id.to_string()));
        }
        documents.insert(id.to_string(), document);
        Ok(())
    }

    async fn get(&self, id: &str) -> StoreResult<Option<Value>> {
        Ok(self.documents.read().await.get(id).cloned())
    }

    async fn update(&self, id: &str, document: Value) -> StoreResult<()> {
        let mut documents = self.documents.write().await;
        match documents.get_mut(id) {
            Some(slot) => {
                *slot = document;
                Ok(())
            }
            None => Err(StoreError::DocumentNotFound(id.to_string())),
        }
    }

    async fn delete(&self, id: &str) -> StoreResult<bool> {
        Ok(self.documents.write().await.remove(id).is_some())
    }

    async fn find(&self, query: &DocumentQuery) -> StoreResult<Vec<Value>> {
        let documents = self.documents.read().await;
        Ok(documents
            .values()
            .filter(|document| query.matches(document))
            .cloned()
            .collect())
    }

    async fn find_one(&self, query: &DocumentQuery) -> StoreResult<Option<Value>> {
        let documents = self.documents.read().await;
        Ok(documents
            .values()
            .find(|document| query.matches(document))
            .cloned())
    }
}

/// An in-memory database handing out named [`MemoryCollection`]s.
///
/// Collections are created lazily on first access, mirroring how the
/// synchronized engine materializes collections per entity type.
#[derive(Debug, Default)]
pub struct MemoryDatabase {
    collections: RwLock<BTreeMap<String, Arc<MemoryCollection>>>,
}

impl MemoryDatabase {
    /// Creates an empty database.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Database for MemoryDatabase {
    async fn collection(&self, name: &str) -> Arc<dyn Collection> {
        // First try to get an existing collection
        {
            let collections = self.collections.read().await;
            if let Some(collection) = collections.get(name) {
                return collection.clone();
            }
        }

        // Create a new one
        let mut collections = self.collections.write().await;
        // Check again in case another task created it
        if let Some(collection) = collections.get(name) {
            return collection.clone();
        }

        let collection = Arc::new(MemoryCollection::new());
        collections.insert(name.to_string(), collection.clone());

        tracing::debug!(collection = name, "Created in-memory collection");

        collection
    }
}
