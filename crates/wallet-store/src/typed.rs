//! Typed access to a raw document collection.
//!
//! `TypedCollection<T>` wraps an untyped [`Collection`] with serde
//! conversions, providing a domain-typed interface to controllers. It is
//! the layer at which "document" becomes "record": the consumption layer
//! only ever sees its own types.

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::marker::PhantomData;
use std::sync::Arc;

use crate::collection::Collection;
use crate::error::StoreResult;
use crate::query::DocumentQuery;

/// A serde-typed view onto a raw collection.
#[derive(Clone)]
pub struct TypedCollection<T> {
    inner: Arc<dyn Collection>,
    _marker: PhantomData<fn() -> T>,
}

impl<T> TypedCollection<T>
where
    T: Serialize + DeserializeOwned,
{
    /// Wraps a raw collection.
    #[must_use]
    pub fn new(inner: Arc<dyn Collection>) -> Self {
        Self {
            inner,
            _marker: PhantomData,
        }
    }

    /// Inserts a new record under the given id.
    pub async fn insert(&self, id: &str, record: &T) -> StoreResult<()> {
        let document = serde_json::to_value(record)?;
        self.inner.insert(id, document).await
    }

    /// Reads a record by id.
    pub async fn get(&self, id: &str) -> StoreResult<Option<T>> {
        match self.inner.get(id).await? {
            Some(document) => Ok(Some(serde_json::from_value(document)?)),
            None => Ok(None),
        }
    }

    /// Replaces an existing record.
    pub async fn update(&self, id: &str, record: &T) -> StoreResult<()> {
        let document = serde_json::to_value(record)?;
        self.inner.update(id, document).await
    }

    /// Deletes a record by id. Returns whether a record was removed.
    pub async fn delete(&self, id: &str) -> StoreResult<bool> {
        self.inner.delete(id).await
    }

    /// Returns all records matching the query.
    pub async fn find(&self, query: &DocumentQuery) -> StoreResult<Vec<T>> {
        let documents = self.inner.find(query).await?;
        let mut records = Vec::with_capacity(documents.len());
        for document in documents {
            records.push(serde_json::from_value(document)?);
        }
        Ok(records)
    }

    /// Returns the first record matching the query.
    pub async fn find_one(&self, query: &DocumentQuery) -> StoreResult<Option<T>> {
        match self.inner.find_one(query).await? {
            Some(document) => Ok(Some(serde_json::from_value(document)?)),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryCollection;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Record {
        id: String,
        kind: String,
        count: u32,
    }

    fn typed() -> TypedCollection<Record> {
        TypedCollection::new(Arc::new(MemoryCollection::new()))
    }

    #[tokio::test]
    async fn roundtrips_records() {
        let collection = typed();
        let record = Record {
            id: "r-1".to_string(),
            kind: "x".to_string(),
            count: 3,
        };

        collection.insert("r-1", &record).await.unwrap();
        let loaded = collection.get("r-1").await.unwrap().unwrap();
        assert_eq!(loaded, record);
    }

    #[tokio::test]
    async fn update_and_delete() {
        let collection = typed();
        let mut record = Record {
            id: "r-1".to_string(),
            kind: "x".to_string(),
            count: 3,
        };
        collection.insert("r-1", &record).await.unwrap();

        record.count = 4;
        collection.update("r-1", &record).await.unwrap();
        assert_eq!(collection.get("r-1").await.unwrap().unwrap().count, 4);

        assert!(collection.delete("r-1").await.unwrap());
        assert!(collection.get("r-1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn find_with_query() {
        let collection = typed();
        for (id, kind) in [("a", "x"), ("b", "y"), ("c", "x")] {
            collection
                .insert(
                    id,
                    &Record {
                        id: id.to_string(),
                        kind: kind.to_string(),
                        count: 0,
                    },
                )
                .await
                .unwrap();
        }

        let query = DocumentQuery::new().field("kind", json!("x"));
        let found = collection.find(&query).await.unwrap();
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].id, "a");
        assert_eq!(found[1].id, "c");
    }
}
