//! HashMap-backed document store for testing and development.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use super::document::{DocumentStore, StorageError};

type Collections = HashMap<String, HashMap<String, Vec<u8>>>;

/// In-memory document store keyed by collection path. Clone-friendly via Arc.
#[derive(Clone)]
pub struct InMemoryDocumentStore {
    collections: Arc<RwLock<Collections>>,
}

impl Default for InMemoryDocumentStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryDocumentStore {
    pub fn new() -> Self {
        InMemoryDocumentStore {
            collections: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

impl DocumentStore for InMemoryDocumentStore {
    fn list(&self, collection: &str) -> Result<Vec<(String, Vec<u8>)>, StorageError> {
        let collections = self
            .collections
            .read()
            .map_err(|_| StorageError::LockPoisoned("list"))?;

        Ok(collections
            .get(collection)
            .map(|documents| {
                documents
                    .iter()
                    .map(|(id, bytes)| (id.clone(), bytes.clone()))
                    .collect()
            })
            .unwrap_or_default())
    }

    fn get(&self, collection: &str, id: &str) -> Result<Option<Vec<u8>>, StorageError> {
        let collections = self
            .collections
            .read()
            .map_err(|_| StorageError::LockPoisoned("get"))?;

        Ok(collections
            .get(collection)
            .and_then(|documents| documents.get(id))
            .cloned())
    }

    fn insert(&self, collection: &str, id: &str, bytes: Vec<u8>) -> Result<(), StorageError> {
        let mut collections = self
            .collections
            .write()
            .map_err(|_| StorageError::LockPoisoned("insert"))?;

        let documents = collections.entry(collection.to_string()).or_default();
        if documents.contains_key(id) {
            return Err(StorageError::AlreadyExists { id: id.to_string() });
        }
        documents.insert(id.to_string(), bytes);
        Ok(())
    }

    fn update(&self, collection: &str, id: &str, bytes: Vec<u8>) -> Result<(), StorageError> {
        let mut collections = self
            .collections
            .write()
            .map_err(|_| StorageError::LockPoisoned("update"))?;

        let slot = collections
            .get_mut(collection)
            .and_then(|documents| documents.get_mut(id))
            .ok_or_else(|| StorageError::Missing { id: id.to_string() })?;
        *slot = bytes;
        Ok(())
    }

    fn delete(&self, collection: &str, id: &str) -> Result<(), StorageError> {
        let mut collections = self
            .collections
            .write()
            .map_err(|_| StorageError::LockPoisoned("delete"))?;

        if let Some(documents) = collections.get_mut(collection) {
            documents.remove(id);
        }
        Ok(())
    }

    fn apply_batch(
        &self,
        collection: &str,
        writes: Vec<(String, Vec<u8>)>,
    ) -> Result<(), StorageError> {
        let mut collections = self
            .collections
            .write()
            .map_err(|_| StorageError::LockPoisoned("apply_batch"))?;

        let documents = collections.entry(collection.to_string()).or_default();

        // Validate the whole batch before touching anything, so a bad write
        // cannot leave a partial result behind.
        for (id, _) in &writes {
            if !documents.contains_key(id) {
                return Err(StorageError::Missing { id: id.clone() });
            }
        }
        for (id, bytes) in writes {
            documents.insert(id, bytes);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_get_list() {
        let store = InMemoryDocumentStore::new();
        store.insert("c", "a", vec![1]).unwrap();
        store.insert("c", "b", vec![2]).unwrap();

        assert_eq!(store.get("c", "a").unwrap(), Some(vec![1]));
        assert_eq!(store.get("c", "missing").unwrap(), None);
        assert_eq!(store.list("c").unwrap().len(), 2);
        assert!(store.list("other").unwrap().is_empty());
    }

    #[test]
    fn insert_rejects_taken_id() {
        let store = InMemoryDocumentStore::new();
        store.insert("c", "a", vec![1]).unwrap();
        let err = store.insert("c", "a", vec![2]).unwrap_err();
        assert_eq!(err, StorageError::AlreadyExists { id: "a".into() });
        assert_eq!(store.get("c", "a").unwrap(), Some(vec![1]));
    }

    #[test]
    fn update_requires_existing() {
        let store = InMemoryDocumentStore::new();
        let err = store.update("c", "a", vec![1]).unwrap_err();
        assert_eq!(err, StorageError::Missing { id: "a".into() });

        store.insert("c", "a", vec![1]).unwrap();
        store.update("c", "a", vec![9]).unwrap();
        assert_eq!(store.get("c", "a").unwrap(), Some(vec![9]));
    }

    #[test]
    fn delete_is_idempotent() {
        let store = InMemoryDocumentStore::new();
        store.insert("c", "a", vec![1]).unwrap();
        store.delete("c", "a").unwrap();
        assert_eq!(store.get("c", "a").unwrap(), None);
        store.delete("c", "a").unwrap();
        store.delete("never", "a").unwrap();
    }

    #[test]
    fn batch_is_all_or_nothing() {
        let store = InMemoryDocumentStore::new();
        store.insert("c", "a", vec![1]).unwrap();
        store.insert("c", "b", vec![2]).unwrap();

        let err = store
            .apply_batch(
                "c",
                vec![
                    ("a".to_string(), vec![10]),
                    ("ghost".to_string(), vec![99]),
                    ("b".to_string(), vec![20]),
                ],
            )
            .unwrap_err();
        assert_eq!(err, StorageError::Missing { id: "ghost".into() });
        // Nothing applied.
        assert_eq!(store.get("c", "a").unwrap(), Some(vec![1]));
        assert_eq!(store.get("c", "b").unwrap(), Some(vec![2]));

        store
            .apply_batch(
                "c",
                vec![("a".to_string(), vec![10]), ("b".to_string(), vec![20])],
            )
            .unwrap();
        assert_eq!(store.get("c", "a").unwrap(), Some(vec![10]));
        assert_eq!(store.get("c", "b").unwrap(), Some(vec![20]));
    }

    #[test]
    fn clones_share_storage() {
        let store = InMemoryDocumentStore::new();
        let other = store.clone();
        store.insert("c", "a", vec![1]).unwrap();
        assert_eq!(other.get("c", "a").unwrap(), Some(vec![1]));
    }
}
