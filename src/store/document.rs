use std::fmt;

/// Error from the storage backend itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageError {
    LockPoisoned(&'static str),
    Missing { id: String },
    AlreadyExists { id: String },
    Backend(String),
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageError::LockPoisoned(operation) => {
                write!(f, "storage lock poisoned during {}", operation)
            }
            StorageError::Missing { id } => write!(f, "document {} does not exist", id),
            StorageError::AlreadyExists { id } => write!(f, "document {} already exists", id),
            StorageError::Backend(message) => write!(f, "storage backend error: {}", message),
        }
    }
}

impl std::error::Error for StorageError {}

/// Abstract CRUD + batch storage over `(collection path, document id)`.
///
/// Documents are opaque serialized bytes; callers own the schema. Maps to a
/// document collection in hosted stores, tables in SQL, key prefixes in KV.
pub trait DocumentStore: Send + Sync {
    /// All documents in a collection, order unspecified.
    fn list(&self, collection: &str) -> Result<Vec<(String, Vec<u8>)>, StorageError>;

    fn get(&self, collection: &str, id: &str) -> Result<Option<Vec<u8>>, StorageError>;

    /// Create a new document. Fails `AlreadyExists` if the id is taken.
    fn insert(&self, collection: &str, id: &str, bytes: Vec<u8>) -> Result<(), StorageError>;

    /// Replace an existing document. Fails `Missing` if absent.
    fn update(&self, collection: &str, id: &str, bytes: Vec<u8>) -> Result<(), StorageError>;

    /// Delete a document. Deleting an absent id is a no-op.
    fn delete(&self, collection: &str, id: &str) -> Result<(), StorageError>;

    /// Replace several existing documents at once. All-or-nothing: either
    /// every write lands or none do.
    fn apply_batch(
        &self,
        collection: &str,
        writes: Vec<(String, Vec<u8>)>,
    ) -> Result<(), StorageError>;
}
