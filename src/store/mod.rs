//! Durable, observable word storage.
//!
//! `WordStore` is the domain facade: it owns the duplicate-word invariant,
//! the once-per-day review gate, and per-collection snapshot fan-out, on top
//! of an abstract `DocumentStore` backend.

mod document;
mod in_memory;
mod watch;
mod words;

use std::fmt;

use crate::language::Language;

pub use document::{DocumentStore, StorageError};
pub use in_memory::InMemoryDocumentStore;
pub use watch::WatchHandle;
pub use words::WordStore;

/// The composite key scoping one word collection: `(owner, language)`.
///
/// Collections are partitioned per user; the storage path is
/// `users/{uid}/languages/{language}/words`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CollectionKey {
    pub owner: String,
    pub language: Language,
}

impl CollectionKey {
    pub fn new(owner: impl Into<String>, language: Language) -> Self {
        CollectionKey {
            owner: owner.into(),
            language,
        }
    }

    pub fn path(&self) -> String {
        format!("users/{}/languages/{}/words", self.owner, self.language.code())
    }
}

impl fmt::Display for CollectionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

/// Outcome of a word store operation that did not succeed.
///
/// `DuplicateWord`, `NotFound`, and `ThrottledToday` are expected conditions
/// the screen turns into notices; `NotAuthenticated` and `Storage` are
/// faults, logged where they arise.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    NotAuthenticated,
    EmptyField,
    DuplicateWord { word: String },
    NotFound { id: String },
    ThrottledToday,
    Storage(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::NotAuthenticated => write!(f, "no signed-in user"),
            StoreError::EmptyField => write!(f, "word and meaning must be non-empty"),
            StoreError::DuplicateWord { word } => {
                write!(f, "word '{}' already exists in this collection", word)
            }
            StoreError::NotFound { id } => write!(f, "no word with id {}", id),
            StoreError::ThrottledToday => write!(f, "progress already updated today"),
            StoreError::Storage(message) => write!(f, "storage fault: {}", message),
        }
    }
}

impl std::error::Error for StoreError {}

impl From<StorageError> for StoreError {
    fn from(err: StorageError) -> Self {
        tracing::error!(error = %err, "storage fault");
        StoreError::Storage(err.to_string())
    }
}
