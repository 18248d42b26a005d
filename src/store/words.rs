//! The word store: durable, observable word collections scoped by
//! `(owner, language)`.
//!
//! ## Example
//!
//! ```ignore
//! use wordup::{InMemoryDocumentStore, Language, SystemClock, WordStore};
//!
//! let store = WordStore::new(documents, identity, Arc::new(SystemClock));
//! let record = store.add_word(Language::English, "Hello", "Olá")?;
//! let handle = store.subscribe(Language::English, |words| {
//!     println!("{} words", words.len());
//! })?;
//! ```

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use uuid::Uuid;

use super::document::DocumentStore;
use super::watch::{WatchHandle, WatchHub};
use super::{CollectionKey, StoreError};
use crate::clock::Clock;
use crate::identity::IdentityProvider;
use crate::language::Language;
use crate::policy;
use crate::word::WordRecord;

/// Stored document body. `id` is the document key, not part of the body.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WordDoc {
    word: String,
    meaning: String,
    progress: u8,
    last_viewed: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
}

impl WordDoc {
    fn from_record(record: &WordRecord) -> Self {
        WordDoc {
            word: record.word.clone(),
            meaning: record.meaning.clone(),
            progress: record.progress,
            last_viewed: record.last_viewed,
            created_at: record.created_at,
        }
    }

    fn into_record(self, id: impl Into<String>) -> WordRecord {
        WordRecord {
            id: id.into(),
            word: self.word,
            meaning: self.meaning,
            progress: self.progress,
            last_viewed: self.last_viewed,
            created_at: self.created_at,
        }
    }
}

fn encode(doc: &WordDoc) -> Result<Vec<u8>, StoreError> {
    serde_json::to_vec(doc).map_err(|e| StoreError::Storage(format!("encode word document: {}", e)))
}

fn decode(id: &str, bytes: &[u8]) -> Result<WordDoc, StoreError> {
    serde_json::from_slice(bytes)
        .map_err(|e| StoreError::Storage(format!("corrupt word document {}: {}", id, e)))
}

/// Word collections partitioned by `(current user, language)`.
///
/// Every operation resolves the owner from the identity provider; with no
/// signed-in user it aborts with `NotAuthenticated`. Expected conditions
/// (duplicate, missing, throttled) come back as typed errors, never panics,
/// and every successful mutation pushes a fresh snapshot to that
/// collection's subscribers.
pub struct WordStore<S> {
    documents: Arc<S>,
    identity: Arc<dyn IdentityProvider>,
    clock: Arc<dyn Clock>,
    watches: WatchHub,
}

impl<S: DocumentStore> WordStore<S> {
    pub fn new(
        documents: Arc<S>,
        identity: Arc<dyn IdentityProvider>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        WordStore {
            documents,
            identity,
            clock,
            watches: WatchHub::new(),
        }
    }

    fn collection(&self, language: Language) -> Result<CollectionKey, StoreError> {
        match self.identity.current_user() {
            Some(user) => Ok(CollectionKey::new(user.uid, language)),
            None => {
                warn!(%language, "word store operation without a signed-in user");
                Err(StoreError::NotAuthenticated)
            }
        }
    }

    fn load(&self, key: &CollectionKey) -> Result<Vec<WordRecord>, StoreError> {
        let documents = self.documents.list(&key.path())?;
        let mut words = Vec::with_capacity(documents.len());
        for (id, bytes) in documents {
            words.push(decode(&id, &bytes)?.into_record(id));
        }
        Ok(words)
    }

    fn publish(&self, key: &CollectionKey) {
        match self.load(key) {
            Ok(snapshot) => self.watches.publish(&key.path(), &snapshot),
            Err(e) => warn!(collection = %key, error = %e, "skipping snapshot publish"),
        }
    }

    /// All words in the current user's collection for `language`, order
    /// unspecified.
    pub fn list_words(&self, language: Language) -> Result<Vec<WordRecord>, StoreError> {
        let key = self.collection(language)?;
        self.load(&key)
    }

    /// Live subscription to one collection: the listener gets the current
    /// snapshot immediately, then a fresh one after every mutation. Dropping
    /// the handle (or calling `unsubscribe`) stops delivery.
    pub fn subscribe<F>(&self, language: Language, listener: F) -> Result<WatchHandle, StoreError>
    where
        F: Fn(Vec<WordRecord>) + Send + Sync + 'static,
    {
        let key = self.collection(language)?;
        let snapshot = self.load(&key)?;

        let listener: Arc<dyn Fn(Vec<WordRecord>) + Send + Sync> = Arc::new(listener);
        let handle = self.watches.watch(&key.path(), {
            let listener = Arc::clone(&listener);
            move |words| listener(words)
        });
        listener(snapshot);
        Ok(handle)
    }

    /// Add a word to the collection. Inputs are trimmed; the `word` must not
    /// already be present (case-sensitive exact match). The new record
    /// starts at zero progress with a store-assigned id.
    ///
    /// The duplicate check is read-then-write, racy under true concurrent
    /// writers; accepted for single-user single-device usage.
    pub fn add_word(
        &self,
        language: Language,
        word: &str,
        meaning: &str,
    ) -> Result<WordRecord, StoreError> {
        let key = self.collection(language)?;
        let word = word.trim();
        let meaning = meaning.trim();
        if word.is_empty() || meaning.is_empty() {
            return Err(StoreError::EmptyField);
        }

        let existing = self.load(&key)?;
        if existing.iter().any(|record| record.word == word) {
            debug!(collection = %key, word, "word already in collection");
            return Err(StoreError::DuplicateWord {
                word: word.to_string(),
            });
        }

        let record = WordRecord::new(Uuid::new_v4().to_string(), word, meaning, self.clock.now());
        self.documents
            .insert(&key.path(), &record.id, encode(&WordDoc::from_record(&record))?)?;
        debug!(collection = %key, id = %record.id, word, "word added");
        self.publish(&key);
        Ok(record)
    }

    /// One daily progress bump for the word with `id`: `+5` capped at 100,
    /// refused with `ThrottledToday` when the word was already viewed on
    /// today's calendar day.
    pub fn update_progress(&self, language: Language, id: &str) -> Result<WordRecord, StoreError> {
        let key = self.collection(language)?;
        let bytes = self
            .documents
            .get(&key.path(), id)?
            .ok_or_else(|| StoreError::NotFound { id: id.to_string() })?;
        let doc = decode(id, &bytes)?;

        let now = self.clock.now();
        let Some(progress) = policy::review(doc.progress, doc.last_viewed, now) else {
            debug!(collection = %key, id, "progress already updated today");
            return Err(StoreError::ThrottledToday);
        };

        let mut record = doc.into_record(id);
        record.progress = progress;
        record.last_viewed = Some(now);
        self.documents
            .update(&key.path(), id, encode(&WordDoc::from_record(&record))?)?;
        self.publish(&key);
        Ok(record)
    }

    /// Zero every record in the collection (`progress = 0`, never viewed),
    /// as one all-or-nothing batch.
    pub fn reset_all(&self, language: Language) -> Result<(), StoreError> {
        let key = self.collection(language)?;
        let words = self.load(&key)?;

        let mut writes = Vec::with_capacity(words.len());
        for mut record in words {
            record.progress = 0;
            record.last_viewed = None;
            let bytes = encode(&WordDoc::from_record(&record))?;
            writes.push((record.id, bytes));
        }
        self.documents.apply_batch(&key.path(), writes)?;
        debug!(collection = %key, "progress reset");
        self.publish(&key);
        Ok(())
    }

    /// Delete the word with `id`. Removing an id that is already gone is an
    /// idempotent no-op.
    pub fn remove_word(&self, language: Language, id: &str) -> Result<(), StoreError> {
        let key = self.collection(language)?;
        self.documents.delete(&key.path(), id)?;
        debug!(collection = %key, id, "word removed");
        self.publish(&key);
        Ok(())
    }
}
