//! Shared fixtures for the integration suite.

#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Local, TimeZone, Utc};
use wordup::{
    Clock, DocumentStore, InMemoryDocumentStore, InMemoryIdentityProvider, StorageError, WordStore,
};

/// Settable clock for crossing day boundaries deterministically.
pub struct FixedClock(Mutex<DateTime<Utc>>);

impl FixedClock {
    pub fn at(instant: DateTime<Utc>) -> Self {
        FixedClock(Mutex::new(instant))
    }

    pub fn advance_to(&self, instant: DateTime<Utc>) {
        *self.0.lock().unwrap() = instant;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        *self.0.lock().unwrap()
    }
}

/// Build instants in local time so calendar-day comparisons come out the
/// same on any machine, whatever its timezone.
pub fn local(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> DateTime<Utc> {
    Local
        .with_ymd_and_hms(y, mo, d, h, mi, 0)
        .single()
        .unwrap()
        .with_timezone(&Utc)
}

/// Document store wrapper with switchable write faults, for exercising the
/// degraded paths.
pub struct FaultyStore {
    inner: InMemoryDocumentStore,
    fail_writes: AtomicBool,
    fail_batches: AtomicBool,
}

impl FaultyStore {
    pub fn new() -> Self {
        FaultyStore {
            inner: InMemoryDocumentStore::new(),
            fail_writes: AtomicBool::new(false),
            fail_batches: AtomicBool::new(false),
        }
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub fn fail_batches(&self, fail: bool) {
        self.fail_batches.store(fail, Ordering::SeqCst);
    }

    fn write_fault(&self) -> Result<(), StorageError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            Err(StorageError::Backend("injected write fault".into()))
        } else {
            Ok(())
        }
    }
}

impl DocumentStore for FaultyStore {
    fn list(&self, collection: &str) -> Result<Vec<(String, Vec<u8>)>, StorageError> {
        self.inner.list(collection)
    }

    fn get(&self, collection: &str, id: &str) -> Result<Option<Vec<u8>>, StorageError> {
        self.inner.get(collection, id)
    }

    fn insert(&self, collection: &str, id: &str, bytes: Vec<u8>) -> Result<(), StorageError> {
        self.write_fault()?;
        self.inner.insert(collection, id, bytes)
    }

    fn update(&self, collection: &str, id: &str, bytes: Vec<u8>) -> Result<(), StorageError> {
        self.write_fault()?;
        self.inner.update(collection, id, bytes)
    }

    fn delete(&self, collection: &str, id: &str) -> Result<(), StorageError> {
        self.write_fault()?;
        self.inner.delete(collection, id)
    }

    fn apply_batch(
        &self,
        collection: &str,
        writes: Vec<(String, Vec<u8>)>,
    ) -> Result<(), StorageError> {
        if self.fail_batches.load(Ordering::SeqCst) {
            return Err(StorageError::Backend("injected batch fault".into()));
        }
        self.inner.apply_batch(collection, writes)
    }
}

pub struct Fixture<S: DocumentStore> {
    pub store: Arc<WordStore<S>>,
    pub auth: Arc<InMemoryIdentityProvider<InMemoryDocumentStore>>,
    pub clock: Arc<FixedClock>,
}

fn fixture_with<S: DocumentStore + 'static>(documents: Arc<S>) -> Fixture<S> {
    let clock = Arc::new(FixedClock::at(local(2026, 3, 10, 9, 0)));
    let auth = Arc::new(InMemoryIdentityProvider::new(
        Arc::new(InMemoryDocumentStore::new()),
        Arc::clone(&clock) as Arc<dyn Clock>,
    ));
    auth.sign_up("ana@example.com", "hunter2").unwrap();
    let store = Arc::new(WordStore::new(
        documents,
        Arc::clone(&auth) as Arc<dyn wordup::IdentityProvider>,
        Arc::clone(&clock) as Arc<dyn Clock>,
    ));
    Fixture { store, auth, clock }
}

/// A word store with a signed-in user and a fixed clock.
pub fn signed_in_store() -> Fixture<InMemoryDocumentStore> {
    fixture_with(Arc::new(InMemoryDocumentStore::new()))
}

/// Same, but words go through a fault-injectable backend.
pub fn signed_in_faulty_store() -> (Fixture<FaultyStore>, Arc<FaultyStore>) {
    let documents = Arc::new(FaultyStore::new());
    let fixture = fixture_with(Arc::clone(&documents));
    (fixture, documents)
}
