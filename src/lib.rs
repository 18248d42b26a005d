mod clock;
mod controller;
mod identity;
mod language;
mod policy;
mod routes;
mod store;
mod word;

pub use clock::{Clock, SystemClock};
pub use controller::{LanguageScreen, Notice};
pub use identity::{AuthError, Identity, IdentityProvider, InMemoryIdentityProvider, UserProfile};
pub use language::Language;
pub use policy::{local_date, review, same_calendar_day, PROGRESS_MAX, PROGRESS_STEP};
pub use routes::Route;
pub use store::{
    CollectionKey, DocumentStore, InMemoryDocumentStore, StorageError, StoreError, WatchHandle,
    WordStore,
};
pub use word::{Suggestion, WordRecord};
