//! Identity: who is signed in, and the interactive sign-in flows.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::clock::Clock;
use crate::store::{DocumentStore, StorageError};

/// Collection path for user profile documents.
const PROFILES: &str = "users";

/// The signed-in user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub uid: String,
    pub email: String,
    pub display_name: Option<String>,
}

/// Current-user lookup. Word collections are partitioned by this identity;
/// operations that need it abort when it is absent rather than retrying.
pub trait IdentityProvider: Send + Sync {
    fn current_user(&self) -> Option<Identity>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    InvalidCredentials,
    EmailTaken,
    Storage(String),
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthError::InvalidCredentials => write!(f, "unknown account or wrong password"),
            AuthError::EmailTaken => write!(f, "an account with this email already exists"),
            AuthError::Storage(message) => write!(f, "storage fault: {}", message),
        }
    }
}

impl std::error::Error for AuthError {}

impl From<StorageError> for AuthError {
    fn from(err: StorageError) -> Self {
        AuthError::Storage(err.to_string())
    }
}

/// User profile document, merge-upserted at sign-in under `users/{uid}`:
/// `createdAt` survives re-authentication, email and name follow the
/// account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub uid: String,
    pub email: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

struct Account {
    uid: String,
    // None for federated-only accounts.
    password_digest: Option<String>,
    display_name: Option<String>,
}

/// In-memory identity provider: email/password sign-up and sign-in plus a
/// federated flow, with the current identity held for the session.
pub struct InMemoryIdentityProvider<S> {
    accounts: RwLock<HashMap<String, Account>>,
    current: RwLock<Option<Identity>>,
    profiles: Arc<S>,
    clock: Arc<dyn Clock>,
}

impl<S: DocumentStore> InMemoryIdentityProvider<S> {
    pub fn new(profiles: Arc<S>, clock: Arc<dyn Clock>) -> Self {
        InMemoryIdentityProvider {
            accounts: RwLock::new(HashMap::new()),
            current: RwLock::new(None),
            profiles,
            clock,
        }
    }

    /// Create an account and sign it in.
    pub fn sign_up(&self, email: &str, password: &str) -> Result<Identity, AuthError> {
        let identity = {
            let mut accounts = self
                .accounts
                .write()
                .unwrap_or_else(PoisonError::into_inner);
            if accounts.contains_key(email) {
                return Err(AuthError::EmailTaken);
            }
            let account = Account {
                uid: Uuid::new_v4().to_string(),
                password_digest: Some(digest(password)),
                display_name: None,
            };
            let identity = Identity {
                uid: account.uid.clone(),
                email: email.to_string(),
                display_name: None,
            };
            accounts.insert(email.to_string(), account);
            identity
        };
        self.establish(identity)
    }

    /// Email/password sign-in. Unknown accounts and wrong passwords are the
    /// same error.
    pub fn sign_in(&self, email: &str, password: &str) -> Result<Identity, AuthError> {
        let identity = {
            let accounts = self.accounts.read().unwrap_or_else(PoisonError::into_inner);
            let account = accounts.get(email).ok_or(AuthError::InvalidCredentials)?;
            if account.password_digest.as_deref() != Some(digest(password).as_str()) {
                warn!(email, "sign-in with wrong password");
                return Err(AuthError::InvalidCredentials);
            }
            Identity {
                uid: account.uid.clone(),
                email: email.to_string(),
                display_name: account.display_name.clone(),
            }
        };
        self.establish(identity)
    }

    /// Federated sign-in: the external provider already vouched for the
    /// email, so the account is found or created without a password.
    pub fn sign_in_federated(&self, email: &str, display_name: &str) -> Result<Identity, AuthError> {
        let identity = {
            let mut accounts = self
                .accounts
                .write()
                .unwrap_or_else(PoisonError::into_inner);
            let account = accounts.entry(email.to_string()).or_insert_with(|| Account {
                uid: Uuid::new_v4().to_string(),
                password_digest: None,
                display_name: None,
            });
            account.display_name = Some(display_name.to_string());
            Identity {
                uid: account.uid.clone(),
                email: email.to_string(),
                display_name: account.display_name.clone(),
            }
        };
        self.establish(identity)
    }

    pub fn sign_out(&self) {
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = None;
    }

    /// The stored profile for a user, if any.
    pub fn profile(&self, uid: &str) -> Result<Option<UserProfile>, AuthError> {
        match self.profiles.get(PROFILES, uid)? {
            Some(bytes) => {
                let profile = serde_json::from_slice(&bytes)
                    .map_err(|e| AuthError::Storage(format!("corrupt profile {}: {}", uid, e)))?;
                Ok(Some(profile))
            }
            None => Ok(None),
        }
    }

    fn establish(&self, identity: Identity) -> Result<Identity, AuthError> {
        self.save_profile(&identity)?;
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = Some(identity.clone());
        debug!(uid = %identity.uid, email = %identity.email, "signed in");
        Ok(identity)
    }

    fn save_profile(&self, identity: &Identity) -> Result<(), AuthError> {
        let name = identity
            .display_name
            .clone()
            .unwrap_or_else(|| "Anonymous".to_string());

        let (profile, existed) = match self.profile(&identity.uid)? {
            Some(mut existing) => {
                existing.email = identity.email.clone();
                existing.name = name;
                (existing, true)
            }
            None => (
                UserProfile {
                    uid: identity.uid.clone(),
                    email: identity.email.clone(),
                    name,
                    created_at: self.clock.now(),
                },
                false,
            ),
        };

        let bytes = serde_json::to_vec(&profile)
            .map_err(|e| AuthError::Storage(format!("encode profile: {}", e)))?;
        if existed {
            self.profiles.update(PROFILES, &profile.uid, bytes)?;
        } else {
            self.profiles.insert(PROFILES, &profile.uid, bytes)?;
        }
        Ok(())
    }
}

impl<S: DocumentStore> IdentityProvider for InMemoryIdentityProvider<S> {
    fn current_user(&self) -> Option<Identity> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

fn digest(password: &str) -> String {
    hex::encode(Sha256::digest(password.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::SystemClock;
    use crate::store::InMemoryDocumentStore;
    use chrono::TimeZone;
    use std::sync::Mutex;

    struct FixedClock(Mutex<DateTime<Utc>>);

    impl FixedClock {
        fn at(instant: DateTime<Utc>) -> Self {
            FixedClock(Mutex::new(instant))
        }

        fn advance_to(&self, instant: DateTime<Utc>) {
            *self.0.lock().unwrap() = instant;
        }
    }

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            *self.0.lock().unwrap()
        }
    }

    fn provider() -> InMemoryIdentityProvider<InMemoryDocumentStore> {
        InMemoryIdentityProvider::new(
            Arc::new(InMemoryDocumentStore::new()),
            Arc::new(SystemClock),
        )
    }

    #[test]
    fn sign_up_establishes_identity() {
        let auth = provider();
        assert_eq!(auth.current_user(), None);

        let identity = auth.sign_up("ana@example.com", "hunter2").unwrap();
        assert_eq!(auth.current_user(), Some(identity.clone()));

        let profile = auth.profile(&identity.uid).unwrap().unwrap();
        assert_eq!(profile.email, "ana@example.com");
        assert_eq!(profile.name, "Anonymous");
    }

    #[test]
    fn duplicate_sign_up_is_rejected() {
        let auth = provider();
        auth.sign_up("ana@example.com", "hunter2").unwrap();
        auth.sign_out();

        let err = auth.sign_up("ana@example.com", "other").unwrap_err();
        assert_eq!(err, AuthError::EmailTaken);
        assert_eq!(auth.current_user(), None);
    }

    #[test]
    fn sign_in_checks_credentials() {
        let auth = provider();
        let created = auth.sign_up("ana@example.com", "hunter2").unwrap();
        auth.sign_out();

        assert_eq!(
            auth.sign_in("ana@example.com", "wrong").unwrap_err(),
            AuthError::InvalidCredentials
        );
        assert_eq!(
            auth.sign_in("nobody@example.com", "hunter2").unwrap_err(),
            AuthError::InvalidCredentials
        );
        assert_eq!(auth.current_user(), None);

        let identity = auth.sign_in("ana@example.com", "hunter2").unwrap();
        assert_eq!(identity.uid, created.uid);
        assert_eq!(auth.current_user(), Some(identity));
    }

    #[test]
    fn federated_sign_in_finds_or_creates() {
        let auth = provider();
        let first = auth.sign_in_federated("ana@example.com", "Ana").unwrap();
        auth.sign_out();
        let second = auth.sign_in_federated("ana@example.com", "Ana S.").unwrap();

        assert_eq!(first.uid, second.uid);
        assert_eq!(second.display_name.as_deref(), Some("Ana S."));

        let profile = auth.profile(&second.uid).unwrap().unwrap();
        assert_eq!(profile.name, "Ana S.");
    }

    #[test]
    fn profile_merge_keeps_created_at() {
        let documents = Arc::new(InMemoryDocumentStore::new());
        let day_one = Utc.with_ymd_and_hms(2026, 3, 10, 9, 0, 0).unwrap();
        let day_two = Utc.with_ymd_and_hms(2026, 5, 1, 9, 0, 0).unwrap();
        let clock = Arc::new(FixedClock::at(day_one));
        let auth = InMemoryIdentityProvider::new(documents, Arc::clone(&clock) as Arc<dyn Clock>);

        let identity = auth.sign_up("ana@example.com", "hunter2").unwrap();
        auth.sign_out();

        clock.advance_to(day_two);
        auth.sign_in("ana@example.com", "hunter2").unwrap();

        let profile = auth.profile(&identity.uid).unwrap().unwrap();
        assert_eq!(profile.created_at, day_one);
    }

    #[test]
    fn passwords_are_not_stored_verbatim() {
        let auth = provider();
        auth.sign_up("ana@example.com", "hunter2").unwrap();
        let accounts = auth.accounts.read().unwrap();
        let stored = accounts["ana@example.com"]
            .password_digest
            .clone()
            .unwrap();
        assert_ne!(stored, "hunter2");
        assert_eq!(stored, digest("hunter2"));
    }
}
