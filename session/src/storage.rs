//! Persistence tiers for the session token and user record.
//!
//! SYSTEM CONTEXT
//! ==============
//! "Remember me" sessions live in the durable tier (browser `localStorage`,
//! the CLI's state file); everything else lives in the session tier
//! (`sessionStorage`, process memory). Both tiers use the same two keys and
//! at most one of them holds a session at a time.

#[cfg(test)]
#[path = "storage_test.rs"]
mod storage_test;

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::user::User;

pub const TOKEN_KEY: &str = "token";
pub const USER_KEY: &str = "user";

/// A write to a persistence tier failed (quota, private mode, I/O).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("storage write failed: {0}")]
pub struct StorageError(pub String);

/// One string key-value persistence tier.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;

    /// # Errors
    ///
    /// Returns [`StorageError`] when the backing store rejects the write.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    fn remove(&self, key: &str);
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StorageTier {
    /// Survives browser restarts.
    Durable,
    /// Scoped to the current browser session.
    Session,
}

impl StorageTier {
    #[must_use]
    pub fn for_remember(remember: bool) -> Self {
        if remember { Self::Durable } else { Self::Session }
    }

    #[must_use]
    pub fn other(self) -> Self {
        match self {
            Self::Durable => Self::Session,
            Self::Session => Self::Durable,
        }
    }
}

/// In-memory tier used for process-scoped sessions and in tests.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RefCell<HashMap<String, String>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.borrow().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries.borrow_mut().insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove(&self, key: &str) {
        self.entries.borrow_mut().remove(key);
    }
}

/// A session read back from storage.
#[derive(Clone, Debug, PartialEq)]
pub struct StoredSession {
    pub tier: StorageTier,
    pub token: String,
    pub user: User,
}

/// Outcome of reading both tiers at bootstrap.
#[derive(Clone, Debug, PartialEq)]
pub enum Restored {
    Found(StoredSession),
    Empty,
    /// A stored user record did not parse; both tiers were wiped.
    Corrupt,
}

/// The pair of tiers plus the rules for reading and writing a session.
#[derive(Clone)]
pub struct SessionPersistence {
    durable: Rc<dyn KeyValueStore>,
    session: Rc<dyn KeyValueStore>,
}

impl SessionPersistence {
    pub fn new(durable: Rc<dyn KeyValueStore>, session: Rc<dyn KeyValueStore>) -> Self {
        Self { durable, session }
    }

    fn tier(&self, tier: StorageTier) -> &dyn KeyValueStore {
        match tier {
            StorageTier::Durable => self.durable.as_ref(),
            StorageTier::Session => self.session.as_ref(),
        }
    }

    /// Read the durable tier first, then the session tier. A tier counts only
    /// when it holds both keys.
    #[must_use]
    pub fn restore(&self) -> Restored {
        for tier in [StorageTier::Durable, StorageTier::Session] {
            let store = self.tier(tier);
            let (Some(token), Some(raw_user)) = (store.get(TOKEN_KEY), store.get(USER_KEY)) else {
                continue;
            };
            let parsed = serde_json::from_str::<serde_json::Value>(&raw_user)
                .ok()
                .and_then(User::from_value);
            return match parsed {
                Some(user) => Restored::Found(StoredSession { tier, token, user }),
                None => {
                    tracing::warn!(?tier, "stored user record is malformed; clearing session storage");
                    self.clear();
                    Restored::Corrupt
                }
            };
        }
        Restored::Empty
    }

    /// Write token and user to `tier` and wipe the other tier.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] when either key could not be written; the
    /// tier is left without a partial session in that case.
    pub fn save(&self, tier: StorageTier, token: &str, user: &User) -> Result<(), StorageError> {
        self.clear_tier(tier.other());
        let raw_user = serde_json::to_string(user).map_err(|e| StorageError(e.to_string()))?;
        let store = self.tier(tier);
        let written = store.set(TOKEN_KEY, token).and_then(|()| store.set(USER_KEY, &raw_user));
        if written.is_err() {
            self.clear_tier(tier);
        }
        written
    }

    /// Overwrite the user record in whichever tier currently holds the token.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] when the write is rejected.
    pub fn save_user(&self, user: &User) -> Result<(), StorageError> {
        let Some(tier) = self.token_tier() else {
            return Ok(());
        };
        let raw_user = serde_json::to_string(user).map_err(|e| StorageError(e.to_string()))?;
        self.tier(tier).set(USER_KEY, &raw_user)
    }

    #[must_use]
    pub fn token_tier(&self) -> Option<StorageTier> {
        [StorageTier::Durable, StorageTier::Session]
            .into_iter()
            .find(|tier| self.tier(*tier).get(TOKEN_KEY).is_some())
    }

    /// Remove every persisted copy from both tiers.
    pub fn clear(&self) {
        self.clear_tier(StorageTier::Durable);
        self.clear_tier(StorageTier::Session);
    }

    fn clear_tier(&self, tier: StorageTier) {
        let store = self.tier(tier);
        store.remove(TOKEN_KEY);
        store.remove(USER_KEY);
    }
}
