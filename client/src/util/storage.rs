//! Web Storage persistence tiers.
//!
//! `localStorage` backs the durable tier ("remember me"), `sessionStorage`
//! the tab-scoped one. Private browsing or a disabled storage API surfaces as
//! a missing store: reads return nothing and writes fail with
//! [`StorageError`], which the session store logs and ignores.

use session::{KeyValueStore, StorageError, StorageTier};

pub struct WebStorage {
    tier: StorageTier,
}

impl WebStorage {
    #[must_use]
    pub fn local() -> Self {
        Self { tier: StorageTier::Durable }
    }

    #[must_use]
    pub fn session() -> Self {
        Self { tier: StorageTier::Session }
    }

    fn name(&self) -> &'static str {
        match self.tier {
            StorageTier::Durable => "localStorage",
            StorageTier::Session => "sessionStorage",
        }
    }

    #[cfg(feature = "hydrate")]
    fn storage(&self) -> Option<web_sys::Storage> {
        let window = web_sys::window()?;
        let storage = match self.tier {
            StorageTier::Durable => window.local_storage(),
            StorageTier::Session => window.session_storage(),
        };
        storage.ok().flatten()
    }
}

#[cfg(feature = "hydrate")]
impl KeyValueStore for WebStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.storage()?.get_item(key).ok().flatten()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let storage = self
            .storage()
            .ok_or_else(|| StorageError(format!("{} unavailable", self.name())))?;
        storage
            .set_item(key, value)
            .map_err(|err| StorageError(format!("{} rejected {key}: {err:?}", self.name())))
    }

    fn remove(&self, key: &str) {
        if let Some(storage) = self.storage() {
            let _ = storage.remove_item(key);
        }
    }
}

// Outside the browser there is nothing to persist to.
#[cfg(not(feature = "hydrate"))]
impl KeyValueStore for WebStorage {
    fn get(&self, _key: &str) -> Option<String> {
        None
    }

    fn set(&self, key: &str, _value: &str) -> Result<(), StorageError> {
        Err(StorageError(format!("{} unavailable on server (key {key})", self.name())))
    }

    fn remove(&self, _key: &str) {}
}
