//! Persistence providers.
//!
//! Everything the crate stores goes through [`KeyValueStore`]: an opaque
//! byte payload under a namespaced string key. [`MemoryStore`] stands in for
//! browser local storage; [`SeaOrmStore`] keeps the same entries in a
//! database table.

use std::fmt::{self, Debug};

use async_trait::async_trait;

use crate::error::Result;
use crate::model::RecordKind;

mod memory;
mod seaorm_store;

pub use memory::MemoryStore;
pub use seaorm_store::SeaOrmStore;

/// Computes the new payload of a key from its current payload.
///
/// A provider may call it more than once when it has to retry the write, so
/// it must not assume it runs a single time.
pub type UpdateFn<'a> = Box<dyn FnMut(Option<Vec<u8>>) -> Result<Vec<u8>> + Send + 'a>;

/// A key-value persistence provider.
///
/// Any number of handles, in this process or another one, may share the
/// same entries; [`update`](KeyValueStore::update) is the only way to change
/// an entry based on what it currently holds without racing them.
#[async_trait]
pub trait KeyValueStore: Debug + Send + Sync {
    /// Returns the payload stored under `key`, if any.
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Stores `value` under `key`, replacing any previous payload.
    async fn set(&self, key: &str, value: Vec<u8>) -> Result<()>;

    /// Removes `key`. Removing a missing key is not an error.
    async fn remove(&self, key: &str) -> Result<()>;

    /// Atomically replaces the payload under `key` with `apply(current)`.
    ///
    /// No other write to `key` lands between the read and the write. When
    /// `apply` fails, nothing is written and its error is returned.
    async fn update<'a>(&self, key: &str, apply: UpdateFn<'a>) -> Result<()>;
}

/// A namespaced storage key.
///
/// Record keys have the shape `namespace:kind:owner[:scope]`, where `scope`
/// narrows a kind further (images are stored per project).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StorageKey(String);

impl StorageKey {
    /// Key of one record sequence.
    pub fn records(namespace: &str, kind: RecordKind, owner: &str, scope: Option<&str>) -> Self {
        match scope {
            Some(scope) => Self(format!("{namespace}:{}:{owner}:{scope}", kind.as_str())),
            None => Self(format!("{namespace}:{}:{owner}", kind.as_str())),
        }
    }

    /// Key of the persisted current session.
    pub fn session(namespace: &str) -> Self {
        Self(format!("{namespace}:{}", RecordKind::Session.as_str()))
    }

    /// Key of the email to user-id registry.
    pub fn identities(namespace: &str) -> Self {
        Self(format!("{namespace}:identities"))
    }

    /// The key as handed to a [`KeyValueStore`].
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StorageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
