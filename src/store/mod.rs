/// Store layer for the dashboard's persisted state
///
/// This module defines the key-value store interface every other layer
/// writes through, plus the error taxonomy for store operations.

pub mod memory;
pub mod sqlite;

// Re-export the concrete store types
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

use std::sync::mpsc;
use thiserror::Error;

/// Errors that can occur during store operations
#[derive(Error, Debug)]
pub enum StoreError {
    /// The backing store rejected a write because it would exceed capacity.
    /// The previously stored value for the key is left unchanged.
    #[error("storage quota exceeded: {used} of {limit} bytes in use")]
    QuotaExceeded { used: usize, limit: usize },

    /// Any other backend failure (store disabled, I/O error, ...)
    #[error("storage unavailable: {0}")]
    Unavailable(String),

    /// The value could not be serialized for storage
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// A change notification emitted by a store that supports subscriptions
///
/// `key` is `None` when the whole store was cleared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreEvent {
    pub key: Option<String>,
}

/// The single string-keyed, string-valued local store everything persists to
///
/// Implementations are synchronous and assume one logical writer per key at
/// a time within a single execution context. Backend failures on the read
/// side fail open: `get` and `keys` treat them as "absent" after logging,
/// only writes surface errors.
pub trait KeyValueStore {
    /// Return the raw stored string for `key`, or `None` if never set
    fn get(&self, key: &str) -> Option<String>;

    /// Persist `value` under `key` synchronously
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Remove every key. A failure here is session-fatal for the caller;
    /// no partially-cleared state is ever surfaced as recoverable.
    fn clear(&self) -> Result<(), StoreError>;

    /// Enumerate all present keys, order unspecified
    fn keys(&self) -> Vec<String>;

    /// Optional best-effort change notification channel
    ///
    /// Stores that cannot notify return `None`; callers must behave
    /// correctly (if slightly stale) without it.
    fn subscribe(&self) -> Option<mpsc::Receiver<StoreEvent>> {
        None
    }
}
