/// Typed record codec over the key-value store
///
/// Converts between raw stored strings and typed record values. Decode
/// failure is treated like "key absent": the data is non-critical personal
/// tracking data, so reads fail open to the caller's default. Writes are
/// never silently lost; every store error propagates.

use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

use crate::store::{KeyValueStore, StoreError};

/// A stored value that did not parse as the expected record shape
///
/// Always recovered locally; surfaced only as a diagnostic.
#[derive(Error, Debug)]
#[error("stored value under '{key}' is corrupt: {source}")]
pub struct DecodeError {
    pub key: String,
    #[source]
    pub source: serde_json::Error,
}

/// Read and decode `key`, distinguishing absent, present, and corrupt
pub fn try_load<T, S>(store: &S, key: &str) -> Result<Option<T>, DecodeError>
where
    T: DeserializeOwned,
    S: KeyValueStore + ?Sized,
{
    match store.get(key) {
        None => Ok(None),
        Some(raw) => serde_json::from_str(&raw).map(Some).map_err(|source| {
            DecodeError {
                key: key.to_string(),
                source,
            }
        }),
    }
}

/// Read and decode `key`, falling back to `default` on absence or corruption
///
/// On absence the caller's `default` is returned unchanged, not re-parsed.
/// Corruption is reported as a non-fatal diagnostic and never escapes.
pub fn load<T, S>(store: &S, key: &str, default: T) -> T
where
    T: DeserializeOwned,
    S: KeyValueStore + ?Sized,
{
    match try_load(store, key) {
        Ok(Some(value)) => value,
        Ok(None) => default,
        Err(e) => {
            tracing::warn!("{}, using default", e);
            default
        }
    }
}

/// Encode `value` and write it under `key`
///
/// Propagates `QuotaExceeded`/`Unavailable` for user-visible reporting;
/// never retries.
pub fn save<T, S>(store: &S, key: &str, value: &T) -> Result<(), StoreError>
where
    T: Serialize,
    S: KeyValueStore + ?Sized,
{
    let raw = serde_json::to_string(value)?;
    store.set(key, &raw)
}
