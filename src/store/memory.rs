/// In-memory store implementation
///
/// This provides the same contract as the durable store but backed by a
/// plain map, with a controllable byte capacity so tests can exercise
/// quota failures deterministically.

use std::collections::HashMap;
use std::sync::mpsc;
use std::sync::Mutex;

use crate::store::{KeyValueStore, StoreError, StoreEvent};

/// Map-backed store with an optional capacity limit
///
/// Capacity counts the UTF-8 byte lengths of every stored key and value,
/// the same accounting the durable store uses.
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
    capacity_bytes: Option<usize>,
    subscribers: Mutex<Vec<mpsc::Sender<StoreEvent>>>,
}

impl MemoryStore {
    /// Create an unbounded in-memory store
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            capacity_bytes: None,
            subscribers: Mutex::new(Vec::new()),
        }
    }

    /// Create a store that rejects writes beyond `capacity_bytes`
    pub fn with_capacity(capacity_bytes: usize) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            capacity_bytes: Some(capacity_bytes),
            subscribers: Mutex::new(Vec::new()),
        }
    }

    /// Total bytes currently stored across all keys and values
    pub fn used_bytes(&self) -> usize {
        let entries = self.entries.lock().expect("store mutex poisoned");
        entries.iter().map(|(k, v)| k.len() + v.len()).sum()
    }

    fn notify(&self, event: StoreEvent) {
        let mut subscribers = self.subscribers.lock().expect("store mutex poisoned");
        // Drop receivers that have gone away
        subscribers.retain(|tx| tx.send(event.clone()).is_ok());
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        let entries = self.entries.lock().expect("store mutex poisoned");
        entries.get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        {
            let mut entries = self.entries.lock().expect("store mutex poisoned");

            if let Some(limit) = self.capacity_bytes {
                let used: usize = entries.iter().map(|(k, v)| k.len() + v.len()).sum();
                let replaced = entries.get(key).map(|v| key.len() + v.len()).unwrap_or(0);
                let projected = used - replaced + key.len() + value.len();
                if projected > limit {
                    return Err(StoreError::QuotaExceeded { used, limit });
                }
            }

            entries.insert(key.to_string(), value.to_string());
        }

        self.notify(StoreEvent {
            key: Some(key.to_string()),
        });
        Ok(())
    }

    fn clear(&self) -> Result<(), StoreError> {
        {
            let mut entries = self.entries.lock().expect("store mutex poisoned");
            entries.clear();
        }
        self.notify(StoreEvent { key: None });
        Ok(())
    }

    fn keys(&self) -> Vec<String> {
        let entries = self.entries.lock().expect("store mutex poisoned");
        entries.keys().cloned().collect()
    }

    fn subscribe(&self) -> Option<mpsc::Receiver<StoreEvent>> {
        let (tx, rx) = mpsc::channel();
        let mut subscribers = self.subscribers.lock().expect("store mutex poisoned");
        subscribers.push(tx);
        Some(rx)
    }
}
