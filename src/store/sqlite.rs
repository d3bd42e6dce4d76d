/// SQLite implementation of the key-value store
///
/// This is the durable backend: a single `kv` table holding one row per
/// stored key. It enforces a byte capacity the way a browser-local store
/// does, rejecting (not truncating) writes that would exceed it.

use std::path::PathBuf;
use std::sync::mpsc;
use std::sync::Mutex;

use rusqlite::{params, Connection, OptionalExtension};

use crate::store::{KeyValueStore, StoreError, StoreEvent};

/// Default capacity, matching the ballpark a browser grants local storage
pub const DEFAULT_CAPACITY_BYTES: usize = 5 * 1024 * 1024;

/// SQLite-backed store with a fixed byte capacity
pub struct SqliteStore {
    conn: Connection,
    capacity_bytes: usize,
    subscribers: Mutex<Vec<mpsc::Sender<StoreEvent>>>,
}

impl SqliteStore {
    /// Open (or create) the store at `db_path` with the default capacity
    pub fn new(db_path: PathBuf) -> Result<Self, StoreError> {
        Self::with_capacity(db_path, DEFAULT_CAPACITY_BYTES)
    }

    /// Open (or create) the store at `db_path` with an explicit capacity
    pub fn with_capacity(db_path: PathBuf, capacity_bytes: usize) -> Result<Self, StoreError> {
        let conn = Connection::open(&db_path)
            .map_err(|e| StoreError::Unavailable(format!("failed to open store: {}", e)))?;

        initialize_schema(&conn)?;

        tracing::info!("SQLite store initialized at: {:?}", db_path);

        Ok(Self {
            conn,
            capacity_bytes,
            subscribers: Mutex::new(Vec::new()),
        })
    }

    /// Open the store at the default location, trying the user's home,
    /// data, and config directories in order, falling back to the current
    /// directory.
    pub fn open_default() -> Result<Self, StoreError> {
        let potential_dirs = [
            dirs::home_dir().map(|mut p| {
                p.push(".life_dashboard");
                p
            }),
            dirs::data_dir().map(|mut p| {
                p.push("life_dashboard");
                p
            }),
            dirs::config_dir().map(|mut p| {
                p.push("life_dashboard");
                p
            }),
            std::env::current_dir().ok().map(|mut p| {
                p.push(".life_dashboard");
                p
            }),
        ];

        for dir in potential_dirs.iter().flatten() {
            if std::fs::create_dir_all(dir).is_ok() {
                let mut db_path = dir.clone();
                db_path.push("dashboard.db");
                return Self::new(db_path);
            }
        }

        Err(StoreError::Unavailable(
            "no writable location for the store".to_string(),
        ))
    }

    /// Total bytes currently stored across all keys and values
    pub fn used_bytes(&self) -> usize {
        self.conn
            .query_row(
                "SELECT COALESCE(SUM(LENGTH(CAST(key AS BLOB)) + LENGTH(CAST(value AS BLOB))), 0) FROM kv",
                [],
                |row| row.get::<_, i64>(0),
            )
            .unwrap_or(0) as usize
    }

    fn stored_size(&self, key: &str) -> usize {
        self.conn
            .query_row(
                "SELECT LENGTH(CAST(key AS BLOB)) + LENGTH(CAST(value AS BLOB)) FROM kv WHERE key = ?1",
                params![key],
                |row| row.get::<_, i64>(0),
            )
            .optional()
            .unwrap_or(None)
            .unwrap_or(0) as usize
    }

    fn notify(&self, event: StoreEvent) {
        let mut subscribers = self.subscribers.lock().expect("store mutex poisoned");
        subscribers.retain(|tx| tx.send(event.clone()).is_ok());
    }
}

impl KeyValueStore for SqliteStore {
    fn get(&self, key: &str) -> Option<String> {
        let result = self
            .conn
            .query_row(
                "SELECT value FROM kv WHERE key = ?1",
                params![key],
                |row| row.get::<_, String>(0),
            )
            .optional();

        match result {
            Ok(value) => value,
            Err(e) => {
                // Read failures fail open: treat the key as absent
                tracing::warn!("store read failed for key '{}': {}", key, e);
                None
            }
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let used = self.used_bytes();
        let projected = used - self.stored_size(key) + key.len() + value.len();
        if projected > self.capacity_bytes {
            return Err(StoreError::QuotaExceeded {
                used,
                limit: self.capacity_bytes,
            });
        }

        self.conn
            .execute(
                "INSERT INTO kv (key, value) VALUES (?1, ?2)
                 ON CONFLICT(key) DO UPDATE SET value = excluded.value",
                params![key, value],
            )
            .map_err(|e| StoreError::Unavailable(format!("write failed: {}", e)))?;

        tracing::debug!("stored {} bytes under key '{}'", value.len(), key);
        self.notify(StoreEvent {
            key: Some(key.to_string()),
        });
        Ok(())
    }

    fn clear(&self) -> Result<(), StoreError> {
        self.conn
            .execute("DELETE FROM kv", [])
            .map_err(|e| StoreError::Unavailable(format!("clear failed: {}", e)))?;
        self.notify(StoreEvent { key: None });
        Ok(())
    }

    fn keys(&self) -> Vec<String> {
        let mut stmt = match self.conn.prepare("SELECT key FROM kv") {
            Ok(stmt) => stmt,
            Err(e) => {
                tracing::warn!("store key enumeration failed: {}", e);
                return Vec::new();
            }
        };

        let keys = match stmt.query_map([], |row| row.get::<_, String>(0)) {
            Ok(rows) => rows.filter_map(|r| r.ok()).collect(),
            Err(e) => {
                tracing::warn!("store key enumeration failed: {}", e);
                Vec::new()
            }
        };
        keys
    }

    fn subscribe(&self) -> Option<mpsc::Receiver<StoreEvent>> {
        let (tx, rx) = mpsc::channel();
        let mut subscribers = self.subscribers.lock().expect("store mutex poisoned");
        subscribers.push(tx);
        Some(rx)
    }
}

/// Create the key-value table if it doesn't exist
///
/// Safe to call on every open; the schema is a single table so there is
/// no version tracking to migrate.
fn initialize_schema(conn: &Connection) -> Result<(), StoreError> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS kv (
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL
        )",
        [],
    )
    .map_err(|e| StoreError::Unavailable(format!("schema initialization failed: {}", e)))?;

    Ok(())
}
