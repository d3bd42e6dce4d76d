/// Snapshot export and import
///
/// A snapshot is the full content of the store at one instant: a flat JSON
/// object whose top-level keys are the store keys. Export decodes each raw
/// value as JSON where possible and keeps it as a raw string otherwise.
/// Import is a destructive replace, never a merge, and validates the
/// document before anything is cleared.

use std::collections::BTreeMap;
use std::path::Path;

use chrono::NaiveDateTime;
use serde_json::Value;
use thiserror::Error;

use crate::calendar::day_key;
use crate::store::{KeyValueStore, StoreError};

/// Errors that can occur while importing a snapshot
///
/// `MalformedDocument` and `FileRead` fire before any destructive action;
/// the store is left untouched.
#[derive(Error, Debug)]
pub enum ImportError {
    #[error("malformed snapshot document: {0}")]
    MalformedDocument(String),

    #[error("failed to read snapshot file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// A complete point-in-time export of the store's contents
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Snapshot {
    pub entries: BTreeMap<String, Value>,
}

impl Snapshot {
    /// Render the snapshot as the flat JSON document users download
    pub fn to_json_string(&self) -> String {
        let object: serde_json::Map<String, Value> = self
            .entries
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        serde_json::to_string_pretty(&Value::Object(object))
            .unwrap_or_else(|_| "{}".to_string())
    }
}

/// Capture every key of the store into a snapshot
///
/// Values that parse as JSON are stored decoded; anything else is kept as
/// a raw string, so a later import reproduces the same decoded view.
pub fn export_snapshot<S>(store: &S) -> Snapshot
where
    S: KeyValueStore + ?Sized,
{
    let mut entries = BTreeMap::new();
    for key in store.keys() {
        if let Some(raw) = store.get(&key) {
            let value = serde_json::from_str(&raw).unwrap_or(Value::String(raw));
            entries.insert(key, value);
        }
    }
    tracing::info!("exported snapshot with {} entries", entries.len());
    Snapshot { entries }
}

/// Suggested download name for an export taken at `now`
pub fn suggested_filename(now: NaiveDateTime) -> String {
    format!("life-dashboard-backup-{}.json", day_key(now.date()))
}

/// Parse snapshot text, accepting only a flat JSON object
pub fn parse_snapshot(text: &str) -> Result<Snapshot, ImportError> {
    let value: Value = serde_json::from_str(text)
        .map_err(|e| ImportError::MalformedDocument(e.to_string()))?;

    match value {
        Value::Object(object) => Ok(Snapshot {
            entries: object.into_iter().collect(),
        }),
        other => Err(ImportError::MalformedDocument(format!(
            "expected a JSON object at the top level, got {}",
            json_type_name(&other)
        ))),
    }
}

/// Read and parse a snapshot file
///
/// One-shot read: it either completes or fails with `FileRead`; there is
/// no cancellation.
pub fn read_snapshot_file(path: &Path) -> Result<Snapshot, ImportError> {
    let text = std::fs::read_to_string(path)?;
    parse_snapshot(&text)
}

/// Replace the entire store's contents with `doc`
///
/// Any key present in the store but absent from `doc` is lost. The document
/// is structurally valid by construction (see `parse_snapshot`), so the
/// clear only happens once no validation can fail.
pub fn import_snapshot<S>(store: &S, doc: &Snapshot) -> Result<(), ImportError>
where
    S: KeyValueStore + ?Sized,
{
    store.clear()?;

    for (key, value) in &doc.entries {
        let raw = match value {
            // Raw strings were never JSON; write them back verbatim
            Value::String(s) => s.clone(),
            other => serde_json::to_string(other).map_err(StoreError::from)?,
        };
        store.set(key, &raw)?;
    }

    tracing::info!("imported snapshot with {} entries", doc.entries.len());
    Ok(())
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
