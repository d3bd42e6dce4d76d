/// Period rollover policy
///
/// Every per-period accumulator stores the marker of the period its payload
/// belongs to. Whenever the accumulator is read, the stored marker is
/// compared against a marker computed fresh from the clock; on mismatch the
/// payload is replaced by its empty shape, the marker advanced, and the
/// reset persisted immediately. The reset fires at most once per boundary
/// crossing; a missing or unparsable marker counts as stale, never as an
/// error.

use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use chrono::NaiveDateTime;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::calendar::{day_key, week_start_key, Clock};
use crate::codec;
use crate::store::{KeyValueStore, StoreError};

/// The accounting period an accumulator is keyed by
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Period {
    /// Calendar day, marker `YYYY-MM-DD`
    Day,
    /// Monday-first week, marker is the start-of-week date `YYYY-MM-DD`
    Week,
}

impl Period {
    /// The marker for the period containing `now`
    pub fn marker(&self, now: NaiveDateTime) -> String {
        match self {
            Period::Day => day_key(now.date()),
            Period::Week => week_start_key(now.date()),
        }
    }
}

/// A record that accumulates per-period data and carries its period marker
///
/// `Default` must produce the empty payload with an empty marker, which is
/// stale against any real period and therefore resets on first load.
pub trait Periodic: Serialize + DeserializeOwned + Default {
    /// Whether this record rolls over daily or weekly
    const PERIOD: Period;

    /// The stored marker for the period the payload currently represents
    fn marker(&self) -> &str;

    /// Replace the payload with its empty shape and advance the marker
    fn reset(&mut self, marker: String);
}

/// Reset `record` if its marker no longer matches the current period
///
/// Returns whether a reset fired. Applying this twice within one period is
/// the same as applying it once.
pub fn ensure_current<T: Periodic>(record: &mut T, now: NaiveDateTime) -> bool {
    let current = T::PERIOD.marker(now);
    if record.marker() == current {
        return false;
    }
    record.reset(current);
    true
}

/// Load a periodic record, rolling it over first if its period has passed
///
/// Absent or corrupt stored state decodes to the default (empty marker),
/// which is stale by definition and resets cleanly. A reset is persisted
/// before the record is returned, so a concurrent context converges to the
/// same view on its next load.
pub fn load_current<T, S, C>(store: &S, key: &str, clock: &C) -> Result<T, StoreError>
where
    T: Periodic,
    S: KeyValueStore + ?Sized,
    C: Clock + ?Sized,
{
    let mut record = codec::load(store, key, T::default());
    if ensure_current(&mut record, clock.now()) {
        tracing::debug!("rolled over '{}' to period '{}'", key, record.marker());
        codec::save(store, key, &record)?;
    }
    Ok(record)
}

/// Background recheck driving rollovers in long-lived sessions
///
/// The on-load check alone only fires on the next reload; this watcher
/// invokes `recheck` on a fixed interval (default hourly) so an accumulator
/// left open still resets promptly after a boundary passes. The thread
/// stops when the watcher is dropped.
pub struct RolloverWatcher {
    stop_tx: mpsc::Sender<()>,
    handle: Option<thread::JoinHandle<()>>,
}

impl RolloverWatcher {
    pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(60 * 60);

    /// Spawn the recheck thread
    pub fn spawn<F>(interval: Duration, mut recheck: F) -> Self
    where
        F: FnMut() + Send + 'static,
    {
        let (stop_tx, stop_rx) = mpsc::channel::<()>();
        let handle = thread::spawn(move || loop {
            match stop_rx.recv_timeout(interval) {
                Err(mpsc::RecvTimeoutError::Timeout) => recheck(),
                // Stop requested or the watcher was leaked and dropped
                _ => break,
            }
        });

        Self {
            stop_tx,
            handle: Some(handle),
        }
    }
}

impl Drop for RolloverWatcher {
    fn drop(&mut self) {
        let _ = self.stop_tx.send(());
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}
