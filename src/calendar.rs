/// Calendar and period utilities
///
/// Pure date computations plus the injectable wall clock. This module is
/// the single definition of the Monday-first week: every other component
/// calls in here rather than re-deriving weekday order, so week boundaries
/// have one source of truth.

use std::sync::{Arc, Mutex};

use chrono::{Datelike, Duration, Local, NaiveDate, NaiveDateTime, NaiveTime};

/// Canonical `YYYY-MM-DD` key for a local calendar date
///
/// Used both as a day-level period marker and as a map key for
/// day-indexed payloads.
pub fn day_key(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Weekday index with Monday = 0 ... Sunday = 6
///
/// Distinct from conventions that start the week on Sunday; the shift
/// happens here and nowhere else.
pub fn weekday_index(date: NaiveDate) -> u32 {
    date.weekday().num_days_from_monday()
}

/// ISO-8601 week number (weeks start Monday; week 1 contains the year's
/// first Thursday)
pub fn iso_week_number(date: NaiveDate) -> u32 {
    date.iso_week().week()
}

/// The year the ISO week belongs to, which differs from the calendar year
/// around year boundaries
pub fn iso_week_year(date: NaiveDate) -> i32 {
    date.iso_week().year()
}

/// The Monday at local midnight of the week containing `datetime`
pub fn start_of_week(datetime: NaiveDateTime) -> NaiveDateTime {
    let date = datetime.date();
    let monday = date - Duration::days(weekday_index(date) as i64);
    NaiveDateTime::new(monday, NaiveTime::MIN)
}

/// `YYYY-MM-DD` key of the Monday starting the week containing `date`
///
/// This is the canonical week-level period marker.
pub fn week_start_key(date: NaiveDate) -> String {
    day_key(start_of_week(NaiveDateTime::new(date, NaiveTime::MIN)).date())
}

/// Source of the current wall-clock time
///
/// Threaded through the rollover policy so boundary behavior is
/// deterministic in tests. A marker is always computed fresh from this
/// clock when compared, never cached beyond one comparison.
pub trait Clock {
    fn now(&self) -> NaiveDateTime;
}

/// The real local wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// A settable clock for driving simulated day/week boundaries in tests
#[derive(Debug, Clone)]
pub struct FixedClock {
    now: Arc<Mutex<NaiveDateTime>>,
}

impl FixedClock {
    pub fn new(now: NaiveDateTime) -> Self {
        Self {
            now: Arc::new(Mutex::new(now)),
        }
    }

    /// Move the clock to a new instant; clones of this clock see the change
    pub fn set(&self, now: NaiveDateTime) {
        *self.now.lock().expect("clock mutex poisoned") = now;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        *self.now.lock().expect("clock mutex poisoned")
    }
}
